use markdown_rundoc_engine::{
    HtmlStash, LineHighlighter, RundocPreprocessor, SelectionConfig, Stash,
};
use pretty_assertions::assert_eq;

fn render(preprocessor: &RundocPreprocessor, md: &str) -> String {
    let mut stash = HtmlStash::new();
    let text = preprocessor.run(md, &mut stash);
    stash.restore(&text)
}

const GUIDE: &str = r#"# Install guide

Set up the database first.

```bash#needdb#setup
createdb app
```

```env#needdb
DB_PASS=hunter2
```

~~~python#test#slow
assert run() == "ok"
~~~

```secrets#cloud
TOKEN=abc
```

```
no tags here
```
"#;

#[test]
fn guide_without_filters() {
    insta::assert_snapshot!(render(&RundocPreprocessor::default(), GUIDE), @r#"
# Install guide

Set up the database first.

<pre><code class="bash needdb setup selected">createdb app
</code></pre>

<pre><code class="env needdb selected">DB_PASS=hunter2
</code></pre>

<pre><code class="python test slow selected">assert run() == &quot;ok&quot;
</code></pre>

<pre><code class="secrets cloud">TOKEN=abc
</code></pre>

<pre><code>no tags here
</code></pre>
"#);
}

#[test]
fn guide_excluding_slow_blocks() {
    let config = SelectionConfig::default()
        .with_tags("setup#test")
        .with_must_not_have_tags("slow");
    let blocks = RundocPreprocessor::new(config).blocks(GUIDE);

    let summary: Vec<(usize, bool)> = blocks.iter().map(|b| (b.line, b.selected)).collect();
    assert_eq!(
        summary,
        vec![(5, true), (9, true), (13, false), (17, false), (21, false)]
    );
}

#[test]
fn guide_single_python_session() {
    let config = SelectionConfig::default().with_single_session("python");
    let blocks = RundocPreprocessor::new(config).blocks(GUIDE);

    let selected: Vec<String> = blocks
        .iter()
        .filter(|b| b.selected)
        .map(|b| b.tags.to_string())
        .collect();
    assert_eq!(selected, vec!["python#test#slow"]);
}

#[test]
fn custom_selection_tag() {
    let config = SelectionConfig::default().with_selection_tag("rundoc-run");
    let html = render(&RundocPreprocessor::new(config), "```sh#x\nls\n```\n");

    assert_eq!(html, "<pre><code class=\"sh x rundoc-run\">ls\n</code></pre>\n");
}

#[test]
fn highlighted_guide_block() {
    let preprocessor =
        RundocPreprocessor::default().with_highlighter(LineHighlighter::default());
    let md = "```{.python#run hl_lines=\"2\"}\nimport os\nprint(os.sep)\n```\n";

    insta::assert_snapshot!(render(&preprocessor, md), @r#"
<div class="codehilite"><pre><code class="python run selected">import os
<span class="hll">print(os.sep)
</span></code></pre></div>
"#);
}

/// A stash that records markup and hands out visible tokens.
#[derive(Default)]
struct RecordingStash {
    stored: Vec<String>,
}

impl Stash for RecordingStash {
    fn store(&mut self, markup: String) -> String {
        self.stored.push(markup);
        format!("[[block {}]]", self.stored.len())
    }
}

#[test]
fn custom_stash_receives_every_block() {
    let mut stash = RecordingStash::default();
    let out = RundocPreprocessor::default().run(GUIDE, &mut stash);

    assert_eq!(stash.stored.len(), 5);
    assert!(out.contains("[[block 1]]\n\n[[block 2]]"));
    assert!(out.starts_with("# Install guide\n\nSet up the database first.\n\n"));
    assert!(out.ends_with("[[block 5]]\n"));
}

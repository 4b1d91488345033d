use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use markdown_rundoc_config::Config;
use markdown_rundoc_engine::{HtmlStash, LineHighlighter, RundocPreprocessor, io};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// The document with every block rendered as markup
    Html,
    /// One line per block: location, outcome and classes
    Blocks,
}

/// Mark fenced code blocks in Markdown documents for execution.
#[derive(Debug, Parser)]
#[command(name = "markdown-rundoc", version, about)]
struct Cli {
    /// Markdown files or directories to scan for `*.md`; `-` or nothing reads stdin
    paths: Vec<PathBuf>,

    /// Config file to use instead of ~/.config/markdown-rundoc/config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Select blocks carrying any of these `#`-separated tags
    #[arg(long)]
    tags: Option<String>,

    /// Only select blocks carrying all of these tags
    #[arg(long)]
    must_have_tags: Option<String>,

    /// Never select blocks carrying any of these tags
    #[arg(long)]
    must_not_have_tags: Option<String>,

    /// Only select blocks run by this interpreter
    #[arg(long)]
    single_session: Option<String>,

    /// Class added to selected blocks
    #[arg(long)]
    selection_tag: Option<String>,

    #[arg(long, value_enum, default_value_t = Format::Html)]
    format: Format,

    /// Log every classified block
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Loads the config file and applies command-line overrides on top.
    fn resolve_config(&self) -> Result<Config> {
        let config_path = self.config.clone().unwrap_or_else(Config::config_path);
        log::debug!("Config path: {}", config_path.display());

        let mut config = match Config::load_from_path(&config_path)? {
            Some(config) => {
                log::info!("Loaded config from {}", config_path.display());
                config
            }
            None if self.config.is_some() => {
                anyhow::bail!("Config file not found: {}", config_path.display())
            }
            None => Config::default(),
        };

        let overrides = [
            (&self.tags, &mut config.tags),
            (&self.must_have_tags, &mut config.must_have_tags),
            (&self.must_not_have_tags, &mut config.must_not_have_tags),
            (&self.single_session, &mut config.single_session),
            (&self.selection_tag, &mut config.selection_tag),
        ];
        for (flag, field) in overrides {
            if let Some(value) = flag {
                field.clone_from(value);
            }
        }
        Ok(config)
    }
}

fn build_preprocessor(config: &Config) -> RundocPreprocessor {
    let preprocessor = RundocPreprocessor::new(config.selection());
    match config.highlight_config() {
        Some(highlight) => preprocessor.with_highlighter(LineHighlighter::new(highlight)),
        None => preprocessor,
    }
}

/// A document to process, with the name used in reports.
struct Source {
    name: String,
    text: String,
}

fn read_sources(paths: &[PathBuf]) -> Result<Vec<Source>> {
    if paths.is_empty() {
        return Ok(vec![read_stdin()?]);
    }

    let mut sources = Vec::new();
    for path in paths {
        if path.as_os_str() == "-" {
            sources.push(read_stdin()?);
        } else if path.is_dir() {
            sources.extend(read_directory(path)?);
        } else {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            sources.push(Source {
                name: path.display().to_string(),
                text,
            });
        }
    }
    Ok(sources)
}

fn read_directory(root: &Path) -> Result<Vec<Source>> {
    let files = io::scan_markdown_files(root)
        .with_context(|| format!("Failed to scan {}", root.display()))?;
    log::info!("Found {} markdown file(s) in {}", files.len(), root.display());

    files
        .iter()
        .map(|relative| -> Result<Source> {
            let text = io::read_document(relative, root)?;
            Ok(Source {
                name: relative.to_path(root).display().to_string(),
                text,
            })
        })
        .collect()
}

fn read_stdin() -> Result<Source> {
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read stdin")?;
    Ok(Source {
        name: "<stdin>".to_string(),
        text,
    })
}

fn process(
    preprocessor: &RundocPreprocessor,
    source: &Source,
    format: Format,
    out: &mut impl Write,
) -> Result<()> {
    match format {
        Format::Html => {
            let mut stash = HtmlStash::new();
            let text = preprocessor.run(&source.text, &mut stash);
            log::debug!("{}: stashed {} block(s)", source.name, stash.len());
            out.write_all(stash.restore(&text).as_bytes())?;
        }
        Format::Blocks => {
            for block in preprocessor.blocks(&source.text) {
                writeln!(
                    out,
                    "{}:{}\t{}\t{}",
                    source.name,
                    block.line,
                    if block.selected { "selected" } else { "skipped" },
                    block.classes.join(" ")
                )?;
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let config = cli.resolve_config()?;
    let preprocessor = build_preprocessor(&config);
    let sources = read_sources(&cli.paths)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for source in &sources {
        process(&preprocessor, source, cli.format, &mut out)
            .with_context(|| format!("Failed to process {}", source.name))?;
    }
    out.flush()?;
    Ok(())
}

use relative_path::{RelativePath, RelativePathBuf};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid document directory: {0}")]
    InvalidDocumentDir(String),
    #[error("Path is not relative UTF-8: {0}")]
    InvalidPath(PathBuf),
}

/// Read a markdown document relative to `root`
pub fn read_document(relative_path: &RelativePath, root: &Path) -> Result<String, IoError> {
    let absolute_path = relative_path.to_path(root);
    if !absolute_path.exists() {
        return Err(IoError::NotFound(absolute_path));
    }
    fs::read_to_string(&absolute_path).map_err(IoError::Io)
}

/// Scan for markdown files under `root`, returned relative to it and sorted
pub fn scan_markdown_files(root: &Path) -> Result<Vec<RelativePathBuf>, IoError> {
    validate_document_dir(root)?;

    let mut files = Vec::new();
    scan_directory_recursive(root, &mut files)?;
    files.sort();

    files
        .into_iter()
        .map(|path| {
            path.strip_prefix(root)
                .ok()
                .and_then(|relative| RelativePathBuf::from_path(relative).ok())
                .ok_or(IoError::InvalidPath(path))
        })
        .collect()
}

fn scan_directory_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), IoError> {
    let entries = fs::read_dir(dir).map_err(IoError::Io)?;

    for entry in entries {
        let entry = entry.map_err(IoError::Io)?;
        let path = entry.path();

        if path.is_dir() {
            scan_directory_recursive(&path, files)?;
        } else if let Some(ext) = path.extension()
            && ext == "md"
        {
            files.push(path);
        }
    }

    Ok(())
}

pub fn validate_document_dir(path: &Path) -> Result<(), IoError> {
    if !path.exists() || !path.is_dir() {
        return Err(IoError::InvalidDocumentDir(
            "directory does not exist".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{create_test_docs_dir, create_test_file};

    #[test]
    fn test_scan_and_read_documents() {
        // Given a directory with markdown files
        let docs_dir = create_test_docs_dir();
        create_test_file(&docs_dir, "setup.md", "```bash\nmake\n```\n");
        create_test_file(&docs_dir, "deploy.md", "```bash#deploy\n./deploy\n```\n");

        // When scanning for files
        let files = scan_markdown_files(docs_dir.path()).unwrap();

        // Then both are found, sorted, and readable
        assert_eq!(
            files,
            vec![
                RelativePathBuf::from("deploy.md"),
                RelativePathBuf::from("setup.md")
            ]
        );
        let content = read_document(&files[1], docs_dir.path()).unwrap();
        assert_eq!(content, "```bash\nmake\n```\n");
    }

    #[test]
    fn test_handle_invalid_document_directory() {
        let nonexistent_path = PathBuf::from("/this/path/does/not/exist");
        let result = scan_markdown_files(&nonexistent_path);
        assert!(matches!(result, Err(IoError::InvalidDocumentDir(_))));
    }

    #[test]
    fn test_scan_nested_directories() {
        let docs_dir = create_test_docs_dir();
        create_test_file(&docs_dir, "root.md", "# Root");
        std::fs::create_dir(docs_dir.path().join("guides")).unwrap();
        create_test_file(&docs_dir, "guides/nested.md", "# Nested");

        let files = scan_markdown_files(docs_dir.path()).unwrap();

        assert_eq!(files.len(), 2);
        assert!(files.contains(&RelativePathBuf::from("guides/nested.md")));
        assert!(files.contains(&RelativePathBuf::from("root.md")));
    }

    #[test]
    fn test_ignore_non_markdown_files() {
        let docs_dir = create_test_docs_dir();
        create_test_file(&docs_dir, "document.md", "# Markdown");
        create_test_file(&docs_dir, "script.sh", "echo hi");
        create_test_file(&docs_dir, "config.toml", "tags = \"\"");

        let files = scan_markdown_files(docs_dir.path()).unwrap();

        assert_eq!(files, vec![RelativePathBuf::from("document.md")]);
    }

    #[test]
    fn test_validate_document_dir_rejects_file() {
        let docs_dir = create_test_docs_dir();
        let file = create_test_file(&docs_dir, "file.md", "");
        assert!(matches!(
            validate_document_dir(&file),
            Err(IoError::InvalidDocumentDir(_))
        ));
    }

    #[test]
    fn test_read_document_not_found() {
        let docs_dir = create_test_docs_dir();
        let result = read_document(RelativePath::new("missing.md"), docs_dir.path());
        assert!(matches!(result, Err(IoError::NotFound(_))));
    }
}

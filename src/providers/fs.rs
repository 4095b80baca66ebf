//! Filesystem document source

use async_trait::async_trait;
use std::path::PathBuf;
use walkdir::WalkDir;

use crate::error::Result;
use crate::types::RawDocument;

use super::document_store::DocumentSource;

/// Document source reading every regular file in a directory.
///
/// Subdirectories and non-UTF-8 files are skipped with a warning.
pub struct FsDocumentSource {
    dir: PathBuf,
}

impl FsDocumentSource {
    /// Create a source over the given directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl DocumentSource for FsDocumentSource {
    async fn list_documents(&self) -> Result<Vec<RawDocument>> {
        let mut documents = Vec::new();

        if !self.dir.exists() {
            tracing::warn!("Document directory {:?} does not exist", self.dir);
            return Ok(documents);
        }

        for entry in WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path().to_path_buf();
            let filename = entry.file_name().to_string_lossy().to_string();

            match tokio::fs::read_to_string(&path).await {
                Ok(content) => documents.push(RawDocument::new(filename, content)),
                Err(e) => {
                    tracing::warn!("Skipping unreadable file {:?}: {}", path, e);
                }
            }
        }

        documents.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(documents)
    }

    fn name(&self) -> &str {
        "filesystem"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lists_only_regular_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "alpha").unwrap();
        std::fs::write(dir.path().join("b.md"), "beta").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("c.txt"), "gamma").unwrap();

        let source = FsDocumentSource::new(dir.path());
        let docs = source.list_documents().await.unwrap();

        let names: Vec<&str> = docs.iter().map(|d| d.filename.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.md"]);
        assert_eq!(docs[0].content, "alpha");
    }

    #[tokio::test]
    async fn missing_directory_yields_empty_list() {
        let source = FsDocumentSource::new("/nonexistent/for/sure");
        assert!(source.list_documents().await.unwrap().is_empty());
    }
}

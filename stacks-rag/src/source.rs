//! Document sources feeding the ingestion pipeline.
//!
//! A [`DocumentSource`] enumerates documents with their extracted plain text.
//! Extraction itself (PDF parsing and the like) is a collaborator's concern;
//! the sources here cover in-memory corpora and folders of pre-extracted
//! text files.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

/// One document with its extracted plain text.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// A human-readable name, typically the file name.
    pub name: String,
    /// The extracted plain text.
    pub text: String,
}

/// An enumerable set of documents with extractable text.
///
/// Per-document extraction failures are handled inside the source (logged
/// and skipped), never surfaced as errors.
pub trait DocumentSource: Send + Sync {
    /// A label describing the source, used in error messages and logs.
    fn describe(&self) -> String;

    /// Enumerate the documents that yielded extractable text.
    fn documents(&self) -> Vec<SourceDocument>;
}

/// A fixed in-memory corpus, mainly for tests and small demos.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    documents: Vec<SourceDocument>,
}

impl InMemorySource {
    /// Create a source over the given documents.
    pub fn new(documents: Vec<SourceDocument>) -> Self {
        Self { documents }
    }
}

impl DocumentSource for InMemorySource {
    fn describe(&self) -> String {
        format!("in-memory corpus ({} documents)", self.documents.len())
    }

    fn documents(&self) -> Vec<SourceDocument> {
        self.documents.clone()
    }
}

/// A folder of pre-extracted text documents (`.txt` / `.md`).
///
/// Files that cannot be read are logged with `warn!` and skipped; a
/// missing or unreadable folder yields an empty enumeration, which the
/// pipeline reports as a no-documents failure.
#[derive(Debug, Clone)]
pub struct TextFolderSource {
    folder: PathBuf,
}

impl TextFolderSource {
    /// Create a source over the given folder.
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self { folder: folder.into() }
    }

    fn is_text_file(path: &Path) -> bool {
        matches!(
            path.extension().and_then(|e| e.to_str()),
            Some(ext) if ext.eq_ignore_ascii_case("txt") || ext.eq_ignore_ascii_case("md")
        )
    }
}

impl DocumentSource for TextFolderSource {
    fn describe(&self) -> String {
        self.folder.display().to_string()
    }

    fn documents(&self) -> Vec<SourceDocument> {
        let entries = match std::fs::read_dir(&self.folder) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(folder = %self.folder.display(), error = %e, "failed to read corpus folder");
                return Vec::new();
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && Self::is_text_file(path))
            .collect();
        // Stable enumeration order keeps passage ids deterministic per run.
        paths.sort();

        let mut documents = Vec::new();
        for path in paths {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());

            match std::fs::read_to_string(&path) {
                Ok(text) => documents.push(SourceDocument { name, text }),
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "could not read document, skipping");
                }
            }
        }

        info!(folder = %self.folder.display(), count = documents.len(), "enumerated documents");
        documents
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_folder_yields_no_documents() {
        let source = TextFolderSource::new("/nonexistent/corpus");
        assert!(source.documents().is_empty());
    }

    #[test]
    fn enumerates_only_text_files_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in
            [("b.txt", "beta"), ("a.md", "alpha"), ("c.pdf", "binary"), ("d.rs", "code")]
        {
            let mut f = std::fs::File::create(dir.path().join(name)).unwrap();
            f.write_all(body.as_bytes()).unwrap();
        }

        let source = TextFolderSource::new(dir.path());
        let docs = source.documents();
        let names: Vec<&str> = docs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a.md", "b.txt"]);
    }
}

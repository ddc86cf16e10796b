use bytes::Bytes;
use std::path::Path;

/// An uploaded file held in memory: a student's submission or the shared
/// answer key.
///
/// Cloning is cheap; the contents are reference-counted, so every grading
/// call can capture its own copy at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionFile {
    pub name: String,
    pub bytes: Bytes,
}

impl SubmissionFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads `path` into memory, keeping only its file name.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Self::new(name, bytes))
    }

    /// Lower-cased extension including the dot, e.g. `.xlsx`.
    pub fn extension(&self) -> Option<String> {
        let idx = self.name.rfind('.')?;
        Some(self.name[idx..].to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

//! Local attachment files.

use std::path::{Path, PathBuf};

/// Reads image files referenced by embeds.
pub trait AttachmentSource {
    /// File contents and MIME type of an attachment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    fn read(&self, filename: &str) -> std::io::Result<(Vec<u8>, &'static str)>;
}

/// Attachments folder of a vault.
#[derive(Debug, Clone)]
pub struct VaultAttachments {
    dir: PathBuf,
}

impl VaultAttachments {
    /// Read attachments from `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Folder files are read from.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl AttachmentSource for VaultAttachments {
    fn read(&self, filename: &str) -> std::io::Result<(Vec<u8>, &'static str)> {
        let data = std::fs::read(self.dir.join(filename))?;
        Ok((data, content_type(filename)))
    }
}

/// MIME type from a file extension.
#[must_use]
pub fn content_type(filename: &str) -> &'static str {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_content_type() {
        assert_eq!(content_type("a.png"), "image/png");
        assert_eq!(content_type("a.JPG"), "image/jpeg");
        assert_eq!(content_type("a.jpeg"), "image/jpeg");
        assert_eq!(content_type("a.svg"), "image/svg+xml");
        assert_eq!(content_type("a.webp"), "image/webp");
        assert_eq!(content_type("a.gif"), "image/gif");
        assert_eq!(content_type("notes.pdf"), "application/octet-stream");
        assert_eq!(content_type("README"), "application/octet-stream");
    }

    #[test]
    fn test_read_attachment() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("cat.png"), b"PNG").unwrap();

        let source = VaultAttachments::new(temp_dir.path());
        let (data, content_type) = source.read("cat.png").unwrap();

        assert_eq!(data, b"PNG");
        assert_eq!(content_type, "image/png");
    }

    #[test]
    fn test_read_missing_attachment() {
        let temp_dir = TempDir::new().unwrap();
        let source = VaultAttachments::new(temp_dir.path());
        let err = source.read("gone.png").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}

//! Publishing results.

use std::fmt;

use super::error::AttachmentError;
use crate::types::Page;

/// Non-fatal problem met while publishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncWarning {
    /// A diagram or image placeholder was left in the page.
    Attachment(AttachmentError),
    /// The attachment was uploaded but its token was not in the page body.
    Unplaced(AttachmentError),
}

impl fmt::Display for SyncWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attachment(err) => write!(f, "{err}; placeholder left in page"),
            Self::Unplaced(err) => write!(f, "{err}; attachment uploaded but not embedded"),
        }
    }
}

/// Outcome of publishing one note.
#[derive(Debug)]
pub struct SyncReport {
    /// Page after the last write.
    pub page: Page,
    /// Browser URL of the page.
    pub url: String,
    /// Whether the page was created by this run.
    pub created: bool,
    /// Folder pages created, outermost first.
    pub folders_created: Vec<String>,
    /// Existing pages moved below a new parent.
    pub pages_moved: Vec<String>,
    /// Attachments uploaded and embedded.
    pub attachments_uploaded: usize,
    /// Non-fatal problems.
    pub warnings: Vec<SyncWarning>,
}

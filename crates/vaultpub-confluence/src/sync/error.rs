//! Error types for publishing.

use std::fmt;

use crate::error::ConfluenceError;

/// Fatal publishing error. Remote pages created before the failure stay.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Input or configuration cannot be published.
    #[error("invalid publish request: {0}")]
    Config(String),

    /// Page lookup was rejected by the server.
    #[error("looking up '{title}' failed: {source}")]
    Lookup {
        title: String,
        #[source]
        source: ConfluenceError,
    },

    /// Page create or update was rejected, including version conflicts.
    #[error("writing '{title}' failed: {source}")]
    Write {
        title: String,
        #[source]
        source: ConfluenceError,
    },

    /// The title is taken by an archived page, which Confluence will not reuse.
    #[error("'{title}' exists as an archived page; restore or rename it first: {url}")]
    ArchivedTitle { title: String, url: String },

    /// The page would become its own ancestor: a folder above it in the
    /// same path has the same title.
    #[error("'{title}' is also the title of a folder page above it; rename one of them: {url}")]
    NestedTitle { title: String, url: String },

    /// Confluence could not be reached.
    #[error("Confluence unavailable while processing '{title}': {source}")]
    Unavailable {
        title: String,
        #[source]
        source: ConfluenceError,
    },
}

impl SyncError {
    /// Classify a failed lookup of `title`.
    pub(crate) fn lookup(title: &str, source: ConfluenceError) -> Self {
        if source.is_transport() {
            Self::Unavailable {
                title: title.to_owned(),
                source,
            }
        } else {
            Self::Lookup {
                title: title.to_owned(),
                source,
            }
        }
    }

    /// Classify a failed create or update of `title`.
    pub(crate) fn write(title: &str, source: ConfluenceError) -> Self {
        if source.is_transport() {
            Self::Unavailable {
                title: title.to_owned(),
                source,
            }
        } else {
            Self::Write {
                title: title.to_owned(),
                source,
            }
        }
    }
}

/// Kind of placeholder an attachment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Diagram,
    Image,
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Diagram => f.write_str("diagram"),
            Self::Image => f.write_str("image"),
        }
    }
}

/// A placeholder that could not be resolved. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} {index} ({name}): {reason}")]
pub struct AttachmentError {
    pub kind: AttachmentKind,
    /// Position among the document's placeholders of this kind.
    pub index: usize,
    /// Attachment filename.
    pub name: String,
    pub reason: String,
}

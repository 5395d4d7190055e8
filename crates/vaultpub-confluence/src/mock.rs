//! In-memory Confluence for testing.
//!
//! Provides [`MockConfluence`] for exercising the publisher without a server.

use std::sync::RwLock;

use crate::api::ConfluenceApi;
use crate::error::ConfluenceError;
use crate::types::{Page, PageStatus};

/// Base URL used for page links.
const MOCK_BASE_URL: &str = "https://confluence.test";

/// Remote call recorded by [`MockConfluence`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Search {
        title: String,
        status: PageStatus,
    },
    Create {
        title: String,
        parent: Option<String>,
    },
    Update {
        id: String,
        title: String,
        version: u32,
        parent: Option<String>,
    },
    Upload {
        page_id: String,
        filename: String,
    },
}

impl MockCall {
    /// Whether the call changed a page.
    #[must_use]
    pub fn is_page_write(&self) -> bool {
        matches!(self, Self::Create { .. } | Self::Update { .. })
    }
}

/// Attachment stored by [`MockConfluence`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockAttachment {
    pub id: String,
    pub page_id: String,
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Default)]
struct MockState {
    pages: Vec<Page>,
    attachments: Vec<MockAttachment>,
    calls: Vec<MockCall>,
    next_id: u64,
    unavailable: bool,
}

impl MockState {
    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        (1000 + self.next_id).to_string()
    }
}

/// In-memory space.
///
/// Use the builder methods to seed pages. Updates enforce optimistic
/// versioning the way the server does: a stale version is rejected with
/// HTTP 409.
///
/// # Example
///
/// ```ignore
/// use vaultpub_confluence::{ConfluenceApi, MockConfluence};
///
/// let confluence = MockConfluence::new()
///     .with_page("1", "Tech", None)
///     .with_archived_page("2", "Old");
///
/// let tech = confluence.find_page("Tech", None).unwrap();
/// ```
#[derive(Debug, Default)]
pub struct MockConfluence {
    state: RwLock<MockState>,
}

impl MockConfluence {
    /// Create an empty space.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a current page at version 1.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_page(self, id: &str, title: &str, parent: Option<&str>) -> Self {
        self.insert(id, title, parent, PageStatus::Current);
        self
    }

    /// Add an archived page.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_archived_page(self, id: &str, title: &str) -> Self {
        self.insert(id, title, None, PageStatus::Archived);
        self
    }

    /// Fail every call as if the server were unreachable.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn unavailable(self) -> Self {
        self.state.write().unwrap().unavailable = true;
        self
    }

    fn insert(&self, id: &str, title: &str, parent: Option<&str>, status: PageStatus) {
        self.state.write().unwrap().pages.push(Page {
            id: id.to_owned(),
            title: title.to_owned(),
            version: 1,
            parent_id: parent.map(str::to_owned),
            status,
            body: String::new(),
            web_path: None,
        });
    }

    /// All pages, in creation order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn pages(&self) -> Vec<Page> {
        self.state.read().unwrap().pages.clone()
    }

    /// Current page with the given title.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn page_titled(&self, title: &str) -> Option<Page> {
        self.state
            .read()
            .unwrap()
            .pages
            .iter()
            .find(|p| p.title == title && p.status == PageStatus::Current)
            .cloned()
    }

    /// Calls received so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        self.state.read().unwrap().calls.clone()
    }

    /// Page creates and updates received so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn page_writes(&self) -> Vec<MockCall> {
        self.calls()
            .into_iter()
            .filter(MockCall::is_page_write)
            .collect()
    }

    /// Stored attachments.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn attachments(&self) -> Vec<MockAttachment> {
        self.state.read().unwrap().attachments.clone()
    }

    /// Forget recorded calls, keeping pages and attachments.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn clear_calls(&self) {
        self.state.write().unwrap().calls.clear();
    }
}

fn unreachable_error() -> ConfluenceError {
    ConfluenceError::Io(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "mock server unavailable",
    ))
}

fn not_found(id: &str) -> ConfluenceError {
    ConfluenceError::HttpResponse {
        status: 404,
        body: format!("No content found with id {id}"),
    }
}

impl ConfluenceApi for MockConfluence {
    fn search_pages(&self, title: &str, status: PageStatus) -> Result<Vec<Page>, ConfluenceError> {
        let mut state = self.state.write().unwrap();
        state.calls.push(MockCall::Search {
            title: title.to_owned(),
            status,
        });
        if state.unavailable {
            return Err(unreachable_error());
        }

        Ok(state
            .pages
            .iter()
            .filter(|p| p.title == title && p.status == status)
            .cloned()
            .collect())
    }

    fn create_page(
        &self,
        title: &str,
        body: &str,
        parent: Option<&str>,
    ) -> Result<Page, ConfluenceError> {
        let mut state = self.state.write().unwrap();
        state.calls.push(MockCall::Create {
            title: title.to_owned(),
            parent: parent.map(str::to_owned),
        });
        if state.unavailable {
            return Err(unreachable_error());
        }
        if state.pages.iter().any(|p| p.title == title) {
            return Err(ConfluenceError::HttpResponse {
                status: 400,
                body: format!("A page with this title already exists: {title}"),
            });
        }

        let page = Page {
            id: state.allocate_id(),
            title: title.to_owned(),
            version: 1,
            parent_id: parent.map(str::to_owned),
            status: PageStatus::Current,
            body: body.to_owned(),
            web_path: None,
        };
        state.pages.push(page.clone());
        Ok(page)
    }

    fn update_page(
        &self,
        id: &str,
        title: &str,
        body: &str,
        current_version: u32,
        parent: Option<&str>,
    ) -> Result<Page, ConfluenceError> {
        let mut state = self.state.write().unwrap();
        state.calls.push(MockCall::Update {
            id: id.to_owned(),
            title: title.to_owned(),
            version: current_version + 1,
            parent: parent.map(str::to_owned),
        });
        if state.unavailable {
            return Err(unreachable_error());
        }

        let page = state
            .pages
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found(id))?;
        if page.version != current_version {
            return Err(ConfluenceError::HttpResponse {
                status: 409,
                body: format!(
                    "Version must be incremented on update. Current version is: {}",
                    page.version
                ),
            });
        }

        page.version = current_version + 1;
        title.clone_into(&mut page.title);
        body.clone_into(&mut page.body);
        if let Some(parent) = parent {
            page.parent_id = Some(parent.to_owned());
        }
        Ok(page.clone())
    }

    fn upload_attachment(
        &self,
        page_id: &str,
        filename: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<String, ConfluenceError> {
        let mut state = self.state.write().unwrap();
        state.calls.push(MockCall::Upload {
            page_id: page_id.to_owned(),
            filename: filename.to_owned(),
        });
        if state.unavailable {
            return Err(unreachable_error());
        }
        if !state.pages.iter().any(|p| p.id == page_id) {
            return Err(not_found(page_id));
        }

        if let Some(existing) = state
            .attachments
            .iter_mut()
            .find(|a| a.page_id == page_id && a.filename == filename)
        {
            existing.data = data.to_vec();
            content_type.clone_into(&mut existing.content_type);
            return Ok(existing.id.clone());
        }

        let id = format!("att{}", state.allocate_id());
        state.attachments.push(MockAttachment {
            id: id.clone(),
            page_id: page_id.to_owned(),
            filename: filename.to_owned(),
            content_type: content_type.to_owned(),
            data: data.to_vec(),
        });
        Ok(id)
    }

    fn page_url(&self, page: &Page) -> String {
        format!("{MOCK_BASE_URL}/pages/viewpage.action?pageId={}", page.id)
    }
}

//! Transport seam between the synchronizer and Confluence.

use crate::client::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::{Page, PageStatus};

/// Remote page operations the synchronizer relies on.
///
/// Implemented by [`ConfluenceClient`] over HTTP and by `MockConfluence` in
/// memory.
pub trait ConfluenceApi {
    /// Pages of the space with exactly this title and status.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup request fails.
    fn search_pages(&self, title: &str, status: PageStatus) -> Result<Vec<Page>, ConfluenceError>;

    /// Create a page below `parent`, or at the space root.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the page.
    fn create_page(
        &self,
        title: &str,
        body: &str,
        parent: Option<&str>,
    ) -> Result<Page, ConfluenceError>;

    /// Replace a page's title and body, writing version `current_version + 1`.
    ///
    /// A `parent` moves the page below that page.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the update, including when
    /// `current_version` is stale.
    fn update_page(
        &self,
        id: &str,
        title: &str,
        body: &str,
        current_version: u32,
        parent: Option<&str>,
    ) -> Result<Page, ConfluenceError>;

    /// Upload a file to a page, replacing an attachment of the same name.
    /// Returns the attachment id.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload fails.
    fn upload_attachment(
        &self,
        page_id: &str,
        filename: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<String, ConfluenceError>;

    /// Browser URL of a page.
    fn page_url(&self, page: &Page) -> String;

    /// Current page with this exact title.
    ///
    /// With a `parent`, only a page directly below it matches; without one
    /// the page may live anywhere in the space.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup request fails.
    fn find_page(&self, title: &str, parent: Option<&str>) -> Result<Option<Page>, ConfluenceError> {
        Ok(self
            .search_pages(title, PageStatus::Current)?
            .into_iter()
            .find(|page| {
                page.title == title
                    && parent.is_none_or(|id| page.parent_id.as_deref() == Some(id))
            }))
    }

    /// Archived page with this exact title.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup request fails.
    fn find_archived_page(&self, title: &str) -> Result<Option<Page>, ConfluenceError> {
        Ok(self
            .search_pages(title, PageStatus::Archived)?
            .into_iter()
            .find(|page| page.title == title))
    }
}

impl ConfluenceApi for ConfluenceClient {
    fn search_pages(&self, title: &str, status: PageStatus) -> Result<Vec<Page>, ConfluenceError> {
        ConfluenceClient::search_pages(self, title, status)
    }

    fn create_page(
        &self,
        title: &str,
        body: &str,
        parent: Option<&str>,
    ) -> Result<Page, ConfluenceError> {
        ConfluenceClient::create_page(self, title, body, parent)
    }

    fn update_page(
        &self,
        id: &str,
        title: &str,
        body: &str,
        current_version: u32,
        parent: Option<&str>,
    ) -> Result<Page, ConfluenceError> {
        ConfluenceClient::update_page(self, id, title, body, current_version, parent)
    }

    fn upload_attachment(
        &self,
        page_id: &str,
        filename: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<String, ConfluenceError> {
        ConfluenceClient::upload_attachment(self, page_id, filename, data, content_type)
            .map(|attachment| attachment.id)
    }

    fn page_url(&self, page: &Page) -> String {
        ConfluenceClient::page_url(self, page)
    }
}

//! Page operations for Confluence API.

use serde_json::{Value, json};
use tracing::info;

use super::{ConfluenceClient, checked_body, encode_query};
use crate::error::ConfluenceError;
use crate::types::{ContentResponse, Page, PageStatus, SearchResponse};

/// Fields expanded on every page lookup.
const PAGE_EXPAND: &str = "version,ancestors,body.storage";

impl ConfluenceClient {
    /// Find pages of the space with an exact title and the given status.
    pub(crate) fn search_pages(
        &self,
        title: &str,
        status: PageStatus,
    ) -> Result<Vec<Page>, ConfluenceError> {
        let url = format!(
            "{}/content?spaceKey={}&title={}&status={}&expand={PAGE_EXPAND}",
            self.api_url(),
            encode_query(&self.space_key),
            encode_query(title),
            status.as_str(),
        );

        info!("Searching {} pages titled '{}'", status, title);

        let response = self
            .agent
            .get(&url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .call()?;

        let response: SearchResponse = checked_body(response)?.read_json()?;
        Ok(response.results.into_iter().map(Page::from).collect())
    }

    /// Create a page, optionally below `parent`.
    pub(crate) fn create_page(
        &self,
        title: &str,
        body: &str,
        parent: Option<&str>,
    ) -> Result<Page, ConfluenceError> {
        let url = format!("{}/content", self.api_url());
        let payload = self.page_payload(title, body, parent, None);

        info!("Creating page '{}' (parent={:?})", title, parent);

        let payload_bytes = serde_json::to_vec(&payload)?;
        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;

        let content: ContentResponse = checked_body(response)?.read_json()?;
        let page = written_page(content, body, parent);
        info!("Created page '{}' (id={})", title, page.id);
        Ok(page)
    }

    /// Update existing page (auto-increments version).
    ///
    /// A `parent` moves the page below that page; `None` leaves it in place.
    pub(crate) fn update_page(
        &self,
        page_id: &str,
        title: &str,
        body: &str,
        version: u32,
        parent: Option<&str>,
    ) -> Result<Page, ConfluenceError> {
        let url = format!("{}/content/{}", self.api_url(), page_id);
        let payload = self.page_payload(title, body, parent, Some(version + 1));

        info!(
            "Updating page {} from version {} to {}",
            page_id,
            version,
            version + 1
        );

        let payload_bytes = serde_json::to_vec(&payload)?;
        let response = self
            .agent
            .put(&url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;

        let content: ContentResponse = checked_body(response)?.read_json()?;
        let page = written_page(content, body, parent);
        info!("Updated page {} to version {}", page_id, page.version);
        Ok(page)
    }

    /// Get web URL for page.
    pub(crate) fn page_url(&self, page: &Page) -> String {
        match &page.web_path {
            Some(webui) => format!("{}{}", self.base_url, webui),
            None => format!(
                "{}/pages/viewpage.action?pageId={}",
                self.base_url, page.id
            ),
        }
    }

    /// JSON body for page create and update requests.
    fn page_payload(
        &self,
        title: &str,
        body: &str,
        parent: Option<&str>,
        version: Option<u32>,
    ) -> Value {
        let mut payload = json!({
            "type": "page",
            "title": title,
            "space": {"key": self.space_key},
            "body": {
                "storage": {
                    "value": body,
                    "representation": "storage"
                }
            }
        });

        if let Some(parent) = parent {
            payload["ancestors"] = json!([{"id": parent}]);
        }
        if let Some(number) = version {
            payload["version"] = json!({"number": number});
        }

        payload
    }
}

/// Page after a write.
///
/// Write responses do not always expand the body or ancestors, so the values
/// just sent fill the gaps.
fn written_page(content: ContentResponse, body: &str, parent: Option<&str>) -> Page {
    let mut page = Page::from(content);
    body.clone_into(&mut page.body);
    if let Some(parent) = parent {
        page.parent_id = Some(parent.to_owned());
    }
    page
}

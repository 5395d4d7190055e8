//! Confluence page types.

use std::fmt;

use serde::Deserialize;

/// Lifecycle state of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    /// Live page.
    Current,
    /// Archived page; its title stays reserved in the space.
    Archived,
}

impl PageStatus {
    /// Value used by the REST API `status` parameter.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Archived => "archived",
        }
    }

    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("archived") => Self::Archived,
            _ => Self::Current,
        }
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confluence page as seen by the publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Page ID.
    pub id: String,
    /// Page title, unique within the space.
    pub title: String,
    /// Current version number.
    pub version: u32,
    /// Immediate parent page; `None` for space root pages.
    pub parent_id: Option<String>,
    /// Lifecycle state.
    pub status: PageStatus,
    /// Storage format body.
    pub body: String,
    /// Web UI path relative to the base URL, when the server reports one.
    pub web_path: Option<String>,
}

/// Content search API response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SearchResponse {
    /// Matching content.
    pub results: Vec<ContentResponse>,
}

/// Content as returned by the REST API.
///
/// Only includes fields that are actually used.
/// Serde ignores unknown fields from the API response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ContentResponse {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub status: Option<String>,
    pub version: Version,
    /// Ancestors ordered from the space root down to the parent.
    #[serde(default)]
    pub ancestors: Vec<Ancestor>,
    #[serde(default)]
    pub body: Option<Body>,
    #[serde(rename = "_links", default)]
    pub links: Option<Links>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Version {
    pub number: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Ancestor {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Body {
    #[serde(default)]
    pub storage: Option<Storage>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Storage {
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Links {
    #[serde(default)]
    pub webui: Option<String>,
}

impl From<ContentResponse> for Page {
    fn from(content: ContentResponse) -> Self {
        Self {
            id: content.id,
            title: content.title,
            version: content.version.number,
            parent_id: content.ancestors.into_iter().next_back().map(|a| a.id),
            status: PageStatus::parse(content.status.as_deref()),
            body: content
                .body
                .and_then(|b| b.storage)
                .map(|s| s.value)
                .unwrap_or_default(),
            web_path: content.links.and_then(|l| l.webui),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_page_from_search_result() {
        let json = r#"{
            "results": [{
                "id": "42",
                "type": "page",
                "status": "current",
                "title": "RnD",
                "version": {"number": 7, "message": ""},
                "ancestors": [{"id": "1", "title": "Home"}, {"id": "9", "title": "Tech"}],
                "body": {"storage": {"value": "<p>x</p>", "representation": "storage"}},
                "_links": {"webui": "/display/DOC/RnD", "self": "https://c/rest/api/content/42"}
            }],
            "size": 1
        }"#;

        let response: SearchResponse = serde_json::from_str(json).unwrap();
        let page = Page::from(response.results.into_iter().next().unwrap());

        assert_eq!(
            page,
            Page {
                id: "42".to_owned(),
                title: "RnD".to_owned(),
                version: 7,
                parent_id: Some("9".to_owned()),
                status: PageStatus::Current,
                body: "<p>x</p>".to_owned(),
                web_path: Some("/display/DOC/RnD".to_owned()),
            }
        );
    }

    #[test]
    fn test_root_page_without_optional_fields() {
        let json = r#"{"id": "5", "title": "Tech", "status": "archived", "version": {"number": 1}}"#;
        let page = Page::from(serde_json::from_str::<ContentResponse>(json).unwrap());

        assert_eq!(page.parent_id, None);
        assert_eq!(page.status, PageStatus::Archived);
        assert_eq!(page.body, "");
        assert_eq!(page.web_path, None);
    }
}

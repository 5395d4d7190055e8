//! Confluence publishing for vaultpub.
//!
//! This crate provides:
//! - [`ConfluenceClient`]: REST API client with basic or bearer authentication
//! - [`ConfluenceApi`]: the remote operations publishing needs, implemented
//!   by the client and by [`MockConfluence`] (behind the `mock` feature)
//! - [`Synchronizer`]: folder hierarchy reconciliation, page upsert and
//!   attachment placeholder resolution
//!
//! # API Client
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use vaultpub_config::Credentials;
//! use vaultpub_confluence::{ConfluenceApi, ConfluenceClient};
//!
//! let client = ConfluenceClient::new(
//!     "https://example.atlassian.net/wiki",
//!     "DOC",
//!     &Credentials::Basic {
//!         username: "ada@example.com".to_owned(),
//!         api_token: "token".to_owned(),
//!     },
//! );
//!
//! if let Some(page) = client.find_page("Tech", None)? {
//!     println!("Found {} at version {}", page.title, page.version);
//! }
//! # Ok(())
//! # }
//! ```

// Transport seam
mod api;
pub use api::ConfluenceApi;

// API client
mod client;
pub use client::ConfluenceClient;

// Types
mod types;
pub use types::{Page, PageStatus};

// Publishing
pub mod sync;
pub use sync::{SyncError, SyncReport, SyncWarning, Synchronizer, VaultAttachments};

// In-memory transport
#[cfg(any(test, feature = "mock"))]
mod mock;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockAttachment, MockCall, MockConfluence};

// Errors
pub mod error;
pub use error::ConfluenceError;

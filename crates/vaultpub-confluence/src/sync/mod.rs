//! Page hierarchy synchronization.
//!
//! [`Synchronizer`] publishes one transcoded note:
//!
//! 1. Make sure every folder page of the note's path exists below its parent,
//!    creating missing folders and moving misplaced ones
//! 2. Create or update the note page below the last folder
//! 3. Render diagrams and upload images, then swap their placeholder tokens
//!    for image macros in one final update
//!
//! Every run resolves the tree again by title lookup, so publishing the same
//! note twice converges on the same pages.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::time::Duration;
//! use vaultpub_config::Credentials;
//! use vaultpub_confluence::{ConfluenceClient, Synchronizer, VaultAttachments};
//! use vaultpub_diagrams::KrokiRenderer;
//! use vaultpub_markup::transcode;
//!
//! let client = ConfluenceClient::new(
//!     "https://example.atlassian.net/wiki",
//!     "DOC",
//!     &Credentials::Bearer("token".to_owned()),
//! );
//! let renderer = KrokiRenderer::new("https://kroki.io", Duration::from_secs(30));
//! let attachments = VaultAttachments::new("vault/attachments");
//! let synchronizer = Synchronizer::new(&client, &renderer, &attachments);
//!
//! let folders = vec!["Tech".to_owned(), "RnD".to_owned()];
//! let report = synchronizer.sync("Alpha", &folders, &transcode("# Alpha"))?;
//! println!("Published {}", report.url);
//! # Ok(())
//! # }
//! ```

mod error;
mod report;
mod vault;

pub use error::{AttachmentError, AttachmentKind, SyncError};
pub use report::{SyncReport, SyncWarning};
pub use vault::{AttachmentSource, VaultAttachments, content_type};

use tracing::{info, warn};
use vaultpub_diagrams::DiagramRenderer;
use vaultpub_markup::{DiagramSource, ImageEmbed, Transcoded, attachment_image, substitute_placeholder};

use crate::api::ConfluenceApi;
use crate::types::Page;

/// Body of generated folder pages.
pub const FOLDER_BODY: &str =
    "<p>This page groups the pages published from the matching vault folder.</p>";

/// Where a title was found relative to the wanted parent.
enum Located {
    UnderParent(Page),
    Elsewhere(Page),
    Missing,
}

/// Publishes transcoded notes into a Confluence space.
pub struct Synchronizer<'a> {
    api: &'a dyn ConfluenceApi,
    renderer: &'a dyn DiagramRenderer,
    attachments: &'a dyn AttachmentSource,
    root_page_id: Option<String>,
}

/// Mutable bookkeeping for one run.
#[derive(Default)]
struct Progress {
    /// Ids of the folder pages resolved so far, outermost first.
    folder_ids: Vec<String>,
    folders_created: Vec<String>,
    pages_moved: Vec<String>,
}

impl<'a> Synchronizer<'a> {
    /// Create a synchronizer publishing at the space root.
    #[must_use]
    pub fn new(
        api: &'a dyn ConfluenceApi,
        renderer: &'a dyn DiagramRenderer,
        attachments: &'a dyn AttachmentSource,
    ) -> Self {
        Self {
            api,
            renderer,
            attachments,
            root_page_id: None,
        }
    }

    /// Hang folder chains below this page instead of the space root.
    #[must_use]
    pub fn root_page_id(mut self, root_page_id: Option<String>) -> Self {
        self.root_page_id = root_page_id;
        self
    }

    /// Publish a note as `title` below the folder pages named by `folders`.
    ///
    /// # Errors
    ///
    /// Returns an error if a lookup or write fails, or if a title is held by
    /// an archived page. Pages created before the failure are kept.
    /// Placeholder failures are reported as warnings instead.
    pub fn sync(
        &self,
        title: &str,
        folders: &[String],
        transcoded: &Transcoded,
    ) -> Result<SyncReport, SyncError> {
        if title.trim().is_empty() {
            return Err(SyncError::Config("page title is empty".to_owned()));
        }
        if let Some(segment) = folders.iter().find(|s| s.trim().is_empty()) {
            return Err(SyncError::Config(format!(
                "folder path contains an empty segment: {segment:?}"
            )));
        }

        let mut progress = Progress::default();
        let mut parent = self.root_page_id.clone();

        for segment in folders {
            let folder = self.ensure_folder(segment, parent.as_deref(), &mut progress)?;
            progress.folder_ids.push(folder.id.clone());
            parent = Some(folder.id);
        }

        let (page, created) =
            self.upsert_page(title, &transcoded.markup, parent.as_deref(), &mut progress)?;

        let (page, attachments_uploaded, warnings) =
            self.resolve_placeholders(page, transcoded, parent.as_deref())?;

        let url = self.api.page_url(&page);
        info!(
            "Published '{}' (id={}, version={}) at {}",
            page.title, page.id, page.version, url
        );

        Ok(SyncReport {
            page,
            url,
            created,
            folders_created: progress.folders_created,
            pages_moved: progress.pages_moved,
            attachments_uploaded,
            warnings,
        })
    }

    /// Find `title` below `parent`, or anywhere in the space.
    ///
    /// Without a parent (first folder segment, no root page configured) any
    /// current page with the title is accepted where it is: only pages
    /// below a known parent can be misplaced.
    ///
    /// Fails when the title is only held by an archived page.
    fn locate(&self, title: &str, parent: Option<&str>) -> Result<Located, SyncError> {
        let lookup = |err| SyncError::lookup(title, err);

        if let Some(page) = self.api.find_page(title, parent).map_err(lookup)? {
            return Ok(Located::UnderParent(page));
        }
        if parent.is_some()
            && let Some(page) = self.api.find_page(title, None).map_err(lookup)?
        {
            return Ok(Located::Elsewhere(page));
        }
        if let Some(archived) = self.api.find_archived_page(title).map_err(lookup)? {
            return Err(SyncError::ArchivedTitle {
                title: title.to_owned(),
                url: self.api.page_url(&archived),
            });
        }
        Ok(Located::Missing)
    }

    /// Refuse to move a page below itself or one of its descendants.
    fn ensure_not_folder(&self, page: &Page, progress: &Progress) -> Result<(), SyncError> {
        if progress.folder_ids.contains(&page.id) {
            return Err(SyncError::NestedTitle {
                title: page.title.clone(),
                url: self.api.page_url(page),
            });
        }
        Ok(())
    }

    /// Move an existing page below `parent`, keeping its body.
    fn move_page(
        &self,
        page: &Page,
        parent: Option<&str>,
        progress: &mut Progress,
    ) -> Result<Page, SyncError> {
        warn!(
            "Moving '{}' (id={}) from parent {:?} to {:?}",
            page.title, page.id, page.parent_id, parent
        );
        let moved = self
            .api
            .update_page(&page.id, &page.title, &page.body, page.version, parent)
            .map_err(|err| SyncError::write(&page.title, err))?;
        progress.pages_moved.push(page.title.clone());
        Ok(moved)
    }

    fn ensure_folder(
        &self,
        title: &str,
        parent: Option<&str>,
        progress: &mut Progress,
    ) -> Result<Page, SyncError> {
        match self.locate(title, parent)? {
            Located::UnderParent(page) => Ok(page),
            Located::Elsewhere(page) => {
                self.ensure_not_folder(&page, progress)?;
                self.move_page(&page, parent, progress)
            }
            Located::Missing => {
                info!("Creating folder page '{}'", title);
                let page = self
                    .api
                    .create_page(title, FOLDER_BODY, parent)
                    .map_err(|err| SyncError::write(title, err))?;
                progress.folders_created.push(title.to_owned());
                Ok(page)
            }
        }
    }

    /// Create or update the note page. Returns the page and whether it is new.
    fn upsert_page(
        &self,
        title: &str,
        body: &str,
        parent: Option<&str>,
        progress: &mut Progress,
    ) -> Result<(Page, bool), SyncError> {
        let write = |err| SyncError::write(title, err);

        match self.locate(title, parent)? {
            Located::UnderParent(page) => {
                let page = self
                    .api
                    .update_page(&page.id, title, body, page.version, parent)
                    .map_err(write)?;
                Ok((page, false))
            }
            Located::Elsewhere(page) => {
                self.ensure_not_folder(&page, progress)?;
                warn!(
                    "Moving '{}' (id={}) from parent {:?} to {:?}",
                    page.title, page.id, page.parent_id, parent
                );
                let page = self
                    .api
                    .update_page(&page.id, title, body, page.version, parent)
                    .map_err(write)?;
                progress.pages_moved.push(title.to_owned());
                Ok((page, false))
            }
            Located::Missing => {
                let page = self.api.create_page(title, body, parent).map_err(write)?;
                Ok((page, true))
            }
        }
    }

    /// Upload attachments for every placeholder and embed them.
    ///
    /// Each placeholder is independent: a failure leaves its token in the
    /// body and becomes a warning.
    fn resolve_placeholders(
        &self,
        page: Page,
        transcoded: &Transcoded,
        parent: Option<&str>,
    ) -> Result<(Page, usize, Vec<SyncWarning>), SyncError> {
        if !transcoded.has_placeholders() {
            return Ok((page, 0, Vec::new()));
        }

        let mut body = page.body.clone();
        let mut uploaded = 0;
        let mut warnings = Vec::new();

        for diagram in &transcoded.diagrams {
            match self.upload_diagram(&page.id, diagram) {
                Ok(filename) => {
                    let image = attachment_image(&filename, None);
                    if embed(&mut body, &diagram.token(), &image) {
                        uploaded += 1;
                    } else {
                        warnings.push(unplaced(AttachmentKind::Diagram, diagram.index, filename));
                    }
                }
                Err(err) => {
                    warn!("Skipping {}", err);
                    warnings.push(SyncWarning::Attachment(err));
                }
            }
        }

        for image in &transcoded.images {
            match self.upload_image(&page.id, image) {
                Ok(()) => {
                    let macro_markup = attachment_image(&image.filename, image.width);
                    if embed(&mut body, &image.token(), &macro_markup) {
                        uploaded += 1;
                    } else {
                        warnings.push(unplaced(
                            AttachmentKind::Image,
                            image.index,
                            image.filename.clone(),
                        ));
                    }
                }
                Err(err) => {
                    warn!("Skipping {}", err);
                    warnings.push(SyncWarning::Attachment(err));
                }
            }
        }

        if uploaded == 0 {
            return Ok((page, 0, warnings));
        }

        let page = self
            .api
            .update_page(&page.id, &page.title, &body, page.version, parent)
            .map_err(|err| SyncError::write(&page.title, err))?;
        Ok((page, uploaded, warnings))
    }

    fn upload_diagram(&self, page_id: &str, diagram: &DiagramSource) -> Result<String, AttachmentError> {
        let filename = diagram.attachment_name();
        let failure = |reason: String| AttachmentError {
            kind: AttachmentKind::Diagram,
            index: diagram.index,
            name: filename.clone(),
            reason,
        };

        let svg = self
            .renderer
            .render_svg(&diagram.code)
            .map_err(|err| failure(err.to_string()))?;
        self.api
            .upload_attachment(page_id, &filename, &svg, "image/svg+xml")
            .map_err(|err| failure(err.to_string()))?;
        Ok(filename)
    }

    fn upload_image(&self, page_id: &str, image: &ImageEmbed) -> Result<(), AttachmentError> {
        let failure = |reason: String| AttachmentError {
            kind: AttachmentKind::Image,
            index: image.index,
            name: image.filename.clone(),
            reason,
        };

        let (data, content_type) = self
            .attachments
            .read(&image.filename)
            .map_err(|err| failure(err.to_string()))?;
        self.api
            .upload_attachment(page_id, &image.filename, &data, content_type)
            .map_err(|err| failure(err.to_string()))?;
        Ok(())
    }
}

/// Swap `token` for `markup`. False when the body does not contain the token.
fn embed(body: &mut String, token: &str, markup: &str) -> bool {
    let replaced = substitute_placeholder(body, token, markup);
    if replaced == *body {
        return false;
    }
    *body = replaced;
    true
}

fn unplaced(kind: AttachmentKind, index: usize, name: String) -> SyncWarning {
    warn!("{} {} ({}) uploaded but its placeholder is missing", kind, index, name);
    SyncWarning::Unplaced(AttachmentError {
        kind,
        index,
        name,
        reason: "placeholder not found in page body".to_owned(),
    })
}

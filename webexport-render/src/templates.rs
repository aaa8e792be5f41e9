//! Askama template definitions.

use askama::Template;

/// An image-map area with its attribute list already serialized
#[derive(Debug, Clone)]
pub struct AreaTag {
    pub coords: String,
    /// Space-prefixed `name="value"` pairs
    pub attributes: String,
}

/// A named region rendered as a `<div>` container
#[derive(Debug, Clone)]
pub struct RegionBlock {
    pub name: String,
    pub content: String,
}

/// A linked area listed in the table of contents
#[derive(Debug, Clone)]
pub struct TocEntry {
    /// Space-prefixed link attributes (`href`, `target`, `class`)
    pub link: String,
    pub title: String,
}

/// Exported page template
#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate {
    /// Contents of `<title>`
    pub document_title: String,
    pub title: String,

    // Assembled sections, inserted verbatim
    pub head: String,
    pub body_start: String,
    pub body_end: String,
    pub regions: Vec<RegionBlock>,

    // Image and its map
    pub image: Option<String>,
    pub areas: Vec<AreaTag>,

    // Server-side include mode
    pub use_pt_website: bool,
    pub ssi_root: String,

    pub site_author: Option<String>,
}

/// `toc.htm` fragment listing the page's linked areas
#[derive(Template)]
#[template(path = "toc.html")]
pub struct TocTemplate {
    pub use_pt_website: bool,
    pub has_parent: bool,
    pub entries: Vec<TocEntry>,
}

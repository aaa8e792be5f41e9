//! # webexport-render
//!
//! Renders assembled documents to HTML using Askama.
//!
//! The engine's sections are inserted verbatim; only titles, region names
//! and area attribute values are escaped here.

pub mod templates;

pub use templates::{AreaTag, PageTemplate, RegionBlock, TocEntry, TocTemplate};

use askama::Template;
use thiserror::Error;
use webexport_core::{AssembledDocument, ExportOptions, MergedAttribute, SiteConfig};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Template rendering failed: {0}")]
    Template(#[from] askama::Error),
}

/// Page-level settings that do not come from the assembled document
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub use_pt_website: bool,
    pub ssi_root: String,
    /// Prefix of every page's `<title>`
    pub site_title: Option<String>,
    pub site_author: Option<String>,
}

impl RenderOptions {
    pub fn new(export: &ExportOptions, site: &SiteConfig) -> Self {
        Self {
            use_pt_website: export.use_pt_website,
            ssi_root: export.ssi_root.trim_end_matches('/').to_string(),
            site_title: Some(site.title.clone()).filter(|t| !t.trim().is_empty()),
            site_author: site.author.clone(),
        }
    }

    /// Browser title of a page: `site - page`, or the page title alone when
    /// it already is the site title
    pub fn document_title(&self, page_title: &str) -> String {
        match &self.site_title {
            Some(site) if site != page_title => format!("{} - {}", site, page_title),
            _ => page_title.to_string(),
        }
    }
}

/// Attributes a table-of-contents link carries over from its area
const TOC_LINK_ATTRIBUTES: &[&str] = &["href", "target", "class"];

/// Render a full page
pub fn render_page(doc: &AssembledDocument, options: &RenderOptions) -> Result<String, RenderError> {
    let template = PageTemplate {
        document_title: options.document_title(&doc.title),
        title: doc.title.clone(),
        head: doc.head.clone(),
        body_start: doc.body_start.clone(),
        body_end: doc.body_end.clone(),
        regions: doc
            .regions
            .iter()
            .map(|r| RegionBlock {
                name: r.name.clone(),
                content: r.content.clone(),
            })
            .collect(),
        image: doc.image.clone(),
        areas: doc
            .areas
            .iter()
            .map(|a| AreaTag {
                coords: a.coords.clone(),
                attributes: attribute_list(&a.attributes),
            })
            .collect(),
        use_pt_website: options.use_pt_website,
        ssi_root: options.ssi_root.clone(),
        site_author: options.site_author.clone(),
    };

    Ok(template.render()?)
}

/// Render the `toc.htm` fragment: one entry per area that links somewhere
pub fn render_toc(doc: &AssembledDocument, options: &RenderOptions) -> Result<String, RenderError> {
    let entries = doc
        .areas
        .iter()
        .filter(|a| a.attribute("href").is_some_and(|h| !h.is_empty()))
        .map(|a| {
            let link: Vec<MergedAttribute> = a
                .attributes
                .iter()
                .filter(|attr| TOC_LINK_ATTRIBUTES.contains(&attr.name.as_str()))
                .cloned()
                .collect();
            TocEntry {
                link: attribute_list(&link),
                title: a
                    .attribute("title")
                    .map(str::to_string)
                    .unwrap_or_else(|| a.node.name().to_string()),
            }
        })
        .collect();

    let template = TocTemplate {
        use_pt_website: options.use_pt_website,
        has_parent: doc.page_path != "index.html",
        entries,
    };

    Ok(template.render()?)
}

/// Serialize attributes as ` name="value"` pairs in their merged order
pub fn attribute_list(attributes: &[MergedAttribute]) -> String {
    attributes
        .iter()
        .map(|a| format!(" {}=\"{}\"", a.name, html_escape(&a.value)))
        .collect()
}

/// Escape a value for a double-quoted attribute
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

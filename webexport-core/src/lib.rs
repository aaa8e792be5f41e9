//! # webexport-core
//!
//! Content composition engine for exporting a model tree as web pages.
//!
//! An [`ExportSession`] walks the model, lets every attached contributor
//! register attribute and element items in a per-page [`ExporterRegistry`],
//! and assembles each page into an [`AssembledDocument`]. Nothing here
//! touches the filesystem except model and config loading.

pub mod assembler;
pub mod config;
pub mod contributors;
mod defaults;
pub mod driver;
pub mod error;
pub mod escape;
pub mod item;
pub mod model;
pub mod registry;

pub use assembler::{AreaMap, AssembledDocument, DocumentAssembler, MergedAttribute, RegionSection};
pub use config::{Config, ExportOptions, SiteConfig};
pub use contributors::{Contributor, ContributorKind, WebExportable};
pub use defaults::{DEFAULT_END_TEXT, WRITE_TEXT_SCRIPT};
pub use driver::{
    export_model, BackReference, ExportContext, ExportSession, ExportState, ExportedSite,
    PageExport, SubExport,
};
pub use error::{ContributorError, ExportError};
pub use item::{AttributeItem, ElementItem};
pub use model::{ModelError, ModelTree, Node};
pub use registry::ExporterRegistry;
pub use webexport_types::{ContributionKey, NodeId, OverwritePolicy, Placement};

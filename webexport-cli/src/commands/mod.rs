//! CLI command implementations.

pub mod export;
pub mod init;
pub mod inspect;

pub use export::{export_site, ExportFlags};
pub use init::init_project;
pub use inspect::inspect_site;

use anyhow::{Context, Result};
use std::path::Path;
use webexport_core::{Config, ExportedSite, ExportOptions, ExportSession, ModelTree};

/// Load config and model, then run one export session
pub(crate) fn run_session(
    config_path: &Path,
    adjust: impl FnOnce(ExportOptions) -> ExportOptions,
) -> Result<(Config, ExportOptions, ExportedSite)> {
    tracing::info!("Loading config from {:?}", config_path);
    let config = Config::from_file(config_path).context("Failed to load configuration")?;
    let options = adjust(config.export.clone());

    let model_path = config.model_path();
    let tree = ModelTree::from_file(&model_path)
        .with_context(|| format!("Failed to load model {:?}", model_path))?;
    tracing::info!("Exporting {} ({} nodes)", tree.root_id(), tree.len());

    let site = ExportSession::new(&tree, options.clone())
        .run(tree.root_id())
        .context("Export failed")?;

    Ok((config, options, site))
}

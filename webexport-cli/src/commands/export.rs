//! Export command implementation.
//!
//! Every page is rendered in memory first. Output is then written to a
//! staging directory next to the output directory and moved into place only
//! once everything has been written.

use anyhow::{Context, Result};
use include_dir::{include_dir, Dir};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use webexport_core::{Config, ExportOptions, ExportedSite};
use webexport_render::{render_page, render_toc, RenderOptions};

// Embed the page scripts and styles so they are available after cargo install
static BUNDLED_ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/assets");

/// Command-line overrides of the configured export options
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportFlags {
    pub force: bool,
    pub open: bool,
    pub web: bool,
}

impl ExportFlags {
    fn apply(self, mut options: ExportOptions) -> ExportOptions {
        if self.web {
            options = options.web();
        }
        options.force |= self.force;
        options.open |= self.open;
        options
    }
}

/// A rendered file, relative to the output directory
struct RenderedFile {
    path: PathBuf,
    contents: String,
}

/// Export the configured model to the output directory
pub fn export_site(config_path: &Path, flags: ExportFlags) -> Result<()> {
    let (config, options, site) = super::run_session(config_path, |o| flags.apply(o))?;

    let render_options = RenderOptions::new(&options, &config.site);
    let files = render_site(&site, &render_options)?;

    let output_dir = config.output_dir();
    write_output(&output_dir, options.force, |staging| {
        for file in &files {
            let target = staging.join(&file.path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, &file.contents)
                .with_context(|| format!("Failed to write {:?}", target))?;
        }

        copy_resources(&config, &site, staging)?;

        if options.copy_javascript && !options.use_pt_website {
            extract_bundled_assets(&staging.join("javascript"))?;
            tracing::info!("Copied page scripts to {:?}", output_dir.join("javascript"));
        }

        if let Some(assets_dir) = config.assets_dir() {
            if assets_dir.exists() {
                copy_dir(&assets_dir, staging)?;
                tracing::info!("Copied assets from {:?}", assets_dir);
            } else {
                tracing::warn!("Configured assets path {:?} does not exist", assets_dir);
            }
        }
        Ok(())
    })?;

    tracing::info!("✓ Exported {} pages", site.pages.len());
    tracing::info!("✓ Output written to {:?}", output_dir);

    if options.open {
        let index = output_dir.join("index.html");
        if let Err(e) = open::that(&index) {
            tracing::warn!("Failed to open {:?}: {}", index, e);
        }
    }

    Ok(())
}

/// Build the output in a staging directory beside `output_dir`, then move
/// it into place. If `fill` fails the existing output is left untouched.
fn write_output(
    output_dir: &Path,
    force: bool,
    fill: impl FnOnce(&Path) -> Result<()>,
) -> Result<()> {
    let parent = output_dir
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).with_context(|| format!("Failed to create {:?}", parent))?;

    let workspace = tempfile::Builder::new()
        .prefix(".webexport-")
        .tempdir_in(parent)
        .context("Failed to create staging directory")?;
    let staging = workspace.path().join("site");
    fs::create_dir_all(&staging)?;

    fill(&staging)?;

    if !output_dir.exists() {
        fs::rename(&staging, output_dir)
            .with_context(|| format!("Failed to move output into {:?}", output_dir))?;
        return Ok(());
    }

    if force {
        let previous = workspace.path().join("previous");
        fs::rename(output_dir, &previous)
            .with_context(|| format!("Failed to move aside {:?}", output_dir))?;
        if let Err(e) = fs::rename(&staging, output_dir) {
            fs::rename(&previous, output_dir)
                .with_context(|| format!("Failed to restore {:?}", output_dir))?;
            return Err(e).with_context(|| format!("Failed to move output into {:?}", output_dir));
        }
        tracing::info!("Replaced existing output {:?}", output_dir);
        return Ok(());
    }

    // Without force the new files land over the old ones; stale files stay
    for entry in WalkDir::new(&staging)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let relative = entry.path().strip_prefix(&staging).unwrap_or(entry.path());
        let target = output_dir.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(entry.path(), &target)
            .with_context(|| format!("Failed to move {:?} to {:?}", entry.path(), target))?;
    }
    Ok(())
}

/// Render every page and its table of contents
fn render_site(site: &ExportedSite, options: &RenderOptions) -> Result<Vec<RenderedFile>> {
    let mut files = Vec::with_capacity(site.pages.len() * 2);

    for doc in &site.pages {
        let html = render_page(doc, options)
            .with_context(|| format!("Failed to render page for {}", doc.node))?;
        let toc = render_toc(doc, options)
            .with_context(|| format!("Failed to render toc for {}", doc.node))?;

        let page_path = PathBuf::from(&doc.page_path);
        let dir = page_path.parent().map(Path::to_path_buf).unwrap_or_default();
        tracing::debug!("Rendered {}", doc.page_path);

        files.push(RenderedFile {
            path: page_path,
            contents: html,
        });
        files.push(RenderedFile {
            path: dir.join("toc.htm"),
            contents: toc,
        });
    }

    Ok(files)
}

/// Copy page images and figures from the model directory next to the pages
/// that reference them
fn copy_resources(config: &Config, site: &ExportedSite, output_dir: &Path) -> Result<()> {
    let model_dir = config.model_dir();

    for doc in &site.pages {
        let page_dir = output_dir.join(
            Path::new(&doc.page_path)
                .parent()
                .unwrap_or_else(|| Path::new("")),
        );

        for resource in &doc.resources {
            let source = model_dir.join(resource);
            let Some(file_name) = source.file_name() else {
                continue;
            };
            if !source.is_file() {
                tracing::warn!("{}: missing file {:?}", doc.node, source);
                continue;
            }

            let target = page_dir.join(file_name);
            fs::create_dir_all(&page_dir)?;
            fs::copy(&source, &target)
                .with_context(|| format!("Failed to copy {:?} to {:?}", source, target))?;
        }
    }

    Ok(())
}

fn copy_dir(src: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(src)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dest.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &target)
            .with_context(|| format!("Failed to copy {:?} to {:?}", entry.path(), target))?;
    }
    Ok(())
}

fn extract_bundled_assets(dest: &Path) -> Result<()> {
    fs::create_dir_all(dest)?;
    for file in BUNDLED_ASSETS.files() {
        let target = dest.join(file.path());
        fs::write(&target, file.contents())
            .with_context(|| format!("Failed to write bundled asset to {:?}", target))?;
    }
    Ok(())
}

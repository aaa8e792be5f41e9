//! Init command implementation.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"site:
  title: "Modulation"
  author: null

paths:
  model: model.yml
  output: web
  assets: null

export:
  use_pt_website: false
  ssi_root: "https://ptolemy.berkeley.edu"
  copy_javascript: true
  force: false
  open: false
  default_end_text: true
  open_composites: false
"#;

const SAMPLE_MODEL: &str = r#"name: modulation
title: "AM modulation"
image: modulation.png
parameters:
  - { name: frequency, expression: "440" }
contributors:
  - kind: html_text
    position: start
    content: "<p>Amplitude modulation of a sine wave by a ramp.</p>"
nodes:
  - name: Ramp
    area: [10, 20, 60, 50]
    parameters:
      - { name: init, expression: "0" }
      - { name: step, expression: "1.0" }
    contributors:
      - kind: mouse_over_text
        text: "Ramp with step $(step)"
  - name: Sine
    area: [80, 20, 130, 50]
    open: true
    parameters:
      - { name: frequency, expression: "frequency", value: "440" }
    nodes:
      - name: Phase
        area: [10, 10, 40, 40]
  - name: Plot
    area: [150, 20, 200, 50]
    figure: plot.png
    contributors:
      - kind: title
        text: "Modulated signal"
"#;

/// Initialize a new webexport project
pub fn init_project(path: Option<&Path>) -> Result<()> {
    let root = path.unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(root).with_context(|| format!("Failed to create {:?}", root))?;

    write_if_missing(&root.join("webexport.yml"), DEFAULT_CONFIG)?;
    write_if_missing(&root.join("model.yml"), SAMPLE_MODEL)?;

    println!("✓ webexport initialized in {:?}", root);
    println!("  - Edit webexport.yml to customize site metadata");
    println!("  - Describe your model in model.yml, then run `webexport export`");
    Ok(())
}

fn write_if_missing(path: &Path, contents: &str) -> Result<()> {
    if path.exists() {
        println!("{:?} already exists", path);
        return Ok(());
    }

    fs::write(path, contents).with_context(|| format!("Failed to write {:?}", path))?;
    println!("Created {:?}", path);
    Ok(())
}

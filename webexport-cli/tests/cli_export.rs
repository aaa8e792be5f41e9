use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const CONFIG: &str = r#"
site:
  title: "Test"
  author: "Tester"
paths:
  model: model/model.yml
  output: web
"#;

const MODEL: &str = r#"
name: top
title: "Top model"
image: top.png
nodes:
  - name: Sub
    area: [0, 0, 10, 10]
    open: true
    nodes:
      - name: Leaf
        area: [1, 1, 5, 5]
        contributors:
          - kind: linked_page
            target: Sub
  - name: Plot
    area: [20, 0, 30, 10]
    figure: figures/plot.png
  - name: Note
    area: [40, 0, 50, 10]
    contributors:
      - kind: mouse_over_text
        text: "gain is $(gain)"
"#;

fn project(dir: &Path, model: &str) -> Result<(), Box<dyn std::error::Error>> {
    fs::write(dir.join("webexport.yml"), CONFIG)?;
    fs::create_dir_all(dir.join("model/figures"))?;
    fs::write(dir.join("model/model.yml"), model)?;
    fs::write(dir.join("model/top.png"), b"png")?;
    fs::write(dir.join("model/figures/plot.png"), b"png")?;
    Ok(())
}

fn working_model() -> String {
    MODEL.replace("gain is $(gain)", "a note")
}

#[test]
fn export_writes_pages_and_resources() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    project(dir.path(), &working_model())?;

    #[allow(deprecated)]
    Command::cargo_bin("webexport")?
        .current_dir(dir.path())
        .args(["export"])
        .assert()
        .success();

    let web = dir.path().join("web");
    let index = fs::read_to_string(web.join("index.html"))?;
    assert!(index.contains("<title>Test - Top model</title>"));
    assert!(index.contains("<h1>Top model</h1>"));
    assert!(index.contains("href=\"Sub/index.html\""));
    assert!(index.contains("href=\"plot.png\" class=\"iframe\""));
    assert!(index.contains("<p class=\"footer\">Tester</p>"));

    let sub = fs::read_to_string(web.join("Sub/index.html"))?;
    assert!(sub.contains("../javascript/webexport.js"));

    assert!(web.join("toc.htm").is_file());
    assert!(web.join("Sub/toc.htm").is_file());
    assert!(web.join("top.png").is_file());
    assert!(web.join("plot.png").is_file());
    assert!(web.join("javascript/webexport.js").is_file());
    assert!(web.join("javascript/webexport.css").is_file());
    Ok(())
}

#[test]
fn export_failure_writes_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    project(dir.path(), MODEL)?;

    #[allow(deprecated)]
    Command::cargo_bin("webexport")?
        .current_dir(dir.path())
        .args(["export"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(".top.Note"))
        .stderr(predicate::str::contains("gain"));

    assert!(!dir.path().join("web").exists());
    Ok(())
}

#[test]
fn export_force_removes_stale_output() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    project(dir.path(), &working_model())?;
    fs::create_dir_all(dir.path().join("web"))?;
    fs::write(dir.path().join("web/stale.html"), "old")?;

    #[allow(deprecated)]
    Command::cargo_bin("webexport")?
        .current_dir(dir.path())
        .args(["export"])
        .assert()
        .success();
    assert!(dir.path().join("web/stale.html").exists());

    #[allow(deprecated)]
    Command::cargo_bin("webexport")?
        .current_dir(dir.path())
        .args(["export", "--force"])
        .assert()
        .success();
    assert!(!dir.path().join("web/stale.html").exists());
    assert!(dir.path().join("web/index.html").is_file());
    Ok(())
}

#[test]
fn inspect_prints_site_json() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    project(dir.path(), &working_model())?;

    #[allow(deprecated)]
    let assert = Command::cargo_bin("webexport")?
        .current_dir(dir.path())
        .args(["inspect"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
    let json: serde_json::Value = serde_json::from_str(stdout.trim())?;
    assert_eq!(json["root"], ".top");
    assert_eq!(json["pages"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["pages"][1]["page_path"], "Sub/index.html");
    // The leaf on Sub's page links to Sub, which is already being exported
    assert_eq!(json["back_references"][0]["from"], ".top.Sub");
    assert_eq!(json["back_references"][0]["to"], ".top.Sub");
    assert_eq!(json["back_references"].as_array().map(Vec::len), Some(1));

    assert!(!dir.path().join("web").exists());
    Ok(())
}

#[test]
fn init_creates_starter_project() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;

    #[allow(deprecated)]
    Command::cargo_bin("webexport")?
        .current_dir(dir.path())
        .args(["init", "site"])
        .assert()
        .success()
        .stdout(predicate::str::contains("webexport initialized"));

    assert!(dir.path().join("site/webexport.yml").is_file());
    assert!(dir.path().join("site/model.yml").is_file());

    #[allow(deprecated)]
    Command::cargo_bin("webexport")?
        .current_dir(dir.path().join("site"))
        .args(["export"])
        .assert()
        .success();
    assert!(dir.path().join("site/web/Sine/index.html").is_file());
    Ok(())
}

//! Integration tests for `previewer manifest`
//!
//! Runs the built binary against scratch design trees and checks the
//! manifest it writes.

use anyhow::Result;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run_previewer(dir: &Path, args: &[&str]) -> Result<Output> {
    let output = Command::new(env!("CARGO_BIN_EXE_previewer"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()?;
    Ok(output)
}

fn write_document(root: &Path, relative: &str) -> Result<()> {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap())?;
    fs::write(path, "<html></html>")?;
    Ok(())
}

#[test]
fn test_manifest_default_location() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_document(temp_dir.path(), "designs-hud/design-1-overview.html")?;

    let output = run_previewer(temp_dir.path(), &["manifest"])?;
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let manifest_path = temp_dir.path().join("design_previewer/manifest.json");
    let manifest: serde_json::Value = serde_json::from_str(&fs::read_to_string(manifest_path)?)?;

    assert_eq!(manifest["title"], "Design Previewer");
    assert_eq!(manifest["description"], "Auto-discovered design preview manifest.");
    assert_eq!(manifest["versions"][0]["key"], "v1");
    assert_eq!(manifest["versions"][0]["groups"][0]["label"], "HUD");
    assert_eq!(
        manifest["versions"][0]["groups"][0]["items"][0],
        serde_json::json!({
            "title": "1 - Overview",
            "path": "./designs-hud/design-1-overview.html"
        })
    );

    Ok(())
}

#[test]
fn test_manifest_custom_output_and_title() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path().join("site");
    write_document(&root, "v2/rts_hq/01-base.html")?;

    let out = temp_dir.path().join("out/manifest.json");
    let output = run_previewer(
        temp_dir.path(),
        &[
            "manifest",
            "--root",
            root.to_str().unwrap(),
            "--manifest",
            out.to_str().unwrap(),
            "--title",
            "Strategy",
            "--description",
            "Base layouts",
        ],
    )?;
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 versions, 1 documents"), "stdout: {stdout}");

    let manifest: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out)?)?;
    assert_eq!(manifest["title"], "Strategy");
    assert_eq!(manifest["description"], "Base layouts");
    assert_eq!(manifest["versions"][0]["label"], "V2");
    assert_eq!(manifest["versions"][0]["groups"][0]["label"], "RTS HQ");
    assert_eq!(manifest["versions"][0]["groups"][0]["items"][0]["title"], "01 - Base");

    Ok(())
}

#[test]
fn test_manifest_missing_root_fails() -> Result<()> {
    let temp_dir = TempDir::new()?;

    let output = run_previewer(temp_dir.path(), &["manifest", "--root", "does-not-exist"])?;

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(!temp_dir.path().join("does-not-exist").exists());

    Ok(())
}

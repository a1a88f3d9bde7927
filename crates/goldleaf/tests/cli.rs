use std::fs;
use std::process::Command;

use tempfile::TempDir;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn goldleaf(config_dir: &std::path::Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_goldleaf"));
    command
        .env("GOLDLEAF_CONFIG_DIR", config_dir)
        .env("RUST_LOG", "warn");
    command
}

#[test]
fn still_export_writes_png() {
    let root = TempDir::new().unwrap();
    let target = root.path().join("out/still.png");

    let status = goldleaf(root.path())
        .args(["--still-export"])
        .arg(&target)
        .args(["--still-time", "3.5", "--size", "48x27"])
        .status()
        .expect("failed to run goldleaf --still-export");

    assert!(status.success());
    let bytes = fs::read(&target).expect("still written");
    assert_eq!(bytes[..8], PNG_SIGNATURE);
}

#[test]
fn config_where_reports_env_directory() {
    let root = TempDir::new().unwrap();

    let output = goldleaf(root.path())
        .args(["config", "where"])
        .output()
        .expect("failed to run goldleaf config where");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains(&root.path().display().to_string()));
    assert!(stdout.contains("goldleaf.toml (missing)"));
}

#[test]
fn config_show_resolves_images_relative_to_file() {
    let root = TempDir::new().unwrap();
    fs::write(
        root.path().join("goldleaf.toml"),
        "version = 1\nimages = [\"frames/01.png\", \"frames/02.png\"]\n\n[window]\nfps = 30\n",
    )
    .unwrap();

    let output = goldleaf(root.path())
        .args(["config", "show", "--json"])
        .output()
        .expect("failed to run goldleaf config show");

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["version"], 1);
    let images = value["images"].as_array().unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(
        images[0].as_str().unwrap(),
        root.path().join("frames/01.png").to_str().unwrap()
    );
    assert_eq!(value["window"]["fps"], 30.0);
}

#[test]
fn config_show_fails_for_invalid_config() {
    let root = TempDir::new().unwrap();
    let explicit = root.path().join("broken.toml");
    fs::write(&explicit, "version = 1\nimages = []\n").unwrap();

    let output = goldleaf(root.path())
        .args(["config", "show", "--config"])
        .arg(&explicit)
        .output()
        .expect("failed to run goldleaf config show");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("at least one image"));
}

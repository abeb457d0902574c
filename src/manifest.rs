// src/manifest.rs

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Deserialize)]
struct PackageJson {
    name: Option<String>,
}

#[derive(Deserialize)]
struct CargoToml {
    package: Option<CargoPackage>,
}

#[derive(Deserialize)]
struct CargoPackage {
    name: String,
}

/// Works out a project name for `dir`: `package.json`, then `Cargo.toml`,
/// then the directory's own name.
pub fn discover_name(dir: &Path) -> Option<String> {
    package_json_name(dir)
        .or_else(|| cargo_toml_name(dir))
        .or_else(|| dir_name(dir))
        .filter(|name| !name.is_empty())
}

fn package_json_name(dir: &Path) -> Option<String> {
    let path = dir.join("package.json");
    let contents = fs::read_to_string(&path).ok()?;
    match serde_json::from_str::<PackageJson>(&contents) {
        Ok(package) => {
            let name = package.name.map(|name| strip_scope(&name).to_string());
            debug!(?name, "read package.json");
            name
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring unreadable package.json");
            None
        }
    }
}

fn cargo_toml_name(dir: &Path) -> Option<String> {
    let path = dir.join("Cargo.toml");
    let contents = fs::read_to_string(&path).ok()?;
    match toml::from_str::<CargoToml>(&contents) {
        Ok(manifest) => manifest.package.map(|p| p.name),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring unreadable Cargo.toml");
            None
        }
    }
}

fn dir_name(dir: &Path) -> Option<String> {
    let dir = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
    dir.file_name().map(|name| name.to_string_lossy().into_owned())
}

/// `@org/widget` -> `widget`
fn strip_scope(name: &str) -> &str {
    match name.strip_prefix('@').and_then(|rest| rest.split_once('/')) {
        Some((_, unscoped)) => unscoped,
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_package_json_scope_is_stripped() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("package.json"), r#"{"name": "@phicus/olt-manager"}"#).unwrap();
        assert_eq!(discover_name(temp.path()).as_deref(), Some("olt-manager"));
    }

    #[test]
    fn test_package_json_wins_over_cargo_toml() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("package.json"), r#"{"name": "web"}"#).unwrap();
        fs::write(temp.path().join("Cargo.toml"), "[package]\nname = \"core\"\n").unwrap();
        assert_eq!(discover_name(temp.path()).as_deref(), Some("web"));
    }

    #[test]
    fn test_cargo_toml_name() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("Cargo.toml"), "[package]\nname = \"core\"\nversion = \"0.1.0\"\n").unwrap();
        assert_eq!(discover_name(temp.path()).as_deref(), Some("core"));
    }

    #[test]
    fn test_falls_back_to_directory_name() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("my-service");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("package.json"), "not json").unwrap();
        assert_eq!(discover_name(&dir).as_deref(), Some("my-service"));
    }

    #[test]
    fn test_strip_scope() {
        assert_eq!(strip_scope("@org/widget"), "widget");
        assert_eq!(strip_scope("widget"), "widget");
        assert_eq!(strip_scope("@broken"), "@broken");
    }
}

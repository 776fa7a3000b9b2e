//! Loading renderer defaults
//!
//! Renderer-level [`DialogDefaults`] can come from a JSON file and from
//! environment variables. Files are searched in order:
//!
//! 1. `./.hookdialog.json`
//! 2. `./hookdialog.json`
//! 3. `$CONFIG_DIR/hookdialog/hookdialog.json`
//!
//! The first file found wins. Environment variables are applied on top.

use crate::dialog::{DialogDefaults, DialogResult};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const ENV_BACKDROP_CANCEL: &str = "HOOKDIALOG_BACKDROP_CANCEL";
pub const ENV_REJECT_ON_CANCEL: &str = "HOOKDIALOG_REJECT_ON_CANCEL";
pub const ENV_SHOW_CLOSE_BUTTON: &str = "HOOKDIALOG_SHOW_CLOSE_BUTTON";

/// Candidate configuration files, highest priority first
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("./.hookdialog.json"),
        PathBuf::from("./hookdialog.json"),
    ];
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("hookdialog").join("hookdialog.json"));
    }
    paths
}

/// Defaults from the first configuration file found, then the environment
pub async fn load_defaults() -> DialogResult<DialogDefaults> {
    let mut defaults = match load_from_paths(&config_paths()).await? {
        Some(defaults) => defaults,
        None => {
            debug!("No dialog configuration file found, using built-in defaults");
            DialogDefaults::default()
        }
    };
    load_from_env(&mut defaults);
    Ok(defaults)
}

/// Parse the first existing file of `paths`
pub async fn load_from_paths(paths: &[PathBuf]) -> DialogResult<Option<DialogDefaults>> {
    for path in paths {
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            return load_from_path(path).await.map(Some);
        }
    }
    Ok(None)
}

/// Parse one configuration file
pub async fn load_from_path(path: &Path) -> DialogResult<DialogDefaults> {
    debug!("Loading dialog configuration from: {}", path.display());
    let content = tokio::fs::read_to_string(path).await?;
    let defaults = serde_json::from_str(&content)?;
    Ok(defaults)
}

/// Apply the `HOOKDIALOG_*` environment variables
pub fn load_from_env(defaults: &mut DialogDefaults) {
    apply_env(defaults, |key| std::env::var(key).ok());
}

/// Apply overrides read through `lookup`. Unparseable values are ignored.
pub fn apply_env(defaults: &mut DialogDefaults, lookup: impl Fn(&str) -> Option<String>) {
    let flag = |key: &str| {
        let value = lookup(key)?;
        match parse_flag(&value) {
            Some(flag) => Some(flag),
            None => {
                warn!("Ignoring {}={:?}: expected true or false", key, value);
                None
            }
        }
    };

    if let Some(value) = flag(ENV_BACKDROP_CANCEL) {
        defaults.backdrop_cancel = Some(value);
    }
    if let Some(value) = flag(ENV_REJECT_ON_CANCEL) {
        defaults.reject_on_cancel = Some(value);
    }
    if let Some(value) = flag(ENV_SHOW_CLOSE_BUTTON) {
        defaults.show_close_button = Some(value);
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::{DialogError, Region};
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_load_from_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hookdialog.json");
        tokio::fs::write(
            &path,
            r#"{"backdropCancel": true, "defaultCancelValue": "none", "classNames": {"title": "big"}}"#,
        )
        .await
        .unwrap();

        let defaults = load_from_path(&path).await.unwrap();

        assert_eq!(defaults.backdrop_cancel, Some(true));
        assert_eq!(defaults.default_cancel_value, Some(serde_json::json!("none")));
        assert_eq!(defaults.class_names.get(Region::Title).map(String::as_str), Some("big"));
    }

    #[tokio::test]
    async fn test_first_existing_path_wins() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let first = dir.path().join("first.json");
        let second = dir.path().join("second.json");
        tokio::fs::write(&first, r#"{"showCloseButton": true}"#).await.unwrap();
        tokio::fs::write(&second, r#"{"showCloseButton": false}"#).await.unwrap();

        let defaults = load_from_paths(&[missing, first, second]).await.unwrap().unwrap();
        assert_eq!(defaults.show_close_button, Some(true));
    }

    #[tokio::test]
    async fn test_no_file_found() {
        let dir = tempdir().unwrap();
        let found = load_from_paths(&[dir.path().join("nope.json")]).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_invalid_json_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let err = load_from_path(&path).await.unwrap_err();
        assert!(matches!(err, DialogError::Json(_)));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_BACKDROP_CANCEL, "true"),
            (ENV_REJECT_ON_CANCEL, "0"),
            (ENV_SHOW_CLOSE_BUTTON, "maybe"),
        ]);
        let mut defaults = DialogDefaults::new().show_close_button(true);

        apply_env(&mut defaults, |key| env.get(key).map(|value| value.to_string()));

        assert_eq!(defaults.backdrop_cancel, Some(true));
        assert_eq!(defaults.reject_on_cancel, Some(false));
        assert_eq!(defaults.show_close_button, Some(true));
    }

    #[test]
    fn test_config_paths_order() {
        let paths = config_paths();
        assert_eq!(paths[0], PathBuf::from("./.hookdialog.json"));
        assert_eq!(paths[1], PathBuf::from("./hookdialog.json"));
    }
}

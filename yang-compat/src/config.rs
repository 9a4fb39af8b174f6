use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use yang_compat_core::RfcVersion;

use crate::report::ReportFormat;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "yang-compat.toml";

/// Settings read from a TOML file. Every field is optional; command-line
/// flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckConfig {
    pub rfc_version: Option<RfcVersion>,
    pub format: Option<ReportFormat>,
    /// Import search paths for the new module.
    pub path: Vec<PathBuf>,
    /// Import search paths for the old module.
    pub from_path: Vec<PathBuf>,
    pub strict: Option<bool>,
}

/// Errors returned when loading a settings file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Load settings from a TOML file.
pub fn load_config(path: &Path) -> Result<CheckConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&raw, path.display().to_string())
}

fn parse_config(raw: &str, path: String) -> Result<CheckConfig, ConfigError> {
    toml::from_str(raw).map_err(|source| ConfigError::Parse { path, source })
}

/// Load the explicit config file, or `yang-compat.toml` from `cwd` when it
/// exists. Relative search paths in the file are resolved against the
/// file's directory.
pub fn discover_config(explicit: Option<&Path>, cwd: &Path) -> Result<Option<CheckConfig>, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let candidate = cwd.join(DEFAULT_CONFIG_FILE);
            if !candidate.is_file() {
                return Ok(None);
            }
            candidate
        }
    };

    let mut config = load_config(&path)?;
    if let Some(base) = path.parent() {
        let anchor = |dir: PathBuf| if dir.is_relative() { base.join(dir) } else { dir };
        config.path = config.path.into_iter().map(anchor).collect();
        config.from_path = config.from_path.into_iter().map(anchor).collect();
    }
    Ok(Some(config))
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;
    use yang_compat_core::RfcVersion;

    use super::{discover_config, parse_config, CheckConfig, ConfigError, DEFAULT_CONFIG_FILE};
    use crate::report::ReportFormat;

    #[test]
    fn parses_every_setting() {
        let config = parse_config(
            r#"
rfc_version = "7950"
format = "json"
path = ["/opt/yang"]
from_path = ["/opt/yang-old"]
strict = true
"#,
            "inline".to_string(),
        )
        .expect("valid config");

        assert_eq!(
            config,
            CheckConfig {
                rfc_version: Some(RfcVersion::Rfc7950),
                format: Some(ReportFormat::Json),
                path: vec![PathBuf::from("/opt/yang")],
                from_path: vec![PathBuf::from("/opt/yang-old")],
                strict: Some(true),
            }
        );
    }

    #[test]
    fn rejects_unknown_keys_and_values() {
        let unknown = parse_config("colour = true", "inline".to_string());
        assert!(matches!(unknown, Err(ConfigError::Parse { .. })));

        let bad_version = parse_config(r#"rfc_version = "8040""#, "inline".to_string());
        assert!(matches!(bad_version, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn discovers_default_file_and_anchors_paths() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(discover_config(None, dir.path()).expect("no file"), None);

        fs::write(dir.path().join(DEFAULT_CONFIG_FILE), r#"path = ["modules"]"#).expect("write");
        let config = discover_config(None, dir.path())
            .expect("loads")
            .expect("present");
        assert_eq!(config.path, [dir.path().join("modules")]);

        let missing = discover_config(Some(&dir.path().join("absent.toml")), dir.path());
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}

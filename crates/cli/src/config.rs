//! Optional per-project settings read from `shep.toml` next to the input
//! file. Command-line flags take precedence.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::OutputFormat;

pub(crate) const CONFIG_FILE: &str = "shep.toml";

/// Contents of `shep.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ProjectConfig {
    /// Treat warnings as failures.
    #[serde(default)]
    pub strict: bool,
    /// Default output format.
    pub output: Option<OutputFormat>,
    /// Issue codes to hide. Errors are never hidden.
    #[serde(default)]
    pub ignore: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("error reading file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config '{}': {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub(crate) fn read_source(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Load `shep.toml` from the directory containing `input`, if present.
pub(crate) fn load_for(input: &Path) -> Result<ProjectConfig, CliError> {
    let dir = match input.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let path = dir.join(CONFIG_FILE);
    if !path.is_file() {
        tracing::debug!(path = %path.display(), "no project config");
        return Ok(ProjectConfig::default());
    }
    let content = read_source(&path)?;
    let config: ProjectConfig =
        toml::from_str(&content).map_err(|source| CliError::Config { path: path.clone(), source })?;
    tracing::debug!(path = %path.display(), ?config, "loaded project config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_keys() {
        let config: ProjectConfig = toml::from_str(
            r#"
strict = true
output = "json"
ignore = ["lint.field-name", "boundary.money"]
"#,
        )
        .unwrap();
        assert!(config.strict);
        assert_eq!(config.output, Some(OutputFormat::Json));
        assert_eq!(config.ignore.len(), 2);
    }

    #[test]
    fn empty_file_is_default() {
        let config: ProjectConfig = toml::from_str("").unwrap();
        assert_eq!(config, ProjectConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<ProjectConfig>("colour = true").is_err());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_for(&dir.path().join("app.shep")).unwrap();
        assert_eq!(config, ProjectConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "strict = \"yes\"").unwrap();
        let err = load_for(&dir.path().join("app.shep")).unwrap_err();
        assert!(matches!(err, CliError::Config { .. }));
        assert!(err.to_string().starts_with("invalid config"));
    }
}

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PasskeepError;

const CONFIG_DIR: &str = ".passkeep";
const CONFIG_FILE: &str = "config.toml";
const DEFAULT_OUTPUT_FILE: &str = "secret.txt";

/// Contents of `.passkeep/config.toml`. Every field is optional.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct FileConfig {
    pub profile: Option<String>,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub output_file: Option<PathBuf>,
}

/// Values given on the command line. They win over everything else.
#[derive(Debug, Default)]
pub struct Overrides {
    pub profile: Option<String>,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub output_file: Option<PathBuf>,
}

/// Fully resolved runtime settings.
///
/// Region and credentials are finally settled by the AWS default provider
/// chain (environment, shared config and credentials files, SSO, container
/// and instance roles). `region` pins it from the command line;
/// `fallback_region` only applies when the chain finds nothing.
#[derive(Debug, Default)]
pub struct Settings {
    pub profile: Option<String>,
    pub region: Option<String>,
    pub fallback_region: Option<String>,
    pub endpoint_url: Option<String>,
    pub output_file: PathBuf,
}

/// Returns the config file path for a given project root.
pub fn config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_DIR).join(CONFIG_FILE)
}

/// Returns the current project root (cwd).
pub fn project_root() -> Result<PathBuf, PasskeepError> {
    std::env::current_dir().map_err(PasskeepError::Io)
}

/// Read and parse the config file at `path`, which must exist.
pub fn read(path: &Path) -> Result<FileConfig, PasskeepError> {
    if !path.exists() {
        return Err(PasskeepError::Config(format!(
            "{}: file does not exist",
            path.display()
        )));
    }
    let raw = std::fs::read_to_string(path)?;
    toml::from_str(&raw).map_err(|e| PasskeepError::Config(format!("{}: {}", path.display(), e)))
}

/// Like [`read`], but a missing file yields the defaults.
pub fn read_or_default(path: &Path) -> Result<FileConfig, PasskeepError> {
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    read(path)
}

impl Settings {
    /// Merges the layers: command line, then environment, then file, then defaults.
    /// `env` looks up an environment variable; empty values count as unset.
    pub fn resolve(
        file: FileConfig,
        overrides: Overrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let lookup = |key: &str| env(key).filter(|v| !v.is_empty());

        let profile = overrides
            .profile
            .or_else(|| lookup("AWS_PROFILE"))
            .or(file.profile);

        let endpoint_url = overrides
            .endpoint_url
            .or_else(|| lookup("AWS_ENDPOINT_URL_SECRETS_MANAGER"))
            .or_else(|| lookup("AWS_ENDPOINT_URL"))
            .or(file.endpoint_url);

        let output_file = overrides
            .output_file
            .or(file.output_file)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE));

        Self {
            profile,
            region: overrides.region,
            fallback_region: file.region,
            endpoint_url,
            output_file,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn write(path: &Path, config: &FileConfig) -> Result<(), PasskeepError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let raw = toml::to_string(config).map_err(|e| PasskeepError::Config(e.to_string()))?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = config_path(dir.path());

        let config = FileConfig {
            profile: Some("work".into()),
            region: Some("eu-west-2".into()),
            endpoint_url: Some("http://localhost:4566".into()),
            output_file: Some(PathBuf::from("out/secret.txt")),
        };
        write(&path, &config).unwrap();

        assert_eq!(path, dir.path().join(".passkeep").join("config.toml"));
        assert_eq!(read(&path).unwrap(), config);
    }

    #[test]
    fn test_read_or_default_missing_config_returns_defaults() {
        let dir = TempDir::new().unwrap();
        let loaded = read_or_default(&config_path(dir.path())).unwrap();
        assert_eq!(loaded, FileConfig::default());
    }

    #[test]
    fn test_read_named_missing_config_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("does-not-exist.toml");

        let err = read(&path).unwrap_err();
        assert!(
            matches!(err, PasskeepError::Config(ref m) if m.contains("does-not-exist.toml")),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn test_read_malformed_config_returns_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "region = [unclosed").unwrap();

        assert!(matches!(read(&path), Err(PasskeepError::Config(_))));
        assert!(matches!(read_or_default(&path), Err(PasskeepError::Config(_))));
    }

    #[test]
    fn test_resolve_defaults() {
        let settings = Settings::resolve(FileConfig::default(), Overrides::default(), env_from(&[]));

        assert_eq!(settings.profile, None);
        assert_eq!(settings.region, None);
        assert_eq!(settings.fallback_region, None);
        assert_eq!(settings.endpoint_url, None);
        assert_eq!(settings.output_file, PathBuf::from("secret.txt"));
    }

    #[test]
    fn test_resolve_with_only_aws_profile() {
        let env = env_from(&[("AWS_PROFILE", "default")]);
        let settings = Settings::resolve(FileConfig::default(), Overrides::default(), env);

        assert_eq!(settings.profile.as_deref(), Some("default"));
        // Left to the provider chain, which reads the profile's region.
        assert_eq!(settings.region, None);
    }

    #[test]
    fn test_resolve_precedence_cli_env_file() {
        let file = || FileConfig {
            profile: Some("file-profile".into()),
            region: Some("file-region".into()),
            endpoint_url: Some("http://file:1".into()),
            output_file: Some(PathBuf::from("file.txt")),
        };

        // Environment beats file.
        let env = env_from(&[
            ("AWS_PROFILE", "env-profile"),
            ("AWS_ENDPOINT_URL", "http://env:2"),
        ]);
        let settings = Settings::resolve(file(), Overrides::default(), env);
        assert_eq!(settings.profile.as_deref(), Some("env-profile"));
        assert_eq!(settings.region, None);
        assert_eq!(settings.fallback_region.as_deref(), Some("file-region"));
        assert_eq!(settings.endpoint_url.as_deref(), Some("http://env:2"));
        assert_eq!(settings.output_file, PathBuf::from("file.txt"));

        // Command line beats environment.
        let env = env_from(&[
            ("AWS_PROFILE", "env-profile"),
            ("AWS_ENDPOINT_URL", "http://env:2"),
        ]);
        let overrides = Overrides {
            profile: Some("cli-profile".into()),
            region: Some("cli-region".into()),
            endpoint_url: Some("http://cli:3".into()),
            output_file: Some(PathBuf::from("cli.txt")),
        };
        let settings = Settings::resolve(file(), overrides, env);
        assert_eq!(settings.profile.as_deref(), Some("cli-profile"));
        assert_eq!(settings.region.as_deref(), Some("cli-region"));
        assert_eq!(settings.endpoint_url.as_deref(), Some("http://cli:3"));
        assert_eq!(settings.output_file, PathBuf::from("cli.txt"));
    }

    #[test]
    fn test_file_values_apply_when_nothing_else_is_set() {
        let file = FileConfig {
            profile: Some("file-profile".into()),
            region: Some("file-region".into()),
            endpoint_url: Some("http://file:1".into()),
            output_file: None,
        };
        let settings = Settings::resolve(file, Overrides::default(), env_from(&[("AWS_PROFILE", "")]));

        assert_eq!(settings.profile.as_deref(), Some("file-profile"));
        assert_eq!(settings.fallback_region.as_deref(), Some("file-region"));
        assert_eq!(settings.endpoint_url.as_deref(), Some("http://file:1"));
    }

    #[test]
    fn test_service_specific_endpoint_wins() {
        let env = env_from(&[
            ("AWS_ENDPOINT_URL", "http://generic:1"),
            ("AWS_ENDPOINT_URL_SECRETS_MANAGER", "http://specific:2"),
        ]);
        let settings = Settings::resolve(FileConfig::default(), Overrides::default(), env);
        assert_eq!(settings.endpoint_url.as_deref(), Some("http://specific:2"));
    }
}

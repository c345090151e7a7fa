//! Config path resolution for the agent binary

use std::path::PathBuf;

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "DEMON_CONFIG_PATH";

/// Config file used when neither an argument nor the env var is given
pub const DEFAULT_CONFIG_PATH: &str = "config/demon.yaml";

/// Where the config path came from, for the startup log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    Argument,
    Environment,
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Argument => write!(f, "command line"),
            ConfigSource::Environment => write!(f, "{}", CONFIG_PATH_ENV),
            ConfigSource::Default => write!(f, "default"),
        }
    }
}

/// Pick the config path: first positional argument, then `DEMON_CONFIG_PATH`,
/// then `config/demon.yaml`. Empty values count as unset.
pub fn resolve_config_path(arg: Option<&str>, env_value: Option<&str>) -> (PathBuf, ConfigSource) {
    match (arg.filter(|a| !a.is_empty()), env_value.filter(|v| !v.is_empty())) {
        (Some(path), _) => (PathBuf::from(path), ConfigSource::Argument),
        (None, Some(path)) => (PathBuf::from(path), ConfigSource::Environment),
        (None, None) => (PathBuf::from(DEFAULT_CONFIG_PATH), ConfigSource::Default),
    }
}

/// Resolve the config path from this process's arguments and environment
///
/// ```no_run
/// use shannons_demon::bin_common::config_path_from_process;
///
/// let (path, source) = config_path_from_process();
/// println!("{} ({})", path.display(), source);
/// ```
pub fn config_path_from_process() -> (PathBuf, ConfigSource) {
    let arg = std::env::args().nth(1);
    let env_value = std::env::var(CONFIG_PATH_ENV).ok();
    resolve_config_path(arg.as_deref(), env_value.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_wins() {
        let (path, source) = resolve_config_path(Some("cli.yaml"), Some("env.yaml"));
        assert_eq!(path, PathBuf::from("cli.yaml"));
        assert_eq!(source, ConfigSource::Argument);
    }

    #[test]
    fn test_env_then_default() {
        assert_eq!(
            resolve_config_path(None, Some("env.yaml")),
            (PathBuf::from("env.yaml"), ConfigSource::Environment)
        );
        assert_eq!(
            resolve_config_path(None, None),
            (PathBuf::from(DEFAULT_CONFIG_PATH), ConfigSource::Default)
        );
    }

    #[test]
    fn test_empty_values_ignored() {
        assert_eq!(
            resolve_config_path(Some(""), Some("")),
            (PathBuf::from(DEFAULT_CONFIG_PATH), ConfigSource::Default)
        );
        assert_eq!(resolve_config_path(Some(""), Some("env.yaml")).1, ConfigSource::Environment);
    }
}

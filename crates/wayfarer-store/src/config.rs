use std::path::{Path, PathBuf};

/// Local store configuration.
///
/// Callers resolve the directory themselves; [`StoreConfig::ENV_VAR`] names
/// the variable that overrides it and [`StoreConfig::default_data_dir`] is
/// the platform fallback (`~/.local/share/wayfarer` on Linux).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory holding one file per store key.
    pub data_dir: PathBuf,
}

impl StoreConfig {
    /// Environment variable that overrides the data directory.
    pub const ENV_VAR: &str = "WAYFARER_DATA_DIR";

    /// Build a config from an explicit directory (useful for tests and CLI flags).
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// The platform data directory joined with `wayfarer`, or `./.wayfarer`
    /// when the platform reports none.
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .map(|d| d.join("wayfarer"))
            .unwrap_or_else(|| PathBuf::from(".wayfarer"))
    }

    /// The directory this config points at.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_new() {
        let cfg = StoreConfig::new("/tmp/wayfarer-test");
        assert_eq!(cfg.data_dir(), Path::new("/tmp/wayfarer-test"));
    }

    #[test]
    fn default_dir_ends_with_app_name() {
        let dir = StoreConfig::default_data_dir();
        let last = dir.file_name().and_then(|s| s.to_str());
        assert!(
            matches!(last, Some("wayfarer") | Some(".wayfarer")),
            "unexpected default dir: {}",
            dir.display()
        );
    }
}

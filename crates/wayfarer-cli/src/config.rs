//! Configuration file management for wayfarer.
//!
//! Provides a TOML-based config file at `~/.config/wayfarer/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use wayfarer_core::PlannerConfig;
use wayfarer_store::StoreConfig;

/// Environment variable naming the destination image directory.
pub const IMAGES_DIR_ENV: &str = "WAYFARER_IMAGES_DIR";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub storage: StorageSection,
    pub planner: PlannerConfig,
    pub images: ImagesSection,
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesSection {
    /// Directory holding `<destination>.png` (or `.jpg`, `.webp`) files.
    pub dir: Option<PathBuf>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the wayfarer config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/wayfarer` or `~/.config/wayfarer`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("wayfarer");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("wayfarer")
}

/// Return the path to the wayfarer config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file at `path`. A missing file is `None`.
pub fn load_config_from(path: &Path) -> Result<Option<ConfigFile>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e)
                .with_context(|| format!("failed to read config file at {}", path.display()));
        }
    };
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(Some(config))
}

/// Serialize and write `config` to `path`, creating parent dirs as needed.
pub fn save_config_to(path: &Path, config: &ConfigFile) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }
    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;
    Ok(())
}

/// `wayfarer init`: write a config file holding the defaults.
pub fn cmd_init(force: bool) -> Result<()> {
    let path = config_path();
    if path.exists() && !force {
        bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = ConfigFile {
        storage: StorageSection {
            data_dir: Some(StoreConfig::default_data_dir()),
        },
        planner: PlannerConfig::default(),
        images: ImagesSection::default(),
    };
    save_config_to(&path, &cfg)?;

    println!("Config written to {}", path.display());
    if let Some(dir) = &cfg.storage.data_dir {
        println!("  storage.data_dir = {}", dir.display());
    }
    println!("  planner.page_size = {}", cfg.planner.page_size);
    println!();
    println!("Next: run `wayfarer import <file> --origin <city> --dest <city>`.");
    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Values given on the command line.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub data_dir: Option<PathBuf>,
    pub page_size: Option<usize>,
    pub images_dir: Option<PathBuf>,
}

/// Fully resolved configuration, ready for use.
#[derive(Debug, Clone, PartialEq)]
pub struct WayfarerConfig {
    pub store: StoreConfig,
    pub planner: PlannerConfig,
    pub images_dir: Option<PathBuf>,
}

impl WayfarerConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    pub fn resolve(cli: &CliOverrides) -> Result<Self> {
        let file = load_config_from(&config_path())?.unwrap_or_default();
        Ok(Self::resolve_with(cli, file, |name| std::env::var(name).ok()))
    }

    /// Resolution over an explicit config file and variable lookup.
    ///
    /// Blank or unparseable env values are skipped.
    pub fn resolve_with(
        cli: &CliOverrides,
        file: ConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let var = |name: &str| env(name).filter(|v| !v.trim().is_empty());

        let data_dir = cli
            .data_dir
            .clone()
            .or_else(|| var(StoreConfig::ENV_VAR).map(PathBuf::from))
            .or(file.storage.data_dir)
            .unwrap_or_else(StoreConfig::default_data_dir);

        let mut planner = file.planner.overlay_env(&var);
        if let Some(page_size) = cli.page_size {
            planner.page_size = page_size;
        }

        let images_dir = cli
            .images_dir
            .clone()
            .or_else(|| var(IMAGES_DIR_ENV).map(PathBuf::from))
            .or(file.images.dir);

        Self {
            store: StoreConfig::new(data_dir),
            planner: planner.normalized(),
            images_dir,
        }
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    fn file_with_everything() -> ConfigFile {
        ConfigFile {
            storage: StorageSection {
                data_dir: Some(PathBuf::from("/file/data")),
            },
            planner: PlannerConfig {
                page_size: 25,
                load_more_delay_ms: 100,
            },
            images: ImagesSection {
                dir: Some(PathBuf::from("/file/images")),
            },
        }
    }

    #[test]
    fn save_and_load_config_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("wayfarer").join("config.toml");

        let original = file_with_everything();
        save_config_to(&path, &original).unwrap();
        let loaded = load_config_from(&path).unwrap().unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn missing_config_file_is_none() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(load_config_from(&tmp.path().join("nope.toml")).unwrap().is_none());
    }

    #[test]
    fn invalid_config_file_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[planner]\npage_size = \"lots\"\n").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse config file"));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let cfg: ConfigFile = toml::from_str("[planner]\npage_size = 5\n").unwrap();
        assert_eq!(cfg.planner.page_size, 5);
        assert_eq!(
            cfg.planner.load_more_delay_ms,
            PlannerConfig::DEFAULT_LOAD_MORE_DELAY_MS
        );
        assert!(cfg.storage.data_dir.is_none());
    }

    #[test]
    fn resolve_with_cli_flag_overrides_all() {
        let cli = CliOverrides {
            data_dir: Some(PathBuf::from("/cli/data")),
            page_size: Some(3),
            images_dir: Some(PathBuf::from("/cli/images")),
        };
        let env = lookup(&[
            ("WAYFARER_DATA_DIR", "/env/data"),
            ("WAYFARER_PAGE_SIZE", "7"),
            ("WAYFARER_IMAGES_DIR", "/env/images"),
        ]);
        let resolved = WayfarerConfig::resolve_with(&cli, file_with_everything(), env);
        assert_eq!(resolved.store.data_dir(), Path::new("/cli/data"));
        assert_eq!(resolved.planner.page_size, 3);
        assert_eq!(resolved.images_dir.as_deref(), Some(Path::new("/cli/images")));
    }

    #[test]
    fn resolve_env_overrides_file() {
        let env = lookup(&[
            ("WAYFARER_DATA_DIR", "/env/data"),
            ("WAYFARER_PAGE_SIZE", "7"),
            ("WAYFARER_LOAD_MORE_DELAY_MS", "0"),
        ]);
        let resolved =
            WayfarerConfig::resolve_with(&CliOverrides::default(), file_with_everything(), env);
        assert_eq!(resolved.store.data_dir(), Path::new("/env/data"));
        assert_eq!(resolved.planner.page_size, 7);
        assert_eq!(resolved.planner.load_more_delay_ms, 0);
        assert_eq!(resolved.images_dir.as_deref(), Some(Path::new("/file/images")));
    }

    #[test]
    fn resolve_falls_back_to_file_then_defaults() {
        let resolved = WayfarerConfig::resolve_with(
            &CliOverrides::default(),
            file_with_everything(),
            lookup(&[("WAYFARER_PAGE_SIZE", "not a number"), ("WAYFARER_DATA_DIR", " ")]),
        );
        assert_eq!(resolved.store.data_dir(), Path::new("/file/data"));
        assert_eq!(resolved.planner.page_size, 25);

        let resolved =
            WayfarerConfig::resolve_with(&CliOverrides::default(), ConfigFile::default(), lookup(&[]));
        assert_eq!(resolved.store, StoreConfig::new(StoreConfig::default_data_dir()));
        assert_eq!(resolved.planner, PlannerConfig::default());
        assert!(resolved.images_dir.is_none());
    }

    #[test]
    fn env_layer_overrides_only_the_fields_it_sets() {
        let resolved = WayfarerConfig::resolve_with(
            &CliOverrides::default(),
            file_with_everything(),
            lookup(&[("WAYFARER_LOAD_MORE_DELAY_MS", "0"), ("WAYFARER_PAGE_SIZE", "")]),
        );
        assert_eq!(
            resolved.planner,
            PlannerConfig {
                page_size: 25,
                load_more_delay_ms: 0,
            }
        );
    }

    #[test]
    fn zero_page_size_is_clamped() {
        let cli = CliOverrides {
            page_size: Some(0),
            ..CliOverrides::default()
        };
        let resolved = WayfarerConfig::resolve_with(&cli, ConfigFile::default(), lookup(&[]));
        assert_eq!(resolved.planner.page_size, 1);
    }
}

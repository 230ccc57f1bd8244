use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::matrix::MatrixSettings;
use crate::model::Tab;

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_true() -> bool {
    true
}

fn default_start_tab() -> String {
    "linux".to_string()
}

fn default_tick_ms() -> u64 {
    100
}

fn default_rows() -> usize {
    25
}

fn default_cols() -> usize {
    80
}

fn default_spawn_one_in() -> u32 {
    5
}

fn default_output_file() -> String {
    "cmdref-output.txt".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Cyberpunk,
    Matrix,
    Neon,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_start_tab")]
    pub start_tab: String,
    #[serde(default)]
    pub theme: ThemeName,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            start_tab: default_start_tab(),
            theme: ThemeName::default(),
        }
    }
}

impl UiConfig {
    pub fn start_tab(&self) -> Result<Tab> {
        self.start_tab
            .parse::<Tab>()
            .map_err(anyhow::Error::msg)
            .context("invalid [ui].start_tab")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnimationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default = "default_rows")]
    pub rows: usize,
    #[serde(default = "default_cols")]
    pub cols: usize,
    #[serde(default = "default_spawn_one_in")]
    pub spawn_one_in: u32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tick_ms: default_tick_ms(),
            rows: default_rows(),
            cols: default_cols(),
            spawn_one_in: default_spawn_one_in(),
        }
    }
}

impl AnimationConfig {
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn matrix_settings(&self) -> MatrixSettings {
        MatrixSettings {
            rows: self.rows,
            cols: self.cols,
            spawn_one_in: self.spawn_one_in,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.tick_ms == 0 {
            bail!("[animation].tick_ms must be greater than zero");
        }
        if self.spawn_one_in == 0 {
            bail!("[animation].spawn_one_in must be at least 1");
        }
        if self.rows == 0 || self.cols == 0 {
            bail!(
                "[animation] grid must not be empty (rows = {}, cols = {})",
                self.rows,
                self.cols
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_file")]
    pub default_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_file: default_output_file(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.ui.start_tab()?;
        self.animation.validate()
    }
}

pub fn load(cwd: &Path, explicit_path: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit_path {
        return Ok(LoadedConfig {
            config: load_from_path(path)?,
            path: Some(path.to_path_buf()),
        });
    }

    let local_candidates = [cwd.join("cmdref.toml"), cwd.join(".cmdref.toml")];
    for path in &local_candidates {
        if path.exists() {
            return Ok(LoadedConfig {
                config: load_from_path(path)?,
                path: Some(path.to_path_buf()),
            });
        }
    }

    let global_path = global_config_path()?;
    if global_path.exists() {
        return Ok(LoadedConfig {
            config: load_from_path(&global_path)?,
            path: Some(global_path),
        });
    }

    Ok(LoadedConfig {
        config: Config::default(),
        path: None,
    })
}

pub fn global_config_path() -> Result<PathBuf> {
    let config_root = dirs::config_dir().context("unable to resolve OS config directory")?;
    Ok(config_root.join("cmdref").join("config.toml"))
}

pub fn write_example_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    fs::write(path, EXAMPLE_CONFIG)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn load_from_path(path: &Path) -> Result<Config> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("invalid TOML in {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config in {}", path.display()))?;
    Ok(config)
}

const EXAMPLE_CONFIG: &str = r#"# cmdref config

[ui]
# linux | windows | macos | favorites
start_tab = "linux"
# cyberpunk | matrix | neon
theme = "cyberpunk"

# Header animation. Each tick scrolls the grid up by one row.
[animation]
enabled = true
tick_ms = 100
rows = 25
cols = 80
# A new cell shows a digit with probability 1/spawn_one_in.
spawn_one_in = 5

[output]
# Suggested file name for Ctrl+S (relative to the working directory).
default_file = "cmdref-output.txt"

# Logging is off unless a file is given. RUST_LOG overrides `level`.
[logging]
level = "info"
# file = "/tmp/cmdref.log"
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Platform;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn empty_config_uses_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.ui.start_tab().unwrap(), Tab::Platform(Platform::Linux));
        assert_eq!(cfg.ui.theme, ThemeName::Cyberpunk);
        assert!(cfg.animation.enabled);
        assert_eq!(cfg.animation.tick_rate(), Duration::from_millis(100));
        assert_eq!(cfg.animation.matrix_settings(), MatrixSettings::default());
        assert_eq!(cfg.output.default_file, "cmdref-output.txt");
        assert!(cfg.logging.file.is_none());
    }

    #[test]
    fn parses_full_config() {
        let raw = r#"
[ui]
start_tab = "favorites"
theme = "neon"

[animation]
enabled = false
tick_ms = 250
rows = 4
cols = 20
spawn_one_in = 3

[output]
default_file = "out/details.txt"

[logging]
level = "debug"
file = "/tmp/cmdref.log"
"#;
        let cfg: Config = toml::from_str(raw).unwrap();
        cfg.validate().unwrap();
        assert_eq!(cfg.ui.start_tab().unwrap(), Tab::Favorites);
        assert_eq!(cfg.ui.theme, ThemeName::Neon);
        assert!(!cfg.animation.enabled);
        assert_eq!(cfg.animation.tick_ms, 250);
        assert_eq!(
            cfg.animation.matrix_settings(),
            MatrixSettings {
                rows: 4,
                cols: 20,
                spawn_one_in: 3
            }
        );
        assert_eq!(cfg.output.default_file, "out/details.txt");
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.logging.file, Some(PathBuf::from("/tmp/cmdref.log")));
    }

    #[test]
    fn rejects_zero_tick_and_spawn_rate() {
        let cfg: Config = toml::from_str("[animation]\ntick_ms = 0\n").unwrap();
        assert!(cfg.validate().unwrap_err().to_string().contains("tick_ms"));

        let cfg: Config = toml::from_str("[animation]\nspawn_one_in = 0\n").unwrap();
        assert!(cfg.validate().unwrap_err().to_string().contains("spawn_one_in"));
    }

    #[test]
    fn rejects_unknown_start_tab() {
        let cfg: Config = toml::from_str("[ui]\nstart_tab = \"plan9\"\n").unwrap();
        let err = format!("{:#}", cfg.validate().unwrap_err());
        assert!(err.contains("start_tab"));
    }

    #[test]
    fn example_config_is_valid() {
        let cfg: Config = toml::from_str(EXAMPLE_CONFIG).unwrap();
        cfg.validate().unwrap();
    }

    #[test]
    fn prefers_local_config_file() {
        let root = make_temp_dir();
        fs::write(root.join("cmdref.toml"), "[ui]\nstart_tab = \"windows\"\n").unwrap();

        let loaded = load(&root, None).unwrap();
        assert_eq!(loaded.path, Some(root.join("cmdref.toml")));
        assert_eq!(
            loaded.config.ui.start_tab().unwrap(),
            Tab::Platform(Platform::Windows)
        );

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn write_example_refuses_to_overwrite_without_force() {
        let root = make_temp_dir();
        let path = root.join("nested").join("config.toml");

        write_example_config(&path, false).unwrap();
        let err = write_example_config(&path, false).unwrap_err().to_string();
        assert!(err.contains("--force"));
        write_example_config(&path, true).unwrap();

        let _ = fs::remove_dir_all(root);
    }

    fn make_temp_dir() -> PathBuf {
        let nonce = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("cmdref-config-test-{nonce}"));
        fs::create_dir_all(&path).unwrap();
        path
    }
}

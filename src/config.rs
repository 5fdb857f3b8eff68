use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::scroll::is_physical;

const DEFAULT_ENV_PREFIX: &str = "FOLIO";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub ui: UIConfig,
    #[serde(default)]
    pub portfolio: PortfolioConfig,
    #[serde(default)]
    pub readme: ReadmeConfig,
    #[serde(default)]
    pub embed: EmbedConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UIConfig {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_intro")]
    pub intro: bool,
    #[serde(default = "default_tick_rate", with = "humantime_serde")]
    pub tick_rate: Duration,
}

impl Default for UIConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            intro: default_intro(),
            tick_rate: default_tick_rate(),
        }
    }
}

fn default_theme() -> String {
    "dark".into()
}

fn default_intro() -> bool {
    true
}

fn default_tick_rate() -> Duration {
    Duration::from_millis(120)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PortfolioConfig {
    #[serde(default)]
    pub data_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReadmeConfig {
    #[serde(default = "default_content_host")]
    pub content_host: String,
    #[serde(default = "default_branch")]
    pub default_branch: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_readme_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ReadmeConfig {
    fn default() -> Self {
        Self {
            content_host: default_content_host(),
            default_branch: default_branch(),
            user_agent: default_user_agent(),
            timeout: default_readme_timeout(),
        }
    }
}

fn default_content_host() -> String {
    "https://raw.githubusercontent.com".into()
}

fn default_branch() -> String {
    "main".into()
}

fn default_user_agent() -> String {
    format!("folio/{} (+https://github.com/folio-tui/folio)", crate::VERSION)
}

fn default_readme_timeout() -> Duration {
    Duration::from_secs(20)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedConfig {
    #[serde(default = "default_allowed_hosts")]
    pub allowed_hosts: Vec<String>,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            allowed_hosts: default_allowed_hosts(),
        }
    }
}

fn default_allowed_hosts() -> Vec<String> {
    vec!["github.io".into(), "vercel.app".into(), "netlify.app".into()]
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScrollConfig {
    #[serde(default = "default_stiffness")]
    pub stiffness: f64,
    #[serde(default = "default_damping")]
    pub damping: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            stiffness: default_stiffness(),
            damping: default_damping(),
        }
    }
}

fn default_stiffness() -> f64 {
    200.0
}

fn default_damping() -> f64 {
    30.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub config_file: Option<PathBuf>,
    pub env_prefix: Option<String>,
}

pub fn load(options: LoadOptions) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(path) = options.config_file.as_ref() {
        if path.exists() {
            let from_file = read_config_file(path)?;
            cfg = merge_config(cfg, from_file);
        }
    } else if let Some(default_path) = default_config_path() {
        if default_path.exists() {
            let from_file = read_config_file(&default_path)?;
            cfg = merge_config(cfg, from_file);
        }
    }

    let prefix = options.env_prefix.as_deref().unwrap_or(DEFAULT_ENV_PREFIX);
    apply_env(&mut cfg, prefix);

    Ok(cfg)
}

fn read_config_file(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&data)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))?;
    Ok(config)
}

fn merge_config(mut base: Config, other: Config) -> Config {
    if !other.ui.theme.is_empty() {
        base.ui.theme = other.ui.theme;
    }
    base.ui.intro = other.ui.intro;
    if !other.ui.tick_rate.is_zero() {
        base.ui.tick_rate = other.ui.tick_rate;
    }

    if other.portfolio.data_file.is_some() {
        base.portfolio.data_file = other.portfolio.data_file;
    }

    if !other.readme.content_host.is_empty() {
        base.readme.content_host = other.readme.content_host;
    }
    if !other.readme.default_branch.is_empty() {
        base.readme.default_branch = other.readme.default_branch;
    }
    if !other.readme.user_agent.is_empty() {
        base.readme.user_agent = other.readme.user_agent;
    }
    if !other.readme.timeout.is_zero() {
        base.readme.timeout = other.readme.timeout;
    }

    base.embed.allowed_hosts = other.embed.allowed_hosts;

    if is_physical(other.scroll.stiffness) {
        base.scroll.stiffness = other.scroll.stiffness;
    }
    if is_physical(other.scroll.damping) {
        base.scroll.damping = other.scroll.damping;
    }

    if !other.log.level.is_empty() {
        base.log.level = other.log.level;
    }
    if other.log.file.is_some() {
        base.log.file = other.log.file;
    }

    base
}

// Environment keys use `__` as the section separator: FOLIO_UI__THEME=light.
fn apply_env(cfg: &mut Config, prefix: &str) {
    let mut map: HashMap<String, String> = HashMap::new();
    let upper_prefix = format!("{}_", prefix.to_uppercase());

    for (key, value) in env::vars() {
        if let Some(stripped) = key.strip_prefix(&upper_prefix) {
            let normalized = stripped.to_ascii_lowercase().replace("__", ".");
            map.insert(normalized, value);
        }
    }

    for (key, value) in map {
        apply_env_value(cfg, &key, value);
    }
}

fn apply_env_value(cfg: &mut Config, key: &str, value: String) {
    match key {
        "ui.theme" => cfg.ui.theme = value,
        "ui.intro" => cfg.ui.intro = env_bool(&value),
        "ui.tick_rate" => {
            if let Ok(duration) = humantime::parse_duration(&value) {
                cfg.ui.tick_rate = duration;
            }
        }
        "portfolio.data_file" => cfg.portfolio.data_file = Some(PathBuf::from(value)),
        "readme.content_host" => cfg.readme.content_host = value,
        "readme.default_branch" => cfg.readme.default_branch = value,
        "readme.user_agent" => cfg.readme.user_agent = value,
        "readme.timeout" => {
            if let Ok(duration) = humantime::parse_duration(&value) {
                cfg.readme.timeout = duration;
            }
        }
        "embed.allowed_hosts" => {
            cfg.embed.allowed_hosts = value
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        "scroll.stiffness" => {
            if let Some(parsed) = value.trim().parse::<f64>().ok().filter(|v| is_physical(*v)) {
                cfg.scroll.stiffness = parsed;
            }
        }
        "scroll.damping" => {
            if let Some(parsed) = value.trim().parse::<f64>().ok().filter(|v| is_physical(*v)) {
                cfg.scroll.damping = parsed;
            }
        }
        "log.level" => cfg.log.level = value,
        "log.file" => cfg.log.file = Some(PathBuf::from(value)),
        _ => {}
    }
}

fn env_bool(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "True" | "yes")
}

pub fn default_path() -> Option<PathBuf> {
    default_config_path()
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("folio").join("config.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::tempdir;

    fn isolated() -> LoadOptions {
        LoadOptions {
            config_file: Some(PathBuf::from("/nonexistent/folio/config.yaml")),
            env_prefix: Some("FOLIO_TEST_NONE".into()),
        }
    }

    #[test]
    fn load_defaults_without_files() {
        let cfg = load(isolated()).unwrap();
        assert_eq!(cfg.ui.theme, "dark");
        assert!(cfg.ui.intro);
        assert_eq!(cfg.readme.default_branch, "main");
        assert_eq!(cfg.readme.content_host, "https://raw.githubusercontent.com");
        assert_eq!(cfg.embed.allowed_hosts.len(), 3);
        assert_eq!(cfg.scroll.stiffness, 200.0);
        assert_eq!(cfg.scroll.damping, 30.0);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "ui:\n  theme: light\n  intro: false\nreadme:\n  default_branch: master\n  timeout: 5s\nembed:\n  allowed_hosts: [pages.dev]\n",
        )
        .unwrap();
        let cfg = load(LoadOptions {
            config_file: Some(path),
            env_prefix: Some("FOLIO_TEST_NONE".into()),
        })
        .unwrap();
        assert_eq!(cfg.ui.theme, "light");
        assert!(!cfg.ui.intro);
        assert_eq!(cfg.readme.default_branch, "master");
        assert_eq!(cfg.readme.timeout, Duration::from_secs(5));
        assert_eq!(cfg.readme.content_host, default_content_host());
        assert_eq!(cfg.embed.allowed_hosts, vec!["pages.dev".to_string()]);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "ui: [not, a, map").unwrap();
        let err = load(LoadOptions {
            config_file: Some(path),
            env_prefix: Some("FOLIO_TEST_NONE".into()),
        })
        .unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config file"));
    }

    #[test]
    fn env_overrides() {
        env::set_var("FOLIO_ENVTEST_UI__THEME", "light");
        env::set_var("FOLIO_ENVTEST_EMBED__ALLOWED_HOSTS", "github.io, pages.dev");
        let cfg = load(LoadOptions {
            config_file: Some(PathBuf::from("/nonexistent/folio/config.yaml")),
            env_prefix: Some("FOLIO_ENVTEST".into()),
        })
        .unwrap();
        assert_eq!(cfg.ui.theme, "light");
        assert_eq!(
            cfg.embed.allowed_hosts,
            vec!["github.io".to_string(), "pages.dev".to_string()]
        );
        env::remove_var("FOLIO_ENVTEST_UI__THEME");
        env::remove_var("FOLIO_ENVTEST_EMBED__ALLOWED_HOSTS");
    }

    #[test]
    fn env_rejects_unphysical_spring() {
        env::set_var("FOLIO_SPRINGTEST_SCROLL__STIFFNESS", "0");
        env::set_var("FOLIO_SPRINGTEST_SCROLL__DAMPING", "NaN");
        let cfg = load(LoadOptions {
            config_file: Some(PathBuf::from("/nonexistent/folio/config.yaml")),
            env_prefix: Some("FOLIO_SPRINGTEST".into()),
        })
        .unwrap();
        assert_eq!(cfg.scroll.stiffness, 200.0);
        assert_eq!(cfg.scroll.damping, 30.0);

        env::set_var("FOLIO_SPRINGTEST_SCROLL__STIFFNESS", "320");
        env::set_var("FOLIO_SPRINGTEST_SCROLL__DAMPING", "-4");
        let cfg = load(LoadOptions {
            config_file: Some(PathBuf::from("/nonexistent/folio/config.yaml")),
            env_prefix: Some("FOLIO_SPRINGTEST".into()),
        })
        .unwrap();
        assert_eq!(cfg.scroll.stiffness, 320.0);
        assert_eq!(cfg.scroll.damping, 30.0);
        env::remove_var("FOLIO_SPRINGTEST_SCROLL__STIFFNESS");
        env::remove_var("FOLIO_SPRINGTEST_SCROLL__DAMPING");
    }
}

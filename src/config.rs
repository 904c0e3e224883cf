//! Site configuration module.
//!
//! Handles loading, validating, and merging `site.toml`. Stock defaults are
//! serialized to a TOML table and the user file is merged on top of it, so a
//! `site.toml` only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [church]
//! name = "Calvary Fellowship Baptist Church"
//! short_name = "CFBC"
//! phone = "(440) 354-8994"
//! email = "info@cfbchurch.net"
//! address = ["727 Mentor Avenue", "Painesville, OH 44077"]
//!
//! [store]
//! api_url = "https://api.airtable.com/v0"
//! request_timeout_secs = 60   # Per HTTP request
//! read_attempts = 3           # Total attempts for list reads
//! backoff_base_ms = 1000      # Wait before the 2nd attempt; doubles after
//! page_budget_secs = 10       # Upper bound on one page's store read
//!
//! [server]
//! bind = "127.0.0.1:3000"
//!
//! [revalidate]                # Seconds a rendered page stays fresh
//! home = 3600
//! about = 3600
//! visit = 86400
//! ministries = 3600
//! missions = 3600
//! sermons = 3600
//! contact = 86400
//! events = 900
//!
//! [carousel]
//! interval_ms = 5000
//! autoplay = true
//! max_items = 12
//!
//! [colors.light]
//! background = "#ffffff"
//! # ...
//! ```
//!
//! ## Credentials
//!
//! The Airtable token and base id are secrets and are never read from
//! `site.toml`. They come from the process environment, see
//! [`crate::store::StoreCredentials::from_env`].
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `site.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Congregation details shown in the header, footer, and error messages.
    pub church: ChurchConfig,
    /// Airtable connection tuning (never credentials).
    pub store: StoreConfig,
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Per-page revalidation intervals.
    pub revalidate: RevalidateConfig,
    /// Home page events carousel.
    pub carousel: CarouselConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.read_attempts == 0 {
            return Err(ConfigError::Validation(
                "store.read_attempts must be at least 1".into(),
            ));
        }
        if self.store.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "store.request_timeout_secs must be non-zero".into(),
            ));
        }
        if !self.store.api_url.starts_with("http://") && !self.store.api_url.starts_with("https://")
        {
            return Err(ConfigError::Validation(
                "store.api_url must be an http(s) URL".into(),
            ));
        }
        if self.carousel.interval_ms == 0 {
            return Err(ConfigError::Validation(
                "carousel.interval_ms must be non-zero".into(),
            ));
        }
        if self.church.phone.trim().is_empty() {
            return Err(ConfigError::Validation(
                "church.phone must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Congregation details.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChurchConfig {
    pub name: String,
    /// Used in the header logo and page titles.
    pub short_name: String,
    /// Shown in the footer and in the contact failure message.
    pub phone: String,
    pub email: String,
    /// Street address, one line per entry.
    pub address: Vec<String>,
}

impl Default for ChurchConfig {
    fn default() -> Self {
        Self {
            name: "Calvary Fellowship Baptist Church".to_string(),
            short_name: "CFBC".to_string(),
            phone: "(440) 354-8994".to_string(),
            email: "info@cfbchurch.net".to_string(),
            address: vec![
                "727 Mentor Avenue".to_string(),
                "Painesville, OH 44077".to_string(),
            ],
        }
    }
}

/// Airtable connection tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// REST root, without the base id.
    pub api_url: String,
    pub request_timeout_secs: u64,
    /// Total attempts for a list read, including the first.
    pub read_attempts: u32,
    /// Backoff before the second attempt. Each later wait doubles.
    pub backoff_base_ms: u64,
    /// Upper bound on the time one page may spend reading the store before
    /// it renders fallback content instead.
    pub page_budget_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.airtable.com/v0".to_string(),
            request_timeout_secs: 60,
            read_attempts: 3,
            backoff_base_ms: 1000,
            page_budget_secs: 10,
        }
    }
}

impl StoreConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn page_budget(&self) -> Duration {
        Duration::from_secs(self.page_budget_secs)
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Seconds a rendered page is served from cache before the next request
/// triggers a fresh store read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RevalidateConfig {
    pub home: u64,
    pub about: u64,
    pub visit: u64,
    pub ministries: u64,
    pub missions: u64,
    pub sermons: u64,
    pub contact: u64,
    /// The `/api/events` feed used by the carousel.
    pub events: u64,
}

impl Default for RevalidateConfig {
    fn default() -> Self {
        Self {
            home: 3600,
            about: 3600,
            visit: 86400,
            ministries: 3600,
            missions: 3600,
            sermons: 3600,
            contact: 86400,
            events: 900,
        }
    }
}

/// Home page events carousel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CarouselConfig {
    /// Autoplay step interval in milliseconds.
    pub interval_ms: u64,
    pub autoplay: bool,
    /// Cap on fetched events, not counting the fixed first slide.
    pub max_items: usize,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5000,
            autoplay: true,
            max_items: 12,
        }
    }
}

impl CarouselConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Secondary text: card metadata, footer, captions.
    pub text_muted: String,
    /// Hero band and primary buttons.
    pub accent: String,
    pub accent_text: String,
    pub surface: String,
    pub border: String,
    pub link: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text: "#111827".to_string(),
            text_muted: "#4b5563".to_string(),
            accent: "#1e3a8a".to_string(),
            accent_text: "#ffffff".to_string(),
            surface: "#f9fafb".to_string(),
            border: "#e5e7eb".to_string(),
            link: "#0284c7".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#0b1120".to_string(),
            text: "#f3f4f6".to_string(),
            text_muted: "#9ca3af".to_string(),
            accent: "#1d4ed8".to_string(),
            accent_text: "#ffffff".to_string(),
            surface: "#111827".to_string(),
            border: "#1f2937".to_string(),
            link: "#7dd3fc".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `site.toml` from `path`, falling back to stock defaults when the
/// file is absent.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `site.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# CFBC site configuration
# =======================
# All settings are optional. Values shown below are the defaults.
# Unknown keys cause an error.
#
# The Airtable token and base id are NOT configured here. Set
# AIRTABLE_API_TOKEN and AIRTABLE_BASE_ID in the environment. Without them
# every page renders its built-in fallback content and the contact form
# is disabled.

# ---------------------------------------------------------------------------
# Church details (header, footer, contact failure message)
# ---------------------------------------------------------------------------
[church]
name = "Calvary Fellowship Baptist Church"
short_name = "CFBC"
phone = "(440) 354-8994"
email = "info@cfbchurch.net"
address = ["727 Mentor Avenue", "Painesville, OH 44077"]

# ---------------------------------------------------------------------------
# Airtable
# ---------------------------------------------------------------------------
[store]
api_url = "https://api.airtable.com/v0"

# Timeout for one HTTP request, in seconds.
request_timeout_secs = 60

# Total attempts for a list read. Waits between attempts start at
# backoff_base_ms and double each time (1s, 2s, ...).
read_attempts = 3
backoff_base_ms = 1000

# A page that cannot finish its store read within this many seconds renders
# fallback content instead.
page_budget_secs = 10

# ---------------------------------------------------------------------------
# HTTP server
# ---------------------------------------------------------------------------
[server]
bind = "127.0.0.1:3000"

# ---------------------------------------------------------------------------
# Revalidation: seconds a rendered page is served before it is re-rendered
# ---------------------------------------------------------------------------
[revalidate]
home = 3600
about = 3600
visit = 86400
ministries = 3600
missions = 3600
sermons = 3600
contact = 86400
events = 900

# ---------------------------------------------------------------------------
# Home page events carousel
# ---------------------------------------------------------------------------
[carousel]
interval_ms = 5000
autoplay = true
max_items = 12

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
text = "#111827"
text_muted = "#4b5563"
accent = "#1e3a8a"
accent_text = "#ffffff"
surface = "#f9fafb"
border = "#e5e7eb"
link = "#0284c7"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#0b1120"
text = "#f3f4f6"
text_muted = "#9ca3af"
accent = "#1d4ed8"
accent_text = "#ffffff"
surface = "#111827"
border = "#1f2937"
link = "#7dd3fc"
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    fn vars(scheme: &ColorScheme, indent: &str) -> String {
        [
            ("--color-bg", &scheme.background),
            ("--color-text", &scheme.text),
            ("--color-text-muted", &scheme.text_muted),
            ("--color-accent", &scheme.accent),
            ("--color-accent-text", &scheme.accent_text),
            ("--color-surface", &scheme.surface),
            ("--color-border", &scheme.border),
            ("--color-link", &scheme.link),
        ]
        .iter()
        .map(|(name, value)| format!("{indent}{name}: {value};"))
        .collect::<Vec<_>>()
        .join("\n")
    }

    format!(
        ":root {{\n{}\n}}\n\n@media (prefers-color-scheme: dark) {{\n    :root {{\n{}\n    }}\n}}",
        vars(&colors.light, "    "),
        vars(&colors.dark, "        "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_church_details() {
        let config = SiteConfig::default();
        assert_eq!(config.church.short_name, "CFBC");
        assert_eq!(config.church.phone, "(440) 354-8994");
        assert_eq!(config.church.address.len(), 2);
    }

    #[test]
    fn default_store_retry_settings() {
        let config = SiteConfig::default();
        assert_eq!(config.store.read_attempts, 3);
        assert_eq!(config.store.backoff_base(), Duration::from_secs(1));
        assert_eq!(config.store.request_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn default_revalidation_is_hourly_for_content_pages() {
        let config = SiteConfig::default();
        assert_eq!(config.revalidate.ministries, 3600);
        assert_eq!(config.revalidate.missions, 3600);
        assert_eq!(config.revalidate.sermons, 3600);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[carousel]
interval_ms = 3500
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.carousel.interval(), Duration::from_millis(3500));
        // Untouched sections keep defaults
        assert!(config.carousel.autoplay);
        assert_eq!(config.store.read_attempts, 3);
    }

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"bind = "a""#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"bind = "b""#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("bind").unwrap().as_str(), Some("b"));
    }

    #[test]
    fn merge_toml_deep_nested() {
        let base: toml::Value = toml::from_str(
            r##"
[colors.light]
background = "#fff"
text = "#000"
"##,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r##"
[colors.light]
background = "#fafafa"
"##,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let light = merged.get("colors").unwrap().get("light").unwrap();
        assert_eq!(light.get("background").unwrap().as_str(), Some("#fafafa"));
        assert_eq!(light.get("text").unwrap().as_str(), Some("#000"));
    }

    #[test]
    fn unknown_key_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str(
            r#"
[store]
read_attempt = 5
"#,
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn credentials_are_not_a_config_key() {
        let result: Result<SiteConfig, _> = toml::from_str(
            r#"
[store]
api_token = "secret"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_zero_attempts() {
        let mut config = SiteConfig::default();
        config.store.read_attempts = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(msg)) if msg.contains("read_attempts")
        ));
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let mut config = SiteConfig::default();
        config.carousel.interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_http_api_url() {
        let mut config = SiteConfig::default();
        config.store.api_url = "ftp://example.com".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_default_config_passes() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("site.toml")).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:3000");
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("site.toml");
        fs::write(
            &path,
            r#"
[server]
bind = "0.0.0.0:8080"

[revalidate]
missions = 60
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.revalidate.missions, 60);
        assert_eq!(config.revalidate.ministries, 3600);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("site.toml");
        fs::write(&path, "this is not valid toml [[[").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("site.toml");
        fs::write(&path, "[church]\nphone = \"  \"\n").unwrap();
        assert!(matches!(
            load_config(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let parsed: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(parsed.church.name, defaults.church.name);
        assert_eq!(parsed.store.api_url, defaults.store.api_url);
        assert_eq!(parsed.revalidate.events, defaults.revalidate.events);
        assert_eq!(parsed.colors.dark.accent, defaults.colors.dark.accent);
    }

    #[test]
    fn generate_css_includes_both_schemes() {
        let mut colors = ColorConfig::default();
        colors.light.background = "#f0f0f0".to_string();
        let css = generate_color_css(&colors);
        assert!(css.contains("--color-bg: #f0f0f0;"));
        assert!(css.contains("--color-accent: #1d4ed8;"));
        assert!(css.contains("@media (prefers-color-scheme: dark)"));
    }
}

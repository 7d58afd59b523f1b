//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Target site and monitored courses
    #[serde(default)]
    pub site: SiteConfig,

    /// CSS selectors for the page controls
    #[serde(default)]
    pub selectors: SelectorConfig,

    /// Browser session settings
    #[serde(default)]
    pub webdriver: WebDriverConfig,

    /// Availability evaluation and run policy
    #[serde(default)]
    pub checker: CheckerConfig,

    /// Telegram notification settings
    #[serde(default)]
    pub notify: NotifyConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.site.url)
            .map_err(|e| AppError::validation(format!("site.url is invalid: {e}")))?;
        if self.site.region.trim().is_empty() {
            return Err(AppError::validation("site.region is empty"));
        }
        if self.site.pou.trim().is_empty() {
            return Err(AppError::validation("site.pou is empty"));
        }
        if self.site.courses.is_empty() {
            return Err(AppError::validation("No courses defined"));
        }
        if self.site.courses.iter().any(|c| c.trim().is_empty()) {
            return Err(AppError::validation("site.courses contains an empty name"));
        }
        Url::parse(&self.webdriver.server_url)
            .map_err(|e| AppError::validation(format!("webdriver.server_url is invalid: {e}")))?;
        if self.webdriver.page_timeout_secs == 0 {
            return Err(AppError::validation(
                "webdriver.page_timeout_secs must be > 0",
            ));
        }
        if self.webdriver.poll_interval_ms == 0 {
            return Err(AppError::validation(
                "webdriver.poll_interval_ms must be > 0",
            ));
        }
        if self.checker.no_batch_markers.is_empty() {
            return Err(AppError::validation("No availability markers defined"));
        }
        if self
            .checker
            .no_batch_markers
            .iter()
            .any(|m| m.trim().is_empty())
        {
            return Err(AppError::validation(
                "checker.no_batch_markers contains a blank entry",
            ));
        }
        Url::parse(&self.notify.api_base)
            .map_err(|e| AppError::validation(format!("notify.api_base is invalid: {e}")))?;
        if self.notify.timeout_secs == 0 {
            return Err(AppError::validation("notify.timeout_secs must be > 0"));
        }
        if !self.notify.template.contains("{course}") {
            return Err(AppError::validation(
                "notify.template must contain the {course} placeholder",
            ));
        }
        Ok(())
    }
}

/// Target site and the fixed set of monitored courses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// URL of the batch detail page
    #[serde(default = "defaults::site_url")]
    pub url: String,

    /// Region dropdown value
    #[serde(default = "defaults::region")]
    pub region: String,

    /// POU (branch/location) dropdown value
    #[serde(default = "defaults::pou")]
    pub pou: String,

    /// Course names to check, in order
    #[serde(default = "defaults::courses")]
    pub courses: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            url: defaults::site_url(),
            region: defaults::region(),
            pou: defaults::pou(),
            courses: defaults::courses(),
        }
    }
}

/// CSS selectors for the page controls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Region dropdown
    #[serde(default = "defaults::region_select")]
    pub region: String,

    /// POU dropdown
    #[serde(default = "defaults::pou_select")]
    pub pou: String,

    /// Course dropdown
    #[serde(default = "defaults::course_select")]
    pub course: String,

    /// Query trigger button
    #[serde(default = "defaults::query_button")]
    pub query_button: String,

    /// Element whose text is read after a query
    #[serde(default = "defaults::result_region")]
    pub result_region: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            region: defaults::region_select(),
            pou: defaults::pou_select(),
            course: defaults::course_select(),
            query_button: defaults::query_button(),
            result_region: defaults::result_region(),
        }
    }
}

/// Browser session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebDriverConfig {
    /// WebDriver server URL (chromedriver)
    #[serde(default = "defaults::server_url")]
    pub server_url: String,

    /// Run Chrome headless
    #[serde(default = "defaults::headless")]
    pub headless: bool,

    /// User-Agent for the browser session
    #[serde(default = "defaults::browser_user_agent")]
    pub user_agent: String,

    /// Extra Chrome launch arguments
    #[serde(default = "defaults::chrome_args")]
    pub chrome_args: Vec<String>,

    /// Element wait timeout in seconds
    #[serde(default = "defaults::page_timeout")]
    pub page_timeout_secs: u64,

    /// Poll interval for element waits in milliseconds
    #[serde(default = "defaults::poll_interval")]
    pub poll_interval_ms: u64,

    /// Delay after a postback-triggering selection in milliseconds
    #[serde(default = "defaults::settle_delay")]
    pub settle_ms: u64,

    /// Delay after the query click before reading results in milliseconds
    #[serde(default = "defaults::result_wait")]
    pub result_wait_ms: u64,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            server_url: defaults::server_url(),
            headless: defaults::headless(),
            user_agent: defaults::browser_user_agent(),
            chrome_args: defaults::chrome_args(),
            page_timeout_secs: defaults::page_timeout(),
            poll_interval_ms: defaults::poll_interval(),
            settle_ms: defaults::settle_delay(),
            result_wait_ms: defaults::result_wait(),
        }
    }
}

/// Availability evaluation and run policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckerConfig {
    /// Phrases that mark a result as "no slots", matched case-insensitively
    #[serde(default = "defaults::no_batch_markers")]
    pub no_batch_markers: Vec<String>,

    /// Stop the pass after the first available course
    #[serde(default)]
    pub stop_after_first: bool,

    /// Pause after each sent notification in milliseconds
    #[serde(default = "defaults::notify_delay")]
    pub notify_delay_ms: u64,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            no_batch_markers: defaults::no_batch_markers(),
            stop_after_first: false,
            notify_delay_ms: defaults::notify_delay(),
        }
    }
}

/// Telegram notification settings.
///
/// Credentials are deliberately absent here; they come from the environment
/// (see [`TelegramCredentials`]) so the config file stays safe to commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Bot API base URL
    #[serde(default = "defaults::api_base")]
    pub api_base: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::notify_timeout")]
    pub timeout_secs: u64,

    /// Message template; {course} and {pou} are interpolated
    #[serde(default = "defaults::template")]
    pub template: String,

    /// Telegram parse mode for the message body
    #[serde(default = "defaults::parse_mode")]
    pub parse_mode: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::api_base(),
            timeout_secs: defaults::notify_timeout(),
            template: defaults::template(),
            parse_mode: defaults::parse_mode(),
        }
    }
}

/// Telegram bot credentials, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct TelegramCredentials {
    pub bot_token: String,
    pub chat_id: String,
}

impl TelegramCredentials {
    /// Environment variable holding the bot token.
    pub const TOKEN_VAR: &'static str = "TELEGRAM_BOT_TOKEN";

    /// Environment variable holding the recipient chat id.
    pub const CHAT_ID_VAR: &'static str = "TELEGRAM_CHAT_ID";

    /// Read credentials from the process environment.
    ///
    /// Every notification depends on these, so a missing variable fails the
    /// whole run up front rather than after a full scrape.
    pub fn from_env() -> Result<Self> {
        Self::from_values(
            std::env::var(Self::TOKEN_VAR).ok(),
            std::env::var(Self::CHAT_ID_VAR).ok(),
        )
    }

    fn from_values(token: Option<String>, chat_id: Option<String>) -> Result<Self> {
        let bot_token = token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::config(format!("{} is not set", Self::TOKEN_VAR)))?;
        let chat_id = chat_id
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| AppError::config(format!("{} is not set", Self::CHAT_ID_VAR)))?;
        Ok(Self { bot_token, chat_id })
    }
}

mod defaults {
    // Site defaults
    pub fn site_url() -> String {
        "https://icaionlineregistration.org/launchbatchdetail.aspx".into()
    }
    pub fn region() -> String {
        "Southern".into()
    }
    pub fn pou() -> String {
        "HYDERABAD".into()
    }
    pub fn courses() -> Vec<String> {
        vec![
            "Advanced (ICITSS) MCS Course".into(),
            "ICITSS - Information Technology".into(),
            "ICITSS - Orientation Course".into(),
        ]
    }

    // Selector defaults (the portal is an ASP.NET WebForms page)
    pub fn region_select() -> String {
        "#ddlRegion".into()
    }
    pub fn pou_select() -> String {
        "#ddlPOU".into()
    }
    pub fn course_select() -> String {
        "#ddlCourse".into()
    }
    pub fn query_button() -> String {
        "#btnGetList".into()
    }
    pub fn result_region() -> String {
        "body".into()
    }

    // WebDriver defaults
    pub fn server_url() -> String {
        "http://localhost:9515".into()
    }
    pub fn headless() -> bool {
        true
    }
    pub fn browser_user_agent() -> String {
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
         Chrome/120.0.0.0 Safari/537.36"
            .into()
    }
    pub fn chrome_args() -> Vec<String> {
        vec![
            "--no-sandbox".into(),
            "--disable-dev-shm-usage".into(),
            "--disable-gpu".into(),
            "--window-size=1920,1080".into(),
            "--disable-blink-features=AutomationControlled".into(),
            "--disable-extensions".into(),
            "--disable-software-rasterizer".into(),
            "--ignore-certificate-errors".into(),
        ]
    }
    pub fn page_timeout() -> u64 {
        30
    }
    pub fn poll_interval() -> u64 {
        500
    }
    pub fn settle_delay() -> u64 {
        3000
    }
    pub fn result_wait() -> u64 {
        5000
    }

    // Checker defaults
    pub fn no_batch_markers() -> Vec<String> {
        vec![
            "no batch available".into(),
            "no batch".into(),
            "no record found".into(),
            "no records found".into(),
            "batch not available".into(),
        ]
    }
    pub fn notify_delay() -> u64 {
        1000
    }

    // Notify defaults
    pub fn api_base() -> String {
        "https://api.telegram.org".into()
    }
    pub fn notify_timeout() -> u64 {
        10
    }
    pub fn template() -> String {
        "🚨 ICAI SLOT OPEN!\n\nCourse: {course}\nPOU: {pou}\n\nBook NOW!".into()
    }
    pub fn parse_mode() -> String {
        "HTML".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_courses() {
        let mut config = Config::default();
        config.site.courses.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_blank_course_name() {
        let mut config = Config::default();
        config.site.courses.push("   ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_site_url() {
        let mut config = Config::default();
        config.site.url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_markers() {
        let mut config = Config::default();
        config.checker.no_batch_markers.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_blank_marker() {
        let mut config = Config::default();
        config.checker.no_batch_markers.push("   ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_template_without_course_placeholder() {
        let mut config = Config::default();
        config.notify.template = "slots open".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_parses_partial_file_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[site]\nregion = \"Western\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.site.region, "Western");
        assert_eq!(config.site.pou, "HYDERABAD");
        assert_eq!(config.site.courses.len(), 3);
        assert_eq!(config.selectors.region, "#ddlRegion");
    }

    #[test]
    fn load_or_default_falls_back_on_missing_file() {
        let config = Config::load_or_default("/nonexistent/config.toml");
        assert_eq!(config.site.region, "Southern");
    }

    #[test]
    fn credentials_require_both_variables() {
        assert!(TelegramCredentials::from_values(None, None).is_err());
        assert!(TelegramCredentials::from_values(Some("t".into()), None).is_err());
        assert!(TelegramCredentials::from_values(None, Some("c".into())).is_err());
        assert!(TelegramCredentials::from_values(Some("  ".into()), Some("c".into())).is_err());

        let creds =
            TelegramCredentials::from_values(Some("123:abc".into()), Some("42".into())).unwrap();
        assert_eq!(creds.bot_token, "123:abc");
        assert_eq!(creds.chat_id, "42");
    }
}

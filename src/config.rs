use crate::error::{Result, ScrapeGateError};
use std::env;
use std::time::Duration;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Service identity
    pub app: AppConfig,
    /// API server configuration
    pub api: ApiServerConfig,
    /// ClickHouse connection settings
    pub clickhouse: ClickHouseConfig,
    /// Tor SOCKS and control port settings
    pub tor: TorConfig,
    /// Paid residential proxy vendors
    pub providers: ProvidersConfig,
    /// Exit IP verification endpoint
    pub ip_check: IpCheckConfig,
    /// Headless browser settings
    pub scrape: ScrapeConfig,
    /// Logging configuration
    pub log: LogConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub name: String,
    pub version: String,
    pub environment: String,
}

#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Port for the API server (default: 8000)
    pub port: u16,
    /// Host to bind to (default: 0.0.0.0)
    pub host: String,
}

#[derive(Debug, Clone)]
pub struct ClickHouseConfig {
    pub host: String,
    /// HTTP interface port (default: 8123)
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    /// Use https for the HTTP interface
    pub secure: bool,
}

#[derive(Debug, Clone)]
pub struct TorConfig {
    /// Whether the free path is available at all
    pub enabled: bool,
    /// SOCKS5 host (default: tor-proxy)
    pub host: String,
    /// SOCKS5 port (default: 9050)
    pub port: u16,
    /// Control protocol port (default: 9051)
    pub control_port: u16,
    /// `TOR_CONTROL_PASSWORD`. Defaults to empty, which only authenticates
    /// against a control port without `HashedControlPassword`.
    pub control_password: String,
    /// Bound on connect and on every control read/write
    pub control_timeout: Duration,
    /// Pause after NEWNYM before the exit IP is checked
    pub settle_delay: Duration,
}

/// Connection parameters for a single paid vendor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct ProvidersConfig {
    /// Default paid vendor identifier (PROXY_PROVIDER)
    pub selected: String,
    pub brightdata: VendorConfig,
    pub oxylabs: VendorConfig,
    pub smartproxy: VendorConfig,
    pub iproyal: VendorConfig,
    pub floppydata: VendorConfig,
    /// Two-letter country code for FloppyData
    pub floppydata_country: String,
    /// Optional city for FloppyData, empty = any
    pub floppydata_city: String,
    /// FloppyData rotation code: 0 sticky, -1 per request, 1-60 minutes
    pub floppydata_rotation: String,
}

#[derive(Debug, Clone)]
pub struct IpCheckConfig {
    pub url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub user_agent: String,
    /// Explicit Chromium binary, otherwise auto-detected
    pub chrome_executable: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level (debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: String,
}

impl TorConfig {
    /// Tor is enabled but no control password was provided
    pub fn control_password_missing(&self) -> bool {
        self.enabled && self.control_password.is_empty()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            app: AppConfig {
                name: get_env_or("APP_NAME", "my-stats"),
                version: get_env_or("APP_VERSION", "1.0.0"),
                environment: get_env_or("APP_ENV", "production"),
            },
            api: ApiServerConfig {
                port: parse_port("API_PORT", "8000")?,
                host: get_env_or("API_HOST", "0.0.0.0"),
            },
            clickhouse: ClickHouseConfig {
                host: get_env_or("CLICKHOUSE_HOST", "v_clickhouse"),
                port: parse_port("CLICKHOUSE_PORT", "8123")?,
                username: get_env_or("CLICKHOUSE_USERNAME", "root"),
                password: get_env_or("CLICKHOUSE_PASSWORD", ""),
                database: get_env_or("CLICKHOUSE_DATABASE", "default"),
                secure: parse_bool("CLICKHOUSE_SECURE", false)?,
            },
            tor: TorConfig {
                enabled: parse_bool("USE_TOR_PROXY", true)?,
                host: get_env_or("TOR_PROXY_HOST", "tor-proxy"),
                port: parse_port("TOR_PROXY_PORT", "9050")?,
                control_port: parse_port("TOR_CONTROL_PORT", "9051")?,
                control_password: get_env_or("TOR_CONTROL_PASSWORD", ""),
                control_timeout: Duration::from_secs(parse_u64("TOR_CONTROL_TIMEOUT", "10")?),
                settle_delay: Duration::from_millis(parse_u64("TOR_SETTLE_MILLIS", "1000")?),
            },
            providers: ProvidersConfig {
                selected: get_env_or("PROXY_PROVIDER", "brightdata"),
                brightdata: vendor_from_env("BRIGHTDATA", "brd.superproxy.io", "22225")?,
                oxylabs: vendor_from_env("OXYLABS", "pr.oxylabs.io", "7777")?,
                smartproxy: vendor_from_env("SMARTPROXY", "gate.smartproxy.com", "7000")?,
                iproyal: vendor_from_env("IPROYAL", "geo.iproyal.com", "12321")?,
                floppydata: vendor_from_env("FLOPPYDATA", "geo.floppydata.com", "10080")?,
                floppydata_country: get_env_or("FLOPPYDATA_COUNTRY", "US"),
                floppydata_city: get_env_or("FLOPPYDATA_CITY", ""),
                floppydata_rotation: get_env_or("FLOPPYDATA_ROTATION", "0"),
            },
            ip_check: IpCheckConfig {
                url: get_env_or("IP_CHECK_URL", "https://httpbin.org/ip"),
                timeout: Duration::from_secs(parse_u64("IP_CHECK_TIMEOUT", "15")?),
            },
            scrape: ScrapeConfig {
                user_agent: get_env_or("SCRAPE_USER_AGENT", DEFAULT_USER_AGENT),
                chrome_executable: env::var("CHROME_EXECUTABLE")
                    .ok()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty()),
            },
            log: LogConfig {
                level: get_env_or("LOG_LEVEL", "info"),
                format: get_env_or("LOG_FORMAT", "json"),
            },
        })
    }

    /// Get the API server address
    pub fn api_addr(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Get the Tor SOCKS endpoint as host:port
    pub fn tor_proxy_addr(&self) -> String {
        format!("{}:{}", self.tor.host, self.tor.port)
    }

    /// Get the ClickHouse HTTP interface base URL
    pub fn clickhouse_url(&self) -> String {
        let scheme = if self.clickhouse.secure { "https" } else { "http" };
        format!(
            "{}://{}:{}/",
            scheme, self.clickhouse.host, self.clickhouse.port
        )
    }
}

fn vendor_from_env(prefix: &str, default_host: &str, default_port: &str) -> Result<VendorConfig> {
    Ok(VendorConfig {
        host: get_env_or(&format!("{}_HOST", prefix), default_host),
        port: parse_port(&format!("{}_PORT", prefix), default_port)?,
        username: get_env_or(&format!("{}_USERNAME", prefix), ""),
        password: get_env_or(&format!("{}_PASSWORD", prefix), ""),
    })
}

fn parse_port(key: &str, default: &str) -> Result<u16> {
    get_env_or(key, default)
        .trim()
        .parse()
        .map_err(|_| ScrapeGateError::InvalidConfig(format!("{} must be a valid port number", key)))
}

fn parse_u64(key: &str, default: &str) -> Result<u64> {
    get_env_or(key, default)
        .trim()
        .parse()
        .map_err(|_| ScrapeGateError::InvalidConfig(format!("{} must be a valid number", key)))
}

fn parse_bool(key: &str, default: bool) -> Result<bool> {
    let Ok(raw) = env::var(key) else {
        return Ok(default);
    };

    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ScrapeGateError::InvalidConfig(format!(
            "{} must be a boolean",
            key
        ))),
    }
}

/// Get environment variable with a default value
fn get_env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

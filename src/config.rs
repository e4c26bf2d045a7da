use serde::Deserialize;

/// Keys that ship in sample configs and must be treated as unset.
const PLACEHOLDER_KEYS: &[&str] = &["YOUR_OPENWEATHERMAP_API_KEY", "YOUR_NEWSAPI_KEY"];

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Base URL and key of a third-party HTTP API. Both are optional at startup;
/// callers check [`ExternalApiConfig::credentials`] before every remote call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalApiConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

impl ExternalApiConfig {
    fn from_env(url_var: &str, key_var: &str) -> Self {
        Self {
            base_url: std::env::var(url_var).ok(),
            api_key: std::env::var(key_var).ok(),
        }
    }

    /// Returns `(base_url, api_key)` when both are present, non-blank and not a placeholder.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let base_url = self.base_url.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
        let api_key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty() && !PLACEHOLDER_KEYS.contains(v))?;
        Some((base_url.trim_end_matches('/'), api_key))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsConfig {
    #[serde(flatten)]
    pub api: ExternalApiConfig,
    pub country: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub news: NewsConfig,
    pub weather: ExternalApiConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "workable".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "workable-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };
        let news = NewsConfig {
            api: ExternalApiConfig::from_env("NEWS_API_BASE_URL", "NEWS_API_KEY"),
            country: std::env::var("NEWS_API_COUNTRY").unwrap_or_else(|_| "us".into()),
        };
        let weather = ExternalApiConfig::from_env("WEATHER_API_BASE_URL", "WEATHER_API_KEY");
        Ok(Self {
            database_url,
            jwt,
            news,
            weather,
        })
    }
}

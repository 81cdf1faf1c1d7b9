use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use ipnet::IpNet;
use picsearch_application::{MAX_WINDOW_SECONDS, RateLimitRule, TrendingLimits};
use picsearch_core::AppError;
use picsearch_infrastructure::OAuthProviderKind;
use tracing_subscriber::EnvFilter;

/// Where sessions are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBackend {
    Postgres,
    Redis,
}

impl SessionBackend {
    fn parse(value: &str) -> Result<Self, AppError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(Self::Postgres),
            "redis" => Ok(Self::Redis),
            other => Err(AppError::Validation(format!(
                "SESSION_BACKEND must be either 'postgres' or 'redis', got '{other}'"
            ))),
        }
    }
}

/// Credentials for one enabled OAuth provider.
#[derive(Debug, Clone)]
pub struct OAuthProviderSettings {
    pub kind: OAuthProviderKind,
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub frontend_url: String,
    pub public_api_url: String,
    pub session_backend: SessionBackend,
    pub redis_url: Option<String>,
    pub cookie_secure: bool,
    pub session_ttl_hours: i64,
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_seconds: i64,
    pub rate_limit_idle_eviction_seconds: i64,
    pub trusted_proxy_cidrs: Vec<IpNet>,
    pub trending_top_k: usize,
    pub trending_max_limit: usize,
    pub store_timeout_ms: u64,
    pub unsplash_access_key: String,
    pub unsplash_api_base_url: String,
    pub oauth_providers: Vec<OAuthProviderSettings>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");
        Self::from_lookup(migrate_only, |name| env::var(name).ok())
    }

    fn from_lookup(
        migrate_only: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let optional = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let required = |name: &str| {
            optional(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))
        };
        let with_default =
            |name: &str, default: &str| optional(name).unwrap_or_else(|| default.to_owned());

        let database_url = required("DATABASE_URL")?;

        let session_backend = SessionBackend::parse(&with_default("SESSION_BACKEND", "postgres"))?;
        let redis_url = optional("REDIS_URL");
        if session_backend == SessionBackend::Redis && redis_url.is_none() {
            return Err(AppError::Validation(
                "REDIS_URL is required when SESSION_BACKEND=redis".to_owned(),
            ));
        }

        let rate_limit_max_requests: u32 =
            parse_positive("RATE_LIMIT_MAX_REQUESTS", optional("RATE_LIMIT_MAX_REQUESTS"), 20)?;
        let rate_limit_window_seconds: i64 = parse_positive(
            "RATE_LIMIT_WINDOW_SECONDS",
            optional("RATE_LIMIT_WINDOW_SECONDS"),
            30,
        )?;
        let rate_limit_idle_eviction_seconds: i64 = parse_positive(
            "RATE_LIMIT_IDLE_EVICTION_SECONDS",
            optional("RATE_LIMIT_IDLE_EVICTION_SECONDS"),
            600,
        )?;
        if rate_limit_idle_eviction_seconds > MAX_WINDOW_SECONDS {
            return Err(AppError::Validation(format!(
                "RATE_LIMIT_IDLE_EVICTION_SECONDS must be at most {MAX_WINDOW_SECONDS}"
            )));
        }

        let trending_top_k: usize =
            parse_positive("TRENDING_TOP_K", optional("TRENDING_TOP_K"), 5)?;
        let trending_max_limit: usize =
            parse_positive("TRENDING_MAX_LIMIT", optional("TRENDING_MAX_LIMIT"), 50)?;
        if trending_top_k > trending_max_limit {
            return Err(AppError::Validation(format!(
                "TRENDING_TOP_K ({trending_top_k}) must not exceed TRENDING_MAX_LIMIT ({trending_max_limit})"
            )));
        }

        let trusted_proxy_cidrs = optional("TRUSTED_PROXY_CIDRS")
            .map(|value| parse_trusted_proxies(&value))
            .transpose()?
            .unwrap_or_default();

        let oauth_providers = [
            (OAuthProviderKind::Google, "GOOGLE"),
            (OAuthProviderKind::GitHub, "GITHUB"),
            (OAuthProviderKind::Facebook, "FACEBOOK"),
        ]
        .into_iter()
        .filter_map(|(kind, prefix)| {
            let client_id = optional(&format!("{prefix}_CLIENT_ID"))?;
            let client_secret = optional(&format!("{prefix}_CLIENT_SECRET"))?;
            Some(OAuthProviderSettings {
                kind,
                client_id,
                client_secret,
            })
        })
        .collect();

        Ok(Self {
            migrate_only,
            database_url,
            api_host: with_default("API_HOST", "127.0.0.1"),
            api_port: parse_positive("API_PORT", optional("API_PORT"), 8080)?,
            frontend_url: with_default("FRONTEND_URL", "http://localhost:5173"),
            public_api_url: with_default("PUBLIC_API_URL", "http://localhost:8080")
                .trim_end_matches('/')
                .to_owned(),
            session_backend,
            redis_url,
            cookie_secure: with_default("SESSION_COOKIE_SECURE", "false")
                .eq_ignore_ascii_case("true"),
            session_ttl_hours: parse_positive("SESSION_TTL_HOURS", optional("SESSION_TTL_HOURS"), 72)?,
            rate_limit_max_requests,
            rate_limit_window_seconds,
            rate_limit_idle_eviction_seconds,
            trusted_proxy_cidrs,
            trending_top_k,
            trending_max_limit,
            store_timeout_ms: parse_positive("STORE_TIMEOUT_MS", optional("STORE_TIMEOUT_MS"), 5000)?,
            // Migrations do not talk to Unsplash.
            unsplash_access_key: if migrate_only {
                optional("UNSPLASH_ACCESS_KEY").unwrap_or_default()
            } else {
                required("UNSPLASH_ACCESS_KEY")?
            },
            unsplash_api_base_url: with_default(
                "UNSPLASH_API_BASE_URL",
                "https://api.unsplash.com",
            ),
            oauth_providers,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }

    pub fn rate_limit_rule(&self) -> Result<RateLimitRule, AppError> {
        RateLimitRule::validated(
            "api",
            self.rate_limit_max_requests,
            self.rate_limit_window_seconds,
        )
    }

    pub fn rate_limit_idle_eviction(&self) -> chrono::Duration {
        chrono::Duration::seconds(
            self.rate_limit_idle_eviction_seconds
                .clamp(1, MAX_WINDOW_SECONDS),
        )
    }

    pub fn trending_limits(&self) -> TrendingLimits {
        TrendingLimits {
            default_limit: self.trending_top_k,
            max_limit: self.trending_max_limit,
        }
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn oauth_redirect_uri(&self, kind: OAuthProviderKind) -> String {
        format!(
            "{}/api/auth/{}/callback",
            self.public_api_url,
            kind.as_str()
        )
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_positive<T>(name: &str, value: Option<String>, default: T) -> Result<T, AppError>
where
    T: FromStr + PartialOrd + Default,
    T::Err: std::fmt::Display,
{
    let Some(value) = value else {
        return Ok(default);
    };

    let parsed = value
        .parse::<T>()
        .map_err(|error| AppError::Validation(format!("invalid {name} '{value}': {error}")))?;
    if parsed <= T::default() {
        return Err(AppError::Validation(format!(
            "{name} must be greater than zero"
        )));
    }

    Ok(parsed)
}

fn parse_trusted_proxies(value: &str) -> Result<Vec<IpNet>, AppError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            // Bare addresses are accepted as single-host networks.
            entry
                .parse::<IpNet>()
                .or_else(|_| entry.parse::<IpAddr>().map(IpNet::from))
                .map_err(|error| {
                    AppError::Validation(format!(
                        "invalid TRUSTED_PROXY_CIDRS entry '{entry}': {error}"
                    ))
                })
        })
        .collect()
}

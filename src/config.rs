use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Cross-origin policy applied to every route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorsMode {
    /// Any origin, the usual verbs, `Content-Type` and `Authorization`.
    Permissive,
    /// tower-http's default layer, which grants nothing cross-origin.
    Default,
}

impl CorsMode {
    fn parse(raw: &str) -> anyhow::Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "permissive" | "" => Ok(CorsMode::Permissive),
            "default" => Ok(CorsMode::Default),
            other => anyhow::bail!("unknown CORS_MODE {other:?}"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    pub otp_ttl_minutes: i64,
    pub cors: CorsMode,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "momfood".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "momfood-users".into()),
            ttl_minutes: env_parse("JWT_TTL_MINUTES", 60 * 24),
        };
        let cors = match std::env::var("CORS_MODE") {
            Ok(v) => CorsMode::parse(&v)?,
            Err(_) => CorsMode::Permissive,
        };
        Ok(Self {
            database_url,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", 10),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_parse("PORT", 10000),
            jwt,
            otp_ttl_minutes: env_parse("OTP_TTL_MINUTES", 10),
            cors,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

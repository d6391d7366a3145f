use serde::Deserialize;

/// Token signing settings. No Debug derive: the secret must never end up
/// in a log line.
#[derive(Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub expires_days: i64,
}

#[derive(Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    /// Mark the session cookie `Secure` (true outside local development).
    pub cookie_secure: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            expires_days: std::env::var("JWT_EXPIRES_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(1),
        };
        let cookie_secure = std::env::var("APP_ENV")
            .map(|v| v == "production")
            .unwrap_or(false);
        Ok(Self {
            database_url,
            jwt,
            cookie_secure,
        })
    }
}

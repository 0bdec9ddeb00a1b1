use anyhow::Context;
use serde::Deserialize;
use std::env;

const DEV_JWT_SECRET: &str = "bookstore-development-secret-do-not-use-in-production";
const MIN_SECRET_LEN: usize = 32;
const MAX_JWT_EXPIRATION_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_port: String,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_expiration_secs: u64,
    pub smtp: Option<SmtpConfig>,
}

/// Outbound mail relay. Present only when `SMTP_HOST` is set.
#[derive(Debug, Deserialize, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
    pub tls: SmtpTls,
}

/// How the SMTP connection is secured.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum SmtpTls {
    /// Plain text throughout, for local relays.
    None,
    /// Plain greeting upgraded with STARTTLS (submission, port 587).
    StartTls,
    /// TLS from the first byte (SMTPS, port 465).
    Implicit,
}

impl SmtpTls {
    /// `SMTP_TLS` wins when set. Otherwise `SMTP_USE_TLS=false` means `None`
    /// and the port picks between implicit TLS (465) and STARTTLS.
    fn resolve(mode: Option<&str>, use_tls: Option<&str>, port: u16) -> anyhow::Result<Self> {
        if let Some(mode) = mode {
            return match mode.trim().to_ascii_lowercase().as_str() {
                "none" | "off" | "plain" => Ok(SmtpTls::None),
                "starttls" => Ok(SmtpTls::StartTls),
                "implicit" | "smtps" | "tls" => Ok(SmtpTls::Implicit),
                other => anyhow::bail!("invalid SMTP_TLS: {other}"),
            };
        }
        if matches!(use_tls, Some(v) if v != "true" && v != "1") {
            return Ok(SmtpTls::None);
        }
        Ok(if port == 465 {
            SmtpTls::Implicit
        } else {
            SmtpTls::StartTls
        })
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_port = lookup("SERVER_PORT").unwrap_or_else(|| "3000".into());
        let database_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());

        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) => secret,
            None => {
                tracing::warn!("JWT_SECRET not set; using the development secret");
                DEV_JWT_SECRET.to_string()
            }
        };
        if jwt_secret.len() < MIN_SECRET_LEN {
            anyhow::bail!("JWT_SECRET must be at least {MIN_SECRET_LEN} bytes");
        }

        let jwt_expiration_secs = match lookup("JWT_EXPIRATION_SECS") {
            Some(v) => v
                .parse()
                .with_context(|| format!("invalid JWT_EXPIRATION_SECS: {v}"))?,
            None => 3600,
        };
        if jwt_expiration_secs == 0 || jwt_expiration_secs > MAX_JWT_EXPIRATION_SECS {
            anyhow::bail!("JWT_EXPIRATION_SECS must be between 1 and {MAX_JWT_EXPIRATION_SECS}");
        }

        let smtp = match lookup("SMTP_HOST") {
            Some(host) => {
                let port = match lookup("SMTP_PORT") {
                    Some(v) => v.parse().with_context(|| format!("invalid SMTP_PORT: {v}"))?,
                    None => 587,
                };
                let tls = SmtpTls::resolve(
                    lookup("SMTP_TLS").as_deref(),
                    lookup("SMTP_USE_TLS").as_deref(),
                    port,
                )?;
                Some(SmtpConfig {
                    host,
                    port,
                    username: lookup("SMTP_USERNAME"),
                    password: lookup("SMTP_PASSWORD"),
                    from: lookup("SMTP_FROM").unwrap_or_else(|| "noreply@bookstore.local".into()),
                    tls,
                })
            }
            None => None,
        };

        Ok(Self {
            server_port,
            database_url,
            jwt_secret,
            jwt_expiration_secs,
            smtp,
        })
    }
}

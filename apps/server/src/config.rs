use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::Context;
use bookloop_core::constants::{
    DEFAULT_APP_BASE_URL, DEFAULT_FOLLOW_UP_COOLDOWN_SECS, DEFAULT_FOLLOW_UP_DELAY_SECS,
    DEFAULT_FOLLOW_UP_INTERVAL_SECS, DEFAULT_NOTIFICATION_TIMEOUT_SECS, MAX_FOLLOW_UP_WINDOW_SECS,
};

use crate::auth::{decode_secret_key, AuthConfig};

const DEFAULT_TOKEN_TTL_SECS: u64 = 60 * 60;
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_MAIL_FROM: &str = "Bookloop <no-reply@bookloop.local>";

#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub app_base_url: String,
    pub follow_up_delay_secs: i64,
    pub follow_up_cooldown_secs: i64,
    pub follow_up_interval: Duration,
    pub scheduler_enabled: bool,
    pub cron_secret: Option<String>,
    pub auth: Option<AuthConfig>,
    pub smtp: Option<SmtpConfig>,
    pub notification_timeout: Duration,
}

fn var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("Invalid {key}: '{raw}'")),
        None => Ok(default),
    }
}

fn check_follow_up_window(key: &str, secs: i64) -> anyhow::Result<()> {
    if !(0..=MAX_FOLLOW_UP_WINDOW_SECS).contains(&secs) {
        anyhow::bail!(
            "{} must be between 0 and {} seconds, got {}",
            key,
            MAX_FOLLOW_UP_WINDOW_SECS,
            secs
        );
    }
    Ok(())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = parse_var(
            "BL_LISTEN_ADDR",
            SocketAddr::from(([0, 0, 0, 0], 8080)),
        )?;
        let db_path = var("BL_DB_PATH").unwrap_or_else(|| "./db/app.db".into());
        let cors_allow = var("BL_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = parse_var("BL_REQUEST_TIMEOUT_MS", 30_000)?;

        let follow_up_delay_secs = parse_var("BL_FOLLOW_UP_DELAY_SECS", DEFAULT_FOLLOW_UP_DELAY_SECS)?;
        let follow_up_cooldown_secs =
            parse_var("BL_FOLLOW_UP_COOLDOWN_SECS", DEFAULT_FOLLOW_UP_COOLDOWN_SECS)?;
        check_follow_up_window("BL_FOLLOW_UP_DELAY_SECS", follow_up_delay_secs)?;
        check_follow_up_window("BL_FOLLOW_UP_COOLDOWN_SECS", follow_up_cooldown_secs)?;
        let interval_secs: u64 =
            parse_var("BL_FOLLOW_UP_INTERVAL_SECS", DEFAULT_FOLLOW_UP_INTERVAL_SECS)?;
        if interval_secs == 0 {
            anyhow::bail!("BL_FOLLOW_UP_INTERVAL_SECS must be at least 1");
        }

        let auth = match (var("BL_AUTH_PASSWORD_HASH"), var("BL_SECRET_KEY")) {
            (Some(password_hash), Some(secret)) => Some(AuthConfig {
                password_hash,
                jwt_secret: decode_secret_key(&secret)?,
                access_token_ttl: Duration::from_secs(DEFAULT_TOKEN_TTL_SECS),
            }),
            (None, None) => None,
            _ => anyhow::bail!("BL_AUTH_PASSWORD_HASH and BL_SECRET_KEY must be set together"),
        };

        let smtp = match var("BL_SMTP_HOST") {
            Some(host) => Some(SmtpConfig {
                host,
                port: parse_var("BL_SMTP_PORT", DEFAULT_SMTP_PORT)?,
                username: var("BL_SMTP_USERNAME"),
                password: var("BL_SMTP_PASSWORD"),
                from: var("BL_MAIL_FROM").unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string()),
            }),
            None => None,
        };

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            app_base_url: var("BL_APP_BASE_URL").unwrap_or_else(|| DEFAULT_APP_BASE_URL.into()),
            follow_up_delay_secs,
            follow_up_cooldown_secs,
            follow_up_interval: Duration::from_secs(interval_secs),
            scheduler_enabled: parse_var("BL_SCHEDULER_ENABLED", true)?,
            cron_secret: var("BL_CRON_SECRET"),
            auth,
            smtp,
            notification_timeout: Duration::from_secs(parse_var(
                "BL_NOTIFICATION_TIMEOUT_SECS",
                DEFAULT_NOTIFICATION_TIMEOUT_SECS,
            )?),
        })
    }
}

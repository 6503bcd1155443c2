use std::env;
use std::time::Duration;

const DEV_SESSION_SECRET: &str = "dev-session-secret-change-me";

/// Accepted range for `SESSION_TTL_DAYS`.
pub const SESSION_TTL_DAYS_RANGE: std::ops::RangeInclusive<i64> = 1..=3650;

/// Most bytes one character can take inside a JSON string (`\uD83D\uDE00`).
const MAX_JSON_BYTES_PER_CHAR: usize = 12;

/// Runtime configuration, read once at startup from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub limits: DocumentLimits,
    pub session: SessionSettings,
    pub asciidoc: AsciiDocSettings,
    pub google_client_id: Option<String>,
    pub cors_allowed_origins: Vec<String>,
}

/// Input size limits, counted in characters.
#[derive(Debug, Clone, Copy)]
pub struct DocumentLimits {
    pub max_source_text_size: usize,
    pub max_title_size: usize,
}

impl DocumentLimits {
    /// Byte limit for JSON bodies: text and title with every character
    /// `\u`-escaped, plus room for the other fields.
    pub fn json_payload_limit(&self) -> usize {
        self.max_source_text_size
            .saturating_add(self.max_title_size)
            .saturating_mul(MAX_JSON_BYTES_PER_CHAR)
            .saturating_add(64 * 1024)
    }
}

impl Default for DocumentLimits {
    fn default() -> Self {
        Self {
            max_source_text_size: 1024 * 1024,
            max_title_size: 256,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub secret: String,
    pub ttl_days: i64,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone)]
pub struct AsciiDocSettings {
    pub command: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl Default for AsciiDocSettings {
    fn default() -> Self {
        Self {
            command: "asciidoc".to_string(),
            args: split_args("--backend html5 --no-header-footer --out-file - -"),
            timeout: Duration::from_secs(30),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from any key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or("DATABASE_URL must be set")?;

        let port = parse_or(&lookup, "PORT", 3002u16)?;

        let defaults = DocumentLimits::default();
        let limits = DocumentLimits {
            max_source_text_size: parse_or(&lookup, "MAX_SOURCE_TEXT_SIZE", defaults.max_source_text_size)?,
            max_title_size: parse_or(&lookup, "MAX_TITLE_SIZE", defaults.max_title_size)?,
        };

        let secret = match lookup("SESSION_SECRET") {
            Some(secret) if !secret.is_empty() => secret,
            _ => {
                log::warn!("⚠️  SESSION_SECRET not set, using development secret");
                DEV_SESSION_SECRET.to_string()
            }
        };

        let ttl_days = parse_or(&lookup, "SESSION_TTL_DAYS", 30i64)?;
        if !SESSION_TTL_DAYS_RANGE.contains(&ttl_days) {
            return Err(format!(
                "SESSION_TTL_DAYS must be between {} and {}, got {}",
                SESSION_TTL_DAYS_RANGE.start(),
                SESSION_TTL_DAYS_RANGE.end(),
                ttl_days
            ));
        }

        let session = SessionSettings {
            secret,
            ttl_days,
            cookie_secure: parse_or(&lookup, "SESSION_COOKIE_SECURE", false)?,
        };

        let asciidoc_defaults = AsciiDocSettings::default();
        let asciidoc = AsciiDocSettings {
            command: lookup("ASCIIDOC_COMMAND").unwrap_or(asciidoc_defaults.command),
            args: lookup("ASCIIDOC_ARGS")
                .map(|args| split_args(&args))
                .unwrap_or(asciidoc_defaults.args),
            timeout: Duration::from_secs(parse_or(
                &lookup,
                "ASCIIDOC_TIMEOUT_SECS",
                asciidoc_defaults.timeout.as_secs(),
            )?),
        };

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Settings {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            database_url,
            limits,
            session,
            asciidoc,
            google_client_id: lookup("GOOGLE_CLIENT_ID").filter(|id| !id.is_empty()),
            cors_allowed_origins,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, String>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| format!("{} has an invalid value: {}", key, raw)),
        None => Ok(default),
    }
}

fn split_args(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(String::from).collect()
}

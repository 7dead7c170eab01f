use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};

#[derive(Clone, Debug, PartialEq)]
pub enum LeaveSourceConfig {
    /// Read `leave_records` straight from the HR database
    Database { database_url: String },
    /// Call the leave REST API
    Remote(LeaveApiConfig),
}

#[derive(Clone, Debug, PartialEq)]
pub struct LeaveApiConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

#[derive(Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub server_addr: String,

    // Rate limiting
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    pub leave_source: LeaveSourceConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).ok_or_else(|| anyhow!("{key} must be set"));

        let leave_source = match lookup("LEAVE_SOURCE").as_deref().unwrap_or("database") {
            "database" => LeaveSourceConfig::Database {
                database_url: required("DATABASE_URL")?,
            },
            "remote" => LeaveSourceConfig::Remote(LeaveApiConfig {
                base_url: required("LEAVE_API_URL")?,
                timeout: Duration::from_secs(parse_or(&lookup, "LEAVE_API_TIMEOUT_SECS", 10)?),
                max_retries: parse_or(&lookup, "LEAVE_API_MAX_RETRIES", 2)?,
                access_token: lookup("LEAVE_API_ACCESS_TOKEN"),
                refresh_token: lookup("LEAVE_API_REFRESH_TOKEN"),
            }),
            other => bail!("LEAVE_SOURCE must be 'database' or 'remote', got '{other}'"),
        };

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            jwt_secret: required("JWT_SECRET")?,
            rate_protected_per_min: parse_or(&lookup, "RATE_PROTECTED_PER_MIN", 1000)?,
            api_prefix: lookup("API_PREFIX").unwrap_or_else(|| "/api".to_string()),
            leave_source,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const BASE: [(&str, &str); 2] = [("SERVER_ADDR", "127.0.0.1:8080"), ("JWT_SECRET", "s3cret")];

    #[test]
    fn database_source_is_the_default() {
        let mut pairs = BASE.to_vec();
        pairs.push(("DATABASE_URL", "mysql://hr@localhost/hrm"));

        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(config.rate_protected_per_min, 1000);
        assert_eq!(
            config.leave_source,
            LeaveSourceConfig::Database {
                database_url: "mysql://hr@localhost/hrm".into()
            }
        );
    }

    #[test]
    fn remote_source_reads_client_settings() {
        let mut pairs = BASE.to_vec();
        pairs.extend([
            ("LEAVE_SOURCE", "remote"),
            ("LEAVE_API_URL", "https://crm.example.com/api"),
            ("LEAVE_API_TIMEOUT_SECS", "3"),
            ("LEAVE_API_REFRESH_TOKEN", "r1"),
        ]);

        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        let LeaveSourceConfig::Remote(api) = config.leave_source else {
            panic!("expected remote leave source");
        };
        assert_eq!(api.timeout, Duration::from_secs(3));
        assert_eq!(api.max_retries, 2);
        assert_eq!(api.access_token, None);
        assert_eq!(api.refresh_token.as_deref(), Some("r1"));
    }

    #[test]
    fn reports_missing_and_malformed_values() {
        let err = Config::from_lookup(lookup_from(&BASE)).err().unwrap();
        assert!(err.to_string().contains("DATABASE_URL"));

        let mut pairs = BASE.to_vec();
        pairs.extend([("DATABASE_URL", "mysql://x"), ("RATE_PROTECTED_PER_MIN", "lots")]);
        let err = Config::from_lookup(lookup_from(&pairs)).err().unwrap();
        assert!(err.to_string().contains("RATE_PROTECTED_PER_MIN"));

        let mut pairs = BASE.to_vec();
        pairs.push(("LEAVE_SOURCE", "ldap"));
        assert!(Config::from_lookup(lookup_from(&pairs)).is_err());
    }
}

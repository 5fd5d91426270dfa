use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Which storage backend the relay persists to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Memory,
    Postgres,
    Redis,
}

impl FromStr for BackendKind {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "memory" => Ok(BackendKind::Memory),
            "postgres" | "sql" => Ok(BackendKind::Postgres),
            "redis" | "kv" => Ok(BackendKind::Redis),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub db_model: BackendKind,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub notify_env: String,
    pub api_bind: String,
    pub web_server: Option<String>,
    pub api_server: Option<String>,
    pub vapid_public_key: String,
    pub vapid_private_key: String,
    pub vapid_subject: String,
    pub dispatch_concurrency: usize,
    pub push_timeout: Duration,
    pub push_ttl_secs: u32,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let db_model = match var("NOTIFY_DB_MODEL") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "NOTIFY_DB_MODEL",
                value,
            })?,
            None => BackendKind::Memory,
        };
        let database_url = var("DATABASE_URL").or_else(|| var("NOTIFY_DATABASE_URL"));
        let redis_url = var("REDIS_URL").or_else(|| var("NOTIFY_REDIS_URL"));

        match db_model {
            BackendKind::Postgres if database_url.is_none() => {
                return Err(ConfigError::Missing("DATABASE_URL"))
            }
            BackendKind::Redis if redis_url.is_none() => {
                return Err(ConfigError::Missing("REDIS_URL"))
            }
            _ => {}
        }

        let notify_env = var("NOTIFY_ENV").unwrap_or_else(|| "dev".to_string());
        let api_bind = var("NOTIFY_API_BIND").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let web_server = var("NOTIFY_WEB_SERVER").map(|v| v.trim_end_matches('/').to_string());
        let api_server = var("NOTIFY_API_SERVER").map(|v| v.trim_end_matches('/').to_string());
        let vapid_public_key = var("VAPID_PUBKEY").ok_or(ConfigError::Missing("VAPID_PUBKEY"))?;
        let vapid_private_key =
            var("VAPID_PRIVKEY").ok_or(ConfigError::Missing("VAPID_PRIVKEY"))?;
        let vapid_subject =
            var("NOTIFY_VAPID_SUBJECT").unwrap_or_else(|| "mailto:admin@localhost".to_string());
        let dispatch_concurrency =
            parse_or(var("NOTIFY_DISPATCH_CONCURRENCY"), "NOTIFY_DISPATCH_CONCURRENCY", 32)?;
        let push_timeout_secs: u64 =
            parse_or(var("NOTIFY_PUSH_TIMEOUT_SECS"), "NOTIFY_PUSH_TIMEOUT_SECS", 10)?;
        let push_ttl_secs = parse_or(var("NOTIFY_PUSH_TTL_SECS"), "NOTIFY_PUSH_TTL_SECS", 86_400)?;

        if dispatch_concurrency == 0 {
            return Err(ConfigError::Invalid {
                name: "NOTIFY_DISPATCH_CONCURRENCY",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            db_model,
            database_url,
            redis_url,
            notify_env,
            api_bind,
            web_server,
            api_server,
            vapid_public_key,
            vapid_private_key,
            vapid_subject,
            dispatch_concurrency,
            push_timeout: Duration::from_secs(push_timeout_secs),
            push_ttl_secs,
        })
    }
}

fn parse_or<T: FromStr>(
    value: Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|name| map.get(name).cloned())
    }

    const VAPID: [(&str, &str); 2] = [("VAPID_PUBKEY", "pub"), ("VAPID_PRIVKEY", "priv")];

    #[test]
    fn test_defaults() {
        let s = settings(&VAPID).unwrap();
        assert_eq!(s.db_model, BackendKind::Memory);
        assert_eq!(s.notify_env, "dev");
        assert_eq!(s.api_bind, "0.0.0.0:3000");
        assert_eq!(s.dispatch_concurrency, 32);
        assert_eq!(s.push_timeout, Duration::from_secs(10));
        assert_eq!(s.push_ttl_secs, 86_400);
        assert_eq!(s.vapid_subject, "mailto:admin@localhost");
        assert!(s.web_server.is_none());
    }

    #[test]
    fn test_vapid_keys_required() {
        assert_eq!(
            settings(&[("VAPID_PRIVKEY", "priv")]).unwrap_err(),
            ConfigError::Missing("VAPID_PUBKEY")
        );
        assert_eq!(
            settings(&[("VAPID_PUBKEY", "pub")]).unwrap_err(),
            ConfigError::Missing("VAPID_PRIVKEY")
        );
    }

    #[test]
    fn test_backend_aliases() {
        assert_eq!("sql".parse::<BackendKind>(), Ok(BackendKind::Postgres));
        assert_eq!("Postgres".parse::<BackendKind>(), Ok(BackendKind::Postgres));
        assert_eq!("kv".parse::<BackendKind>(), Ok(BackendKind::Redis));
        assert!("boto".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_postgres_requires_database_url() {
        let mut vars = VAPID.to_vec();
        vars.push(("NOTIFY_DB_MODEL", "postgres"));
        assert_eq!(
            settings(&vars).unwrap_err(),
            ConfigError::Missing("DATABASE_URL")
        );

        vars.push(("NOTIFY_DATABASE_URL", "postgres://localhost/notify"));
        let s = settings(&vars).unwrap();
        assert_eq!(s.db_model, BackendKind::Postgres);
        assert_eq!(s.database_url.as_deref(), Some("postgres://localhost/notify"));
    }

    #[test]
    fn test_redis_requires_redis_url() {
        let mut vars = VAPID.to_vec();
        vars.push(("NOTIFY_DB_MODEL", "redis"));
        assert_eq!(settings(&vars).unwrap_err(), ConfigError::Missing("REDIS_URL"));
    }

    #[test]
    fn test_unknown_backend_is_invalid() {
        let mut vars = VAPID.to_vec();
        vars.push(("NOTIFY_DB_MODEL", "dynamo"));
        assert!(matches!(
            settings(&vars).unwrap_err(),
            ConfigError::Invalid { name: "NOTIFY_DB_MODEL", .. }
        ));
    }

    #[test]
    fn test_numeric_overrides_and_errors() {
        let mut vars = VAPID.to_vec();
        vars.push(("NOTIFY_DISPATCH_CONCURRENCY", "4"));
        vars.push(("NOTIFY_PUSH_TIMEOUT_SECS", "3"));
        let s = settings(&vars).unwrap();
        assert_eq!(s.dispatch_concurrency, 4);
        assert_eq!(s.push_timeout, Duration::from_secs(3));

        let mut bad = VAPID.to_vec();
        bad.push(("NOTIFY_PUSH_TIMEOUT_SECS", "soon"));
        assert!(matches!(
            settings(&bad).unwrap_err(),
            ConfigError::Invalid { name: "NOTIFY_PUSH_TIMEOUT_SECS", .. }
        ));

        let mut zero = VAPID.to_vec();
        zero.push(("NOTIFY_DISPATCH_CONCURRENCY", "0"));
        assert!(settings(&zero).is_err());
    }

    #[test]
    fn test_server_bases_drop_trailing_slash() {
        let mut vars = VAPID.to_vec();
        vars.push(("NOTIFY_WEB_SERVER", "https://notify.example/"));
        vars.push(("NOTIFY_API_SERVER", "https://api.notify.example"));
        let s = settings(&vars).unwrap();
        assert_eq!(s.web_server.as_deref(), Some("https://notify.example"));
        assert_eq!(s.api_server.as_deref(), Some("https://api.notify.example"));
    }
}

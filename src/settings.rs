//! Runtime settings from the environment (`.env` honored via dotenvy).

use crate::error::ConfigError;
use crate::service::Paging;
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// `DATABASE_URL`, default `postgres://localhost/crud`.
    pub database_url: String,
    /// `BIND_ADDR`, default `0.0.0.0:3000`.
    pub bind_addr: String,
    /// `DB_MAX_CONNECTIONS`, default 5.
    pub max_connections: u32,
    /// `CRUD_DEFAULT_PAGE_SIZE` / `CRUD_MAX_PAGE_SIZE`, default 20 / 1000.
    pub paging: Paging,
    /// `CRUD_BODY_LIMIT` in bytes, default 1 MiB.
    pub body_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database_url: "postgres://localhost/crud".into(),
            bind_addr: "0.0.0.0:3000".into(),
            max_connections: 5,
            paging: Paging::default(),
            body_limit: 1024 * 1024,
        }
    }
}

impl Settings {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Settings, ConfigError> {
        dotenvy::dotenv().ok();
        Settings::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Settings, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();
        let settings = Settings {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            max_connections: parse(&lookup, "DB_MAX_CONNECTIONS", defaults.max_connections)?,
            paging: Paging {
                default_page_size: parse(&lookup, "CRUD_DEFAULT_PAGE_SIZE", defaults.paging.default_page_size)?,
                max_page_size: parse(&lookup, "CRUD_MAX_PAGE_SIZE", defaults.paging.max_page_size)?,
            },
            body_limit: parse(&lookup, "CRUD_BODY_LIMIT", defaults.body_limit)?,
        };
        if settings.paging.default_page_size == 0 || settings.paging.default_page_size > settings.paging.max_page_size {
            return Err(ConfigError::Invalid {
                key: "CRUD_DEFAULT_PAGE_SIZE",
                value: settings.paging.default_page_size.to_string(),
            });
        }
        Ok(settings)
    }
}

fn parse<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(from_pairs(&[]).unwrap(), Settings::default());
    }

    #[test]
    fn test_overrides() {
        let s = from_pairs(&[
            ("DATABASE_URL", "postgres://db/app"),
            ("CRUD_DEFAULT_PAGE_SIZE", "50"),
            ("CRUD_MAX_PAGE_SIZE", "200"),
            ("CRUD_BODY_LIMIT", " 2048 "),
        ])
        .unwrap();
        assert_eq!(s.database_url, "postgres://db/app");
        assert_eq!(s.paging, Paging { default_page_size: 50, max_page_size: 200 });
        assert_eq!(s.body_limit, 2048);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            from_pairs(&[("DB_MAX_CONNECTIONS", "many")]),
            Err(ConfigError::Invalid { key: "DB_MAX_CONNECTIONS", .. })
        ));
        assert!(from_pairs(&[("CRUD_DEFAULT_PAGE_SIZE", "0")]).is_err());
        assert!(from_pairs(&[("CRUD_DEFAULT_PAGE_SIZE", "30"), ("CRUD_MAX_PAGE_SIZE", "10")]).is_err());
    }
}

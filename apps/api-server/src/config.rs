//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use folio_core::domain::{Category, User};
use folio_core::services::PostServiceConfig;
use uuid::Uuid;
use folio_infra::JwtConfig;
use folio_infra::database::DatabaseConfig;
use folio_infra::jobs::InMemoryJobQueueConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    /// Directory for cover images; in-memory storage when unset.
    pub upload_dir: Option<PathBuf>,
    pub posts_per_page: u64,
    pub post_service: PostServiceConfig,
    pub jobs: InMemoryJobQueueConfig,
    pub jwt: JwtConfig,
    /// Loaded into the in-memory repositories when no database is configured.
    pub seed: SeedConfig,
}

/// Authors and categories known from the start in in-memory mode.
#[derive(Debug, Clone, Default)]
pub struct SeedConfig {
    pub authors: Vec<User>,
    pub categories: Vec<Category>,
}

impl SeedConfig {
    /// Reads `SEED_AUTHORS` (`<uuid>:<name>:<email>`, comma separated) and
    /// `SEED_CATEGORIES` (`<name>` or `<uuid>:<name>`, comma separated).
    pub fn from_env() -> Self {
        Self {
            authors: env::var("SEED_AUTHORS")
                .map(|v| parse_authors(&v))
                .unwrap_or_default(),
            categories: env::var("SEED_CATEGORIES")
                .map(|v| parse_categories(&v))
                .unwrap_or_default(),
        }
    }
}

fn entries(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|e| !e.is_empty())
}

fn parse_authors(list: &str) -> Vec<User> {
    entries(list)
        .filter_map(|entry| {
            let mut parts = entry.splitn(3, ':').map(str::trim);
            let id = parts.next().and_then(|id| Uuid::parse_str(id).ok());
            match (id, parts.next(), parts.next()) {
                (Some(id), Some(name), Some(email)) if !name.is_empty() => Some(User {
                    id,
                    ..User::new(name, email)
                }),
                _ => {
                    tracing::warn!(%entry, "Ignoring malformed SEED_AUTHORS entry");
                    None
                }
            }
        })
        .collect()
}

fn parse_categories(list: &str) -> Vec<Category> {
    entries(list)
        .map(|entry| match entry.split_once(':') {
            Some((id, name)) => match Uuid::parse_str(id.trim()) {
                Ok(id) => Category {
                    id,
                    ..Category::new(name.trim())
                },
                Err(_) => Category::new(entry),
            },
            None => Category::new(entry),
        })
        .collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database: None,
            upload_dir: None,
            posts_per_page: 10,
            post_service: PostServiceConfig::default(),
            jobs: InMemoryJobQueueConfig::default(),
            jwt: JwtConfig::default(),
            seed: SeedConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let database = env::var("DATABASE_URL").ok().map(|url| {
            let mut config = DatabaseConfig::new(url);
            if let Some(max) = parse_var("DB_MAX_CONNECTIONS") {
                config.max_connections = max;
            }
            if let Some(min) = parse_var("DB_MIN_CONNECTIONS") {
                config.min_connections = min;
            }
            config
        });

        let post_service = match env::var("POST_READ_PATH") {
            Ok(read_path) => PostServiceConfig { read_path },
            Err(_) => defaults.post_service,
        };

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT").unwrap_or(defaults.port),
            database,
            upload_dir: env::var("UPLOAD_DIR").ok().map(PathBuf::from),
            posts_per_page: parse_var("POSTS_PER_PAGE")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.posts_per_page),
            post_service,
            jobs: InMemoryJobQueueConfig::from_env(),
            jwt: JwtConfig::from_env(),
            seed: SeedConfig::from_env(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_authors_skips_malformed() {
        let id = Uuid::new_v4();
        let list = format!("{id}:Ada:ada@example.com, not-a-uuid:Bob:bob@example.com,,{id}:Eve");

        let authors = parse_authors(&list);

        assert_eq!(authors.len(), 1);
        assert_eq!(authors[0].id, id);
        assert_eq!(authors[0].name, "Ada");
        assert_eq!(authors[0].email, "ada@example.com");
    }

    #[test]
    fn test_parse_categories_with_and_without_id() {
        let id = Uuid::new_v4();

        let categories = parse_categories(&format!("Rust, {id}:Databases"));

        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name, "Rust");
        assert_eq!(categories[1].id, id);
        assert_eq!(categories[1].name, "Databases");
    }
}

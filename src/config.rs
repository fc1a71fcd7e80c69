use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub max_upload_size: usize,
    pub dashboard_sample_limit: i64,
    pub cookie_secure: bool,
    pub log_level: String,
    pub storage: StorageConfig,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub bucket: String,
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StorageBackend {
    /// Files written under `dir`, served by the app at `/media`.
    Local { dir: PathBuf },
    /// Supabase-storage compatible REST API.
    Remote { url: String, key: String },
}

#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let jwt_secret = env_required("JWT_SECRET")?;

        let host: IpAddr = env_or("STOCKROOM_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid STOCKROOM_HOST: {e}"))?;

        let port: u16 = env_or("STOCKROOM_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid STOCKROOM_PORT: {e}"))?;

        let base_url = env_or("STOCKROOM_BASE_URL", &format!("http://{host}:{port}"));

        let max_upload_size: usize = env_or("STOCKROOM_MAX_UPLOAD_SIZE", "5242880")
            .parse()
            .map_err(|e| format!("Invalid STOCKROOM_MAX_UPLOAD_SIZE: {e}"))?;

        let dashboard_sample_limit: i64 = env_or("STOCKROOM_DASHBOARD_SAMPLE", "1000")
            .parse()
            .map_err(|e| format!("Invalid STOCKROOM_DASHBOARD_SAMPLE: {e}"))?;

        let cookie_secure = parse_bool("STOCKROOM_COOKIE_SECURE", &env_or("STOCKROOM_COOKIE_SECURE", "true"))?;

        let log_level = env_or("STOCKROOM_LOG_LEVEL", "info");

        let bucket = env_or("STOCKROOM_STORAGE_BUCKET", "products");
        let backend = match env_or("STOCKROOM_STORAGE", "local").as_str() {
            "local" => StorageBackend::Local {
                dir: PathBuf::from(env_or("STOCKROOM_STORAGE_DIR", "./media")),
            },
            "remote" => StorageBackend::Remote {
                url: env_required("STOCKROOM_STORAGE_URL")?
                    .trim_end_matches('/')
                    .to_string(),
                key: env_required("STOCKROOM_STORAGE_KEY")?,
            },
            other => return Err(format!("Invalid STOCKROOM_STORAGE: {other}")),
        };

        let bootstrap_admin = match (
            std::env::var("STOCKROOM_ADMIN_EMAIL").ok(),
            std::env::var("STOCKROOM_ADMIN_PASSWORD").ok(),
        ) {
            (Some(email), Some(password)) => Some(BootstrapAdmin {
                email,
                password,
                name: env_or("STOCKROOM_ADMIN_NAME", "Administrator"),
            }),
            _ => None,
        };

        Ok(Config {
            database_url,
            jwt_secret,
            host,
            port,
            base_url,
            max_upload_size,
            dashboard_sample_limit,
            cookie_secure,
            log_level,
            storage: StorageConfig { bucket, backend },
            bootstrap_admin,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("Invalid {key}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert_eq!(parse_bool("X", "true"), Ok(true));
        assert_eq!(parse_bool("X", "ON"), Ok(true));
        assert_eq!(parse_bool("X", "0"), Ok(false));
        assert_eq!(parse_bool("X", "no"), Ok(false));
    }

    #[test]
    fn parse_bool_names_the_variable_on_error() {
        let err = parse_bool("STOCKROOM_COOKIE_SECURE", "maybe").unwrap_err();
        assert!(err.contains("STOCKROOM_COOKIE_SECURE"));
    }

    #[test]
    fn env_or_falls_back_to_default() {
        assert_eq!(env_or("STOCKROOM_TEST_SURELY_UNSET_VAR", "fallback"), "fallback");
    }

    #[test]
    fn env_required_reports_missing_key() {
        let err = env_required("STOCKROOM_TEST_SURELY_UNSET_VAR").unwrap_err();
        assert!(err.contains("STOCKROOM_TEST_SURELY_UNSET_VAR"));
    }
}

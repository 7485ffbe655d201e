pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_POOL_SIZE: usize = 10;
pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";

#[derive(Clone, Debug, PartialEq)]
pub enum Env {
    Dev,
    Staging,
    Production,
}

impl Env {
    pub fn from_env() -> Self {
        match var("ENVIRONMENT") {
            Ok(Some(env)) => match env.as_str() {
                "dev" => Env::Dev,
                "staging" => Env::Staging,
                "production" => Env::Production,
                _ => Env::Dev,
            },
            _ => Env::Dev,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: usize,
}

#[derive(Clone, Debug)]
pub struct StripeConfig {
    pub secret_key: String,
    pub api_base: String,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub env: Env,
    pub port: u16,
    pub storage: StorageBackend,
    pub database: Option<DatabaseConfig>,
    pub stripe: Option<StripeConfig>,
    pub cors_allowed_origins: Option<Vec<String>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            env: Env::Dev,
            port: DEFAULT_PORT,
            storage: StorageBackend::Memory,
            database: None,
            stripe: None,
            cors_allowed_origins: None,
        }
    }
}

fn var(key: &str) -> Result<Option<String>, String> {
    match std::env::var(key) {
        Ok(env) => Ok(Some(env)),
        Err(e) => match e {
            std::env::VarError::NotPresent => Ok(None),
            std::env::VarError::NotUnicode(_) => Err(format!(
                "Could not get the environment variable `{key}` due to unicode error"
            )),
        },
    }
}

fn required_var(key: &str) -> String {
    let val = var(key);
    match val {
        Ok(val) => match val {
            Some(val) => val,
            None => {
                tracing::error!("Environment variable `{key}` is required");
                std::process::exit(1)
            }
        },
        Err(e) => {
            tracing::error!(
                "Environment variable `{key}` is required, but could not retrieve: {e}"
            );
            std::process::exit(1)
        }
    }
}

/// Either all or none variables are set
fn all_or_none_vars(keys: Vec<&str>) -> Option<Vec<String>> {
    let mut values = Vec::with_capacity(keys.len());
    for k in &keys {
        match var(k) {
            Ok(Some(val)) => values.push(val),
            _ => {
                if !values.is_empty() {
                    tracing::error!(
                        "Environment variable `{k}` is required if variables {keys:?} are present"
                    );
                }
                return None;
            }
        }
    }
    Some(values)
}

fn parsed_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    match var(key) {
        Ok(Some(raw)) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("Environment variable `{key}` has an invalid value `{raw}`, using default");
            default
        }),
        _ => default,
    }
}

/// Builds a connection URL from separate credentials when `DATABASE_URL` is
/// not given.
fn database_url_from_parts(user: &str, pass: &str, host: &str, name: &str) -> String {
    format!("postgres://{user}:{pass}@{host}/{name}")
}

impl ServerConfig {
    pub fn new_from_env() -> Self {
        let storage = match var("STORAGE_BACKEND") {
            Ok(Some(backend)) if backend == "memory" => StorageBackend::Memory,
            _ => StorageBackend::Postgres,
        };

        let database = match storage {
            StorageBackend::Memory => None,
            StorageBackend::Postgres => {
                let url = match var("DATABASE_URL") {
                    Ok(Some(url)) => url,
                    _ => match all_or_none_vars(vec!["DB_USER", "DB_PASS"]) {
                        Some(mut creds) => {
                            let host = var("DB_HOST")
                                .ok()
                                .flatten()
                                .unwrap_or_else(|| "localhost:5432".into());
                            let name = var("DB_NAME")
                                .ok()
                                .flatten()
                                .unwrap_or_else(|| "talkroute".into());
                            database_url_from_parts(&creds.remove(0), &creds.remove(0), &host, &name)
                        }
                        None => required_var("DATABASE_URL"),
                    },
                };

                Some(DatabaseConfig {
                    url,
                    pool_size: parsed_var("DB_POOL_SIZE", DEFAULT_POOL_SIZE),
                })
            }
        };

        let stripe = var("STRIPE_SECRET_KEY").ok().flatten().map(|secret_key| StripeConfig {
            secret_key,
            api_base: var("STRIPE_API_BASE")
                .ok()
                .flatten()
                .unwrap_or_else(|| DEFAULT_STRIPE_API_BASE.into()),
        });

        if stripe.is_none() {
            tracing::warn!("Missing environment variable `STRIPE_SECRET_KEY`, payments are disabled");
        }

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS").ok().flatten().map(|origins| {
            origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect()
        });

        ServerConfig {
            env: Env::from_env(),
            port: parsed_var("PORT", DEFAULT_PORT),
            storage,
            database,
            stripe,
            cors_allowed_origins,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_database_url_from_credentials() {
        assert_eq!(
            database_url_from_parts("talk", "s3cret", "db:5432", "talkroute"),
            "postgres://talk:s3cret@db:5432/talkroute"
        );
    }

    #[test]
    fn default_config_uses_memory_store_without_payments() {
        let config = ServerConfig::default();
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.stripe.is_none());
    }
}

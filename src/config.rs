use serde::{Deserialize, Serialize};
use std::env;

/// Base Sepolia
pub const DEFAULT_CHAIN_ID: u64 = 84532;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub chain: ChainConfig,
    pub wallet: WalletConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub verification: VerificationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// HS256 secret of the hosted auth provider that issues access tokens
    pub secret: String,
    #[serde(default = "default_jwt_audience")]
    pub audience: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    pub rpc_url: String,
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    pub token_address: String,
    pub ticketing_contract_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// base64 encoded 32-byte AES-256-GCM key
    pub encryption_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EmailConfig {
    pub api_key: String,
    pub from_address: String,
    #[serde(default = "default_email_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VerificationConfig {
    pub url: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_jwt_audience() -> String {
    "authenticated".to_string()
}

fn default_chain_id() -> u64 {
    DEFAULT_CHAIN_ID
}

fn default_email_base_url() -> String {
    "https://api.resend.com".to_string()
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // No config file means everything comes from the environment
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => toml::from_str(&config_str)
                .map_err(|e| format!("Failed to parse config file: {e}"))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                let database_url = get_env("DATABASE_URL")
                    .ok_or("DATABASE_URL is not set and config.toml was not found")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    jwt: JwtConfig {
                        secret: get_env("JWT_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                        audience: get_env("JWT_AUDIENCE").unwrap_or_else(default_jwt_audience),
                    },
                    chain: ChainConfig {
                        rpc_url: get_env("CHAIN_RPC_URL")
                            .unwrap_or_else(|| "https://sepolia.base.org".to_string()),
                        chain_id: get_env_parse("CHAIN_ID", DEFAULT_CHAIN_ID),
                        token_address: get_env("UTICK_TOKEN_ADDRESS").unwrap_or_default(),
                        ticketing_contract_address: get_env("TICKETING_CONTRACT_ADDRESS")
                            .unwrap_or_default(),
                    },
                    wallet: WalletConfig {
                        encryption_key: get_env("WALLET_ENCRYPTION_KEY").unwrap_or_default(),
                    },
                    email: EmailConfig {
                        api_key: get_env("EMAIL_API_KEY").unwrap_or_default(),
                        from_address: get_env("EMAIL_FROM_ADDRESS").unwrap_or_default(),
                        base_url: get_env("EMAIL_BASE_URL")
                            .unwrap_or_else(default_email_base_url),
                    },
                    verification: VerificationConfig {
                        url: get_env("PAYMENT_VERIFICATION_URL").unwrap_or_default(),
                        api_key: get_env("PAYMENT_VERIFICATION_API_KEY"),
                    },
                }
            }
            Err(e) => {
                return Err(format!("Unable to read config file {config_path}: {e}").into());
            }
        };

        // Environment wins even when the file exists
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            config.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_AUDIENCE") {
            config.jwt.audience = v;
        }
        if let Ok(v) = env::var("CHAIN_RPC_URL") {
            config.chain.rpc_url = v;
        }
        if let Ok(v) = env::var("CHAIN_ID")
            && let Ok(id) = v.parse()
        {
            config.chain.chain_id = id;
        }
        if let Ok(v) = env::var("UTICK_TOKEN_ADDRESS") {
            config.chain.token_address = v;
        }
        if let Ok(v) = env::var("TICKETING_CONTRACT_ADDRESS") {
            config.chain.ticketing_contract_address = v;
        }
        if let Ok(v) = env::var("WALLET_ENCRYPTION_KEY") {
            config.wallet.encryption_key = v;
        }
        if let Ok(v) = env::var("EMAIL_API_KEY") {
            config.email.api_key = v;
        }
        if let Ok(v) = env::var("EMAIL_FROM_ADDRESS") {
            config.email.from_address = v;
        }
        if let Ok(v) = env::var("EMAIL_BASE_URL") {
            config.email.base_url = v;
        }
        if let Ok(v) = env::var("PAYMENT_VERIFICATION_URL") {
            config.verification.url = v;
        }
        if let Ok(v) = env::var("PAYMENT_VERIFICATION_API_KEY") {
            config.verification.api_key = Some(v);
        }

        Ok(config)
    }
}

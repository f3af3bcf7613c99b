use std::env;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub mailbox_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                bind_addr: DEFAULT_BIND_ADDR.to_string(),
            },
            store: StoreConfig {
                mailbox_capacity: 1024,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let mut config = Config::default();

        if let Ok(bind_addr) = env::var("BIND_ADDR") {
            config.server.bind_addr = bind_addr;
        }

        if let Ok(capacity) = env::var("STORE_MAILBOX_CAPACITY") {
            config.store.mailbox_capacity = capacity
                .parse()
                .map_err(|e| anyhow::anyhow!("STORE_MAILBOX_CAPACITY: {}", e))?;
        }

        if config.store.mailbox_capacity == 0 {
            anyhow::bail!("STORE_MAILBOX_CAPACITY must be greater than zero");
        }

        Ok(config)
    }
}

use config::Config;
use lazy_static::lazy_static;
use serde::Deserialize;
use std::{env, path::Path};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub max_batch_entries: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        IngestConfig {
            max_batch_entries: 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    ingest: IngestConfig,
    cors: CorsConfig,
}

#[derive(Debug)]
pub struct ServerConfig {
    pub ingest: IngestConfig,
    pub cors: CorsConfig,
}

impl std::fmt::Display for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Server Config:\nIngest: {:?}\n\nCors: {:?}",
            self.ingest, self.cors,
        )
    }
}

lazy_static! {
    pub static ref cfg: ServerConfig = {
        let root = env::var("APP_DIR").unwrap_or_else(|_| {
            let dir =
                env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR or APP_DIR is required");
            let dir = Path::new(&dir).parent().unwrap().display().to_string();
            format!("{}/config", dir)
        });
        let path = format!("{root}/config.toml");
        // Every key has a default; a missing config.toml still boots.
        let cfg_file: ConfigFile = Config::builder()
            .add_source(config::File::with_name(&path).required(false))
            .build()
            .expect("config.toml is unreadable")
            .try_deserialize()
            .expect("config.toml is invalid");

        let ConfigFile { ingest, cors } = cfg_file;

        ServerConfig { ingest, cors }
    };
}

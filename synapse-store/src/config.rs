/**
 * CONFIGURATION - synapse.yaml
 *
 * Chemin : $SYNAPSE_CONFIG ou ./synapse.yaml
 * Fichier absent ou vide -> valeurs par défaut
 * Fichier invalide -> warning + valeurs par défaut
 */

use crate::store::Store;
use crate::tasks::{DeployTiming, DEFAULT_RESTART_DELAY};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

pub const CONFIG_ENV: &str = "SYNAPSE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "synapse.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SynapseConfig {
    pub data_dir: PathBuf,
    pub namespace: String,
    /// Nom inscrit dans `deployedBy`
    pub operator: String,
    pub restart_delay_ms: u64,
    pub deploy: DeployConf,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DeployConf {
    pub tick_ms: u64,
    pub duration_ms: u64,
}

impl Default for SynapseConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            namespace: crate::store::DEFAULT_NAMESPACE.into(),
            operator: "Admin".into(),
            restart_delay_ms: DEFAULT_RESTART_DELAY.as_millis() as u64,
            deploy: DeployConf::default(),
        }
    }
}

impl Default for DeployConf {
    fn default() -> Self {
        Self { tick_ms: 500, duration_ms: 4000 }
    }
}

impl SynapseConfig {
    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }

    pub fn deploy_timing(&self) -> DeployTiming {
        DeployTiming::from(&self.deploy)
    }

    /// Store fichier sous `data_dir`, avec le namespace configuré
    pub fn open_store(&self) -> Store {
        Store::open(self.data_dir.clone(), self.namespace.clone())
    }
}

impl From<&DeployConf> for DeployTiming {
    fn from(conf: &DeployConf) -> Self {
        Self {
            tick: Duration::from_millis(conf.tick_ms),
            total: Duration::from_millis(conf.duration_ms),
        }
    }
}

/// Lecture stricte : `Ok(None)` si le fichier n'existe pas
pub async fn read_config(path: &Path) -> Result<Option<SynapseConfig>, ConfigError> {
    let txt = match fs::read_to_string(path).await {
        Ok(txt) => txt,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(ConfigError::Read { path: path.to_path_buf(), source }),
    };
    if txt.trim().is_empty() {
        return Ok(Some(SynapseConfig::default()));
    }
    serde_yaml::from_str(&txt)
        .map(Some)
        .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
}

pub async fn load_config_from(path: &Path) -> SynapseConfig {
    match read_config(path).await {
        Ok(Some(cfg)) => {
            info!("[config] loaded {}", path.display());
            cfg
        }
        Ok(None) => {
            info!("[config] no {}, using defaults", path.display());
            SynapseConfig::default()
        }
        Err(e) => {
            warn!("[config] {e}, using defaults");
            SynapseConfig::default()
        }
    }
}

pub async fn load_config() -> SynapseConfig {
    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    load_config_from(Path::new(&path)).await
}

//! Synapse store : état local du tableau de bord de flotte d'agents.
//!
//! - `store` : persistance namespacée, seed-si-vide, mutations sérialisées
//! - `fleet` : opérations métier (agents, alertes, déploiements, rôle)
//! - `views` : recherche, filtres, regroupements et agrégats purs
//! - `tasks` : transitions différées annulables (redémarrage, déploiement)

pub mod backend;
pub mod config;
pub mod fleet;
pub mod models;
pub mod seed;
pub mod store;
pub mod tasks;
pub mod views;

pub use backend::{FileBackend, KvBackend, MemoryBackend, StoreError};
pub use config::{load_config, ConfigError, SynapseConfig};
pub use models::*;
pub use store::{SharedStore, StorageKey, Store, DEFAULT_NAMESPACE};
pub use tasks::{
    restart_agent, start_deployment, DeployRequest, DeployTiming, DeploymentRun, ScheduledTask, TaskOutcome,
    TaskScope,
};

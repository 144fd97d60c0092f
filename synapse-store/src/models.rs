/**
 * MODÈLES SYNAPSE - Schémas des entités persistées par le store local
 *
 * RÔLE : Types passifs (Agent, Alert, Deployment, SystemMetrics, ApiConnection)
 * plus les patchs typés qui décrivent une mise à jour partielle.
 *
 * FORMAT : JSON camelCase, valeurs d'énumération identiques aux chaînes
 * stockées ("running", "in_progress", "ERROR"...). Horodatages RFC 3339.
 */

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Valeur textuelle qui ne correspond à aucune variante connue
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Énumération fermée sérialisée sous sa forme texte.
/// Génère `ALL`, `as_str`, `Display` et `FromStr` à partir d'une seule table.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

wire_enum! {
    /// Cycle de vie d'un agent
    AgentStatus {
        Running => "running",
        Stopped => "stopped",
        Error => "error",
        Starting => "starting",
    }
}

wire_enum! {
    AgentType {
        Orchestrator => "orchestrator",
        Worker => "worker",
        Monitor => "monitor",
        Analytics => "analytics",
    }
}

wire_enum! {
    /// Sévérité d'alerte, dans l'ordre d'affichage des sections
    AlertSeverity {
        Critical => "critical",
        Warning => "warning",
        Info => "info",
    }
}

wire_enum! {
    DeploymentStatus {
        Success => "success",
        Failed => "failed",
        InProgress => "in_progress",
        Pending => "pending",
    }
}

wire_enum! {
    SystemStatus {
        Online => "online",
        Degraded => "degraded",
        Offline => "offline",
    }
}

wire_enum! {
    ConnectionStatus {
        Connected => "connected",
        Disconnected => "disconnected",
        Error => "error",
    }
}

wire_enum! {
    /// Niveau d'une ligne de log (forme majuscule comme dans le viewer)
    LogLevel {
        Info => "INFO",
        Debug => "DEBUG",
        Warn => "WARN",
        Error => "ERROR",
    }
}

wire_enum! {
    /// Type de déploiement proposé par l'écran de déploiement
    DeploymentKind {
        Full => "full",
        Hotfix => "hotfix",
        Rollback => "rollback",
        Scale => "scale",
    }
}

wire_enum! {
    UserRole {
        Administrator => "administrator",
        Operator => "operator",
        Viewer => "viewer",
    }
}

impl DeploymentKind {
    /// Titre utilisé comme nom du déploiement créé
    pub fn title(&self) -> &'static str {
        match self {
            DeploymentKind::Full => "Full Deploy",
            DeploymentKind::Hotfix => "Hotfix",
            DeploymentKind::Rollback => "Rollback",
            DeploymentKind::Scale => "Scale",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DeploymentKind::Full => "Deploy all services and configurations",
            DeploymentKind::Hotfix => "Quick patch deployment",
            DeploymentKind::Rollback => "Revert to previous version",
            DeploymentKind::Scale => "Adjust resource allocation",
        }
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Administrator
    }
}

/// Environnements proposés à l'utilisateur (texte libre côté stockage)
pub const ENVIRONMENTS: [&str; 3] = ["production", "staging", "development"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AgentType,
    pub status: AgentStatus,
    pub cpu: u8,                    // 0-100
    pub memory: u8,                 // 0-100
    pub uptime: String,             // texte libre, ex: "7d 12h 34m"
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub severity: AlertSeverity,
    pub message: String,
    pub source: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub read: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub id: String,
    pub name: String,
    pub status: DeploymentStatus,
    pub duration: String,
    pub deployed_by: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub environment: String,        // production, staging, development
}

/// Déploiement sans identifiant, tel que fourni à `append`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDeployment {
    pub name: String,
    pub status: DeploymentStatus,
    pub duration: String,
    pub deployed_by: String,
    pub timestamp: OffsetDateTime,
    pub environment: String,
}

/// Métriques globales (singleton, lecture seule)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemMetrics {
    pub cpu: u8,
    pub memory: u8,
    pub disk: u8,
    pub network: u8,
    pub active_agents: u32,
    pub deployments_today: u32,
    pub system_status: SystemStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConnection {
    pub id: String,
    pub name: String,
    pub status: ConnectionStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub last_checked: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub timestamp: String,
    pub level: LogLevel,
    pub source: String,
    pub message: String,
}

/// Mise à jour partielle d'un agent : seuls les champs `Some` sont fusionnés
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentPatch {
    pub name: Option<String>,
    pub status: Option<AgentStatus>,
    pub cpu: Option<u8>,
    pub memory: Option<u8>,
    pub uptime: Option<String>,
}

impl AgentPatch {
    pub fn status(status: AgentStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Statut + ressources + uptime remis à zéro
    pub fn transition(status: AgentStatus, cpu: u8, memory: u8) -> Self {
        Self {
            name: None,
            status: Some(status),
            cpu: Some(cpu),
            memory: Some(memory),
            uptime: Some("0m".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertPatch {
    pub read: Option<bool>,
}

impl AlertPatch {
    pub fn read() -> Self {
        Self { read: Some(true) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_enum_wire_values() {
        assert_eq!(DeploymentStatus::InProgress.as_str(), "in_progress");
        assert_eq!("in_progress".parse::<DeploymentStatus>(), Ok(DeploymentStatus::InProgress));
        assert_eq!("WARN".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert!("paused".parse::<AgentStatus>().is_err());
        assert_eq!(AlertSeverity::ALL.len(), 3);
    }

    #[test]
    fn test_agent_json_shape() {
        let agent = Agent {
            id: "1".into(),
            name: "Core Orchestrator".into(),
            kind: AgentType::Orchestrator,
            status: AgentStatus::Running,
            cpu: 24,
            memory: 42,
            uptime: "7d 12h 34m".into(),
            last_updated: datetime!(2024-01-15 12:00 UTC),
        };
        let json = serde_json::to_value(&agent).unwrap();
        assert_eq!(json["type"], "orchestrator");
        assert_eq!(json["status"], "running");
        assert_eq!(json["lastUpdated"], "2024-01-15T12:00:00Z");

        let back: Agent = serde_json::from_value(json).unwrap();
        assert_eq!(back, agent);
    }

    #[test]
    fn test_metrics_json_shape() {
        let raw = r#"{"cpu":45,"memory":62,"disk":38,"network":72,"activeAgents":3,"deploymentsToday":12,"systemStatus":"online"}"#;
        let metrics: SystemMetrics = serde_json::from_str(raw).unwrap();
        assert_eq!(metrics.active_agents, 3);
        assert_eq!(metrics.system_status, SystemStatus::Online);
    }

    #[test]
    fn test_deployment_kind_titles() {
        assert_eq!(DeploymentKind::Full.title(), "Full Deploy");
        assert_eq!("rollback".parse::<DeploymentKind>().unwrap().title(), "Rollback");
    }
}

/**
 * SEED - Jeux de données par défaut du store local
 *
 * RÔLE : Fournit une collection littérale par type d'entité, écrite au premier
 * accès d'une clé vide et ré-écrite après un reset.
 *
 * STABILITÉ : Les horodatages sont ancrés sur `SEED_EPOCH` (pas sur l'heure
 * courante) pour qu'un re-seed produise exactement le même fixture.
 */

use crate::models::{
    Agent, AgentStatus, AgentType, Alert, AlertSeverity, ApiConnection, ConnectionStatus,
    Deployment, DeploymentStatus, LogEntry, LogLevel, SystemMetrics, SystemStatus,
};
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

/// Instant de référence de tous les horodatages seed
pub const SEED_EPOCH: OffsetDateTime = datetime!(2024-01-15 12:52:30 UTC);

fn minutes_ago(minutes: i64) -> OffsetDateTime {
    SEED_EPOCH - Duration::minutes(minutes)
}

fn agent(
    id: &str,
    name: &str,
    kind: AgentType,
    status: AgentStatus,
    cpu: u8,
    memory: u8,
    uptime: &str,
) -> Agent {
    Agent {
        id: id.to_string(),
        name: name.to_string(),
        kind,
        status,
        cpu,
        memory,
        uptime: uptime.to_string(),
        last_updated: SEED_EPOCH,
    }
}

pub fn agents() -> Vec<Agent> {
    vec![
        agent("1", "Core Orchestrator", AgentType::Orchestrator, AgentStatus::Running, 24, 42, "7d 12h 34m"),
        agent("2", "Worker Alpha", AgentType::Worker, AgentStatus::Running, 67, 58, "3d 8h 15m"),
        agent("3", "System Monitor", AgentType::Monitor, AgentStatus::Running, 12, 28, "14d 2h 45m"),
        agent("4", "Analytics Engine", AgentType::Analytics, AgentStatus::Stopped, 0, 15, "0m"),
        agent("5", "Worker Beta", AgentType::Worker, AgentStatus::Error, 0, 0, "0m"),
    ]
}

fn alert(id: &str, severity: AlertSeverity, message: &str, source: &str, age_min: i64, read: bool) -> Alert {
    Alert {
        id: id.to_string(),
        severity,
        message: message.to_string(),
        source: source.to_string(),
        timestamp: minutes_ago(age_min),
        read,
    }
}

/// 4 alertes : 2 non lues (critical, warning), 2 lues
pub fn alerts() -> Vec<Alert> {
    vec![
        alert(
            "1",
            AlertSeverity::Critical,
            "Worker Beta agent has crashed and requires immediate attention",
            "Worker Beta",
            5,
            false,
        ),
        alert(
            "2",
            AlertSeverity::Warning,
            "High memory usage detected on Worker Alpha (58%)",
            "System Monitor",
            30,
            false,
        ),
        alert(
            "3",
            AlertSeverity::Info,
            "Scheduled maintenance window starting in 2 hours",
            "System",
            60,
            true,
        ),
        alert(
            "4",
            AlertSeverity::Warning,
            "API rate limit approaching threshold (85%)",
            "Core Orchestrator",
            120,
            true,
        ),
    ]
}

fn deployment(
    id: &str,
    name: &str,
    status: DeploymentStatus,
    duration: &str,
    deployed_by: &str,
    age_min: i64,
    environment: &str,
) -> Deployment {
    Deployment {
        id: id.to_string(),
        name: name.to_string(),
        status,
        duration: duration.to_string(),
        deployed_by: deployed_by.to_string(),
        timestamp: minutes_ago(age_min),
        environment: environment.to_string(),
    }
}

/// Historique, le plus récent en tête
pub fn deployments() -> Vec<Deployment> {
    vec![
        deployment("1", "v2.4.1 Hotfix", DeploymentStatus::Success, "4m 32s", "Admin", 45, "production"),
        deployment("2", "Feature Update", DeploymentStatus::Success, "8m 15s", "Operator", 3 * 60, "staging"),
        deployment("3", "Security Patch", DeploymentStatus::Failed, "2m 08s", "Admin", 6 * 60, "production"),
    ]
}

pub fn metrics() -> SystemMetrics {
    SystemMetrics {
        cpu: 45,
        memory: 62,
        disk: 38,
        network: 72,
        active_agents: 3,
        deployments_today: 12,
        system_status: SystemStatus::Online,
    }
}

pub fn connections() -> Vec<ApiConnection> {
    [
        ("1", "Gemini AI", ConnectionStatus::Connected),
        ("2", "Anthropic", ConnectionStatus::Connected),
        ("3", "Binance", ConnectionStatus::Disconnected),
        ("4", "Telegram", ConnectionStatus::Connected),
    ]
    .into_iter()
    .map(|(id, name, status)| ApiConnection {
        id: id.to_string(),
        name: name.to_string(),
        status,
        last_checked: SEED_EPOCH,
    })
    .collect()
}

/// Lignes de log d'exemple du viewer (non persistées)
pub fn sample_logs() -> Vec<LogEntry> {
    [
        ("1", "2024-01-15 12:45:32.145", LogLevel::Info, "Orchestrator", "System initialization complete"),
        ("2", "2024-01-15 12:45:33.892", LogLevel::Info, "Orchestrator", "Connected to all worker agents"),
        ("3", "2024-01-15 12:45:35.234", LogLevel::Debug, "Worker Alpha", "Processing batch #4521 with 150 items"),
        ("4", "2024-01-15 12:46:01.567", LogLevel::Info, "Worker Alpha", "Batch #4521 completed successfully in 14.2s"),
        ("5", "2024-01-15 12:47:00.123", LogLevel::Warn, "System Monitor", "Memory usage above threshold (58%)"),
        ("6", "2024-01-15 12:48:22.456", LogLevel::Info, "System Monitor", "Health check passed for all agents"),
        ("7", "2024-01-15 12:49:15.789", LogLevel::Debug, "Analytics", "Generating performance report"),
        ("8", "2024-01-15 12:50:00.012", LogLevel::Info, "Orchestrator", "Scheduled maintenance window in 2 hours"),
        ("9", "2024-01-15 12:51:30.345", LogLevel::Warn, "Worker Beta", "Connection timeout, retrying..."),
        ("10", "2024-01-15 12:52:00.678", LogLevel::Error, "Worker Beta", "Failed to connect after 3 retries"),
        ("11", "2024-01-15 12:52:05.901", LogLevel::Info, "Orchestrator", "Attempting to restart Worker Beta"),
        ("12", "2024-01-15 12:52:30.234", LogLevel::Info, "Worker Beta", "Agent restarted successfully"),
    ]
    .into_iter()
    .map(|(id, timestamp, level, source, message)| LogEntry {
        id: id.to_string(),
        timestamp: timestamp.to_string(),
        level,
        source: source.to_string(),
        message: message.to_string(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_stable() {
        assert_eq!(agents(), agents());
        assert_eq!(
            serde_json::to_string(&alerts()).unwrap(),
            serde_json::to_string(&alerts()).unwrap()
        );
    }

    #[test]
    fn test_seed_fixture_shape() {
        assert_eq!(agents().len(), 5);
        assert_eq!(alerts().iter().filter(|a| !a.read).count(), 2);
        assert_eq!(deployments().len(), 3);
        assert_eq!(connections().len(), 4);
        assert_eq!(sample_logs().len(), 12);

        let beta = agents().into_iter().find(|a| a.id == "5").unwrap();
        assert_eq!(beta.status, AgentStatus::Error);
    }

    #[test]
    fn test_seed_deployments_newest_first() {
        let deployments = deployments();
        assert!(deployments.windows(2).all(|w| w[0].timestamp > w[1].timestamp));
    }
}

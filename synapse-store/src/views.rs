/**
 * VUES DÉRIVÉES - Projections pures des collections pour l'affichage
 *
 * RÔLE : Recherche texte, filtres par catégorie, regroupement des alertes par
 * sévérité, statistiques agrégées (compteurs, taux de succès, échelle des barres).
 *
 * CONTRAT : Fonctions sans effet de bord et sans accès au store ; mêmes
 * entrées -> même sortie. L'ordre d'origine des collections est conservé.
 */

use crate::models::{
    Agent, AgentStatus, AgentType, Alert, AlertSeverity, ApiConnection, ConnectionStatus,
    Deployment, DeploymentStatus, LogEntry, LogLevel, SystemMetrics, SystemStatus, UnknownVariant,
};
use serde::Serialize;
use std::str::FromStr;

/// Sous-chaîne insensible à la casse ; une requête vide accepte tout
pub fn matches_query(haystack: &str, query: &str) -> bool {
    query.is_empty() || haystack.to_lowercase().contains(&query.to_lowercase())
}

/// Filtre de l'écran agents : "all", un statut ou un type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgentFilter {
    #[default]
    All,
    Status(AgentStatus),
    Kind(AgentType),
}

impl AgentFilter {
    /// Une valeur de filtre est acceptée si elle égale le statut OU le type
    pub fn matches(&self, agent: &Agent) -> bool {
        match self {
            AgentFilter::All => true,
            AgentFilter::Status(status) => agent.status == *status,
            AgentFilter::Kind(kind) => agent.kind == *kind,
        }
    }
}

impl FromStr for AgentFilter {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_ascii_lowercase();
        if token == "all" {
            return Ok(AgentFilter::All);
        }
        if let Ok(status) = token.parse::<AgentStatus>() {
            return Ok(AgentFilter::Status(status));
        }
        token
            .parse::<AgentType>()
            .map(AgentFilter::Kind)
            .map_err(|_| UnknownVariant {
                kind: "AgentFilter",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeploymentFilter {
    #[default]
    All,
    Status(DeploymentStatus),
}

impl DeploymentFilter {
    pub fn matches(&self, deployment: &Deployment) -> bool {
        match self {
            DeploymentFilter::All => true,
            DeploymentFilter::Status(status) => deployment.status == *status,
        }
    }
}

impl FromStr for DeploymentFilter {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_ascii_lowercase();
        if token == "all" {
            return Ok(DeploymentFilter::All);
        }
        token
            .parse::<DeploymentStatus>()
            .map(DeploymentFilter::Status)
            .map_err(|_| UnknownVariant {
                kind: "DeploymentFilter",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelFilter {
    #[default]
    All,
    Level(LogLevel),
}

impl LevelFilter {
    pub fn matches(&self, entry: &LogEntry) -> bool {
        match self {
            LevelFilter::All => true,
            LevelFilter::Level(level) => entry.level == *level,
        }
    }
}

impl FromStr for LevelFilter {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        if token.eq_ignore_ascii_case("all") {
            return Ok(LevelFilter::All);
        }
        token
            .to_ascii_uppercase()
            .parse::<LogLevel>()
            .map(LevelFilter::Level)
            .map_err(|_| UnknownVariant {
                kind: "LevelFilter",
                value: s.to_string(),
            })
    }
}

pub fn filter_agents<'a>(agents: &'a [Agent], query: &str, filter: AgentFilter) -> Vec<&'a Agent> {
    agents
        .iter()
        .filter(|agent| matches_query(&agent.name, query) && filter.matches(agent))
        .collect()
}

pub fn filter_deployments<'a>(
    deployments: &'a [Deployment],
    query: &str,
    filter: DeploymentFilter,
) -> Vec<&'a Deployment> {
    deployments
        .iter()
        .filter(|d| matches_query(&d.name, query) && filter.matches(d))
        .collect()
}

/// La recherche porte sur le message OU la source
pub fn filter_logs<'a>(logs: &'a [LogEntry], query: &str, filter: LevelFilter) -> Vec<&'a LogEntry> {
    logs.iter()
        .filter(|log| {
            (matches_query(&log.message, query) || matches_query(&log.source, query)) && filter.matches(log)
        })
        .collect()
}

/// Section de l'écran alertes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertSection<'a> {
    pub severity: AlertSeverity,
    pub title: &'static str,
    pub alerts: Vec<&'a Alert>,
}

pub fn section_title(severity: AlertSeverity) -> &'static str {
    match severity {
        AlertSeverity::Critical => "Critical",
        AlertSeverity::Warning => "Warnings",
        AlertSeverity::Info => "Info",
    }
}

/// Regroupe par sévérité (critical, warning, info) ; sections vides omises
pub fn group_alerts(alerts: &[Alert]) -> Vec<AlertSection<'_>> {
    AlertSeverity::ALL
        .iter()
        .map(|severity| AlertSection {
            severity: *severity,
            title: section_title(*severity),
            alerts: alerts.iter().filter(|a| a.severity == *severity).collect(),
        })
        .filter(|section| !section.alerts.is_empty())
        .collect()
}

pub fn unread_count(alerts: &[Alert]) -> usize {
    alerts.iter().filter(|a| !a.read).count()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AgentStatusCounts {
    pub running: usize,
    pub stopped: usize,
    pub error: usize,
    pub starting: usize,
}

impl AgentStatusCounts {
    /// Barres du graphique "Agent Status"
    pub fn bars(&self) -> Vec<Bar> {
        bar_chart(&[("Running", self.running), ("Stopped", self.stopped), ("Error", self.error)])
    }
}

pub fn agent_status_counts(agents: &[Agent]) -> AgentStatusCounts {
    agents.iter().fold(AgentStatusCounts::default(), |mut counts, agent| {
        match agent.status {
            AgentStatus::Running => counts.running += 1,
            AgentStatus::Stopped => counts.stopped += 1,
            AgentStatus::Error => counts.error += 1,
            AgentStatus::Starting => counts.starting += 1,
        }
        counts
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeploymentStatusCounts {
    pub success: usize,
    pub failed: usize,
    pub in_progress: usize,
    pub pending: usize,
}

impl DeploymentStatusCounts {
    pub fn total(&self) -> usize {
        self.success + self.failed + self.in_progress + self.pending
    }

    /// Barres du graphique "Deployments by Status"
    pub fn bars(&self) -> Vec<Bar> {
        bar_chart(&[("Success", self.success), ("Failed", self.failed), ("Pending", self.pending)])
    }
}

pub fn deployment_status_counts(deployments: &[Deployment]) -> DeploymentStatusCounts {
    deployments.iter().fold(DeploymentStatusCounts::default(), |mut counts, d| {
        match d.status {
            DeploymentStatus::Success => counts.success += 1,
            DeploymentStatus::Failed => counts.failed += 1,
            DeploymentStatus::InProgress => counts.in_progress += 1,
            DeploymentStatus::Pending => counts.pending += 1,
        }
        counts
    })
}

/// Pourcentage arrondi de déploiements réussis ; total plancher à 1
pub fn success_rate(deployments: &[Deployment]) -> u32 {
    let success = deployments
        .iter()
        .filter(|d| d.status == DeploymentStatus::Success)
        .count();
    let total = deployments.len().max(1);
    ((success as f64 / total as f64) * 100.0).round() as u32
}

/// Maximum utilisé pour mettre les barres à l'échelle ; plancher à 1
pub fn scale_max<I: IntoIterator<Item = usize>>(values: I) -> usize {
    values.into_iter().max().unwrap_or(0).max(1)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: &'static str,
    pub value: usize,
    /// Hauteur relative dans [0, 1]
    pub ratio: f64,
}

pub fn bar_chart(entries: &[(&'static str, usize)]) -> Vec<Bar> {
    let max = scale_max(entries.iter().map(|(_, value)| *value));
    entries
        .iter()
        .map(|&(label, value)| Bar {
            label,
            value,
            ratio: value as f64 / max as f64,
        })
        .collect()
}

/// Résumé affiché en tête du dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub system_status: SystemStatus,
    pub running_agents: usize,
    pub total_agents: usize,
    pub unread_alerts: usize,
    pub connected_apis: usize,
    pub total_apis: usize,
}

pub fn dashboard_summary(
    metrics: &SystemMetrics,
    agents: &[Agent],
    alerts: &[Alert],
    connections: &[ApiConnection],
) -> DashboardSummary {
    DashboardSummary {
        system_status: metrics.system_status,
        running_agents: agents.iter().filter(|a| a.status == AgentStatus::Running).count(),
        total_agents: agents.len(),
        unread_alerts: unread_count(alerts),
        connected_apis: connections
            .iter()
            .filter(|c| c.status == ConnectionStatus::Connected)
            .count(),
        total_apis: connections.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    #[test]
    fn test_empty_query_all_filter_keeps_everything() {
        let agents = seed::agents();
        let view = filter_agents(&agents, "", AgentFilter::All);
        assert_eq!(view.len(), agents.len());
        assert!(view.iter().zip(agents.iter()).all(|(a, b)| *a == b));
    }

    #[test]
    fn test_agent_search_is_case_insensitive() {
        let agents = seed::agents();
        let names: Vec<&str> = filter_agents(&agents, "WORKER", AgentFilter::All)
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["Worker Alpha", "Worker Beta"]);
    }

    #[test]
    fn test_agent_filter_matches_status_or_type() {
        let agents = seed::agents();

        let running: AgentFilter = "running".parse().unwrap();
        assert_eq!(filter_agents(&agents, "", running).len(), 3);

        let workers: AgentFilter = "worker".parse().unwrap();
        assert_eq!(workers, AgentFilter::Kind(AgentType::Worker));
        let ids: Vec<&str> = filter_agents(&agents, "", workers).iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "5"]);

        // recherche et filtre se combinent
        assert_eq!(filter_agents(&agents, "beta", running).len(), 0);
        assert!("paused".parse::<AgentFilter>().is_err());
    }

    #[test]
    fn test_deployment_filter() {
        let deployments = seed::deployments();
        let failed: DeploymentFilter = "failed".parse().unwrap();
        let view = filter_deployments(&deployments, "", failed);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].name, "Security Patch");

        assert_eq!(filter_deployments(&deployments, "update", DeploymentFilter::All).len(), 1);
    }

    #[test]
    fn test_log_search_covers_source() {
        let logs = seed::sample_logs();
        assert_eq!(filter_logs(&logs, "worker beta", LevelFilter::All).len(), 4);
        let errors: LevelFilter = "error".parse().unwrap();
        assert_eq!(filter_logs(&logs, "", errors).len(), 1);
        assert_eq!(filter_logs(&logs, "", LevelFilter::All).len(), 12);
    }

    #[test]
    fn test_group_alerts_ordered_and_skips_empty() {
        let mut alerts = seed::alerts();
        let sections = group_alerts(&alerts);
        let order: Vec<AlertSeverity> = sections.iter().map(|s| s.severity).collect();
        assert_eq!(order, vec![AlertSeverity::Critical, AlertSeverity::Warning, AlertSeverity::Info]);
        assert_eq!(sections[1].alerts.len(), 2);
        assert_eq!(sections[1].title, "Warnings");

        alerts.retain(|a| a.severity != AlertSeverity::Critical);
        let sections = group_alerts(&alerts);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].severity, AlertSeverity::Warning);

        assert!(group_alerts(&[]).is_empty());
    }

    #[test]
    fn test_counts_and_rates() {
        let agents = seed::agents();
        let counts = agent_status_counts(&agents);
        assert_eq!((counts.running, counts.stopped, counts.error), (3, 1, 1));

        let deployments = seed::deployments();
        assert_eq!(success_rate(&deployments), 67);
        assert_eq!(success_rate(&[]), 0);
        assert_eq!(deployment_status_counts(&deployments).total(), 3);
    }

    #[test]
    fn test_scale_max_floor() {
        assert_eq!(scale_max(Vec::<usize>::new()), 1);
        assert_eq!(scale_max([0, 0, 0]), 1);
        assert_eq!(scale_max([2, 7, 3]), 7);

        let bars = DeploymentStatusCounts::default().bars();
        assert!(bars.iter().all(|b| b.ratio == 0.0));

        let bars = agent_status_counts(&seed::agents()).bars();
        assert_eq!(bars[0].ratio, 1.0);
        assert!((bars[1].ratio - 1.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_dashboard_summary() {
        let summary = dashboard_summary(
            &seed::metrics(),
            &seed::agents(),
            &seed::alerts(),
            &seed::connections(),
        );
        assert_eq!(summary.running_agents, 3);
        assert_eq!(summary.total_agents, 5);
        assert_eq!(summary.unread_alerts, 2);
        assert_eq!(summary.connected_apis, 3);
        assert_eq!(summary.system_status, SystemStatus::Online);
    }
}

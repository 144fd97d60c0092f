/**
 * RENDU TEXTE - Affichage des collections et vues sur stdout
 *
 * Une fonction par écran ; aucune ne touche au store.
 */

use serde::Serialize;
use synapse_store::views::{AlertSection, Bar, DashboardSummary};
use synapse_store::{Agent, Alert, ApiConnection, Deployment, DeploymentKind, LogEntry, SystemMetrics, UserRole};
use time::OffsetDateTime;

const BAR_WIDTH: usize = 24;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// "just now", "5m ago", "3h ago", "12d ago"
pub fn ago(timestamp: OffsetDateTime, now: OffsetDateTime) -> String {
    let minutes = (now - timestamp).whole_minutes();
    match minutes {
        m if m < 1 => "just now".to_string(),
        m if m < 60 => format!("{m}m ago"),
        m if m < 60 * 24 => format!("{}h ago", m / 60),
        m => format!("{}d ago", m / (60 * 24)),
    }
}

fn gauge(percent: u8) -> String {
    let filled = (percent.min(100) as usize * BAR_WIDTH) / 100;
    format!("[{}{}] {:>3}%", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled), percent)
}

fn chart(title: &str, bars: &[Bar]) {
    println!("{title}");
    for bar in bars {
        let filled = (bar.ratio * BAR_WIDTH as f64).round() as usize;
        println!("  {:<10} {:<width$} {}", bar.label, "#".repeat(filled), bar.value, width = BAR_WIDTH);
    }
}

pub fn dashboard(summary: &DashboardSummary, metrics: &SystemMetrics, agents: &[Agent], alerts: &[Alert], now: OffsetDateTime) {
    println!("System {}", summary.system_status);
    println!(
        "  agents {}/{} running, {} unread alerts, APIs {}/{} connected",
        summary.running_agents, summary.total_agents, summary.unread_alerts, summary.connected_apis, summary.total_apis
    );
    println!();
    println!("  CPU     {}", gauge(metrics.cpu));
    println!("  Memory  {}", gauge(metrics.memory));
    println!("  Disk    {}", gauge(metrics.disk));
    println!("  Network {}", gauge(metrics.network));
    println!("  {} active agents, {} deployments today", metrics.active_agents, metrics.deployments_today);
    println!();
    println!("Agents");
    for agent in agents {
        agent_line(agent, now);
    }
    let recent: Vec<&Alert> = alerts.iter().filter(|a| !a.read).take(3).collect();
    if !recent.is_empty() {
        println!();
        println!("Recent alerts");
        for alert in recent {
            alert_line(alert, now);
        }
    }
}

fn agent_line(agent: &Agent, now: OffsetDateTime) {
    println!(
        "  {:<4} {:<18} {:<13} {:<9} cpu {:>3}% mem {:>3}%  up {:<11} {}",
        agent.id,
        agent.name,
        agent.kind.to_string(),
        agent.status.to_string(),
        agent.cpu,
        agent.memory,
        agent.uptime,
        ago(agent.last_updated, now)
    );
}

pub fn agents(agents: &[&Agent], now: OffsetDateTime) {
    if agents.is_empty() {
        println!("No agents found");
        return;
    }
    for agent in agents {
        agent_line(agent, now);
    }
}

pub fn agent(agent: &Agent, now: OffsetDateTime) {
    println!("{} ({})", agent.name, agent.id);
    println!("  type     {}", agent.kind);
    println!("  status   {}", agent.status);
    println!("  cpu      {}", gauge(agent.cpu));
    println!("  memory   {}", gauge(agent.memory));
    println!("  uptime   {}", agent.uptime);
    println!("  updated  {}", ago(agent.last_updated, now));
}

fn alert_line(alert: &Alert, now: OffsetDateTime) {
    let marker = if alert.read { ' ' } else { '*' };
    println!(
        "  {marker} {:<3} {:<8} {} ({}, {})",
        alert.id,
        alert.severity.to_string(),
        alert.message,
        alert.source,
        ago(alert.timestamp, now)
    );
}

pub fn alert_sections(sections: &[AlertSection<'_>], unread: usize, now: OffsetDateTime) {
    if sections.is_empty() {
        println!("No alerts");
        return;
    }
    println!("{unread} unread");
    for section in sections {
        println!("{} ({})", section.title, section.alerts.len());
        for alert in &section.alerts {
            alert_line(alert, now);
        }
    }
}

pub fn deployments(deployments: &[&Deployment], now: OffsetDateTime) {
    if deployments.is_empty() {
        println!("No deployments found");
        return;
    }
    for d in deployments {
        println!(
            "  {:<14} {:<18} {:<11} {:<11} {:>7}  by {} {}",
            d.id,
            d.name,
            d.status.to_string(),
            d.environment,
            d.duration,
            d.deployed_by,
            ago(d.timestamp, now)
        );
    }
}

pub fn deploy_started(kind: DeploymentKind, environment: &str) {
    println!("{}: {}", kind.title(), kind.description());
    println!("Deploying to {environment}...");
}

pub fn deploy_progress(progress: f64) {
    let filled = ((progress / 100.0) * BAR_WIDTH as f64).round() as usize;
    println!("  [{}{}] {:>3.0}%", "#".repeat(filled), ".".repeat(BAR_WIDTH.saturating_sub(filled)), progress);
}

pub fn analytics(agent_bars: &[Bar], deployment_bars: &[Bar], success_rate: u32, total: usize) {
    chart("Agent Status", agent_bars);
    println!();
    chart("Deployments by Status", deployment_bars);
    println!();
    println!("Success rate {success_rate}% over {total} deployments");
}

pub fn logs(entries: &[&LogEntry]) {
    if entries.is_empty() {
        println!("No logs found");
        return;
    }
    for entry in entries {
        println!(
            "{} {:<5} [{}] {}",
            entry.timestamp,
            entry.level.to_string(),
            entry.source,
            entry.message
        );
    }
}

pub fn connections(connections: &[ApiConnection], now: OffsetDateTime) {
    for c in connections {
        println!(
            "  {:<12} {:<12} checked {}",
            c.name,
            c.status.to_string(),
            ago(c.last_checked, now)
        );
    }
}

pub fn role(role: UserRole) {
    println!("Role: {role}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_ago() {
        let now = datetime!(2024-01-15 13:00:00 UTC);
        assert_eq!(ago(now, now), "just now");
        assert_eq!(ago(datetime!(2024-01-15 12:55:00 UTC), now), "5m ago");
        assert_eq!(ago(datetime!(2024-01-15 10:00:00 UTC), now), "3h ago");
        assert_eq!(ago(datetime!(2024-01-13 13:00:00 UTC), now), "2d ago");
    }

    #[test]
    fn test_gauge_is_clamped() {
        assert_eq!(gauge(0), format!("[{}]   0%", ".".repeat(BAR_WIDTH)));
        assert!(gauge(100).starts_with(&format!("[{}]", "#".repeat(BAR_WIDTH))));
    }
}

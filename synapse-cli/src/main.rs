/**
 * SYNAPSE CLI - Tableau de bord de la flotte d'agents en ligne de commande
 *
 * RÔLE : Un sous-commande par écran (dashboard, agents, alertes, déploiements,
 * analytics, logs, réglages). Toute la logique vit dans synapse-store.
 *
 * BOOTSTRAP : .env -> logs (RUST_LOG, défaut synapse=info, sur stderr)
 * -> config YAML -> store (fichier ou mémoire) -> commande.
 */

mod cli;
mod render;

use crate::cli::{AgentOperation, AlertOperation, Command, RoleOperation, SynapseCli};

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::sync::Arc;
use synapse_store::config::{load_config, read_config, SynapseConfig};
use synapse_store::views;
use synapse_store::{
    restart_agent, seed, start_deployment, Agent, DeployRequest, DeploymentKind, MemoryBackend, SharedStore, Store,
    TaskOutcome, TaskScope,
};
use time::OffsetDateTime;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // .env optionnel
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("synapse=info")))
        .with_writer(std::io::stderr)
        .init();

    let args = SynapseCli::parse();
    let global = args.global;

    // un --config explicite doit exister et être valide
    let mut config = match &global.config {
        Some(path) => read_config(path)
            .await?
            .with_context(|| format!("config file {} not found", path.display()))?,
        None => load_config().await,
    };
    if let Some(dir) = global.data_dir {
        config.data_dir = dir;
    }

    let store = if global.ephemeral {
        Store::new(Arc::new(MemoryBackend::new()), config.namespace.clone())
    } else {
        config.open_store()
    }
    .into_shared();

    run(args.command, &store, &config, global.json).await
}

async fn run(command: Command, store: &SharedStore, config: &SynapseConfig, json: bool) -> Result<()> {
    let now = OffsetDateTime::now_utc();

    match command {
        Command::Dashboard => {
            let metrics = store.metrics().await;
            let agents = store.agents().await;
            let alerts = store.alerts().await;
            let connections = store.connections().await;
            let summary = views::dashboard_summary(&metrics, &agents, &alerts, &connections);
            if json {
                return render::print_json(&summary);
            }
            render::dashboard(&summary, &metrics, &agents, &alerts, now);
        }
        Command::Agents { search, filter } => {
            let agents = store.agents().await;
            let view = views::filter_agents(&agents, &search, filter);
            if json {
                return render::print_json(&view);
            }
            render::agents(&view, now);
        }
        Command::Agent { opt } => agent_command(opt, store, config, json, now).await?,
        Command::Alerts { opt } => {
            let alerts = match opt.unwrap_or(AlertOperation::List) {
                AlertOperation::List => store.alerts().await,
                AlertOperation::Read { id } => store.mark_alert_read(&id).await?,
                AlertOperation::ReadAll => store.mark_all_alerts_read().await?,
                AlertOperation::Dismiss { id } => store.dismiss_alert(&id).await?,
            };
            if json {
                return render::print_json(&alerts);
            }
            render::alert_sections(&views::group_alerts(&alerts), views::unread_count(&alerts), now);
        }
        Command::Deployments { search, filter } => {
            let deployments = store.deployments().await;
            let view = views::filter_deployments(&deployments, &search, filter);
            if json {
                return render::print_json(&view);
            }
            render::deployments(&view, now);
        }
        Command::Deploy { kind, env } => deploy(kind, env, store, config, json).await?,
        Command::Analytics => {
            let agents = store.agents().await;
            let deployments = store.deployments().await;
            let agent_counts = views::agent_status_counts(&agents);
            let deployment_counts = views::deployment_status_counts(&deployments);
            let rate = views::success_rate(&deployments);
            if json {
                return render::print_json(&serde_json::json!({
                    "agents": agent_counts,
                    "deployments": deployment_counts,
                    "successRate": rate,
                }));
            }
            render::analytics(&agent_counts.bars(), &deployment_counts.bars(), rate, deployment_counts.total());
        }
        Command::Logs { search, level } => {
            let logs = seed::sample_logs();
            let view = views::filter_logs(&logs, &search, level);
            if json {
                return render::print_json(&view);
            }
            render::logs(&view);
        }
        Command::Connections => {
            let connections = store.connections().await;
            if json {
                return render::print_json(&connections);
            }
            render::connections(&connections, now);
        }
        Command::Role { opt } => {
            let role = match opt.unwrap_or(RoleOperation::Show) {
                RoleOperation::Show => store.user_role().await,
                RoleOperation::Set { role } => {
                    store.set_user_role(role).await?;
                    role
                }
            };
            if json {
                return render::print_json(&role);
            }
            render::role(role);
        }
        Command::Reset => {
            store.clear_all_data().await.context("failed to clear stored data")?;
            println!("All data cleared, defaults will be restored on next read");
        }
    }
    Ok(())
}

fn find_agent<'a>(agents: &'a [Agent], id: &str) -> Result<&'a Agent> {
    agents
        .iter()
        .find(|a| a.id == id)
        .with_context(|| format!("no agent with id {id}"))
}

async fn agent_command(
    opt: AgentOperation,
    store: &SharedStore,
    config: &SynapseConfig,
    json: bool,
    now: OffsetDateTime,
) -> Result<()> {
    let (agents, id) = match opt {
        AgentOperation::Show { id } => (store.agents().await, id),
        AgentOperation::Start { id } => (store.start_agent(&id).await?, id),
        AgentOperation::Stop { id } => (store.stop_agent(&id).await?, id),
        AgentOperation::Restart { id } => {
            let scope = TaskScope::new("agent-restart");
            let (agents, task) = restart_agent(&scope, store, &id, config.restart_delay()).await?;
            let agent = find_agent(&agents, &id)?;
            if !json {
                render::agent(agent, now);
                println!("Restarting...");
            }

            let outcome = tokio::select! {
                outcome = task.wait() => outcome?,
                _ = tokio::signal::ctrl_c() => {
                    scope.cancel_all();
                    TaskOutcome::Cancelled
                }
            };
            if outcome == TaskOutcome::Cancelled {
                bail!("restart of agent {id} interrupted, agent left in starting state");
            }
            info!("[agent] {} restarted", id);
            (store.agents().await, id)
        }
    };

    let agent = find_agent(&agents, &id)?;
    if json {
        return render::print_json(agent);
    }
    render::agent(agent, OffsetDateTime::now_utc());
    Ok(())
}

async fn deploy(kind: DeploymentKind, environment: String, store: &SharedStore, config: &SynapseConfig, json: bool) -> Result<()> {
    let scope = TaskScope::new("deploy");
    if !json {
        render::deploy_started(kind, &environment);
    }
    let request = DeployRequest {
        kind,
        environment,
        deployed_by: config.operator.clone(),
    };

    let run = start_deployment(&scope, store, request, config.deploy_timing());
    let mut progress = run.subscribe();
    let watch_progress = async {
        while progress.changed().await.is_ok() {
            let value = *progress.borrow_and_update();
            if !json {
                render::deploy_progress(value);
            }
        }
        run.wait().await
    };

    let outcome = tokio::select! {
        outcome = watch_progress => outcome?,
        _ = tokio::signal::ctrl_c() => {
            scope.cancel_all();
            TaskOutcome::Cancelled
        }
    };
    if outcome == TaskOutcome::Cancelled {
        bail!("deployment interrupted, nothing recorded");
    }

    let deployments = store.deployments().await;
    let latest = deployments.first().context("deployment history is empty")?;
    if json {
        return render::print_json(latest);
    }
    println!("Deployment {} recorded ({})", latest.id, latest.duration);
    Ok(())
}

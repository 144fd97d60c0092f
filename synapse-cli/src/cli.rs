use std::path::PathBuf;

use synapse_store::views::{AgentFilter, DeploymentFilter, LevelFilter};
use synapse_store::{DeploymentKind, UserRole, ENVIRONMENTS};

/// Tableau de bord en ligne de commande de la flotte Synapse
#[derive(clap::Parser, Clone, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct SynapseCli {
    #[command(subcommand)]
    pub command: Command,
    #[clap(flatten)]
    pub global: GlobalArgs,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalArgs {
    /// Config file (defaults to $SYNAPSE_CONFIG or ./synapse.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Data directory, overrides `data_dir` from the config file
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
    /// Keep state in memory only (nothing written to disk)
    #[arg(long, global = true)]
    pub ephemeral: bool,
    /// Print the underlying data as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(clap::Subcommand, Clone, Debug)]
pub enum Command {
    /// System overview: status, metrics, agents, recent alerts
    #[clap(aliases = &["dash", "d"])]
    Dashboard,
    /// List agents
    Agents {
        /// Case-insensitive search on agent names
        #[arg(short, long, default_value = "")]
        search: String,
        /// all, a status (running, stopped, error, starting) or a type
        #[arg(short, long, default_value = "all")]
        filter: AgentFilter,
    },
    /// Inspect or control a single agent
    Agent {
        #[command(subcommand)]
        opt: AgentOperation,
    },
    /// List and manage alerts
    Alerts {
        #[command(subcommand)]
        opt: Option<AlertOperation>,
    },
    /// Deployment history
    #[clap(aliases = &["deps"])]
    Deployments {
        #[arg(short, long, default_value = "")]
        search: String,
        /// all, success, failed, in_progress or pending
        #[arg(short, long, default_value = "all")]
        filter: DeploymentFilter,
    },
    /// Run a simulated deployment
    Deploy {
        /// full, hotfix, rollback or scale
        #[arg(short, long)]
        kind: DeploymentKind,
        /// Target environment
        #[arg(short, long, default_value = "production", value_parser = ENVIRONMENTS)]
        env: String,
    },
    /// Aggregated charts over agents and deployments
    Analytics,
    /// Sample log stream
    Logs {
        /// Matches message or source
        #[arg(short, long, default_value = "")]
        search: String,
        /// all, INFO, DEBUG, WARN or ERROR
        #[arg(short, long, default_value = "all")]
        level: LevelFilter,
    },
    /// External API connections
    Connections,
    /// Show or change the user role
    Role {
        #[command(subcommand)]
        opt: Option<RoleOperation>,
    },
    /// Remove all stored data; next read re-seeds defaults
    Reset,
}

#[derive(clap::Subcommand, Clone, Debug)]
pub enum AgentOperation {
    /// Show one agent
    Show { id: String },
    /// Start an agent (running, cpu 15%, memory 25%)
    Start { id: String },
    /// Stop an agent
    Stop { id: String },
    /// Restart an agent and wait for it to come back up
    Restart { id: String },
}

#[derive(clap::Subcommand, Clone, Debug)]
pub enum AlertOperation {
    /// Alerts grouped by severity
    List,
    /// Mark one alert as read
    Read { id: String },
    /// Mark every alert as read
    ReadAll,
    /// Delete an alert
    Dismiss { id: String },
}

#[derive(clap::Subcommand, Clone, Debug)]
pub enum RoleOperation {
    Show,
    /// administrator, operator or viewer
    Set { role: UserRole },
}

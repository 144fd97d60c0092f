/**
 * TÂCHES PLANIFIÉES - Transitions différées annulables
 *
 * RÔLE :
 * Simule les effets "montrer une progression puis appliquer l'état final"
 * (redémarrage d'agent, déploiement) sans callback orphelin.
 *
 * FONCTIONNEMENT :
 * - TaskScope = propriétaire des tâches d'un écran ; son Drop annule tout
 * - ScheduledTask = handle d'une tâche (cancel / wait / is_finished)
 * - Chaque tâche reçoit un CancellationToken enfant du scope
 * - L'annulation n'est observée qu'avant la mutation finale : une mutation
 *   commencée va toujours au bout
 */

use crate::backend::StoreError;
use crate::models::{Agent, DeploymentKind, DeploymentStatus, NewDeployment};
use crate::store::SharedStore;
use rand::Rng;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub const DEFAULT_RESTART_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed,
    Cancelled,
}

/// Handle d'une tâche lancée dans un `TaskScope`.
/// Le lâcher ne l'annule pas : c'est le scope qui porte le cycle de vie.
pub struct ScheduledTask {
    label: String,
    token: CancellationToken,
    handle: JoinHandle<Result<TaskOutcome, StoreError>>,
}

impl ScheduledTask {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub async fn wait(self) -> Result<TaskOutcome, StoreError> {
        self.handle
            .await
            .map_err(|e| StoreError::Task(format!("{}: {}", self.label, e)))?
    }
}

/// Portée de tâches liée au cycle de vie d'un écran
pub struct TaskScope {
    name: String,
    token: CancellationToken,
}

impl TaskScope {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            token: CancellationToken::new(),
        }
    }

    /// Lance `body` avec un token enfant ; `body` doit surveiller le token
    pub fn spawn<F, Fut>(&self, label: &str, body: F) -> ScheduledTask
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<TaskOutcome, StoreError>> + Send + 'static,
    {
        let token = self.token.child_token();
        let handle = tokio::spawn(body(token.clone()));
        debug!("[tasks] {} spawned {}", self.name, label);
        ScheduledTask {
            label: label.to_string(),
            token,
            handle,
        }
    }

    /// Exécute `action` après `delay`, sauf annulation entre-temps
    pub fn spawn_after<F, Fut>(&self, label: &str, delay: Duration, action: F) -> ScheduledTask
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), StoreError>> + Send + 'static,
    {
        self.spawn(label, move |token| async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => Ok(TaskOutcome::Cancelled),
                _ = tokio::time::sleep(delay) => {
                    action().await?;
                    Ok(TaskOutcome::Completed)
                }
            }
        })
    }

    pub fn cancel_all(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for TaskScope {
    fn drop(&mut self) {
        if !self.token.is_cancelled() {
            debug!("[tasks] scope {} dropped, cancelling pending tasks", self.name);
            self.token.cancel();
        }
    }
}

/// Passe l'agent en "starting" tout de suite, puis "running" après `delay`
pub async fn restart_agent(
    scope: &TaskScope,
    store: &SharedStore,
    agent_id: &str,
    delay: Duration,
) -> Result<(Vec<Agent>, ScheduledTask), StoreError> {
    let agents = store.begin_restart(agent_id).await?;

    let store = Arc::clone(store);
    let id = agent_id.to_string();
    let task = scope.spawn_after("restart", delay, move || async move {
        store.finish_restart(&id).await.map(|_| ())
    });
    Ok((agents, task))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeployTiming {
    /// Intervalle entre deux pas de progression
    pub tick: Duration,
    /// Durée totale avant l'enregistrement du déploiement
    pub total: Duration,
}

impl Default for DeployTiming {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(500),
            total: Duration::from_millis(4000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployRequest {
    pub kind: DeploymentKind,
    pub environment: String,
    pub deployed_by: String,
}

impl DeployRequest {
    /// Entrée d'historique créée à la fin d'un déploiement réussi
    fn to_deployment(&self) -> NewDeployment {
        let mut rng = rand::rng();
        NewDeployment {
            name: self.kind.title().to_string(),
            status: DeploymentStatus::Success,
            duration: format!("{}m {}s", rng.random_range(2..=6), rng.random_range(0..60)),
            deployed_by: self.deployed_by.clone(),
            timestamp: OffsetDateTime::now_utc(),
            environment: self.environment.clone(),
        }
    }
}

/// Déploiement simulé en cours : progression 0-100 + tâche sous-jacente
pub struct DeploymentRun {
    task: ScheduledTask,
    progress: watch::Receiver<f64>,
}

impl DeploymentRun {
    pub fn progress(&self) -> f64 {
        *self.progress.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<f64> {
        self.progress.clone()
    }

    pub fn cancel(&self) {
        self.task.cancel();
    }

    pub async fn wait(self) -> Result<TaskOutcome, StoreError> {
        self.task.wait().await
    }
}

/// Lance un déploiement simulé : pas aléatoires (< 15%) à chaque tick, puis
/// ajout d'une entrée "success" en tête de l'historique au bout de `timing.total`
pub fn start_deployment(
    scope: &TaskScope,
    store: &SharedStore,
    request: DeployRequest,
    timing: DeployTiming,
) -> DeploymentRun {
    let (tx, rx) = watch::channel(0.0_f64);
    let store = Arc::clone(store);
    let tick = timing.tick.max(Duration::from_millis(1));

    let task = scope.spawn("deploy", move |token| async move {
        let deadline = Instant::now() + timing.total;
        let mut ticker = tokio::time::interval(tick);
        ticker.tick().await;

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    info!("[deploy] {} to {} cancelled", request.kind, request.environment);
                    return Ok(TaskOutcome::Cancelled);
                }
                _ = tokio::time::sleep_until(deadline) => break,
                _ = ticker.tick() => {
                    let step = rand::rng().random_range(0.0..15.0);
                    tx.send_modify(|progress| *progress = (*progress + step).min(100.0));
                }
            }
        }

        let deployment = request.to_deployment();
        store.add_deployment(deployment).await?;
        tx.send_replace(100.0);
        info!("[deploy] {} to {} complete", request.kind, request.environment);
        Ok(TaskOutcome::Completed)
    });

    DeploymentRun { task, progress: rx }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AgentStatus;
    use crate::store::Store;

    fn shared_store() -> SharedStore {
        Store::in_memory().into_shared()
    }

    fn fast_timing() -> DeployTiming {
        DeployTiming {
            tick: Duration::from_millis(5),
            total: Duration::from_millis(60),
        }
    }

    fn hotfix() -> DeployRequest {
        DeployRequest {
            kind: DeploymentKind::Hotfix,
            environment: "staging".into(),
            deployed_by: "Admin".into(),
        }
    }

    #[tokio::test]
    async fn test_restart_completes() {
        let store = shared_store();
        let scope = TaskScope::new("agents");

        let (agents, task) = restart_agent(&scope, &store, "4", Duration::from_millis(20))
            .await
            .unwrap();
        assert_eq!(agents[3].status, AgentStatus::Starting);

        assert_eq!(task.wait().await.unwrap(), TaskOutcome::Completed);
        let agent = store.agent("4").await.unwrap();
        assert_eq!((agent.status, agent.cpu, agent.memory), (AgentStatus::Running, 10, 20));
    }

    #[tokio::test]
    async fn test_dropped_scope_cancels_restart() {
        let store = shared_store();
        let scope = TaskScope::new("agent-detail");

        let (_, task) = restart_agent(&scope, &store, "4", Duration::from_secs(30))
            .await
            .unwrap();
        drop(scope);

        assert_eq!(task.wait().await.unwrap(), TaskOutcome::Cancelled);
        assert_eq!(store.agent("4").await.unwrap().status, AgentStatus::Starting);
    }

    #[tokio::test]
    async fn test_deployment_appends_on_completion() {
        let store = shared_store();
        let scope = TaskScope::new("deploy");

        let run = start_deployment(&scope, &store, hotfix(), fast_timing());
        let progress = run.subscribe();
        assert_eq!(run.wait().await.unwrap(), TaskOutcome::Completed);
        assert_eq!(*progress.borrow(), 100.0);

        let deployments = store.deployments().await;
        assert_eq!(deployments.len(), 4);
        assert_eq!(deployments[0].name, "Hotfix");
        assert_eq!(deployments[0].environment, "staging");
        assert_eq!(deployments[0].status, DeploymentStatus::Success);
    }

    #[tokio::test]
    async fn test_cancelled_deployment_appends_nothing() {
        let store = shared_store();
        let scope = TaskScope::new("deploy");

        let run = start_deployment(
            &scope,
            &store,
            hotfix(),
            DeployTiming {
                tick: Duration::from_millis(5),
                total: Duration::from_secs(30),
            },
        );
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(run.progress() <= 100.0);
        run.cancel();

        assert_eq!(run.wait().await.unwrap(), TaskOutcome::Cancelled);
        assert_eq!(store.deployments().await.len(), 3);
    }

    #[tokio::test]
    async fn test_cancel_all() {
        let scope = TaskScope::new("screen");
        let task = scope.spawn_after("noop", Duration::from_secs(30), || async { Ok(()) });
        assert!(!task.is_finished());
        scope.cancel_all();
        assert!(scope.is_cancelled());
        assert_eq!(task.label(), "noop");
        assert_eq!(task.wait().await.unwrap(), TaskOutcome::Cancelled);
    }
}

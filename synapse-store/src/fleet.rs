/**
 * FLEET - Opérations typées du tableau de bord sur le store local
 *
 * RÔLE : API métier utilisée par les écrans : démarrer/arrêter/redémarrer un
 * agent, marquer/écarter des alertes, ajouter un déploiement, lire métriques,
 * connexions et rôle utilisateur, effacer toutes les données.
 *
 * ARCHITECTURE : Chaque opération instancie une opération générique du store
 * (get/update/mark_all/append/remove/reset) et retourne la collection complète.
 */

use crate::backend::StoreError;
use crate::models::{
    Agent, AgentPatch, AgentStatus, Alert, AlertPatch, ApiConnection, Deployment, NewDeployment,
    SystemMetrics, UserRole,
};
use crate::store::{Patch, Store};
use tracing::info;

impl Patch<Agent> for AgentPatch {
    fn apply(&self, agent: &mut Agent) {
        if let Some(name) = &self.name {
            agent.name = name.clone();
        }
        if let Some(status) = self.status {
            agent.status = status;
        }
        if let Some(cpu) = self.cpu {
            agent.cpu = cpu.min(100);
        }
        if let Some(memory) = self.memory {
            agent.memory = memory.min(100);
        }
        if let Some(uptime) = &self.uptime {
            agent.uptime = uptime.clone();
        }
    }
}

impl Patch<Alert> for AlertPatch {
    fn apply(&self, alert: &mut Alert) {
        if let Some(read) = self.read {
            alert.read = read;
        }
    }
}

/// Valeurs appliquées par chaque transition d'agent
pub mod transitions {
    use super::*;

    pub fn start() -> AgentPatch {
        AgentPatch::transition(AgentStatus::Running, 15, 25)
    }

    pub fn stop() -> AgentPatch {
        AgentPatch::transition(AgentStatus::Stopped, 0, 0)
    }

    /// Première étape d'un redémarrage : seul le statut change
    pub fn begin_restart() -> AgentPatch {
        AgentPatch::status(AgentStatus::Starting)
    }

    pub fn finish_restart() -> AgentPatch {
        AgentPatch::transition(AgentStatus::Running, 10, 20)
    }
}

impl Store {
    // --- agents ---

    pub async fn agents(&self) -> Vec<Agent> {
        self.get().await
    }

    pub async fn agent(&self, agent_id: &str) -> Option<Agent> {
        self.agents().await.into_iter().find(|a| a.id == agent_id)
    }

    pub async fn update_agent(&self, agent_id: &str, patch: AgentPatch) -> Result<Vec<Agent>, StoreError> {
        self.update(agent_id, &patch).await
    }

    pub async fn start_agent(&self, agent_id: &str) -> Result<Vec<Agent>, StoreError> {
        let agents = self.update(agent_id, &transitions::start()).await?;
        info!("[fleet] started agent {}", agent_id);
        Ok(agents)
    }

    pub async fn stop_agent(&self, agent_id: &str) -> Result<Vec<Agent>, StoreError> {
        let agents = self.update(agent_id, &transitions::stop()).await?;
        info!("[fleet] stopped agent {}", agent_id);
        Ok(agents)
    }

    pub async fn begin_restart(&self, agent_id: &str) -> Result<Vec<Agent>, StoreError> {
        let agents = self.update(agent_id, &transitions::begin_restart()).await?;
        info!("[fleet] restarting agent {}", agent_id);
        Ok(agents)
    }

    pub async fn finish_restart(&self, agent_id: &str) -> Result<Vec<Agent>, StoreError> {
        let agents = self.update(agent_id, &transitions::finish_restart()).await?;
        info!("[fleet] agent {} back online", agent_id);
        Ok(agents)
    }

    // --- alerts ---

    pub async fn alerts(&self) -> Vec<Alert> {
        self.get().await
    }

    pub async fn mark_alert_read(&self, alert_id: &str) -> Result<Vec<Alert>, StoreError> {
        self.mark_one(alert_id, &AlertPatch::read()).await
    }

    pub async fn mark_all_alerts_read(&self) -> Result<Vec<Alert>, StoreError> {
        self.mark_all(&AlertPatch::read()).await
    }

    pub async fn dismiss_alert(&self, alert_id: &str) -> Result<Vec<Alert>, StoreError> {
        self.remove(alert_id).await
    }

    // --- deployments ---

    pub async fn deployments(&self) -> Vec<Deployment> {
        self.get().await
    }

    pub async fn add_deployment(&self, deployment: NewDeployment) -> Result<Vec<Deployment>, StoreError> {
        self.append(deployment).await
    }

    // --- read-only ---

    pub async fn metrics(&self) -> SystemMetrics {
        self.get().await
    }

    pub async fn connections(&self) -> Vec<ApiConnection> {
        self.get().await
    }

    pub async fn user_role(&self) -> UserRole {
        self.get().await
    }

    pub async fn set_user_role(&self, role: UserRole) -> Result<(), StoreError> {
        self.set(&role).await
    }

    /// Efface toutes les données locales (logout / "Clear All Data")
    pub async fn clear_all_data(&self) -> Result<(), StoreError> {
        self.reset().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AgentType, DeploymentStatus};
    use time::OffsetDateTime;

    #[tokio::test]
    async fn test_start_errored_agent() {
        let store = Store::in_memory();
        let before = store.agent("5").await.unwrap();
        assert_eq!(before.status, AgentStatus::Error);

        let agents = store.start_agent("5").await.unwrap();
        let beta = agents.iter().find(|a| a.id == "5").unwrap();
        assert_eq!(beta.status, AgentStatus::Running);
        assert_eq!(beta.cpu, 15);
        assert_eq!(beta.memory, 25);
        assert_eq!(beta.uptime, "0m");
        assert!(beta.last_updated > before.last_updated);
        assert_eq!(beta.kind, AgentType::Worker);
    }

    #[tokio::test]
    async fn test_stop_and_restart() {
        let store = Store::in_memory();
        let agents = store.stop_agent("1").await.unwrap();
        let core = &agents[0];
        assert_eq!((core.status, core.cpu, core.memory), (AgentStatus::Stopped, 0, 0));

        store.begin_restart("1").await.unwrap();
        let starting = store.agent("1").await.unwrap();
        assert_eq!(starting.status, AgentStatus::Starting);
        // le patch de début de redémarrage ne touche qu'au statut
        assert_eq!(starting.cpu, 0);

        let agents = store.finish_restart("1").await.unwrap();
        assert_eq!((agents[0].status, agents[0].cpu, agents[0].memory), (AgentStatus::Running, 10, 20));
    }

    #[tokio::test]
    async fn test_patch_clamps_percentages() {
        let store = Store::in_memory();
        let patch = AgentPatch {
            cpu: Some(250),
            ..AgentPatch::default()
        };
        let agents = store.update_agent("2", patch).await.unwrap();
        assert_eq!(agents[1].cpu, 100);
    }

    #[tokio::test]
    async fn test_alert_scenario() {
        let store = Store::in_memory();

        let alerts = store.mark_all_alerts_read().await.unwrap();
        assert_eq!(alerts.len(), 4);
        assert!(alerts.iter().all(|a| a.read));

        let alerts = store.dismiss_alert("2").await.unwrap();
        assert_eq!(alerts.len(), 3);
        assert!(alerts.iter().all(|a| a.id != "2"));
    }

    #[tokio::test]
    async fn test_mark_single_alert_read() {
        let store = Store::in_memory();
        let alerts = store.mark_alert_read("1").await.unwrap();
        assert!(alerts[0].read);
        assert!(!alerts[1].read);
    }

    #[tokio::test]
    async fn test_add_deployment_newest_first() {
        let store = Store::in_memory();
        let deployments = store
            .add_deployment(NewDeployment {
                name: "Rollback".into(),
                status: DeploymentStatus::Success,
                duration: "2m 5s".into(),
                deployed_by: "Operator".into(),
                timestamp: OffsetDateTime::now_utc(),
                environment: "development".into(),
            })
            .await
            .unwrap();
        assert_eq!(deployments.len(), 4);
        assert_eq!(deployments[0].name, "Rollback");
        assert_eq!(deployments[1].id, "1");
    }

    #[tokio::test]
    async fn test_clear_all_data_reseeds() {
        let store = Store::in_memory();
        store.stop_agent("2").await.unwrap();
        store.set_user_role(UserRole::Operator).await.unwrap();
        assert_eq!(store.user_role().await, UserRole::Operator);

        store.clear_all_data().await.unwrap();

        assert_eq!(store.agents().await, crate::seed::agents());
        assert_eq!(store.user_role().await, UserRole::Administrator);
        assert_eq!(store.metrics().await, crate::seed::metrics());
        assert_eq!(store.connections().await.len(), 4);
    }
}

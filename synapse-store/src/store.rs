/**
 * STORE LOCAL - Persistance des collections du tableau de bord
 *
 * RÔLE :
 * Propriétaire unique de la copie canonique de chaque collection (agents,
 * alertes, déploiements, métriques, connexions, rôle utilisateur).
 *
 * FONCTIONNEMENT :
 * - Une clé namespacée par collection (`@synapse/agents`...), valeur = JSON complet
 * - `get` : seed-si-vide, et repli sur le seed si la lecture échoue
 * - Mutations = lecture-modification-écriture de la collection entière,
 *   qui retournent toujours la collection à jour
 * - Un verrou async sérialise les mutations et l'écriture du seed d'une même instance
 *
 * ERREURS :
 * - lecture/désérialisation ratée -> seed (loggé, jamais propagé par `get`)
 * - écriture ratée -> StoreError propagée à l'appelant de la mutation
 * - identifiant introuvable -> no-op
 */

use crate::backend::{FileBackend, KvBackend, MemoryBackend, StoreError};
use crate::models::{Agent, Alert, ApiConnection, Deployment, NewDeployment, SystemMetrics, UserRole};
use crate::seed;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub const DEFAULT_NAMESPACE: &str = "@synapse";

/// Clés de stockage, une par collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Agents,
    Alerts,
    Deployments,
    Metrics,
    Connections,
    UserRole,
}

impl StorageKey {
    pub const ALL: [StorageKey; 6] = [
        StorageKey::Agents,
        StorageKey::Alerts,
        StorageKey::Deployments,
        StorageKey::Metrics,
        StorageKey::Connections,
        StorageKey::UserRole,
    ];

    pub fn suffix(&self) -> &'static str {
        match self {
            StorageKey::Agents => "agents",
            StorageKey::Alerts => "alerts",
            StorageKey::Deployments => "deployments",
            StorageKey::Metrics => "metrics",
            StorageKey::Connections => "connections",
            StorageKey::UserRole => "user_role",
        }
    }
}

/// Valeur persistée sous une clé, avec sa valeur par défaut
pub trait Seeded: Serialize + DeserializeOwned + Clone + Send + Sync {
    const KEY: StorageKey;

    fn seed() -> Self;
}

/// Élément d'une collection identifié par un id opaque
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync {
    const KEY: StorageKey;

    fn id(&self) -> &str;

    fn seed_collection() -> Vec<Self>;

    /// Rafraîchit l'horodatage de modification, pour les entités qui en portent un
    fn touch(&mut self, _now: OffsetDateTime) {}
}

/// Entité que l'on peut créer sans id (l'id est généré par le store)
pub trait Appendable: Entity {
    type Draft: Send;

    fn with_id(id: String, draft: Self::Draft) -> Self;
}

/// Fusion superficielle d'un patch dans une entité
pub trait Patch<E> {
    fn apply(&self, target: &mut E);
}

impl<E: Entity> Seeded for Vec<E> {
    const KEY: StorageKey = E::KEY;

    fn seed() -> Self {
        E::seed_collection()
    }
}

impl Seeded for SystemMetrics {
    const KEY: StorageKey = StorageKey::Metrics;

    fn seed() -> Self {
        seed::metrics()
    }
}

impl Seeded for UserRole {
    const KEY: StorageKey = StorageKey::UserRole;

    fn seed() -> Self {
        UserRole::default()
    }
}

impl Entity for Agent {
    const KEY: StorageKey = StorageKey::Agents;

    fn id(&self) -> &str {
        &self.id
    }

    fn seed_collection() -> Vec<Self> {
        seed::agents()
    }

    /// `last_updated` strictement croissant, même si l'horloge n'a pas avancé
    fn touch(&mut self, now: OffsetDateTime) {
        self.last_updated = if now > self.last_updated {
            now
        } else {
            self.last_updated + Duration::milliseconds(1)
        };
    }
}

impl Entity for Alert {
    const KEY: StorageKey = StorageKey::Alerts;

    fn id(&self) -> &str {
        &self.id
    }

    fn seed_collection() -> Vec<Self> {
        seed::alerts()
    }
}

impl Entity for Deployment {
    const KEY: StorageKey = StorageKey::Deployments;

    fn id(&self) -> &str {
        &self.id
    }

    fn seed_collection() -> Vec<Self> {
        seed::deployments()
    }
}

impl Appendable for Deployment {
    type Draft = NewDeployment;

    fn with_id(id: String, draft: NewDeployment) -> Self {
        Deployment {
            id,
            name: draft.name,
            status: draft.status,
            duration: draft.duration,
            deployed_by: draft.deployed_by,
            timestamp: draft.timestamp,
            environment: draft.environment,
        }
    }
}

impl Entity for ApiConnection {
    const KEY: StorageKey = StorageKey::Connections;

    fn id(&self) -> &str {
        &self.id
    }

    fn seed_collection() -> Vec<Self> {
        seed::connections()
    }
}

pub struct Store {
    backend: Arc<dyn KvBackend>,
    namespace: String,
    write_lock: Mutex<()>,
}

pub type SharedStore = Arc<Store>;

impl Store {
    pub fn new(backend: Arc<dyn KvBackend>, namespace: impl Into<String>) -> Self {
        let store = Self {
            backend,
            namespace: namespace.into(),
            write_lock: Mutex::new(()),
        };
        info!("[store] opened {} under {}", store.backend.describe(), store.namespace);
        store
    }

    /// Store fichier : un JSON par collection dans `data_dir`
    pub fn open<P: Into<PathBuf>>(data_dir: P, namespace: impl Into<String>) -> Self {
        Self::new(Arc::new(FileBackend::new(data_dir)), namespace)
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()), DEFAULT_NAMESPACE)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Clé complète, ex: "@synapse/agents"
    pub fn key(&self, key: StorageKey) -> String {
        format!("{}/{}", self.namespace, key.suffix())
    }

    pub fn into_shared(self) -> SharedStore {
        Arc::new(self)
    }

    /// Valeur persistée, ou seed écrit puis retourné si la clé est vide.
    /// Ne propage jamais d'erreur : toute lecture ratée retourne le seed.
    pub async fn get<T: Seeded>(&self) -> T {
        let _guard = self.write_lock.lock().await;
        self.get_unlocked().await
    }

    /// `get` sans prendre le verrou : l'appelant doit déjà le détenir
    async fn get_unlocked<T: Seeded>(&self) -> T {
        let key = self.key(T::KEY);
        match self.try_get::<T>().await {
            Ok(Some(value)) => value,
            Ok(None) => {
                let value = T::seed();
                match self.put(&key, &value).await {
                    Ok(()) => debug!("[store] seeded {}", key),
                    Err(e) => warn!("[store] failed to persist seed for {}: {}", key, e),
                }
                value
            }
            Err(e) => {
                warn!("[store] unreadable value for {}, using defaults: {}", key, e);
                T::seed()
            }
        }
    }

    /// Lecture sans seed : distingue "pas encore de données" de "données corrompues"
    pub async fn try_get<T: Seeded>(&self) -> Result<Option<T>, StoreError> {
        let key = self.key(T::KEY);
        let raw = match self.backend.get_item(&key).await? {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => return Ok(None),
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Corrupt { key, source })
    }

    /// Remplace entièrement une valeur persistée
    pub async fn set<T: Seeded>(&self, value: &T) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.put(&self.key(T::KEY), value).await
    }

    /// Fusionne `patch` dans l'élément `id` et rafraîchit son horodatage
    pub async fn update<E, P>(&self, id: &str, patch: &P) -> Result<Vec<E>, StoreError>
    where
        E: Entity,
        P: Patch<E> + Sync,
    {
        let _guard = self.write_lock.lock().await;
        let mut items: Vec<E> = self.get_unlocked().await;
        let Some(index) = items.iter().position(|item| item.id() == id) else {
            debug!("[store] no {} with id {}, update skipped", E::KEY.suffix(), id);
            return Ok(items);
        };
        let item = &mut items[index];
        patch.apply(item);
        item.touch(OffsetDateTime::now_utc());

        self.put(&self.key(E::KEY), &items).await?;
        Ok(items)
    }

    /// Transition d'un seul élément (alias de `update`)
    pub async fn mark_one<E, P>(&self, id: &str, patch: &P) -> Result<Vec<E>, StoreError>
    where
        E: Entity,
        P: Patch<E> + Sync,
    {
        self.update(id, patch).await
    }

    /// Applique le même patch à tous les éléments
    pub async fn mark_all<E, P>(&self, patch: &P) -> Result<Vec<E>, StoreError>
    where
        E: Entity,
        P: Patch<E> + Sync,
    {
        let _guard = self.write_lock.lock().await;
        let mut items: Vec<E> = self.get_unlocked().await;
        let now = OffsetDateTime::now_utc();
        for item in items.iter_mut() {
            patch.apply(item);
            item.touch(now);
        }

        self.put(&self.key(E::KEY), &items).await?;
        Ok(items)
    }

    /// Ajoute en tête (le plus récent d'abord) avec un id généré
    pub async fn append<E: Appendable>(&self, draft: E::Draft) -> Result<Vec<E>, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut items: Vec<E> = self.get_unlocked().await;
        let id = next_id(&items, OffsetDateTime::now_utc());
        items.insert(0, E::with_id(id.clone(), draft));

        self.put(&self.key(E::KEY), &items).await?;
        info!("[store] appended {} {}", E::KEY.suffix(), id);
        Ok(items)
    }

    pub async fn remove<E: Entity>(&self, id: &str) -> Result<Vec<E>, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut items: Vec<E> = self.get_unlocked().await;
        let initial_len = items.len();
        items.retain(|item| item.id() != id);

        if items.len() == initial_len {
            debug!("[store] no {} with id {}, remove skipped", E::KEY.suffix(), id);
            return Ok(items);
        }

        self.put(&self.key(E::KEY), &items).await?;
        info!("[store] removed {} {}", E::KEY.suffix(), id);
        Ok(items)
    }

    /// Supprime toutes les clés du namespace ; le prochain `get` re-seed
    pub async fn reset(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let keys: Vec<String> = StorageKey::ALL.iter().map(|k| self.key(*k)).collect();
        self.backend.multi_remove(&keys).await?;
        info!("[store] cleared {} keys under {}", keys.len(), self.namespace);
        Ok(())
    }

    async fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value)?;
        self.backend.set_item(key, json).await
    }
}

/// Id dérivé du timestamp en millisecondes, incrémenté jusqu'à être unique
fn next_id<E: Entity>(items: &[E], now: OffsetDateTime) -> String {
    let taken: HashSet<&str> = items.iter().map(|item| item.id()).collect();
    let mut candidate = now.unix_timestamp_nanos() / 1_000_000;
    while taken.contains(candidate.to_string().as_str()) {
        candidate += 1;
    }
    candidate.to_string()
}

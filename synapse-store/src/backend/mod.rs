/**
 * BACKENDS - Interface clé-valeur sous le store local
 *
 * RÔLE :
 * Ce module définit le contrat minimal de stockage sur lequel repose le store :
 * lire, écrire, supprimer une valeur texte sous une clé namespacée.
 *
 * FONCTIONNEMENT :
 * - KvBackend trait = interface commune (get_item/set_item/remove_item/multi_remove)
 * - FileBackend = un fichier JSON par clé dans un dossier de données
 * - MemoryBackend = HashMap en mémoire (tests, mode éphémère)
 * - StoreError = erreurs communes du backend et du store
 *
 * UTILITÉ :
 * 🎯 Le store ne connaît que des chaînes : la (dé)sérialisation reste côté store
 * 🎯 Les tests tournent sans disque via MemoryBackend
 */

mod file;
mod memory;

pub use file::FileBackend;
pub use memory::MemoryBackend;

use async_trait::async_trait;

/// Erreurs possibles lors des opérations de stockage
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("backend error: {0}")]
    Backend(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("corrupt value under {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("scheduled task failed: {0}")]
    Task(String),
}

/// Interface commune que tous les backends implémentent.
/// Toutes les valeurs sont des documents JSON sérialisés.
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// Lecture d'une valeur ; `None` si la clé n'a jamais été écrite
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Écriture complète d'une valeur (remplace l'existante)
    async fn set_item(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Suppression d'une clé ; supprimer une clé absente n'est pas une erreur
    async fn remove_item(&self, key: &str) -> Result<(), StoreError>;

    /// Suppression de plusieurs clés
    async fn multi_remove(&self, keys: &[String]) -> Result<(), StoreError> {
        for key in keys {
            self.remove_item(key).await?;
        }
        Ok(())
    }

    /// Description lisible du backend (logs)
    fn describe(&self) -> String;
}

/**
 * BACKEND MÉMOIRE - HashMap clé-valeur sans disque
 *
 * UTILITÉ : tests du store et mode `--ephemeral` de la CLI.
 * Compte les écritures pour vérifier l'idempotence du seed.
 */

use super::{KvBackend, StoreError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct MemoryBackend {
    items: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nombre de `set_item` réussis depuis la création
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    /// Texte brut stocké sous une clé
    pub fn raw(&self, key: &str) -> Option<String> {
        self.items.lock().get(key).cloned()
    }

    /// Écrit une valeur sans la compter comme écriture
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.items.lock().insert(key.to_string(), value.to_string());
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.items.lock().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.raw(key))
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.items.lock().insert(key.to_string(), value);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        self.items.lock().remove(key);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("memory ({} keys)", self.items.lock().len())
    }
}

/**
 * BACKEND FICHIER - Persistance JSON sur disque
 *
 * FONCTIONNEMENT :
 * - Un fichier par clé dans `data_dir` (ex: "@synapse/agents" -> "_synapse_agents.json")
 * - Fichier absent = clé jamais écrite
 * - Le dossier est créé à la première écriture
 */

use super::{KvBackend, StoreError};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct FileBackend {
    /// Dossier contenant un fichier JSON par clé
    data_dir: PathBuf,
}

impl FileBackend {
    pub fn new<P: Into<PathBuf>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Chemin du fichier associé à une clé
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", file_stem(key)))
    }
}

/// Remplace tout caractère hors `[A-Za-z0-9_-]` par `_`
fn file_stem(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect()
}

#[async_trait]
impl KvBackend for FileBackend {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.data_dir).await?;
        let path = self.path_for(key);
        tokio::fs::write(&path, value).await?;
        debug!("[file] wrote {}", path.display());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn describe(&self) -> String {
        format!("file:{}", self.data_dir.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("@synapse/agents"), "_synapse_agents");
        assert_eq!(file_stem("@synapse/user_role"), "_synapse_user_role");
    }

    #[tokio::test]
    async fn test_roundtrip_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("data"));

        assert_eq!(backend.get_item("@synapse/alerts").await.unwrap(), None);

        backend.set_item("@synapse/alerts", "[]".to_string()).await.unwrap();
        assert!(backend.path_for("@synapse/alerts").exists());
        assert_eq!(backend.get_item("@synapse/alerts").await.unwrap().as_deref(), Some("[]"));

        backend.remove_item("@synapse/alerts").await.unwrap();
        assert_eq!(backend.get_item("@synapse/alerts").await.unwrap(), None);

        // clé absente : pas d'erreur
        backend.remove_item("@synapse/alerts").await.unwrap();
    }
}

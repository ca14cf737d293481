use crate::api::Credentials;
use crate::errors::{AppError, Result};
use std::fs;
use std::path::{Path, PathBuf};

const CREDENTIALS_FILE: &str = "credentials.json";

/// Plain JSON credential file, `{"client_id": "...", "client_secret": "..."}`.
pub struct CredentialStore {
    storage_path: PathBuf,
}

impl CredentialStore {
    pub fn new(storage_path: PathBuf) -> Self {
        Self { storage_path }
    }

    /// Store kept next to the running executable.
    pub fn beside_executable() -> Result<Self> {
        let exe = std::env::current_exe()?;
        let dir = exe
            .parent()
            .ok_or_else(|| AppError::Io(std::io::Error::other("executable has no parent directory")))?;
        Ok(Self::new(dir.join(CREDENTIALS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.storage_path
    }

    /// Missing or malformed files read as empty credentials.
    pub fn load(&self) -> Credentials {
        if !self.storage_path.exists() {
            return Credentials::default();
        }

        match self.try_load() {
            Ok(credentials) => credentials,
            Err(e) => {
                log::warn!("Failed to load credentials from {:?}: {}", self.storage_path, e);
                Credentials::default()
            }
        }
    }

    fn try_load(&self) -> Result<Credentials> {
        let data = fs::read_to_string(&self.storage_path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Overwrites the file; failures are logged and swallowed.
    pub fn save(&self, credentials: &Credentials) {
        if let Err(e) = self.try_save(credentials) {
            log::error!("Failed to save credentials to {:?}: {}", self.storage_path, e);
        }
    }

    fn try_save(&self, credentials: &Credentials) -> Result<()> {
        let data = serde_json::to_string_pretty(credentials)?;
        fs::write(&self.storage_path, data)?;
        Ok(())
    }

    /// Persists `entered` only when it differs from `saved`. Returns whether a save happened.
    pub fn save_if_changed(&self, saved: &mut Credentials, entered: Credentials) -> bool {
        if *saved == entered {
            return false;
        }
        *saved = entered;
        self.save(saved);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_store() -> (CredentialStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = CredentialStore::new(temp_dir.path().join(CREDENTIALS_FILE));
        (store, temp_dir)
    }

    fn credentials(id: &str, secret: &str) -> Credentials {
        Credentials {
            client_id: id.to_string(),
            client_secret: secret.to_string(),
        }
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let (store, _temp) = setup_store();
        assert_eq!(store.load(), Credentials::default());
    }

    #[test]
    fn test_load_malformed_file_is_empty() {
        let (store, _temp) = setup_store();
        fs::write(store.path(), "{not json").unwrap();
        assert_eq!(store.load(), Credentials::default());
    }

    #[test]
    fn test_load_tolerates_missing_keys() {
        let (store, _temp) = setup_store();
        fs::write(store.path(), r#"{"client_id": "abc"}"#).unwrap();
        assert_eq!(store.load(), credentials("abc", ""));
    }

    #[test]
    fn test_save_then_load() {
        let (store, _temp) = setup_store();
        store.save(&credentials("id", "secret"));

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["client_id"], "id");
        assert_eq!(raw["client_secret"], "secret");
        assert_eq!(store.load(), credentials("id", "secret"));
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        let temp_dir = TempDir::new().unwrap();
        let store = CredentialStore::new(temp_dir.path().join("missing").join(CREDENTIALS_FILE));

        store.save(&credentials("id", "secret"));

        assert!(!store.path().exists());
    }

    #[test]
    fn test_save_if_changed_only_writes_on_change() {
        let (store, _temp) = setup_store();
        let mut saved = credentials("id", "secret");

        assert!(!store.save_if_changed(&mut saved, credentials("id", "secret")));
        assert!(!store.path().exists());

        assert!(store.save_if_changed(&mut saved, credentials("id", "new-secret")));
        assert_eq!(saved, credentials("id", "new-secret"));
        assert_eq!(store.load(), credentials("id", "new-secret"));
    }
}

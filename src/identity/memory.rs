//! In-memory identity store for tests and the CLI walkthrough.

use crate::biometrics::CredentialReference;
use crate::identity::{valid_label, Identity, IdentityStore};
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryIdentityStore {
    records: Mutex<HashMap<Uuid, Identity>>,
}

impl MemoryIdentityStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentityStore for MemoryIdentityStore {
    async fn fetch_by_label(&self, label: &str) -> Result<Option<Identity>> {
        let records = self.records.lock().await;
        Ok(records
            .values()
            .find(|identity| identity.name.eq_ignore_ascii_case(label))
            .cloned())
    }

    async fn create(&self, identity: Identity) -> Result<()> {
        if !valid_label(&identity.name) {
            return Err(anyhow!("Invalid profile name: {}", identity.name));
        }

        let mut records = self.records.lock().await;
        if records
            .values()
            .any(|existing| existing.name.eq_ignore_ascii_case(&identity.name))
        {
            return Err(anyhow!("Profile name already taken: {}", identity.name));
        }
        records.insert(identity.id, identity);
        Ok(())
    }

    async fn update_credential(&self, id: Uuid, credential: CredentialReference) -> Result<()> {
        let mut records = self.records.lock().await;
        let identity = records
            .get_mut(&id)
            .ok_or_else(|| anyhow!("No identity with id {id}"))?;
        identity.credential = Some(credential);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.records.lock().await.remove(&id);
        Ok(())
    }
}

//! In-memory target-app runtime for tests and `--dry-run` crawls.

use std::collections::{HashMap, HashSet};

use tokio::sync::Mutex;
use uuid::Uuid;

use hexbridge_shared::{HexbridgeError, ObjectId, Result};

use crate::runtime::VttRuntime;

/// A journal page held in memory.
#[derive(Debug, Clone)]
pub struct MemoryPage {
    pub id: String,
    pub journal_id: String,
    pub title: String,
    pub html: String,
}

#[derive(Debug, Default)]
struct State {
    /// journal name → journal id
    journals: HashMap<String, String>,
    pages: Vec<MemoryPage>,
    /// (object, scope, key) → value
    annotations: HashMap<(ObjectId, String, String), String>,
    /// Page titles whose creation should fail (test knob).
    failing_titles: HashSet<String>,
    /// When non-empty, annotation targets must be registered here.
    known_objects: HashSet<ObjectId>,
}

/// Always-ready runtime backed by plain maps.
#[derive(Debug, Default)]
pub struct MemoryVtt {
    state: Mutex<State>,
}

impl MemoryVtt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `create_page` fail for the given title.
    pub async fn fail_page_titled(&self, title: impl Into<String>) {
        self.state.lock().await.failing_titles.insert(title.into());
    }

    /// Restrict annotation writes to the given object.
    pub async fn register_object(&self, object: ObjectId) {
        self.state.lock().await.known_objects.insert(object);
    }

    pub async fn pages(&self) -> Vec<MemoryPage> {
        self.state.lock().await.pages.clone()
    }

    pub async fn annotation(&self, object: &ObjectId, scope: &str, key: &str) -> Option<String> {
        self.state
            .lock()
            .await
            .annotations
            .get(&(object.clone(), scope.to_string(), key.to_string()))
            .cloned()
    }
}

impl VttRuntime for MemoryVtt {
    async fn wait_ready(&self) -> Result<()> {
        Ok(())
    }

    async fn find_root_journal(&self, name: &str) -> Result<Option<String>> {
        Ok(self.state.lock().await.journals.get(name).cloned())
    }

    async fn create_root_journal(&self, name: &str) -> Result<String> {
        let id = Uuid::now_v7().to_string();
        self.state
            .lock()
            .await
            .journals
            .insert(name.to_string(), id.clone());
        Ok(id)
    }

    async fn create_page(&self, journal_id: &str, title: &str, html: &str) -> Result<String> {
        let mut state = self.state.lock().await;
        if state.failing_titles.contains(title) {
            return Err(HexbridgeError::target(format!(
                "failed to create page \"{title}\""
            )));
        }
        let id = Uuid::now_v7().to_string();
        state.pages.push(MemoryPage {
            id: id.clone(),
            journal_id: journal_id.to_string(),
            title: title.to_string(),
            html: html.to_string(),
        });
        Ok(id)
    }

    async fn set_annotation(
        &self,
        object: &ObjectId,
        scope: &str,
        key: &str,
        value: &str,
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.known_objects.is_empty() && !state.known_objects.contains(object) {
            return Err(HexbridgeError::target(format!(
                "no object \"{object}\" in the workspace"
            )));
        }
        state.annotations.insert(
            (object.clone(), scope.to_string(), key.to_string()),
            value.to_string(),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn annotation_is_overwritten_not_merged() {
        let vtt = MemoryVtt::new();
        let obj = ObjectId::new("tile-1");

        vtt.set_annotation(&obj, "gm-notes", "notes", "first")
            .await
            .unwrap();
        vtt.set_annotation(&obj, "gm-notes", "notes", "second")
            .await
            .unwrap();

        assert_eq!(
            vtt.annotation(&obj, "gm-notes", "notes").await.as_deref(),
            Some("second")
        );
    }

    #[tokio::test]
    async fn unknown_object_rejected_when_registry_in_use() {
        let vtt = MemoryVtt::new();
        vtt.register_object(ObjectId::new("tile-1")).await;

        let err = vtt
            .set_annotation(&ObjectId::new("tile-2"), "gm-notes", "notes", "x")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("tile-2"));
    }
}

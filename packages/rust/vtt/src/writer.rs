//! Create-entry and write-notes operations on top of a [`VttRuntime`].

use tracing::{debug, info};

use hexbridge_shared::{ObjectId, Result, TargetConfig, TargetRef};

use crate::runtime::VttRuntime;

/// Writes journal entries and notes annotations into the target app.
pub struct JournalWriter<R: VttRuntime> {
    runtime: R,
    config: TargetConfig,
}

impl<R: VttRuntime> JournalWriter<R> {
    pub fn new(runtime: R, config: TargetConfig) -> Self {
        Self { runtime, config }
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Create one journal page for an extracted location.
    ///
    /// Ensures the configured root journal exists (creating it on first
    /// use), then creates a child page and returns the stable reference
    /// encoding both identifiers.
    pub async fn create_entry(&self, title: &str, html: &str) -> Result<TargetRef> {
        self.runtime.wait_ready().await?;

        let journal_id = match self
            .runtime
            .find_root_journal(&self.config.root_journal)
            .await?
        {
            Some(id) => id,
            None => {
                info!(name = %self.config.root_journal, "root journal missing, creating it");
                self.runtime
                    .create_root_journal(&self.config.root_journal)
                    .await?
            }
        };

        let page_id = self.runtime.create_page(&journal_id, title, html).await?;
        debug!(title, %page_id, "journal page created");
        Ok(TargetRef::new(journal_id, page_id))
    }

    /// Overwrite the notes annotation on the designated object.
    ///
    /// The object is always named explicitly by the caller; nothing is
    /// inferred from the target app's current selection.
    pub async fn write_notes(&self, object: &ObjectId, label: &str, html: &str) -> Result<()> {
        self.runtime.wait_ready().await?;
        self.runtime
            .set_annotation(
                object,
                &self.config.annotation_scope,
                &self.config.annotation_key,
                html,
            )
            .await?;
        info!(%object, label, "notes annotation written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryVtt;

    fn writer() -> JournalWriter<MemoryVtt> {
        JournalWriter::new(MemoryVtt::new(), TargetConfig::default())
    }

    #[tokio::test]
    async fn create_entry_creates_root_once() {
        let writer = writer();

        let first = writer.create_entry("Tavern", "<p>a</p>").await.unwrap();
        let second = writer.create_entry("Mill", "<p>b</p>").await.unwrap();

        // Same root journal reused, distinct pages.
        assert_eq!(first.journal_id, second.journal_id);
        assert_ne!(first.page_id, second.page_id);

        let pages = writer.runtime().pages().await;
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].title, "Tavern");
    }

    #[tokio::test]
    async fn create_entry_reference_has_wire_form() {
        let writer = writer();
        let target = writer.create_entry("Tavern", "<p>a</p>").await.unwrap();
        let s = target.to_string();
        assert!(s.starts_with("JournalEntry."));
        assert!(s.contains(".JournalEntryPage."));
    }

    #[tokio::test]
    async fn create_entry_propagates_page_failure() {
        let writer = writer();
        writer.runtime().fail_page_titled("Cursed").await;

        let err = writer.create_entry("Cursed", "<p>x</p>").await.unwrap_err();
        assert!(err.to_string().contains("Cursed"));

        // Failure leaves no page behind.
        assert!(writer.runtime().pages().await.is_empty());
    }

    #[tokio::test]
    async fn write_notes_overwrites_slot() {
        let writer = writer();
        let obj = ObjectId::new("tile-1");

        writer.write_notes(&obj, "Hex 0101", "<p>v1</p>").await.unwrap();
        writer.write_notes(&obj, "Hex 0101", "<p>v2</p>").await.unwrap();

        let value = writer
            .runtime()
            .annotation(&obj, "gm-notes", "notes")
            .await;
        assert_eq!(value.as_deref(), Some("<p>v2</p>"));
    }

    #[tokio::test]
    async fn write_notes_fails_for_unknown_object() {
        let writer = writer();
        writer.runtime().register_object(ObjectId::new("tile-1")).await;

        let err = writer
            .write_notes(&ObjectId::new("ghost"), "Hex", "<p>x</p>")
            .await
            .unwrap_err();
        assert!(matches!(err, hexbridge_shared::HexbridgeError::Target(_)));
    }
}

//! The primitive operations every target-app runtime exposes.

use hexbridge_shared::{ObjectId, Result};

/// Primitive operations of the target app's in-page runtime.
///
/// The orchestrator never talks to the target app directly; it goes through
/// [`crate::JournalWriter`], which composes these primitives. Implementors
/// decide the transport (script injection, file store, in-memory fake).
#[allow(async_fn_in_trait)]
pub trait VttRuntime: Send + Sync {
    /// Wait until the runtime is initialized and accepting operations.
    ///
    /// Deliberately unbounded: the host app signals readiness exactly once,
    /// and there is no sensible recovery if it never does.
    async fn wait_ready(&self) -> Result<()>;

    /// Find the root journal container by name, if it exists.
    async fn find_root_journal(&self, name: &str) -> Result<Option<String>>;

    /// Create the root journal container, returning its identifier.
    async fn create_root_journal(&self, name: &str) -> Result<String>;

    /// Create a page under the given journal, returning the page identifier.
    async fn create_page(&self, journal_id: &str, title: &str, html: &str) -> Result<String>;

    /// Overwrite a single named annotation slot on the designated object.
    /// No merge semantics: last write wins.
    async fn set_annotation(
        &self,
        object: &ObjectId,
        scope: &str,
        key: &str,
        value: &str,
    ) -> Result<()>;
}

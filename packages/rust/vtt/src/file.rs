//! Directory-backed target-app runtime.
//!
//! Writes a journal bundle to disk: `journals.json` for the root
//! containers, one JSON document per page under `pages/`, and one JSON
//! document per annotated object under `notes/`. This is the store the
//! CLI crawls into.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hexbridge_shared::{HexbridgeError, ObjectId, Result};

use crate::runtime::VttRuntime;

/// A root journal container on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalRecord {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Page body with its content format (1 = HTML, matching the target app).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageText {
    pub content: String,
    pub format: u8,
}

/// A journal page on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    pub id: String,
    pub journal_id: String,
    pub name: String,
    pub text: PageText,
    pub created_at: DateTime<Utc>,
}

/// An annotation slot on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteRecord {
    pub object: ObjectId,
    pub scope: String,
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Target-app runtime backed by a bundle directory.
pub struct FileVtt {
    root: PathBuf,
}

impl FileVtt {
    /// Open (and create if needed) a bundle directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(root.join("pages"))
            .map_err(|e| HexbridgeError::io(root.join("pages"), e))?;
        std::fs::create_dir_all(root.join("notes"))
            .map_err(|e| HexbridgeError::io(root.join("notes"), e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn journals_path(&self) -> PathBuf {
        self.root.join("journals.json")
    }

    fn read_journals(&self) -> Result<Vec<JournalRecord>> {
        let path = self.journals_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content =
            std::fs::read_to_string(&path).map_err(|e| HexbridgeError::io(&path, e))?;
        serde_json::from_str(&content)
            .map_err(|e| HexbridgeError::parse(format!("{}: {e}", path.display())))
    }

    fn write_journals(&self, journals: &[JournalRecord]) -> Result<()> {
        let path = self.journals_path();
        let content = serde_json::to_string_pretty(journals)
            .map_err(|e| HexbridgeError::parse(e.to_string()))?;
        std::fs::write(&path, content).map_err(|e| HexbridgeError::io(&path, e))
    }

    fn write_json(&self, path: &Path, value: &impl Serialize) -> Result<()> {
        let content = serde_json::to_string_pretty(value)
            .map_err(|e| HexbridgeError::parse(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| HexbridgeError::io(path, e))
    }

    /// Read back a page record (used by the CLI to report what was written).
    pub fn read_page(&self, page_id: &str) -> Result<PageRecord> {
        let path = self.root.join("pages").join(format!("{page_id}.json"));
        let content =
            std::fs::read_to_string(&path).map_err(|e| HexbridgeError::io(&path, e))?;
        serde_json::from_str(&content)
            .map_err(|e| HexbridgeError::parse(format!("{}: {e}", path.display())))
    }
}

/// Keep object ids filesystem-safe.
fn sanitize_file_stem(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl VttRuntime for FileVtt {
    async fn wait_ready(&self) -> Result<()> {
        // A directory store is ready as soon as it is opened.
        Ok(())
    }

    async fn find_root_journal(&self, name: &str) -> Result<Option<String>> {
        Ok(self
            .read_journals()?
            .into_iter()
            .find(|j| j.name == name)
            .map(|j| j.id))
    }

    async fn create_root_journal(&self, name: &str) -> Result<String> {
        let mut journals = self.read_journals()?;
        let record = JournalRecord {
            id: Uuid::now_v7().to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        let id = record.id.clone();
        journals.push(record);
        self.write_journals(&journals)?;
        tracing::info!(name, %id, "created root journal");
        Ok(id)
    }

    async fn create_page(&self, journal_id: &str, title: &str, html: &str) -> Result<String> {
        let record = PageRecord {
            id: Uuid::now_v7().to_string(),
            journal_id: journal_id.to_string(),
            name: title.to_string(),
            text: PageText {
                content: html.to_string(),
                format: 1,
            },
            created_at: Utc::now(),
        };
        let path = self.root.join("pages").join(format!("{}.json", record.id));
        self.write_json(&path, &record)?;
        Ok(record.id)
    }

    async fn set_annotation(
        &self,
        object: &ObjectId,
        scope: &str,
        key: &str,
        value: &str,
    ) -> Result<()> {
        let record = NoteRecord {
            object: object.clone(),
            scope: scope.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            updated_at: Utc::now(),
        };
        let path = self
            .root
            .join("notes")
            .join(format!("{}.json", sanitize_file_stem(&object.0)));
        self.write_json(&path, &record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> FileVtt {
        let dir = std::env::temp_dir().join(format!("hexbridge-vtt-{}", Uuid::now_v7()));
        FileVtt::open(dir).unwrap()
    }

    #[tokio::test]
    async fn journal_created_once_and_found_after() {
        let vtt = temp_store();

        assert!(vtt.find_root_journal("World").await.unwrap().is_none());
        let id = vtt.create_root_journal("World").await.unwrap();
        assert_eq!(vtt.find_root_journal("World").await.unwrap(), Some(id));

        let _ = std::fs::remove_dir_all(vtt.root());
    }

    #[tokio::test]
    async fn page_roundtrips_through_disk() {
        let vtt = temp_store();
        let journal = vtt.create_root_journal("World").await.unwrap();
        let page_id = vtt
            .create_page(&journal, "The Tavern", "<p>Smoky.</p>")
            .await
            .unwrap();

        let record = vtt.read_page(&page_id).unwrap();
        assert_eq!(record.name, "The Tavern");
        assert_eq!(record.text.content, "<p>Smoky.</p>");
        assert_eq!(record.text.format, 1);

        let _ = std::fs::remove_dir_all(vtt.root());
    }

    #[tokio::test]
    async fn annotation_overwrites_on_disk() {
        let vtt = temp_store();
        let obj = ObjectId::new("tile/1");

        vtt.set_annotation(&obj, "gm-notes", "notes", "first")
            .await
            .unwrap();
        vtt.set_annotation(&obj, "gm-notes", "notes", "second")
            .await
            .unwrap();

        let path = vtt.root().join("notes").join("tile_1.json");
        let content = std::fs::read_to_string(path).unwrap();
        let record: NoteRecord = serde_json::from_str(&content).unwrap();
        assert_eq!(record.value, "second");

        let _ = std::fs::remove_dir_all(vtt.root());
    }
}

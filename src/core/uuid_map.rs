use crate::utils::error::Result;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Identifier translation table for lookup dialects: maps a source row UUID
/// to the identifier of the corresponding foreign dataset.
///
/// Loaded from a flat JSON object, for example:
/// `{"6ca94d69-...": "0b4c397d-...", ...}`
#[derive(Debug, Clone, Default)]
pub struct UuidMap {
    entries: HashMap<String, String>,
}

impl UuidMap {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let entries: HashMap<String, String> = serde_json::from_str(&content)?;
        info!(
            "🔗 Loaded {} identifier mappings from {}",
            entries.len(),
            path.as_ref().display()
        );
        Ok(Self { entries })
    }

    pub fn from_entries<I: IntoIterator<Item = (String, String)>>(entries: I) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Returns the mapped identifier, or `None` when the UUID has no entry.
    pub fn resolve(&self, uuid: &str) -> Option<&str> {
        self.entries.get(uuid).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

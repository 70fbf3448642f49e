//! Index entries and the serialized index file.
//!
//! An entry is the flattened projection `{ file, ...frontmatter }` of one
//! document. Resolved tooling links, when present, ride along under
//! `toolingLinks`.

use std::collections::BTreeMap;
use std::path::Path;

use quire_content::{FieldValue, Frontmatter};
use quire_core::{write_atomic, Error, Result};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Key holding the document path.
pub const FILE_KEY: &str = "file";

/// Key holding resolved tooling links.
pub const TOOLING_LINKS_KEY: &str = "toolingLinks";

/// One document in the index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct IndexEntry {
    /// Path relative to the project root, with forward slashes.
    pub file: String,
    /// Normalized frontmatter.
    pub frontmatter: Frontmatter,
    /// Canonical tool key to URL, once resolved.
    pub tooling_links: Option<BTreeMap<String, String>>,
}

impl IndexEntry {
    /// Entry for `file` with the given frontmatter.
    pub fn new(file: impl Into<String>, frontmatter: Frontmatter) -> Self {
        Self {
            file: file.into(),
            frontmatter,
            tooling_links: None,
        }
    }

    /// The document id.
    pub fn id(&self) -> &str {
        self.frontmatter.get_text("id").unwrap_or_default()
    }

    /// The document title.
    pub fn title(&self) -> &str {
        self.frontmatter.get_text("title").unwrap_or_default()
    }

    /// Topics, empty when absent.
    pub fn topics(&self) -> Vec<String> {
        self.frontmatter.get_list("topics").unwrap_or_default()
    }

    /// Scope tags, empty when absent.
    pub fn scope(&self) -> Vec<String> {
        self.frontmatter.get_list("scope").unwrap_or_default()
    }

    /// Declared version.
    pub fn version(&self) -> Option<String> {
        self.frontmatter.get("version").map(FieldValue::to_text)
    }

    /// Section keys.
    pub fn sections(&self) -> Vec<String> {
        self.frontmatter.get_list("sections").unwrap_or_default()
    }
}

impl Serialize for IndexEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let extra = usize::from(self.tooling_links.is_some());
        let mut map = serializer.serialize_map(Some(1 + self.frontmatter.len() + extra))?;
        map.serialize_entry(FILE_KEY, &self.file)?;
        for (key, value) in self.frontmatter.iter() {
            map.serialize_entry(key, value)?;
        }
        if let Some(links) = &self.tooling_links {
            map.serialize_entry(TOOLING_LINKS_KEY, links)?;
        }
        map.end()
    }
}

impl TryFrom<Map<String, Value>> for IndexEntry {
    type Error = String;

    fn try_from(map: Map<String, Value>) -> std::result::Result<Self, Self::Error> {
        let mut file = None;
        let mut tooling_links = None;
        let mut frontmatter = Frontmatter::new();

        for (key, value) in map {
            match key.as_str() {
                FILE_KEY => match value {
                    Value::String(s) => file = Some(s),
                    other => return Err(format!("`file` must be a string, got {other}")),
                },
                TOOLING_LINKS_KEY => {
                    let links: BTreeMap<String, String> = serde_json::from_value(value)
                        .map_err(|e| format!("invalid `toolingLinks`: {e}"))?;
                    tooling_links = Some(links);
                }
                _ => {
                    if let Some(value) = field_from_json(value) {
                        frontmatter.insert(key, value);
                    }
                }
            }
        }

        let file = file.ok_or_else(|| "entry without `file`".to_string())?;
        Ok(Self {
            file,
            frontmatter,
            tooling_links,
        })
    }
}

fn field_from_json(value: Value) -> Option<FieldValue> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(FieldValue::Text(s)),
        Value::Array(items) => Some(FieldValue::List(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect(),
        )),
        other => Some(FieldValue::Text(other.to_string())),
    }
}

/// The full ordered index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocsIndex {
    /// Entries ordered by ascending `file`.
    pub entries: Vec<IndexEntry>,
}

impl DocsIndex {
    /// Load an index file.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the file does not exist and `Parse` if it is
    /// not a valid index.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::not_found(path.display().to_string(), "index file"));
        }
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::parse(format!("Invalid index JSON in {}: {e}", path.display())))
    }

    /// Write the index as pretty JSON, replacing any prior content.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut content = serde_json::to_string_pretty(self)
            .map_err(|e| Error::operation(format!("Failed to serialize index: {e}")))?;
        content.push('\n');
        write_atomic(path, &content)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries.
    pub fn iter(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.iter()
    }
}

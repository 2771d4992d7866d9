use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A normalized `{name, id}` entry eligible for fuzzy matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryCandidate {
    pub name: String,
    pub id: String,
}

impl DirectoryCandidate {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

/// One page of a cursor-paginated listing. A body without `results` is not a
/// listing and fails to decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionPage {
    #[serde(rename = "results")]
    pub items: Vec<Value>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Person,
    Project,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Project => "project",
        }
    }
}

/// Shape of the records a listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordShape {
    /// Workspace user account; only `type == "person"` is eligible.
    User,
    /// Database row; its name is the title property.
    Page,
}

impl RecordShape {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Page => "page",
        }
    }
}

/// Which listing endpoint a collection pass walks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionScope {
    /// Every user of the workspace.
    People,
    /// Every row of one database.
    Database { database_id: String },
}

impl CollectionScope {
    pub fn label(&self) -> &str {
        match self {
            Self::People => "people",
            Self::Database { database_id } => database_id,
        }
    }

    /// Database rows are pages whichever field they are matched against.
    pub fn record_shape(&self) -> RecordShape {
        match self {
            Self::People => RecordShape::User,
            Self::Database { .. } => RecordShape::Page,
        }
    }
}

/// Playlist domain types and the persisted smart playlist rule tree
use super::{PlaylistId, UserId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Playlist owned by a single user
///
/// Smart playlists carry no song list; membership is computed from `rules`
/// every time the playlist is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: PlaylistId,
    pub owner_id: UserId,
    pub name: String,
    pub is_smart: bool,
    /// Groups are OR-ed together, rules inside a group are AND-ed
    pub rules: Vec<RuleGroupRecord>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a new playlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePlaylist {
    pub owner_id: UserId,
    pub name: String,
    pub is_smart: bool,
    #[serde(default)]
    pub rules: Vec<RuleGroupRecord>,
}

/// A persisted rule group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleGroupRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[serde(default)]
    pub rules: Vec<RuleRecord>,
}

impl RuleGroupRecord {
    /// Create a group without a persisted id
    pub fn new(rules: Vec<RuleRecord>) -> Self {
        Self { id: None, rules }
    }
}

/// A persisted rule, exactly as the client stored it
///
/// Nothing here is validated; `cadence-rules` turns it into a typed rule
/// or a precise error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[serde(alias = "model")]
    pub field: FieldSpec,

    pub operator: String,

    #[serde(default, alias = "value")]
    pub values: Vec<Value>,
}

impl RuleRecord {
    /// Create a rule without a persisted id
    pub fn new(field: FieldSpec, operator: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            id: None,
            field,
            operator: operator.into(),
            values,
        }
    }
}

/// Field reference as persisted: either a bare name or an inline descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldSpec {
    Name(String),
    Descriptor(FieldDescriptor),
}

impl FieldSpec {
    /// Reference a field by its bare name
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// The logical field name, whichever form was stored
    pub fn field_name(&self) -> &str {
        match self {
            FieldSpec::Name(name) => name,
            FieldSpec::Descriptor(descriptor) => &descriptor.name,
        }
    }
}

/// Inline field descriptor (name plus display hints)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

//! Field registry
//!
//! The closed set of catalogue attributes a rule may address. Each entry
//! records the value type, the unit for durations and dates, the relation
//! that has to be joined to reach the column, and whether results can be
//! ordered by it. Adding a field is one new variant plus one registry row.

use crate::error::RuleError;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value type of a field, as seen by the operator registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Text,
    Number,
    Date,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Text => "text",
            ValueType::Number => "number",
            ValueType::Date => "date",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit attached to duration and date fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Seconds,
    Days,
}

impl Unit {
    fn seconds_per_unit(self) -> f64 {
        match self {
            Unit::Seconds => 1.0,
            Unit::Days => 86_400.0,
        }
    }

    /// Length of `count` units, or `None` when the count is negative,
    /// not finite, or too large to represent.
    pub fn duration(self, count: f64) -> Option<Duration> {
        if !count.is_finite() || count < 0.0 {
            return None;
        }

        let millis = (count * self.seconds_per_unit() * 1000.0).round();
        if millis > i64::MAX as f64 {
            return None;
        }

        Duration::try_milliseconds(millis as i64)
    }
}

/// Relation joined onto `songs` to reach a field
///
/// Ordered so a `BTreeSet<Join>` renders joins in a stable order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Join {
    Album,
    Artist,
    /// Always restricted to the requesting user's rows
    Interaction,
}

/// Addressable catalogue field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    SongTitle,
    SongLength,
    SongTrack,
    SongDisc,
    SongCreatedAt,
    SongUpdatedAt,
    AlbumName,
    ArtistName,
    InteractionPlayCount,
    InteractionUpdatedAt,
}

struct FieldDef {
    field: Field,
    name: &'static str,
    aliases: &'static [&'static str],
    value_type: ValueType,
    unit: Option<Unit>,
    join: Option<Join>,
    sortable: bool,
}

// Indexed by `Field as usize`; keep in declaration order.
static REGISTRY: [FieldDef; 10] = [
    FieldDef {
        field: Field::SongTitle,
        name: "song.title",
        aliases: &["title"],
        value_type: ValueType::Text,
        unit: None,
        join: None,
        sortable: true,
    },
    FieldDef {
        field: Field::SongLength,
        name: "song.length",
        aliases: &["length"],
        value_type: ValueType::Number,
        unit: Some(Unit::Seconds),
        join: None,
        sortable: true,
    },
    FieldDef {
        field: Field::SongTrack,
        name: "song.track",
        aliases: &["track"],
        value_type: ValueType::Number,
        unit: None,
        join: None,
        sortable: true,
    },
    FieldDef {
        field: Field::SongDisc,
        name: "song.disc",
        aliases: &["disc"],
        value_type: ValueType::Number,
        unit: None,
        join: None,
        sortable: true,
    },
    FieldDef {
        field: Field::SongCreatedAt,
        name: "song.created_at",
        aliases: &["created_at"],
        value_type: ValueType::Date,
        unit: Some(Unit::Days),
        join: None,
        sortable: true,
    },
    FieldDef {
        field: Field::SongUpdatedAt,
        name: "song.updated_at",
        aliases: &["updated_at"],
        value_type: ValueType::Date,
        unit: Some(Unit::Days),
        join: None,
        sortable: true,
    },
    FieldDef {
        field: Field::AlbumName,
        name: "album.name",
        aliases: &[],
        value_type: ValueType::Text,
        unit: None,
        join: Some(Join::Album),
        sortable: true,
    },
    FieldDef {
        field: Field::ArtistName,
        name: "artist.name",
        aliases: &[],
        value_type: ValueType::Text,
        unit: None,
        join: Some(Join::Artist),
        sortable: true,
    },
    FieldDef {
        field: Field::InteractionPlayCount,
        name: "interaction.play_count",
        aliases: &["interactions.play_count"],
        value_type: ValueType::Number,
        unit: None,
        join: Some(Join::Interaction),
        sortable: true,
    },
    FieldDef {
        field: Field::InteractionUpdatedAt,
        name: "interaction.updated_at",
        aliases: &["interactions.updated_at"],
        value_type: ValueType::Date,
        unit: Some(Unit::Days),
        join: Some(Join::Interaction),
        sortable: true,
    },
];

impl Field {
    /// Resolve a canonical name or a legacy alias
    pub fn resolve(name: &str) -> Result<Self, RuleError> {
        let name = name.trim();
        REGISTRY
            .iter()
            .find(|def| def.name == name || def.aliases.contains(&name))
            .map(|def| def.field)
            .ok_or_else(|| RuleError::UnknownField(name.to_string()))
    }

    /// Every registered field, in registry order
    pub fn all() -> impl Iterator<Item = Field> {
        REGISTRY.iter().map(|def| def.field)
    }

    fn def(self) -> &'static FieldDef {
        &REGISTRY[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.def().name
    }

    pub fn value_type(self) -> ValueType {
        self.def().value_type
    }

    pub fn unit(self) -> Option<Unit> {
        self.def().unit
    }

    pub fn join(self) -> Option<Join> {
        self.def().join
    }

    /// Whether evaluation must scope this field to the requesting user
    pub fn is_user_scoped(self) -> bool {
        self.join() == Some(Join::Interaction)
    }

    pub fn is_sortable(self) -> bool {
        self.def().sortable
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the catalog, the pairing selector and the UI layer.

use serde::{Deserialize, Serialize};

/// Maximum number of tags shown on a card
pub const MAX_DISPLAY_TAGS: usize = 3;

/// The two mutually exclusive roles every actor belongs to
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 攻方
    Alpha,
    /// 受方
    Omega,
}

impl Role {
    /// Both roles, in display order
    pub const ALL: [Role; 2] = [Role::Alpha, Role::Omega];

    /// Card and column heading
    pub fn title(self) -> &'static str {
        match self {
            Role::Alpha => "攻方 (Alpha)",
            Role::Omega => "受方 (Omega)",
        }
    }

    /// Accent color as a hex string (no leading '#')
    /// Used by the generated placeholder portraits.
    pub fn accent_hex(self) -> &'static str {
        match self {
            Role::Alpha => "409eff",
            Role::Omega => "f56c6c",
        }
    }
}

/// A single actor in the roster
///
/// Actors are immutable once the catalog is loaded.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Actor {
    /// Display name (unique within its role by convention)
    pub name: String,
    /// Search query used for the portrait, when it differs from the name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_query: Option<String>,
    /// Short labels, most significant first
    #[serde(default)]
    pub tags: Vec<String>,
    /// Fixed at creation
    pub role: Role,
}

impl Actor {
    /// The query the portrait lookup is keyed on
    pub fn photo_query(&self) -> &str {
        self.photo_query.as_deref().unwrap_or(&self.name)
    }

    /// The first few tags, as shown on a card
    pub fn display_tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().take(MAX_DISPLAY_TAGS).map(String::as_str)
    }

    /// The tag shown under the name in the roster
    pub fn headline_tag(&self) -> Option<&str> {
        self.tags.first().map(String::as_str)
    }
}

/// Identity of an actor inside the catalog: its role and its position
/// within that role's partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActorId {
    pub role: Role,
    pub index: usize,
}

impl ActorId {
    pub fn new(role: Role, index: usize) -> Self {
        Self { role, index }
    }
}

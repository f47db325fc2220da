use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declares a string-backed identifier.
///
/// Identifiers are plain strings on the wire because the narrator
/// collaborator invents them ("npc_blacksmith", "loc_old_mill"). Ids the
/// engine creates itself come from [`generate`](LocationId::generate).
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Prefix used for generated ids of this kind.
            pub const PREFIX: &'static str = $prefix;

            /// Wrap an existing identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a fresh random identifier, e.g. `npc_3f2a9c01b7d4`.
            pub fn generate() -> Self {
                let hex = Uuid::new_v4().simple().to_string();
                Self(format!("{}_{}", $prefix, &hex[..12]))
            }

            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Identifier of a [`Location`](crate::location::Location).
    LocationId,
    "loc"
);
string_id!(
    /// Identifier of an [`Npc`](crate::npc::Npc).
    NpcId,
    "npc"
);
string_id!(
    /// Identifier of a [`WorldItem`](crate::item::WorldItem).
    ItemId,
    "item"
);
string_id!(
    /// Identifier of a [`Quest`](crate::quest::Quest).
    QuestId,
    "quest"
);
string_id!(
    /// Identifier of a [`Faction`](crate::faction::Faction).
    FactionId,
    "faction"
);

//! Enumerated Azure settings used by the resource constructors.
//!
//! Each value object knows its wire spelling (`as_str`) and parses the same
//! spelling case-insensitively, so stack config can name them freely.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{error::DomainError, input::Input};

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $what:literal {
            $( $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$name> for Input {
            fn from(value: $name) -> Self {
                Input::from(value.as_str())
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| DomainError::InvalidConfig {
                        key: $what.into(),
                        reason: format!(
                            "'{}' is not one of: {}",
                            s,
                            Self::ALL.iter().map(|v| v.as_str()).collect::<Vec<_>>().join(", ")
                        ),
                    })
            }
        }
    };
}

wire_enum! {
    /// Storage account SKU.
    SkuName, "sku" {
        StandardLrs => "Standard_LRS",
        StandardGrs => "Standard_GRS",
        StandardRagrs => "Standard_RAGRS",
        StandardZrs => "Standard_ZRS",
        PremiumLrs => "Premium_LRS",
    }
}

wire_enum! {
    /// Storage account kind.
    StorageKind, "kind" {
        Storage => "Storage",
        StorageV2 => "StorageV2",
        BlobStorage => "BlobStorage",
        BlockBlobStorage => "BlockBlobStorage",
        FileStorage => "FileStorage",
    }
}

wire_enum! {
    /// Cosmos DB offer type. Azure only offers `Standard`.
    DatabaseAccountOfferType, "offer_type" {
        Standard => "Standard",
    }
}

wire_enum! {
    /// Cosmos DB default consistency level.
    DefaultConsistencyLevel, "consistency_level" {
        Eventual => "Eventual",
        Session => "Session",
        BoundedStaleness => "BoundedStaleness",
        Strong => "Strong",
        ConsistentPrefix => "ConsistentPrefix",
    }
}

wire_enum! {
    /// Container partition key kind.
    PartitionKind, "partition_kind" {
        Hash => "Hash",
        Range => "Range",
        MultiHash => "MultiHash",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_spelling_round_trips_case_insensitively() {
        assert_eq!(SkuName::from_str("standard_lrs").unwrap(), SkuName::StandardLrs);
        assert_eq!(StorageKind::from_str("StorageV2").unwrap(), StorageKind::StorageV2);
        assert_eq!(
            DefaultConsistencyLevel::from_str("SESSION").unwrap(),
            DefaultConsistencyLevel::Session
        );
    }

    #[test]
    fn unknown_spelling_lists_choices() {
        let err = PartitionKind::from_str("Spiral").unwrap_err();
        match err {
            DomainError::InvalidConfig { key, reason } => {
                assert_eq!(key, "partition_kind");
                assert!(reason.contains("Hash"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn serde_uses_wire_spelling() {
        let json = serde_json::to_string(&SkuName::StandardLrs).unwrap();
        assert_eq!(json, "\"Standard_LRS\"");
    }
}

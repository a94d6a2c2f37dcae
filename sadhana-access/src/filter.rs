//! Data-access filters
//!
//! A declarative restriction for a downstream data layer. The engine never
//! touches storage; it only states which records a role may see, and the
//! data layer translates that into its own query language.

use serde::{Deserialize, Serialize};

/// Record visibility classes used by the filter model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Followers,
    Private,
}

/// Declarative restriction on which records an actor may see
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataFilter {
    /// No restriction at all
    Unrestricted,
    /// Records the actor owns, or records with one of the listed visibilities
    OwnedOrVisible {
        owner_id: String,
        visible: Vec<Visibility>,
    },
    /// Only records with exactly this visibility
    Visible { visibility: Visibility },
    /// No records at all
    MatchNothing,
}

impl DataFilter {
    /// Evaluate the filter against one record's ownership and visibility.
    ///
    /// This is the in-process counterpart of handing the filter to a data
    /// layer; both must agree on these semantics.
    pub fn permits(&self, record_owner_id: &str, visibility: Visibility) -> bool {
        match self {
            DataFilter::Unrestricted => true,
            DataFilter::OwnedOrVisible { owner_id, visible } => {
                record_owner_id == owner_id || visible.contains(&visibility)
            }
            DataFilter::Visible { visibility: required } => visibility == *required,
            DataFilter::MatchNothing => false,
        }
    }

    /// True if the filter can never match any record
    pub fn is_empty(&self) -> bool {
        matches!(self, DataFilter::MatchNothing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrestricted_permits_everything() {
        let filter = DataFilter::Unrestricted;
        assert!(filter.permits("anyone", Visibility::Private));
    }

    #[test]
    fn test_owned_or_visible() {
        let filter = DataFilter::OwnedOrVisible {
            owner_id: "u1".to_string(),
            visible: vec![Visibility::Public, Visibility::Followers],
        };
        assert!(filter.permits("u1", Visibility::Private));
        assert!(filter.permits("u2", Visibility::Public));
        assert!(filter.permits("u2", Visibility::Followers));
        assert!(!filter.permits("u2", Visibility::Private));
    }

    #[test]
    fn test_match_nothing_matches_zero_records() {
        let filter = DataFilter::MatchNothing;
        assert!(!filter.permits("u1", Visibility::Public));
        assert!(!filter.permits("u1", Visibility::Private));
        assert!(filter.is_empty());
    }

    #[test]
    fn test_serializes_for_the_data_layer() {
        let filter = DataFilter::Visible {
            visibility: Visibility::Public,
        };
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(json["kind"], "visible");
    }
}

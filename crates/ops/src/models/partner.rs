//! Delivery partner documents.

use bson::{Document, doc};
use serde::{Deserialize, Serialize};

use quickdrop_core::{GeoPoint, PartnerId};

/// A delivery partner (tasks are read separately, as raw documents).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partner {
    #[serde(rename = "_id")]
    pub id: PartnerId,
    pub name: String,
    pub location: GeoPoint,
}

/// How a partner is looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartnerSelector {
    Id(PartnerId),
    Name(String),
}

impl PartnerSelector {
    /// Build a selector from optional CLI-style inputs; the id wins when both
    /// are given.
    #[must_use]
    pub fn from_parts(id: Option<PartnerId>, name: Option<String>) -> Option<Self> {
        id.map(Self::Id).or_else(|| name.map(Self::Name))
    }

    /// Filter matching the selected partner.
    #[must_use]
    pub fn filter(&self) -> Document {
        match self {
            Self::Id(id) => doc! { "_id": id.as_str() },
            Self::Name(name) => doc! { "name": name.as_str() },
        }
    }
}

impl std::fmt::Display for PartnerSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id {id}"),
            Self::Name(name) => write!(f, "name {name:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_prefers_id() {
        let selector =
            PartnerSelector::from_parts(Some(PartnerId::new("p1")), Some("Joseph Jones".into()));
        assert_eq!(selector, Some(PartnerSelector::Id(PartnerId::new("p1"))));
    }

    #[test]
    fn test_selector_falls_back_to_name() {
        let selector = PartnerSelector::from_parts(None, Some("Joseph Jones".into()));
        assert_eq!(
            selector.map(|s| s.filter()),
            Some(doc! { "name": "Joseph Jones" })
        );
    }

    #[test]
    fn test_selector_requires_one_part() {
        assert_eq!(PartnerSelector::from_parts(None, None), None);
    }
}

//! Customer documents.

use bson::{Bson, Document};
use serde::{Deserialize, Serialize};

use quickdrop_core::{CustomerId, GeoPoint};

/// A customer, as much of it as the queries read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(rename = "_id")]
    pub id: CustomerId,
    #[serde(default)]
    pub name: Option<String>,
    pub location: GeoPoint,
    #[serde(default)]
    pub default_addresses: Option<DefaultAddresses>,
}

impl Customer {
    /// The shipping address flattened to one line, or an empty string when
    /// the customer has none on file.
    #[must_use]
    pub fn shipping_address(&self) -> String {
        self.default_addresses
            .as_ref()
            .map(|a| join_address(&a.shipping))
            .unwrap_or_default()
    }
}

/// Default addresses kept on the customer document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultAddresses {
    /// Address parts (`street`, `city`, `postcode`, ...) in stored order.
    #[serde(default)]
    pub shipping: Document,
    #[serde(default)]
    pub billing: Option<Document>,
}

/// Join the values of an address sub-document with `", "`, keeping field
/// order. Non-string scalars are rendered, nested values skipped.
#[must_use]
pub fn join_address(parts: &Document) -> String {
    parts
        .values()
        .filter_map(|v| match v {
            Bson::String(s) => Some(s.clone()),
            Bson::Int32(i) => Some(i.to_string()),
            Bson::Int64(i) => Some(i.to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bson::doc;

    use super::*;

    #[test]
    fn test_join_address_keeps_order() {
        let parts = doc! {
            "houseNumber": "049",
            "street": "Jay crest",
            "city": "Manchester",
            "postcode": "M70ND",
        };
        assert_eq!(join_address(&parts), "049, Jay crest, Manchester, M70ND");
    }

    #[test]
    fn test_join_address_skips_nested() {
        let parts = doc! { "street": "Helen parkways", "geo": { "lat": 1.0 }, "flat": 7 };
        assert_eq!(join_address(&parts), "Helen parkways, 7");
    }

    #[test]
    fn test_customer_decodes_and_formats_address() {
        let customer: Customer = bson::from_document(doc! {
            "_id": "0d4a13c3",
            "name": "Ada",
            "location": { "type": "Point", "coordinates": [-2.24, 53.48] },
            "defaultAddresses": {
                "shipping": { "street": "7, Helen parkways", "city": "Manchester", "postcode": "M217W" }
            },
            "currentOrders": [],
        })
        .unwrap();

        assert_eq!(customer.id.as_str(), "0d4a13c3");
        assert_eq!(
            customer.shipping_address(),
            "7, Helen parkways, Manchester, M217W"
        );
    }

    #[test]
    fn test_customer_without_addresses() {
        let customer: Customer = bson::from_document(doc! {
            "_id": "c1",
            "location": { "type": "Point", "coordinates": [0.0, 0.0] },
        })
        .unwrap();
        assert_eq!(customer.shipping_address(), "");
    }
}

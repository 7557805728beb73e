//! Domain models decoded from (and encoded into) MongoDB documents.
//!
//! Stored field names are camelCase (`totalOrderCost`, `productID`); the
//! structs here use snake_case and map with serde attributes.

pub mod customer;
pub mod order;
pub mod partner;
pub mod product;
pub mod report;
pub mod store;

pub use customer::{Customer, DefaultAddresses};
pub use order::{
    AssignedItem, AssignedOrder, Assignment, NewDeliveryTask, NewOrder, OrderLine, PartyDetails,
    PlacedOrder, PlacedOrderItem, StoreRef, TaskItem,
};
pub use partner::{Partner, PartnerSelector};
pub use product::{Product, ProductListing};
pub use report::{
    FrequencyStat, InventoryPivot, InventoryPoint, LowInventoryItem, ProductStats, RatedProduct,
    RatingRefresh, SalesLine, StoreStock,
};
pub use store::{InventoryEntry, Store};

/// Lenient decoders for values whose BSON type varies between documents.
pub(crate) mod lenient {
    use bson::Bson;
    use chrono::{NaiveDate, Utc};
    use serde::{Deserialize, Deserializer};

    /// Decode any BSON number (or null as 0) as an `i64`, rounding doubles.
    ///
    /// Aggregation arithmetic may promote integers to `long` or `double`.
    pub fn whole_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Bson::deserialize(deserializer)?;
        number_to_i64(&value).ok_or_else(|| {
            serde::de::Error::custom(format!("expected a number, got {:?}", value.element_type()))
        })
    }

    /// Decode an optional number as `f64`.
    pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Bson>::deserialize(deserializer)?;
        Ok(match value {
            Some(Bson::Double(f)) => Some(f),
            Some(Bson::Int32(i)) => Some(f64::from(i)),
            #[allow(clippy::cast_precision_loss)]
            Some(Bson::Int64(i)) => Some(i as f64),
            _ => None,
        })
    }

    /// Decode a date that may be stored as a string or a BSON datetime into
    /// a `YYYY-MM-DD` label. RFC 3339 timestamps in strings are cut to
    /// their UTC day; other strings are kept as they are.
    pub fn date_label<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Bson::deserialize(deserializer)?;
        Ok(match value {
            Bson::String(s) => chrono::DateTime::parse_from_rfc3339(&s)
                .map_or(s, |at| day_label(at.with_timezone(&Utc).date_naive())),
            Bson::DateTime(dt) => day_label(dt.to_chrono().date_naive()),
            Bson::Null => String::new(),
            other => other.to_string(),
        })
    }

    fn day_label(day: NaiveDate) -> String {
        day.format("%Y-%m-%d").to_string()
    }

    pub(crate) fn number_to_i64(value: &Bson) -> Option<i64> {
        match value {
            Bson::Int32(i) => Some(i64::from(*i)),
            Bson::Int64(i) => Some(*i),
            #[allow(clippy::cast_possible_truncation)]
            Bson::Double(f) if f.is_finite() => Some(f.round() as i64),
            Bson::Null => Some(0),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bson::{Bson, doc};
    use serde::Deserialize;

    use super::lenient;

    #[derive(Debug, Deserialize)]
    struct Amount {
        #[serde(deserialize_with = "lenient::whole_number")]
        value: i64,
    }

    #[derive(Debug, Deserialize)]
    struct Dated {
        #[serde(deserialize_with = "lenient::date_label")]
        date: String,
    }

    #[test]
    fn test_whole_number_accepts_any_number() {
        for (raw, expected) in [
            (Bson::Int32(650), 650),
            (Bson::Int64(27_260), 27_260),
            (Bson::Double(420.0), 420),
            (Bson::Null, 0),
        ] {
            let parsed: Amount = bson::from_document(doc! { "value": raw }).unwrap();
            assert_eq!(parsed.value, expected);
        }
    }

    #[test]
    fn test_whole_number_rejects_strings() {
        let result = bson::from_document::<Amount>(doc! { "value": "650" });
        assert!(result.is_err());
    }

    #[test]
    fn test_date_label_from_string_and_datetime() {
        let parsed: Dated = bson::from_document(doc! { "date": "2023-12-01" }).unwrap();
        assert_eq!(parsed.date, "2023-12-01");

        let dt = bson::DateTime::from_millis(1_701_388_800_000); // 2023-12-01T00:00:00Z
        let parsed: Dated = bson::from_document(doc! { "date": dt }).unwrap();
        assert_eq!(parsed.date, "2023-12-01");
    }

    #[test]
    fn test_date_label_cuts_timestamps_to_utc_day() {
        let parsed: Dated =
            bson::from_document(doc! { "date": "2023-12-01T23:30:00-02:00" }).unwrap();
        assert_eq!(parsed.date, "2023-12-02");

        let parsed: Dated = bson::from_document(doc! { "date": "week 48" }).unwrap();
        assert_eq!(parsed.date, "week 48");
    }
}

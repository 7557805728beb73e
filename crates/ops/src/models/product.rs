//! Product catalogue documents.

use serde::{Deserialize, Serialize};

use quickdrop_core::ProductId;

use super::lenient;

/// A catalogue product, as much of it as order enrichment reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(deserialize_with = "lenient::whole_number")]
    pub std_price: i64,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub avg_rating_score: Option<f64>,
}

/// A fresh product found near a customer, one per store inventory line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListing {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub country_of_origin: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub dimensions: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient::whole_number")]
    pub price: i64,
    /// Distance from the customer to the stocking store, in metres.
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub distance_m: Option<f64>,
}

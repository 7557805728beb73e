//! Rating repository and the `tempAvgRatings` scratch collection.

use bson::{Bson, Document, doc};
use mongodb::{Collection, Database};
use serde::Deserialize;

use super::{RepositoryError, collect_as, collections};

/// Repository for product ratings.
pub struct RatingRepository<'a> {
    db: &'a Database,
}

/// Average score of one product, as written to the scratch collection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AverageRating {
    #[serde(rename = "_id")]
    pub product_id: Bson,
    #[serde(rename = "avgRating", default)]
    pub avg_rating: Option<f64>,
}

impl<'a> RatingRepository<'a> {
    /// Create a new rating repository.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<Document> {
        self.db.collection(collections::RATINGS)
    }

    fn scratch(&self) -> Collection<Document> {
        self.db.collection(collections::TEMP_AVG_RATINGS)
    }

    /// Average every product's scores into `tempAvgRatings`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the aggregation fails.
    pub async fn merge_averages(&self) -> Result<(), RepositoryError> {
        // $merge writes nothing back; the cursor is empty.
        self.collection().aggregate(average_pipeline()).await?;
        Ok(())
    }

    /// Read the averages from `tempAvgRatings`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn read_averages(&self) -> Result<Vec<AverageRating>, RepositoryError> {
        let cursor = self.scratch().find(doc! {}).await?;
        collect_as(cursor).await
    }

    /// Drop `tempAvgRatings`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the drop fails.
    pub async fn drop_averages(&self) -> Result<(), RepositoryError> {
        self.scratch().drop().await?;
        Ok(())
    }
}

pub(crate) fn average_pipeline() -> Vec<Document> {
    vec![
        doc! { "$group": { "_id": "$productID", "avgRating": { "$avg": "$score" } } },
        doc! {
            "$merge": {
                "into": collections::TEMP_AVG_RATINGS,
                "on": "_id",
                "whenMatched": "replace",
                "whenNotMatched": "insert",
            }
        },
    ]
}

//! Integration tests for QuickDrop.
//!
//! Every test seeds its own database from the workspace `fixtures/`
//! directory and drops it afterwards, so tests can run in parallel against
//! one server.
//!
//! # Running Tests
//!
//! ```bash
//! # Start a local server
//! docker run -d -p 27017:27017 mongo:7
//!
//! # Run the ignored tests
//! MONGODB_URI=mongodb://localhost:27017 cargo test -p quickdrop-integration-tests -- --ignored
//! ```

use std::path::PathBuf;
use std::time::Duration;

use mongodb::Database;
use secrecy::SecretString;

use quickdrop_ops::OpsConfig;
use quickdrop_ops::db;
use quickdrop_ops::seed::{SeedManifest, SeedReport, seed_from_manifest};

/// Used when `MONGODB_URI` is not set.
pub const DEFAULT_TEST_URI: &str = "mongodb://localhost:27017";

/// Ids from the fixture data.
pub mod ids {
    pub const ADA: &str = "0d4a13c3-c9ef-40f2-8516-58de00809364";
    pub const SAM: &str = "5f8e2a1b-7d3c-4b9e-a6f0-1c2d3e4f5a6b";

    pub const JOSEPH_JONES: &str = "74426dcf-2b1e-4c8a-9f3d-6e5a4b3c2d1e";
    pub const PRIYA_SHAH: &str = "a1b2c3d4-e5f6-4a7b-8c9d-0e1f2a3b4c5d";

    pub const APPLES: &str = "0b9923f0-6f51-4cfa-ac52-3367409a57a4";
    pub const MUSHROOMS: &str = "345d1a0e-a274-44fe-875c-901a5d01bedc";
    pub const MILK: &str = "7c1f3b7e-52a4-4d1e-9b1a-5d0c8e2f6a11";
    pub const KETTLE: &str = "9e2d4c6a-1b3f-4a5e-8c7d-2f1e0a9b8c76";
    pub const RICE: &str = "b4a8e1d2-3c5f-4e6a-9b7c-8d0f1e2a3b4c";
}

/// The workspace fixture directory.
#[must_use]
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../fixtures")
}

/// Configuration pointing at a per-test database.
#[must_use]
pub fn test_config(database: &str, chart_dir: PathBuf) -> OpsConfig {
    let uri = std::env::var("MONGODB_URI").unwrap_or_else(|_| DEFAULT_TEST_URI.to_string());
    OpsConfig {
        mongodb_uri: SecretString::from(uri),
        database: format!("quickdrop_test_{database}"),
        fixtures_dir: fixtures_dir(),
        chart_dir,
        server_selection_timeout: Duration::from_secs(5),
        courier_speed_kmph: 30.0,
    }
}

/// A seeded database plus a scratch directory for charts.
pub struct TestContext {
    pub config: OpsConfig,
    pub db: Database,
    pub seeded: SeedReport,
    pub chart_dir: tempfile::TempDir,
}

impl TestContext {
    /// Connect to `quickdrop_test_<name>` and reload every fixture.
    ///
    /// # Panics
    ///
    /// Panics if the server is unreachable or seeding fails.
    pub async fn seeded(name: &str) -> Self {
        let chart_dir = tempfile::tempdir().expect("Failed to create chart dir");
        let config = test_config(name, chart_dir.path().to_path_buf());
        let db = db::connect(&config).await.expect("Failed to connect");
        let seeded = seed_from_manifest(&db, &config.fixtures_dir, &SeedManifest::default())
            .await
            .expect("Failed to seed fixtures");
        Self {
            config,
            db,
            seeded,
            chart_dir,
        }
    }

    /// Drop the test database.
    pub async fn cleanup(self) {
        let _ = self.db.drop().await;
    }
}

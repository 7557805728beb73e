//! Connectivity check and fixture seeding.

use std::path::{Path, PathBuf};

use tracing::info;

use quickdrop_ops::db;
use quickdrop_ops::seed::{SeedManifest, seed_from_manifest};

use super::{Context, print_json};

/// Ping the server.
///
/// # Errors
///
/// Returns an error if no server answers within the selection timeout.
pub async fn ping(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    db::ping(&ctx.db).await?;
    info!("Server reachable");
    print_json(&serde_json::json!({ "ok": true, "database": ctx.config.database }))
}

/// Drop and reload the manifest's collections.
///
/// # Errors
///
/// Returns an error if the manifest or a fixture cannot be read, or a
/// database operation fails.
pub async fn seed(
    ctx: &Context,
    manifest: Option<&Path>,
    fixtures_dir: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let manifest = match manifest {
        Some(path) => {
            info!(path = %path.display(), "Loading seed manifest");
            SeedManifest::load(path).await?
        }
        None => SeedManifest::default(),
    };
    let fixtures_dir = fixtures_dir.unwrap_or_else(|| ctx.config.fixtures_dir.clone());

    let report = seed_from_manifest(&ctx.db, &fixtures_dir, &manifest).await?;
    print_json(&report)
}

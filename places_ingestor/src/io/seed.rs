//! Bootstrap input for first runs.

use std::path::Path;

use tracing::warn;

/// Minimal provider list written when a run has no input file yet.
pub const SEED_PROVIDERS_CSV: &str = "\
provider_id,display_name,category,website,phone
p1,Revival PT,Rehabilitation,https://revivalpt.net,612-605-7594
p2,Twin Cities Nutritionists,Nutrition,https://twincitiesnutritionist.com/,612-202-8703
p3,MN Fat Loss,Weight Loss,https://mnfatloss.com/,(763)710-7499
";

/// Writes [`SEED_PROVIDERS_CSV`] to `path` unless a file already exists there.
///
/// Returns `true` if the seed was written.
pub fn seed_providers_if_missing(path: &Path) -> std::io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    warn!(path = %path.display(), "provider file not found; writing seed list");
    std::fs::write(path, SEED_PROVIDERS_CSV)?;
    Ok(true)
}

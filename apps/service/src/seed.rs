use tracing::{debug, info, warn};

use crate::config::SeedTarget;
use crate::database::{StoreError, TargetStore};
use crate::error::MonitorResult;

/// Create each default target whose URL is not stored yet and return how
/// many were added. Entries without a URL, with invalid input or with a
/// name already in use are skipped; only store failures abort the run.
pub async fn seed_defaults(
    store: &dyn TargetStore,
    defaults: &[SeedTarget],
) -> MonitorResult<usize> {
    let mut added = 0;

    for seed in defaults {
        let Some(target) = seed.to_new_target() else {
            debug!("No URL configured for default API {}, skipping", seed.name);
            continue;
        };

        if store.find_by_url(&target.url).await?.is_some() {
            info!("API already exists: {}", seed.name);
            continue;
        }

        if let Err(e) = target.validate() {
            warn!("Skipping default API {} ({}): {}", seed.name, target.url, e);
            continue;
        }

        let url = target.url.clone();
        match store.create(target).await {
            Ok(_) => {
                info!("Added default API: {} ({})", seed.name, url);
                added += 1;
            }
            Err(StoreError::DuplicateName(name)) => {
                warn!("Skipping default API {}: the name is already used by another API", name);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(added)
}

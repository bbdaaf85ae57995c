//! Routing table counter collection.

use tracing::{error, warn};

use crate::api::RouterApi;
use crate::descriptors::{RIB_ACCEPTED_PATHS, RIB_TOTAL_DESTINATIONS, RIB_TOTAL_PATHS};
use crate::family::{AddressFamily, TableType};
use crate::metric::Metric;
use crate::node::ErrorCounter;

const DEFAULT_VRF: &str = "default";

/// Query every (table type, family) pair and build three metrics per answer.
///
/// A failed query is counted and skips only its own pair. An empty answer is
/// logged and skipped without being counted.
pub async fn collect(
    api: &dyn RouterApi,
    families: &[AddressFamily],
    errors: &ErrorCounter,
) -> Vec<Metric> {
    let mut metrics = Vec::with_capacity(TableType::ALL.len() * families.len() * 3);

    for table in TableType::ALL {
        for &family in families {
            match api.get_table_counters(table, family).await {
                Ok(Some(counters)) => {
                    let labels = || {
                        [
                            table.as_str().to_string(),
                            family.as_str().to_string(),
                            DEFAULT_VRF.to_string(),
                        ]
                    };
                    metrics.push(
                        RIB_TOTAL_DESTINATIONS.metric(counters.destinations as f64, labels()),
                    );
                    metrics.push(RIB_TOTAL_PATHS.metric(counters.paths as f64, labels()));
                    metrics.push(RIB_ACCEPTED_PATHS.metric(counters.accepted as f64, labels()));
                }
                Ok(None) => {
                    warn!(table = %table, family = %family, "GoBGP returned no table counters");
                }
                Err(e) => {
                    errors.increment();
                    error!(
                        table = %table,
                        family = %family,
                        error = %e,
                        "GoBGP table query failed"
                    );
                }
            }
        }
    }

    metrics
}

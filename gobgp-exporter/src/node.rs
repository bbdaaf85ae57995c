//! Collection engine for a single GoBGP router.
//!
//! A [`RouterNode`] owns one [`RouterApi`] connection and a metric snapshot.
//! [`RouterNode::gather_metrics`] refreshes the snapshot at most once per poll
//! interval; concurrent scrapes inside the interval are served from the
//! snapshot of the last cycle.
//!
//! The cycle holds the write half of a [`tokio::sync::RwLock`] for its whole
//! duration, so readers only ever see a complete snapshot. Connectivity and
//! result status live behind a separate short-lived lock and the error
//! counter is a plain atomic, so neither waits for metric assembly.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::{SecondsFormat, Utc};
use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::address::RouterAddress;
use crate::api::{GobgpClient, RouterApi};
use crate::config::GobgpConfig;
use crate::descriptors::{
    ROUTER_ASN, ROUTER_ERRORS, ROUTER_ID, ROUTER_NEXT_POLL, ROUTER_SCRAPE_TIME, ROUTER_UP,
};
use crate::error::Result;
use crate::family::AddressFamily;
use crate::metric::{self, Metric};
use crate::{peers, rib};

/// Latest instant used when the poll interval does not fit the clock.
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 86_400);

fn next_collection_at(now: Instant, poll_interval: Duration) -> Instant {
    now.checked_add(poll_interval)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

/// Monotonic count of failed remote requests.
#[derive(Debug, Default)]
pub struct ErrorCounter(AtomicU64);

impl ErrorCounter {
    pub fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Outcome of the most recent collection cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollectionResult {
    #[default]
    Unknown,
    Success,
    Failure,
}

impl CollectionResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionResult::Unknown => "unknown",
            CollectionResult::Success => "success",
            CollectionResult::Failure => "failure",
        }
    }
}

impl fmt::Display for CollectionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connectivity and last-result view of a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeStatus {
    pub connected: bool,
    pub result: CollectionResult,
    /// RFC 3339 time of the last completed cycle.
    pub timestamp: Option<String>,
}

#[derive(Debug, Default)]
struct CycleState {
    metrics: Vec<Metric>,
    router_id: String,
    local_asn: u32,
    next_collection: Option<Instant>,
}

/// One remote router and its cached metric snapshot.
pub struct RouterNode {
    address: RouterAddress,
    api: Arc<dyn RouterApi>,
    families: Vec<AddressFamily>,
    poll_interval: Duration,
    cycle: RwLock<CycleState>,
    errors: ErrorCounter,
    status: parking_lot::RwLock<NodeStatus>,
}

impl fmt::Debug for RouterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterNode")
            .field("address", &self.address)
            .field("poll_interval", &self.poll_interval)
            .field("errors", &self.errors.get())
            .finish_non_exhaustive()
    }
}

impl RouterNode {
    /// Build a node around an existing API handle.
    pub fn new(
        address: RouterAddress,
        api: Arc<dyn RouterApi>,
        families: Vec<AddressFamily>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            address,
            api,
            families,
            poll_interval,
            cycle: RwLock::new(CycleState::default()),
            errors: ErrorCounter::default(),
            status: parking_lot::RwLock::new(NodeStatus::default()),
        }
    }

    /// Validate the configured address and connect to the router.
    pub async fn connect(config: &GobgpConfig) -> Result<Self> {
        let address: RouterAddress = config.address.parse()?;
        let client = GobgpClient::connect(&address, config.timeout(), &config.tls).await?;

        let node = Self::new(
            address,
            Arc::new(client),
            config.address_families.clone(),
            config.poll_interval(),
        );
        node.status.write().connected = true;
        Ok(node)
    }

    pub fn address(&self) -> &RouterAddress {
        &self.address
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Failed remote requests since startup.
    pub fn errors(&self) -> u64 {
        self.errors.get()
    }

    pub fn is_connected(&self) -> bool {
        self.status.read().connected
    }

    pub fn status(&self) -> NodeStatus {
        self.status.read().clone()
    }

    /// Run one collection cycle unless the poll interval has not elapsed yet.
    ///
    /// Remote failures never escape: they are counted, logged and reflected
    /// in the `up` metric.
    pub async fn gather_metrics(&self) {
        let mut cycle = self.cycle.write().await;

        if cycle.next_collection.is_some_and(|next| Instant::now() < next) {
            debug!(address = %self.address, "Poll interval not elapsed, keeping snapshot");
            return;
        }

        let start = Instant::now();
        cycle.metrics.clear();

        let up = match self.api.get_router_identity().await {
            Ok(identity) => {
                debug!(
                    address = %self.address,
                    router_id = %identity.router_id,
                    local_asn = identity.local_asn,
                    "Router identity"
                );
                cycle.router_id = identity.router_id;
                cycle.local_asn = identity.local_asn;
                true
            }
            Err(e) => {
                self.errors.increment();
                error!(
                    address = %self.address,
                    error = %e,
                    connection_error = e.is_connection_error(),
                    "Failed to query GoBGP server"
                );
                false
            }
        };
        self.status.write().connected = up;

        if up {
            let (rib_metrics, peer_metrics) = tokio::join!(
                rib::collect(self.api.as_ref(), &self.families, &self.errors),
                peers::collect(self.api.as_ref(), &self.errors),
            );
            cycle.metrics.extend(rib_metrics);
            cycle.metrics.extend(peer_metrics);
        }

        let interval_secs = i64::try_from(self.poll_interval.as_secs()).unwrap_or(i64::MAX);
        let next_poll = Utc::now().timestamp().saturating_add(interval_secs);
        let up_value = if up { 1.0 } else { 0.0 };

        cycle.metrics.push(ROUTER_UP.metric(up_value, []));
        cycle
            .metrics
            .push(ROUTER_ERRORS.metric(self.errors.get() as f64, []));
        cycle
            .metrics
            .push(ROUTER_NEXT_POLL.metric(next_poll as f64, []));
        cycle
            .metrics
            .push(ROUTER_SCRAPE_TIME.metric(start.elapsed().as_secs_f64(), []));

        if !cycle.router_id.is_empty() {
            let id = ROUTER_ID.metric(1.0, [cycle.router_id.clone()]);
            cycle.metrics.push(id);
        }
        if cycle.local_asn > 0 {
            let asn = ROUTER_ASN.metric(f64::from(cycle.local_asn), []);
            cycle.metrics.push(asn);
        }

        cycle.next_collection = Some(next_collection_at(Instant::now(), self.poll_interval));

        {
            let mut status = self.status.write();
            status.result = if up {
                CollectionResult::Success
            } else {
                CollectionResult::Failure
            };
            status.timestamp = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        }

        debug!(
            address = %self.address,
            metrics = cycle.metrics.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Collection cycle complete"
        );
    }

    /// Refresh if due, then return a copy of the snapshot.
    pub async fn collect(&self) -> Vec<Metric> {
        self.gather_metrics().await;
        self.snapshot().await
    }

    /// The current snapshot, without triggering a cycle.
    pub async fn snapshot(&self) -> Vec<Metric> {
        self.cycle.read().await.metrics.clone()
    }

    /// Refresh if due, then encode the snapshot in text exposition format.
    pub async fn render(&self) -> String {
        self.gather_metrics().await;
        metric::render(&self.cycle.read().await.metrics)
    }
}

//! Scriptable in-memory router for tests and local development.
//!
//! [`MockRouter`] implements [`RouterApi`] without any network access. Every
//! reply can be changed at runtime through `&self`, so a test can share one
//! mock with a running [`RouterNode`](crate::node::RouterNode) and alter its
//! behavior between collection cycles.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tonic::Status;

use crate::api::{PeerRecord, PeerStream, RouterApi, RouterIdentity, TableCounters};
use crate::error::ApiError;
use crate::family::{AddressFamily, TableType};

/// Scripted reply for one (table, family) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableReply {
    Counters(TableCounters),
    Empty,
    Fail,
}

/// Where peer enumeration fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerFailure {
    /// The list request itself is rejected.
    OnRequest,
    /// The stream breaks after yielding this many peers.
    MidStream(usize),
}

#[derive(Debug)]
struct MockState {
    identity: Option<RouterIdentity>,
    default_table: TableCounters,
    tables: HashMap<(TableType, AddressFamily), TableReply>,
    peers: Vec<PeerRecord>,
    peer_failure: Option<PeerFailure>,
    delay: Option<Duration>,
}

/// In-memory [`RouterApi`] implementation.
#[derive(Debug)]
pub struct MockRouter {
    state: Mutex<MockState>,
    identity_calls: AtomicUsize,
    table_calls: AtomicUsize,
    peer_calls: AtomicUsize,
}

impl Default for MockRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRouter {
    /// A healthy router with ID `10.0.0.1`, ASN 65000, no peers and
    /// identical counters in every table.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                identity: Some(RouterIdentity {
                    router_id: "10.0.0.1".to_string(),
                    local_asn: 65000,
                }),
                default_table: TableCounters {
                    destinations: 10,
                    paths: 20,
                    accepted: 15,
                },
                tables: HashMap::new(),
                peers: Vec::new(),
                peer_failure: None,
                delay: None,
            }),
            identity_calls: AtomicUsize::new(0),
            table_calls: AtomicUsize::new(0),
            peer_calls: AtomicUsize::new(0),
        }
    }

    /// Set the identity returned by the router; `None` makes the query fail.
    pub fn set_identity(&self, identity: Option<RouterIdentity>) {
        self.state.lock().identity = identity;
    }

    pub fn set_default_table(&self, counters: TableCounters) {
        self.state.lock().default_table = counters;
    }

    pub fn set_table(&self, table: TableType, family: AddressFamily, reply: TableReply) {
        self.state.lock().tables.insert((table, family), reply);
    }

    pub fn set_peers(&self, peers: Vec<PeerRecord>) {
        self.state.lock().peers = peers;
    }

    pub fn set_peer_failure(&self, failure: Option<PeerFailure>) {
        self.state.lock().peer_failure = failure;
    }

    /// Delay every call by `delay`.
    pub fn set_delay(&self, delay: Option<Duration>) {
        self.state.lock().delay = delay;
    }

    pub fn identity_calls(&self) -> usize {
        self.identity_calls.load(Ordering::SeqCst)
    }

    pub fn table_calls(&self) -> usize {
        self.table_calls.load(Ordering::SeqCst)
    }

    pub fn peer_calls(&self) -> usize {
        self.peer_calls.load(Ordering::SeqCst)
    }

    /// Total number of remote calls served.
    pub fn total_calls(&self) -> usize {
        self.identity_calls() + self.table_calls() + self.peer_calls()
    }

    async fn pause(&self) {
        let delay = self.state.lock().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl RouterApi for MockRouter {
    async fn get_router_identity(&self) -> Result<RouterIdentity, ApiError> {
        self.identity_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        let identity = self.state.lock().identity.clone();
        identity.ok_or_else(|| ApiError::Status(Status::unavailable("mock router is down")))
    }

    async fn get_table_counters(
        &self,
        table: TableType,
        family: AddressFamily,
    ) -> Result<Option<TableCounters>, ApiError> {
        self.table_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        let state = self.state.lock();
        let reply = state
            .tables
            .get(&(table, family))
            .copied()
            .unwrap_or(TableReply::Counters(state.default_table));

        match reply {
            TableReply::Counters(counters) => Ok(Some(counters)),
            TableReply::Empty => Ok(None),
            TableReply::Fail => Err(ApiError::Status(Status::not_found(format!(
                "no {} table for {}",
                table, family
            )))),
        }
    }

    async fn list_peers(&self) -> Result<PeerStream, ApiError> {
        self.peer_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        let (peers, failure) = {
            let state = self.state.lock();
            (state.peers.clone(), state.peer_failure)
        };

        let items: Vec<Result<PeerRecord, ApiError>> = match failure {
            Some(PeerFailure::OnRequest) => {
                return Err(ApiError::Status(Status::unavailable("peer listing rejected")));
            }
            Some(PeerFailure::MidStream(after)) => peers
                .into_iter()
                .take(after)
                .map(Ok)
                .chain(std::iter::once(Err(ApiError::Status(Status::aborted(
                    "peer stream broken",
                )))))
                .collect(),
            None => peers.into_iter().map(Ok).collect(),
        };

        Ok(Box::pin(tokio_stream::iter(items)))
    }
}

/// Build a peer record with the given neighbor address and description.
pub fn peer(address: &str, description: &str) -> PeerRecord {
    PeerRecord {
        neighbor_address: address.to_string(),
        description: description.to_string(),
        router_id: address.to_string(),
        peer_asn: 65001,
        local_asn: 65000,
        session_state: 6,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    #[tokio::test]
    async fn test_mock_identity() {
        let mock = MockRouter::new();
        let identity = mock.get_router_identity().await.unwrap();
        assert_eq!(identity.router_id, "10.0.0.1");

        mock.set_identity(None);
        assert!(mock.get_router_identity().await.is_err());
        assert_eq!(mock.identity_calls(), 2);
    }

    #[tokio::test]
    async fn test_mock_mid_stream_failure() {
        let mock = MockRouter::new();
        mock.set_peers(vec![peer("192.0.2.1", ""), peer("192.0.2.2", "")]);
        mock.set_peer_failure(Some(PeerFailure::MidStream(1)));

        let items: Vec<_> = mock.list_peers().await.unwrap().collect().await;
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(items[1].is_err());
    }
}

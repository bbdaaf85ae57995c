//! Remote router API abstraction and its GoBGP gRPC implementation.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use gobgp_api::GobgpApiClient;
use gobgp_api::apipb::{self, GetBgpRequest, GetTableRequest, ListPeerRequest};
use tokio_stream::{Stream, StreamExt};
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint, Identity};
use tonic::{Response, Status};
use tracing::{debug, info};

use crate::address::RouterAddress;
use crate::config::TlsConfig;
use crate::error::{ApiError, ExporterError, Result};
use crate::family::{AddressFamily, TableType};

/// Router ID and local AS number of the daemon.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouterIdentity {
    pub router_id: String,
    pub local_asn: u32,
}

/// Counters of one routing table for one address family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCounters {
    pub destinations: u64,
    pub paths: u64,
    pub accepted: u64,
}

/// BGP message counters for one direction of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageCounts {
    pub total: u64,
    pub notification: u64,
    pub update: u64,
    pub open: u64,
    pub keepalive: u64,
    pub refresh: u64,
    pub withdraw_update: u64,
    pub withdraw_prefix: u64,
}

impl MessageCounts {
    /// Counters in the order of [`crate::descriptors::MESSAGE_KINDS`].
    pub fn as_array(&self) -> [u64; 8] {
        [
            self.total,
            self.notification,
            self.update,
            self.open,
            self.keepalive,
            self.refresh,
            self.withdraw_update,
            self.withdraw_prefix,
        ]
    }
}

impl From<apipb::Message> for MessageCounts {
    fn from(m: apipb::Message) -> Self {
        Self {
            total: m.total,
            notification: m.notification,
            update: m.update,
            open: m.open,
            keepalive: m.keepalive,
            refresh: m.refresh,
            withdraw_update: m.withdraw_update,
            withdraw_prefix: m.withdraw_prefix,
        }
    }
}

/// Per-direction message counters. A missing direction reads as zeros.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeerMessages {
    pub received: Option<MessageCounts>,
    pub sent: Option<MessageCounts>,
}

/// State of one BGP neighbor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeerRecord {
    pub neighbor_address: String,
    pub description: String,
    /// Router ID announced by the peer; empty until the session is up.
    pub router_id: String,
    pub peer_asn: u32,
    pub local_asn: u32,
    pub admin_state: i32,
    pub session_state: i32,
    pub out_queue: u32,
    pub flops: u32,
    pub send_community: u32,
    pub remove_private: i32,
    pub password_set: bool,
    pub peer_type: i32,
    pub messages: Option<PeerMessages>,
}

impl From<apipb::Peer> for PeerRecord {
    fn from(peer: apipb::Peer) -> Self {
        let conf = peer.conf.unwrap_or_default();
        let state = peer.state.unwrap_or_default();

        let description = if state.description.is_empty() {
            conf.description
        } else {
            state.description
        };
        let neighbor_address = if state.neighbor_address.is_empty() {
            conf.neighbor_address
        } else {
            state.neighbor_address
        };

        Self {
            neighbor_address,
            description,
            router_id: state.router_id,
            peer_asn: state.peer_asn,
            local_asn: state.local_asn,
            admin_state: state.admin_state,
            session_state: state.session_state,
            out_queue: state.out_q,
            flops: state.flops,
            send_community: state.send_community,
            remove_private: state.remove_private,
            password_set: !state.auth_password.is_empty() || !conf.auth_password.is_empty(),
            peer_type: state.r#type,
            messages: state.messages.map(|m| PeerMessages {
                received: m.received.map(MessageCounts::from),
                sent: m.sent.map(MessageCounts::from),
            }),
        }
    }
}

/// A finite, non-restartable stream of peers that may fail mid-way.
pub type PeerStream =
    Pin<Box<dyn Stream<Item = std::result::Result<PeerRecord, ApiError>> + Send>>;

/// Capabilities the collection engine needs from a router.
#[async_trait]
pub trait RouterApi: Send + Sync {
    /// Fetch the router ID and local ASN.
    async fn get_router_identity(&self) -> std::result::Result<RouterIdentity, ApiError>;

    /// Fetch counters of one table. `None` means the router had nothing to report.
    async fn get_table_counters(
        &self,
        table: TableType,
        family: AddressFamily,
    ) -> std::result::Result<Option<TableCounters>, ApiError>;

    /// Start enumerating peers.
    async fn list_peers(&self) -> std::result::Result<PeerStream, ApiError>;
}

/// [`RouterApi`] backed by the GoBGP gRPC service.
#[derive(Debug, Clone)]
pub struct GobgpClient {
    client: GobgpApiClient<Channel>,
    timeout: Duration,
}

impl GobgpClient {
    /// Connect to the daemon, failing if it cannot be reached within `timeout`.
    pub async fn connect(
        address: &RouterAddress,
        timeout: Duration,
        tls: &TlsConfig,
    ) -> Result<Self> {
        let connect_error = |source| ExporterError::Connect {
            address: address.to_string(),
            source,
        };

        let mut endpoint = Endpoint::from_shared(address.endpoint_uri(tls.enabled))
            .map_err(connect_error)?
            .connect_timeout(timeout)
            .timeout(timeout);

        if tls.enabled {
            endpoint = endpoint
                .tls_config(load_tls(tls).await?)
                .map_err(connect_error)?;
        }

        let channel: Channel = endpoint.connect().await.map_err(connect_error)?;
        info!(address = %address, tls = tls.enabled, "Connected to GoBGP");

        Ok(Self::with_channel(channel, timeout))
    }

    /// Wrap an already established channel.
    pub fn with_channel(channel: Channel, timeout: Duration) -> Self {
        Self {
            client: GobgpApiClient::new(channel),
            timeout,
        }
    }

    async fn call<T, F>(&self, fut: F) -> std::result::Result<T, ApiError>
    where
        F: Future<Output = std::result::Result<Response<T>, Status>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(response)) => Ok(response.into_inner()),
            Ok(Err(status)) => Err(ApiError::Status(status)),
            Err(_) => Err(ApiError::Timeout(self.timeout)),
        }
    }
}

#[async_trait]
impl RouterApi for GobgpClient {
    async fn get_router_identity(&self) -> std::result::Result<RouterIdentity, ApiError> {
        let mut client = self.client.clone();
        let response = self.call(client.get_bgp(GetBgpRequest {})).await?;

        let global = response
            .global
            .ok_or_else(|| ApiError::Malformed("GetBgp response without global".to_string()))?;

        Ok(RouterIdentity {
            router_id: global.router_id,
            local_asn: global.asn,
        })
    }

    async fn get_table_counters(
        &self,
        table: TableType,
        family: AddressFamily,
    ) -> std::result::Result<Option<TableCounters>, ApiError> {
        let request = GetTableRequest {
            table_type: table.to_proto() as i32,
            family: Some(family.to_proto()),
            name: String::new(),
        };

        let mut client = self.client.clone();
        let response = self.call(client.get_table(request)).await?;
        debug!(
            table = %table,
            family = %family,
            destinations = response.num_destination,
            "Table counters"
        );

        Ok(Some(TableCounters {
            destinations: response.num_destination,
            paths: response.num_path,
            accepted: response.num_accepted,
        }))
    }

    async fn list_peers(&self) -> std::result::Result<PeerStream, ApiError> {
        let mut client = self.client.clone();
        let stream = self.call(client.list_peer(ListPeerRequest::default())).await?;

        let timeout = self.timeout;
        let peers = stream.timeout(timeout).map(move |item| match item {
            Ok(Ok(response)) => response
                .peer
                .map(PeerRecord::from)
                .ok_or_else(|| ApiError::Malformed("ListPeer response without peer".to_string())),
            Ok(Err(status)) => Err(ApiError::Status(status)),
            Err(_) => Err(ApiError::Timeout(timeout)),
        });

        Ok(Box::pin(peers))
    }
}

async fn load_tls(tls: &TlsConfig) -> Result<ClientTlsConfig> {
    let mut config = ClientTlsConfig::new();

    config = match &tls.ca_cert {
        Some(path) => config.ca_certificate(Certificate::from_pem(read_pem(path).await?)),
        None => config.with_native_roots(),
    };

    if let Some(name) = &tls.server_name {
        config = config.domain_name(name.clone());
    }

    if let (Some(cert), Some(key)) = (&tls.client_cert, &tls.client_key) {
        config = config.identity(Identity::from_pem(read_pem(cert).await?, read_pem(key).await?));
    }

    Ok(config)
}

async fn read_pem(path: &str) -> Result<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|source| ExporterError::Tls {
        path: path.to_string(),
        source,
    })
}

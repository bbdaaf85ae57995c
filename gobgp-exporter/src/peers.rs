//! BGP neighbor collection.

use tokio_stream::StreamExt;
use tracing::{debug, error};

use crate::api::{PeerRecord, RouterApi};
use crate::descriptors::{
    PEER_ADMIN_STATE, PEER_ASN, PEER_COUNT, PEER_FLOPS, PEER_LOCAL_ASN, PEER_OUT_QUEUE,
    PEER_PASSWORD_SET, PEER_RECEIVED_MESSAGES, PEER_REMOVE_PRIVATE_AS, PEER_SEND_COMMUNITY,
    PEER_SENT_MESSAGES, PEER_SESSION_STATE, PEER_TYPE, PEER_UP,
};
use crate::metric::{LabeledDescriptor, Metric};
use crate::node::ErrorCounter;

/// Enumerate peers and build their metrics.
///
/// The whole stream is drained before anything is emitted: a failure at any
/// point is counted once and yields no peer metrics at all.
pub async fn collect(api: &dyn RouterApi, errors: &ErrorCounter) -> Vec<Metric> {
    let mut stream = match api.list_peers().await {
        Ok(stream) => stream,
        Err(e) => {
            errors.increment();
            error!(error = %e, "GoBGP query for peers failed");
            return Vec::new();
        }
    };

    let mut peers = Vec::new();
    while let Some(item) = stream.next().await {
        match item {
            Ok(peer) => peers.push(peer),
            Err(e) => {
                errors.increment();
                error!(error = %e, received = peers.len(), "GoBGP peer stream failed");
                return Vec::new();
            }
        }
    }
    debug!(count = peers.len(), "Peers listed");

    let mut metrics = Vec::with_capacity(1 + peers.len() * 28);
    metrics.push(PEER_COUNT.metric(peers.len() as f64, []));
    for peer in &peers {
        push_peer(peer, &mut metrics);
    }

    metrics
}

fn push_peer(peer: &PeerRecord, metrics: &mut Vec<Metric>) {
    let mut gauge = |descriptor: &'static LabeledDescriptor<2>, value: f64| {
        metrics.push(descriptor.metric(
            value,
            [peer.neighbor_address.clone(), peer.description.clone()],
        ));
    };

    gauge(&PEER_UP, flag(!peer.router_id.is_empty()));
    gauge(&PEER_ASN, f64::from(peer.peer_asn));
    gauge(&PEER_LOCAL_ASN, f64::from(peer.local_asn));
    gauge(&PEER_ADMIN_STATE, f64::from(peer.admin_state));
    gauge(&PEER_SESSION_STATE, f64::from(peer.session_state));

    if let Some(messages) = peer.messages {
        let received = messages.received.unwrap_or_default().as_array();
        for (descriptor, value) in PEER_RECEIVED_MESSAGES.iter().zip(received) {
            gauge(descriptor, value as f64);
        }
        let sent = messages.sent.unwrap_or_default().as_array();
        for (descriptor, value) in PEER_SENT_MESSAGES.iter().zip(sent) {
            gauge(descriptor, value as f64);
        }
    }

    gauge(&PEER_OUT_QUEUE, f64::from(peer.out_queue));
    gauge(&PEER_FLOPS, f64::from(peer.flops));
    gauge(&PEER_SEND_COMMUNITY, f64::from(peer.send_community));
    gauge(&PEER_REMOVE_PRIVATE_AS, f64::from(peer.remove_private));
    gauge(&PEER_PASSWORD_SET, flag(peer.password_set));
    gauge(&PEER_TYPE, f64::from(peer.peer_type));
}

fn flag(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

//! Registry of every metric the exporter can emit.

use crate::metric::{Descriptor, LabeledDescriptor, MetricKind};

const RIB_LABELS: &[&str; 3] = &["route_table", "address_family", "vrf_name"];
const PEER_LABELS: &[&str; 2] = &["name", "description"];

// Router

pub static ROUTER_UP: LabeledDescriptor<0> = LabeledDescriptor::new(
    "gobgp_router_up",
    "Is GoBGP up and responds to queries (1) or is it down (0).",
    MetricKind::Gauge,
    &[],
);

pub static ROUTER_ID: LabeledDescriptor<1> = LabeledDescriptor::new(
    "gobgp_router_id",
    "What is GoBGP router ID.",
    MetricKind::Gauge,
    &["id"],
);

pub static ROUTER_ASN: LabeledDescriptor<0> = LabeledDescriptor::new(
    "gobgp_router_asn",
    "What is GoBGP AS number.",
    MetricKind::Gauge,
    &[],
);

pub static ROUTER_ERRORS: LabeledDescriptor<0> = LabeledDescriptor::new(
    "gobgp_router_failed_req_count",
    "The number of failed requests to GoBGP router.",
    MetricKind::Counter,
    &[],
);

pub static ROUTER_NEXT_POLL: LabeledDescriptor<0> = LabeledDescriptor::new(
    "gobgp_router_next_poll",
    "The timestamp of the next potential scrape of the router.",
    MetricKind::Counter,
    &[],
);

pub static ROUTER_SCRAPE_TIME: LabeledDescriptor<0> = LabeledDescriptor::new(
    "gobgp_router_scrape_time",
    "The amount of time it took to scrape the router.",
    MetricKind::Gauge,
    &[],
);

// Routing tables

pub static RIB_TOTAL_DESTINATIONS: LabeledDescriptor<3> = LabeledDescriptor::new(
    "gobgp_route_total_destination_count",
    "The number of routes on per address family and route table basis",
    MetricKind::Gauge,
    RIB_LABELS,
);

pub static RIB_TOTAL_PATHS: LabeledDescriptor<3> = LabeledDescriptor::new(
    "gobgp_route_total_path_count",
    "The number of available paths to destinations on per address family and route table basis",
    MetricKind::Gauge,
    RIB_LABELS,
);

pub static RIB_ACCEPTED_PATHS: LabeledDescriptor<3> = LabeledDescriptor::new(
    "gobgp_route_accepted_path_count",
    "The number of accepted paths to destinations on per address family and route table basis",
    MetricKind::Gauge,
    RIB_LABELS,
);

// Peers

pub static PEER_COUNT: LabeledDescriptor<0> = LabeledDescriptor::new(
    "gobgp_peer_count",
    "The number of BGP peers",
    MetricKind::Gauge,
    &[],
);

pub static PEER_UP: LabeledDescriptor<2> = LabeledDescriptor::new(
    "gobgp_peer_up",
    "Is the peer up and in established state (1) or it is not (0).",
    MetricKind::Gauge,
    PEER_LABELS,
);

pub static PEER_ASN: LabeledDescriptor<2> = LabeledDescriptor::new(
    "gobgp_peer_asn",
    "What is the AS number of the peer",
    MetricKind::Gauge,
    PEER_LABELS,
);

pub static PEER_LOCAL_ASN: LabeledDescriptor<2> = LabeledDescriptor::new(
    "gobgp_peer_local_asn",
    "What is the AS number presented to the peer by this router.",
    MetricKind::Gauge,
    PEER_LABELS,
);

pub static PEER_ADMIN_STATE: LabeledDescriptor<2> = LabeledDescriptor::new(
    "gobgp_peer_admin_state",
    "Is the peer configured for being Up (0), Down (1), or PFX_CT (2)",
    MetricKind::Gauge,
    PEER_LABELS,
);

pub static PEER_SESSION_STATE: LabeledDescriptor<2> = LabeledDescriptor::new(
    "gobgp_peer_session_state",
    "What is the state of BGP session to the peer - unknown (0), idle (1), connect (2), active (3), opensent (4), openconfirm (5), established (6)",
    MetricKind::Gauge,
    PEER_LABELS,
);

/// Received message counters, indexed like [`MESSAGE_KINDS`].
pub static PEER_RECEIVED_MESSAGES: [LabeledDescriptor<2>; 8] = [
    LabeledDescriptor::new(
        "gobgp_peer_received_message_total_count",
        "The total number of messages the BGP peer sent to this router.",
        MetricKind::Gauge,
        PEER_LABELS,
    ),
    LabeledDescriptor::new(
        "gobgp_peer_received_notification_message_count",
        "How many Notification messages the BGP peer sent to this router.",
        MetricKind::Gauge,
        PEER_LABELS,
    ),
    LabeledDescriptor::new(
        "gobgp_peer_received_update_message_count",
        "How many Update messages the BGP peer sent to this router.",
        MetricKind::Gauge,
        PEER_LABELS,
    ),
    LabeledDescriptor::new(
        "gobgp_peer_received_open_message_count",
        "How many Open messages the BGP peer sent to this router.",
        MetricKind::Gauge,
        PEER_LABELS,
    ),
    LabeledDescriptor::new(
        "gobgp_peer_received_keepalive_message_count",
        "How many Keepalive messages the BGP peer sent to this router.",
        MetricKind::Gauge,
        PEER_LABELS,
    ),
    LabeledDescriptor::new(
        "gobgp_peer_received_refresh_message_count",
        "How many Refresh messages the BGP peer sent to this router.",
        MetricKind::Gauge,
        PEER_LABELS,
    ),
    LabeledDescriptor::new(
        "gobgp_peer_received_withdraw_update_message_count",
        "How many WithdrawUpdate messages the BGP peer sent to this router.",
        MetricKind::Gauge,
        PEER_LABELS,
    ),
    LabeledDescriptor::new(
        "gobgp_peer_received_withdraw_prefix_message_count",
        "How many WithdrawPrefix messages the BGP peer sent to this router.",
        MetricKind::Gauge,
        PEER_LABELS,
    ),
];

/// Sent message counters, indexed like [`MESSAGE_KINDS`].
pub static PEER_SENT_MESSAGES: [LabeledDescriptor<2>; 8] = [
    LabeledDescriptor::new(
        "gobgp_peer_sent_message_total_count",
        "The total number of messages this router sent to this BGP peer.",
        MetricKind::Gauge,
        PEER_LABELS,
    ),
    LabeledDescriptor::new(
        "gobgp_peer_sent_notification_message_count",
        "How many Notification messages this router sent to this BGP peer.",
        MetricKind::Gauge,
        PEER_LABELS,
    ),
    LabeledDescriptor::new(
        "gobgp_peer_sent_update_message_count",
        "How many Update messages this router sent to this BGP peer.",
        MetricKind::Gauge,
        PEER_LABELS,
    ),
    LabeledDescriptor::new(
        "gobgp_peer_sent_open_message_count",
        "How many Open messages this router sent to this BGP peer.",
        MetricKind::Gauge,
        PEER_LABELS,
    ),
    LabeledDescriptor::new(
        "gobgp_peer_sent_keepalive_message_count",
        "How many Keepalive messages this router sent to this BGP peer.",
        MetricKind::Gauge,
        PEER_LABELS,
    ),
    LabeledDescriptor::new(
        "gobgp_peer_sent_refresh_message_count",
        "How many Refresh messages this router sent to this BGP peer.",
        MetricKind::Gauge,
        PEER_LABELS,
    ),
    LabeledDescriptor::new(
        "gobgp_peer_sent_withdraw_update_message_count",
        "How many WithdrawUpdate messages this router sent to this BGP peer.",
        MetricKind::Gauge,
        PEER_LABELS,
    ),
    LabeledDescriptor::new(
        "gobgp_peer_sent_withdraw_prefix_message_count",
        "How many WithdrawPrefix messages this router sent to this BGP peer.",
        MetricKind::Gauge,
        PEER_LABELS,
    ),
];

/// Message kinds in the order of the per-direction counter arrays.
pub const MESSAGE_KINDS: [&str; 8] = [
    "total",
    "notification",
    "update",
    "open",
    "keepalive",
    "refresh",
    "withdraw_update",
    "withdraw_prefix",
];

pub static PEER_OUT_QUEUE: LabeledDescriptor<2> = LabeledDescriptor::new(
    "gobgp_peer_out_queue_count",
    "PeerState.OutQ",
    MetricKind::Gauge,
    PEER_LABELS,
);

pub static PEER_FLOPS: LabeledDescriptor<2> = LabeledDescriptor::new(
    "gobgp_peer_flop_count",
    "PeerState.Flops",
    MetricKind::Gauge,
    PEER_LABELS,
);

pub static PEER_SEND_COMMUNITY: LabeledDescriptor<2> = LabeledDescriptor::new(
    "gobgp_peer_send_community",
    "PeerState.SendCommunity",
    MetricKind::Gauge,
    PEER_LABELS,
);

pub static PEER_REMOVE_PRIVATE_AS: LabeledDescriptor<2> = LabeledDescriptor::new(
    "gobgp_peer_remove_private_as",
    "PeerState.RemovePrivateAs",
    MetricKind::Gauge,
    PEER_LABELS,
);

pub static PEER_PASSWORD_SET: LabeledDescriptor<2> = LabeledDescriptor::new(
    "gobgp_peer_password_set",
    "Whether the GoBGP peer has been configured (1) for authentication or not (0)",
    MetricKind::Gauge,
    PEER_LABELS,
);

pub static PEER_TYPE: LabeledDescriptor<2> = LabeledDescriptor::new(
    "gobgp_peer_type",
    "PeerState.PeerType",
    MetricKind::Gauge,
    PEER_LABELS,
);

/// Every descriptor the exporter can emit, router metrics first.
pub fn describe() -> Vec<&'static Descriptor> {
    let mut all = vec![
        ROUTER_UP.descriptor(),
        ROUTER_ID.descriptor(),
        ROUTER_ASN.descriptor(),
        ROUTER_ERRORS.descriptor(),
        ROUTER_NEXT_POLL.descriptor(),
        ROUTER_SCRAPE_TIME.descriptor(),
        RIB_TOTAL_DESTINATIONS.descriptor(),
        RIB_TOTAL_PATHS.descriptor(),
        RIB_ACCEPTED_PATHS.descriptor(),
        PEER_COUNT.descriptor(),
        PEER_UP.descriptor(),
        PEER_ASN.descriptor(),
        PEER_LOCAL_ASN.descriptor(),
        PEER_ADMIN_STATE.descriptor(),
        PEER_SESSION_STATE.descriptor(),
    ];
    all.extend(PEER_RECEIVED_MESSAGES.iter().map(|d| d.descriptor()));
    all.extend(PEER_SENT_MESSAGES.iter().map(|d| d.descriptor()));
    all.extend([
        PEER_OUT_QUEUE.descriptor(),
        PEER_FLOPS.descriptor(),
        PEER_SEND_COMMUNITY.descriptor(),
        PEER_REMOVE_PRIVATE_AS.descriptor(),
        PEER_PASSWORD_SET.descriptor(),
        PEER_TYPE.descriptor(),
    ]);
    all
}

//! Routing table types and the address-family catalog.

use std::fmt;

use gobgp_api::apipb::{self, family::Afi, family::Safi};
use serde::{Deserialize, Serialize};

/// Routing table scope queried for counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableType {
    Global,
    Local,
}

impl TableType {
    /// Table types the exporter reports on.
    pub const ALL: [TableType; 2] = [TableType::Global, TableType::Local];

    /// Lower-cased label value.
    pub fn as_str(&self) -> &'static str {
        match self {
            TableType::Global => "global",
            TableType::Local => "local",
        }
    }

    pub fn to_proto(self) -> apipb::TableType {
        match self {
            TableType::Global => apipb::TableType::Global,
            TableType::Local => apipb::TableType::Local,
        }
    }
}

impl fmt::Display for TableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A BGP address family known to the exporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
    Ipv4Vpn,
    Ipv6Vpn,
    Ipv4Mpls,
    Ipv6Mpls,
    Evpn,
    Ipv4Encap,
    Ipv6Encap,
    Ipv4Flowspec,
    Ipv6Flowspec,
    Ipv4VpnFlowspec,
    Ipv6VpnFlowspec,
    L2VpnFlowspec,
}

impl AddressFamily {
    /// The full catalog.
    pub const ALL: [AddressFamily; 14] = [
        AddressFamily::Ipv4,
        AddressFamily::Ipv6,
        AddressFamily::Ipv4Vpn,
        AddressFamily::Ipv6Vpn,
        AddressFamily::Ipv4Mpls,
        AddressFamily::Ipv6Mpls,
        AddressFamily::Evpn,
        AddressFamily::Ipv4Encap,
        AddressFamily::Ipv6Encap,
        AddressFamily::Ipv4Flowspec,
        AddressFamily::Ipv6Flowspec,
        AddressFamily::Ipv4VpnFlowspec,
        AddressFamily::Ipv6VpnFlowspec,
        AddressFamily::L2VpnFlowspec,
    ];

    /// Label value, identical to the configuration spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressFamily::Ipv4 => "ipv4",
            AddressFamily::Ipv6 => "ipv6",
            AddressFamily::Ipv4Vpn => "ipv4_vpn",
            AddressFamily::Ipv6Vpn => "ipv6_vpn",
            AddressFamily::Ipv4Mpls => "ipv4_mpls",
            AddressFamily::Ipv6Mpls => "ipv6_mpls",
            AddressFamily::Evpn => "evpn",
            AddressFamily::Ipv4Encap => "ipv4_encap",
            AddressFamily::Ipv6Encap => "ipv6_encap",
            AddressFamily::Ipv4Flowspec => "ipv4_flowspec",
            AddressFamily::Ipv6Flowspec => "ipv6_flowspec",
            AddressFamily::Ipv4VpnFlowspec => "ipv4_vpn_flowspec",
            AddressFamily::Ipv6VpnFlowspec => "ipv6_vpn_flowspec",
            AddressFamily::L2VpnFlowspec => "l2_vpn_flowspec",
        }
    }

    /// Protocol-level (AFI, SAFI) pair.
    pub fn afi_safi(&self) -> (Afi, Safi) {
        match self {
            AddressFamily::Ipv4 => (Afi::Ip, Safi::Unicast),
            AddressFamily::Ipv6 => (Afi::Ip6, Safi::Unicast),
            AddressFamily::Ipv4Vpn => (Afi::Ip, Safi::MplsVpn),
            AddressFamily::Ipv6Vpn => (Afi::Ip6, Safi::MplsVpn),
            AddressFamily::Ipv4Mpls => (Afi::Ip, Safi::MplsLabel),
            AddressFamily::Ipv6Mpls => (Afi::Ip6, Safi::MplsLabel),
            AddressFamily::Evpn => (Afi::L2vpn, Safi::Evpn),
            AddressFamily::Ipv4Encap => (Afi::Ip, Safi::Encapsulation),
            AddressFamily::Ipv6Encap => (Afi::Ip6, Safi::Encapsulation),
            AddressFamily::Ipv4Flowspec => (Afi::Ip, Safi::FlowSpecUnicast),
            AddressFamily::Ipv6Flowspec => (Afi::Ip6, Safi::FlowSpecUnicast),
            AddressFamily::Ipv4VpnFlowspec => (Afi::Ip, Safi::FlowSpecVpn),
            AddressFamily::Ipv6VpnFlowspec => (Afi::Ip6, Safi::FlowSpecVpn),
            AddressFamily::L2VpnFlowspec => (Afi::L2vpn, Safi::FlowSpecVpn),
        }
    }

    pub fn to_proto(self) -> apipb::Family {
        let (afi, safi) = self.afi_safi();
        apipb::Family {
            afi: afi as i32,
            safi: safi as i32,
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

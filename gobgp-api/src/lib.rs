//! GoBGP management API
//!
//! Protobuf wire types and the tonic client for the subset of the
//! `apipb.GobgpApi` service used to monitor a GoBGP daemon.

// Include the generated protobuf code
pub mod apipb {
    tonic::include_proto!("apipb");
}

pub use apipb::gobgp_api_client::GobgpApiClient;

#[cfg(test)]
mod tests {
    use super::apipb::{self, family, peer_state};
    use super::*;
    use prost::Message as _;
    use tonic::transport::Endpoint;

    #[test]
    fn test_get_table_request_wire_format() {
        let request = apipb::GetTableRequest {
            table_type: apipb::TableType::Local as i32,
            family: Some(apipb::Family {
                afi: family::Afi::Ip as i32,
                safi: family::Safi::Unicast as i32,
            }),
            name: String::new(),
        };

        assert_eq!(
            request.encode_to_vec(),
            vec![0x08, 0x01, 0x12, 0x04, 0x08, 0x01, 0x10, 0x01]
        );
    }

    #[test]
    fn test_get_table_response_decode() {
        // num_destination = 3, num_path = 5, num_accepted = 4
        let bytes = [0x08, 0x03, 0x10, 0x05, 0x18, 0x04];
        let response = apipb::GetTableResponse::decode(&bytes[..]).unwrap();

        assert_eq!(response.num_destination, 3);
        assert_eq!(response.num_path, 5);
        assert_eq!(response.num_accepted, 4);
    }

    #[test]
    fn test_peer_state_skips_unknown_fields() {
        // router_id = "1.1.1.1" followed by an unknown varint field 30
        let mut bytes = vec![0xa2, 0x01, 0x07];
        bytes.extend_from_slice(b"1.1.1.1");
        bytes.extend_from_slice(&[0xf0, 0x01, 0x2a]);

        let state = apipb::PeerState::decode(bytes.as_slice()).unwrap();
        assert_eq!(state.router_id, "1.1.1.1");
        assert_eq!(state.session_state(), peer_state::SessionState::Unknown);
    }

    #[test]
    fn test_message_total_tag() {
        // total = 9 is field 7
        let message = apipb::Message::decode(&[0x38, 0x09][..]).unwrap();
        assert_eq!(message.total, 9);
        assert_eq!(message.update, 0);
    }

    #[test]
    fn test_enum_values_match_upstream() {
        assert_eq!(family::Afi::L2vpn as i32, 25);
        assert_eq!(family::Safi::Evpn as i32, 70);
        assert_eq!(family::Safi::MplsVpn as i32, 128);
        assert_eq!(family::Safi::FlowSpecVpn as i32, 134);
        assert_eq!(peer_state::SessionState::Established as i32, 6);
        assert_eq!(peer_state::AdminState::PfxCt as i32, 2);
    }

    #[tokio::test]
    async fn test_unreachable_daemon_is_unavailable() {
        let channel = Endpoint::from_static("http://127.0.0.1:1").connect_lazy();
        let mut client = GobgpApiClient::new(channel);

        let status = client.get_bgp(apipb::GetBgpRequest {}).await.unwrap_err();
        assert!(matches!(
            status.code(),
            tonic::Code::Unavailable | tonic::Code::Unknown
        ));
    }
}

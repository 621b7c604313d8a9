// Control-plane packet definitions; JSON only at the wire boundary

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One UDP datagram, dispatched on the `type` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Packet {
    #[serde(rename = "HELLO")]
    Hello(HelloPacket),
    #[serde(rename = "LSA")]
    Lsa(LsaPacket),
    #[serde(rename = "CONTROL")]
    Control(ControlPacket),
}

/// Periodic neighbor discovery broadcast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloPacket {
    pub router_id: String,
    pub timestamp: f64,
    pub ip_address: String,
    /// Sorted ids of every neighbor this router has detected so far.
    pub known_neighbors: Vec<String>,
}

/// Link-state advertisement: a router's self-description of its outgoing
/// links and reachable prefixes, stamped with a monotonic sequence number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LsaPacket {
    pub router_id: String,
    pub timestamp: f64,
    pub sequence_number: i64,
    pub addresses: Vec<String>,
    pub links: HashMap<String, i32>,
}

/// Operator command, answered with a plain-text report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlPacket {
    pub command: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hello_wire_format() {
        let raw = r#"{ "type":"HELLO",
                       "router_id":"rt3",
                       "timestamp": 1.7e9,
                       "ip_address":"10.10.7.2",
                       "known_neighbors":["rt1","rt4"] }"#;
        let packet: Packet = serde_json::from_str(raw).expect("valid HELLO");
        match packet {
            Packet::Hello(hello) => {
                assert_eq!(hello.router_id, "rt3");
                assert_eq!(hello.ip_address, "10.10.7.2");
                assert_eq!(hello.known_neighbors, vec!["rt1", "rt4"]);
            }
            other => panic!("expected HELLO, got {:?}", other),
        }
    }

    #[test]
    fn parses_lsa_wire_format() {
        let raw = r#"{ "type":"LSA",
                       "router_id":"rt3",
                       "timestamp": 1.7e9,
                       "sequence_number": 42,
                       "addresses":["192.168.12.0/24"],
                       "links": {"rt1": 3, "rt4": 7} }"#;
        let packet: Packet = serde_json::from_str(raw).expect("valid LSA");
        match packet {
            Packet::Lsa(lsa) => {
                assert_eq!(lsa.sequence_number, 42);
                assert_eq!(lsa.addresses, vec!["192.168.12.0/24"]);
                assert_eq!(lsa.links.get("rt4"), Some(&7));
            }
            other => panic!("expected LSA, got {:?}", other),
        }
    }

    #[test]
    fn serializes_with_type_tag() {
        let packet = Packet::Hello(HelloPacket {
            router_id: "rt0".to_string(),
            timestamp: 0.0,
            ip_address: "10.10.1.2".to_string(),
            known_neighbors: Vec::new(),
        });
        let value = serde_json::to_value(&packet).expect("serialize");
        assert_eq!(value.get("type").and_then(|v| v.as_str()), Some("HELLO"));
        assert_eq!(value.get("router_id").and_then(|v| v.as_str()), Some("rt0"));
    }

    #[test]
    fn rejects_unknown_type() {
        let raw = r#"{"type":"GOODBYE","router_id":"rt0"}"#;
        assert!(serde_json::from_str::<Packet>(raw).is_err());
    }
}

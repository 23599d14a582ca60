//! Illustrative per-packet protocol breakdown.
//!
//! Nothing here decodes bytes. Ports, sequence numbers, acknowledgment
//! numbers and DNS transaction ids are drawn from the supplied random
//! source on every call, so two calls for the same packet differ unless the
//! caller passes identically seeded generators.

use crate::model::{Packet, Protocol};
use rand::Rng;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Number(i64),
    Flag(bool),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Flag(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Flag(b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolLayer {
    pub name: &'static str,
    pub fields: Vec<(&'static str, FieldValue)>,
}

impl ProtocolLayer {
    fn new(name: &'static str) -> Self {
        Self { name, fields: Vec::new() }
    }

    fn field(mut self, label: &'static str, value: impl Into<FieldValue>) -> Self {
        self.fields.push((label, value.into()));
        self
    }

    #[cfg(test)]
    pub fn get(&self, label: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(l, _)| *l == label).map(|(_, v)| v)
    }
}

pub const MOCK_SRC_MAC: &str = "00:1B:44:11:3A:B7";
pub const MOCK_DST_MAC: &str = "B8:27:EB:B5:A3:AF";

/// Builds the layer stack shown for `packet`, outermost first.
pub fn synthesize<R: Rng + ?Sized>(packet: &Packet, rng: &mut R) -> Vec<ProtocolLayer> {
    let mut layers = vec![ProtocolLayer::new("Ethernet II")
        .field("Src", MOCK_SRC_MAC)
        .field("Dst", MOCK_DST_MAC)];

    if packet.protocol == Protocol::Arp {
        let operation = if packet.info.contains("Who has") { "request" } else { "reply" };
        layers.push(
            ProtocolLayer::new("Address Resolution Protocol")
                .field("Operation", operation)
                .field("Info", packet.info.as_str()),
        );
        return layers;
    }

    layers.push(
        ProtocolLayer::new("Internet Protocol Version 4")
            .field("TTL", 64i64)
            .field("Src", packet.source.as_str())
            .field("Dst", packet.destination.as_str())
            .field("Total Length", i64::from(packet.size))
            .field("Protocol", packet.protocol.as_str()),
    );

    if packet.protocol == Protocol::Ipv4 {
        return layers;
    }

    match packet.protocol {
        Protocol::Tcp | Protocol::Http | Protocol::Https => {
            let dst_port: i64 = match packet.protocol {
                Protocol::Https => 443,
                Protocol::Http => 80,
                _ => rng.gen_range(1..=500),
            };
            let ack_flag = packet.info.contains("[ACK]");
            let ack: i64 = if ack_flag { rng.gen_range(0..1_000_000) } else { 0 };
            layers.push(
                ProtocolLayer::new("Transmission Control Protocol")
                    .field("Src Port", ephemeral_port(rng))
                    .field("Dst Port", dst_port)
                    .field("Seq", rng.gen_range(0..1_000_000i64))
                    .field("Ack", ack)
                    .field("[SYN]", packet.info.contains("[SYN]"))
                    .field("[ACK]", ack_flag)
                    .field("Window", 65535i64),
            );
        }
        Protocol::Udp | Protocol::Dns => {
            let dst_port: i64 = if packet.protocol == Protocol::Dns { 53 } else { rng.gen_range(1..=500) };
            layers.push(
                ProtocolLayer::new("User Datagram Protocol")
                    .field("Src Port", ephemeral_port(rng))
                    .field("Dst Port", dst_port)
                    .field("Length", i64::from(packet.size) - 28),
            );
        }
        _ => {}
    }

    match packet.protocol {
        Protocol::Http => layers.push(
            ProtocolLayer::new("Hypertext Transfer Protocol")
                .field("Request Info", packet.info.as_str()),
        ),
        Protocol::Https => layers.push(
            ProtocolLayer::new("Transport Layer Security")
                .field("Version", "TLS 1.3")
                .field("Content", "Encrypted Application Data"),
        ),
        Protocol::Dns => {
            let kind = if packet.info.contains("query") { "Query" } else { "Response" };
            layers.push(
                ProtocolLayer::new("Domain Name System")
                    .field("Transaction ID", format!("0x{:x}", rng.gen_range(0..0xffffu32)))
                    .field("Type", kind)
                    .field("Info", packet.info.as_str()),
            );
        }
        _ => {}
    }

    layers
}

fn ephemeral_port<R: Rng + ?Sized>(rng: &mut R) -> i64 {
    rng.gen_range(1024..41024)
}

/// Short explanation for a field label, if there is one.
pub fn field_hint(label: &str) -> Option<&'static str> {
    let hint = match label {
        "Src" => "Source: The originating address (MAC or IP) of the packet.",
        "Dst" => "Destination: The target address (MAC or IP) of the packet.",
        "Src Port" => "Source Port: The port number on the source host.",
        "Dst Port" => "Destination Port: The port number on the destination host.",
        "Seq" => "Sequence Number: Used by TCP to identify and order segments of data.",
        "Ack" => "Acknowledgment Number: Used by TCP to confirm receipt of data segments.",
        "[SYN]" => "TCP Synchronize Flag: Signifies the initiation of a connection.",
        "[ACK]" => "TCP Acknowledgment Flag: Acknowledges successful receipt of a packet.",
        "Window" => "TCP Window Size: Data that can be sent before an acknowledgment is required.",
        "Total Length" => "Length of the IP datagram in bytes, including header and data.",
        "TTL" => "Time To Live: Limits how long data may circulate in a network.",
        "Version" => "TLS Version: The Transport Layer Security version used for encryption.",
        _ => return None,
    };
    Some(hint)
}

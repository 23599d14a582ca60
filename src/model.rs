// src/model.rs
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    #[serde(rename = "HTTP")]
    Http,
    #[serde(rename = "HTTPS")]
    Https,
    #[serde(rename = "IPv4")]
    Ipv4,
    #[serde(rename = "ARP")]
    Arp,
    #[serde(rename = "DNS")]
    Dns,
    #[serde(rename = "TCP")]
    Tcp,
    #[serde(rename = "UDP")]
    Udp,
}

impl Protocol {
    pub const ALL: [Protocol; 7] = [
        Protocol::Http,
        Protocol::Https,
        Protocol::Ipv4,
        Protocol::Arp,
        Protocol::Dns,
        Protocol::Tcp,
        Protocol::Udp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "HTTP",
            Protocol::Https => "HTTPS",
            Protocol::Ipv4 => "IPv4",
            Protocol::Arp => "ARP",
            Protocol::Dns => "DNS",
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a loaded capture. Never mutated after the capture is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
    pub id: u32,
    pub time: String,
    pub protocol: Protocol,
    pub source: String,
    pub destination: String,
    pub size: u32,
    pub info: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ThreatCounts {
    pub total: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolShare {
    pub name: String,
    pub value: u32,
}

/// Result of one analysis run. `analyzed_packets` and `total_packets` are
/// kept apart even though the mock backend sets them equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub top_protocol: Protocol,
    pub top_protocol_percentage: f64,
    pub generated_at: String,
    pub analyzed_packets: u32,
    pub total_packets: u32,
    pub threats_detected: ThreatCounts,
    pub key_findings: Vec<String>,
    pub protocol_distribution: Vec<ProtocolShare>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self { sender: Sender::User, text: text.into() }
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self { sender: Sender::Ai, text: text.into() }
    }
}

pub const CHAT_GREETING: &str = "Hello! I'm your context-aware Network Admin Assistant. Ask me anything about this packet capture.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TierId {
    Quick,
    Standard,
    Comprehensive,
}

impl TierId {
    pub fn as_str(&self) -> &'static str {
        match self {
            TierId::Quick => "quick",
            TierId::Standard => "standard",
            TierId::Comprehensive => "comprehensive",
        }
    }

    /// How much the assistant is asked to dig for this tier.
    pub fn guidance(&self) -> &'static str {
        match self {
            TierId::Quick => "Basic overview, focus on high-level statistics.",
            TierId::Standard => "More detailed analysis, identify common anomalies.",
            TierId::Comprehensive => {
                "In-depth analysis, correlate events, and provide detailed threat assessments."
            }
        }
    }
}

impl fmt::Display for TierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct AnalysisTier {
    pub id: TierId,
    pub name: &'static str,
    pub price: &'static str,
    pub credits: u32,
    pub features: &'static [&'static str],
    pub recommended: bool,
}

pub const ANALYSIS_TIERS: [AnalysisTier; 3] = [
    AnalysisTier {
        id: TierId::Quick,
        name: "Quick Analysis",
        price: "Free",
        credits: 0,
        features: &[
            "Local analysis with basic pattern detection",
            "Protocol distribution",
            "Basic threat detection",
            "Traffic volume analysis",
        ],
        recommended: false,
    },
    AnalysisTier {
        id: TierId::Standard,
        name: "Standard AI Analysis",
        price: "1 Credit",
        credits: 1,
        features: &[
            "AI-powered analysis with cost optimization",
            "All Standard features",
            "Advanced threat hunting",
            "Network topology insights",
        ],
        recommended: false,
    },
    AnalysisTier {
        id: TierId::Comprehensive,
        name: "Comprehensive Analysis",
        price: "3 Credits",
        credits: 3,
        features: &[
            "Full packet analysis with maximum AI processing power",
            "All Detailed features",
            "Full packet inspection",
            "Advanced correlation",
        ],
        recommended: true,
    },
];

/// Container format reported by probing an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureFormat {
    Pcap,
    PcapNg,
    Unrecognized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureProbe {
    pub format: CaptureFormat,
    pub frames: usize,
}

/// A loaded capture: what the table, filters and assistant work from.
#[derive(Debug, Clone)]
pub struct Capture {
    pub file_name: String,
    pub packets: Vec<Packet>,
    pub probe: Option<CaptureProbe>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_serializes_with_display_names() {
        let json = serde_json::to_string(&Protocol::Ipv4).unwrap();
        assert_eq!(json, "\"IPv4\"");
        let back: Protocol = serde_json::from_str("\"HTTPS\"").unwrap();
        assert_eq!(back, Protocol::Https);
    }

    #[test]
    fn summary_uses_camel_case_fields() {
        let summary = AnalysisSummary {
            top_protocol: Protocol::Dns,
            top_protocol_percentage: 12.5,
            generated_at: "now".into(),
            analyzed_packets: 10,
            total_packets: 20,
            threats_detected: ThreatCounts::default(),
            key_findings: vec![],
            protocol_distribution: vec![],
            recommendations: vec![],
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["topProtocol"], "DNS");
        assert_eq!(value["analyzedPackets"], 10);
        assert_eq!(value["totalPackets"], 20);
        assert!(value.get("threatsDetected").is_some());
    }

    #[test]
    fn only_comprehensive_tier_is_recommended() {
        let recommended: Vec<_> = ANALYSIS_TIERS
            .iter()
            .filter(|t| t.recommended)
            .map(|t| t.id)
            .collect();
        assert_eq!(recommended, vec![TierId::Comprehensive]);
    }
}

use crate::model::{Packet, Protocol};
use std::collections::HashSet;

/// Protocols offered as toggle chips, in chip order.
pub const FILTER_CHIPS: [Protocol; 5] = [
    Protocol::Http,
    Protocol::Https,
    Protocol::Ipv4,
    Protocol::Arp,
    Protocol::Dns,
];

/// Active table filters. An empty protocol set and blank address filters
/// let everything through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub protocols: HashSet<Protocol>,
    pub source: String,
    pub destination: String,
}

impl FilterState {
    pub fn toggle(&mut self, protocol: Protocol) {
        if !self.protocols.remove(&protocol) {
            self.protocols.insert(protocol);
        }
    }

    pub fn clear(&mut self) {
        self.protocols.clear();
        self.source.clear();
        self.destination.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.protocols.is_empty() && self.source.is_empty() && self.destination.is_empty()
    }

    /// The packets passing every active predicate, in capture order.
    pub fn apply<'a>(&self, packets: &'a [Packet]) -> Vec<&'a Packet> {
        let source = self.source.to_lowercase();
        let destination = self.destination.to_lowercase();
        packets
            .iter()
            .filter(|p| self.protocols.is_empty() || self.protocols.contains(&p.protocol))
            .filter(|p| contains_ignore_case(&p.source, &source))
            .filter(|p| contains_ignore_case(&p.destination, &destination))
            .collect()
    }
}

// `needle` must already be lowercase.
fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(needle)
}

use crate::model::{Packet, Protocol};
use rand::seq::SliceRandom;
use rand::Rng;

/// Id of the last generated sample packet.
pub const LAST_SAMPLE_ID: u32 = 100;

const SEED_PACKETS: [(u32, Protocol, &str, &str, u32, &str); 15] = [
    (13, Protocol::Https, "192.168.3.131", "52.15.72.14", 66, "HTTPS Encrypted Traffic"),
    (14, Protocol::Http, "72.14.213.147", "192.168.3.131", 54, "GET /api/data"),
    (15, Protocol::Ipv4, "192.168.3.131", "52.15.72.14", 60, "Fragmented IP protocol"),
    (16, Protocol::Https, "52.15.72.14", "192.168.3.131", 231, "HTTPS Encrypted Traffic"),
    (17, Protocol::Arp, "192.168.3.1", "Broadcast", 60, "Who has 192.168.3.131?"),
    (18, Protocol::Dns, "192.168.3.131", "8.8.8.8", 78, "Standard query for google.com"),
    (19, Protocol::Https, "192.168.3.131", "34.215.72.147", 345, "HTTPS Encrypted Traffic"),
    (20, Protocol::Http, "72.14.213.147", "192.168.3.131", 329, "POST /login"),
    (21, Protocol::Tcp, "192.168.3.131", "52.15.72.14", 54, "[SYN] Seq=0 Win=65535"),
    (22, Protocol::Udp, "192.168.3.131", "52.15.72.14", 280, "Port 5353"),
    (23, Protocol::Https, "34.215.72.147", "192.168.3.131", 99, "HTTPS Encrypted Traffic"),
    (24, Protocol::Arp, "192.168.3.131", "Broadcast", 42, "Who has 192.168.3.1?"),
    (25, Protocol::Dns, "8.8.8.8", "192.168.3.131", 120, "Response: google.com A 172.217.164.174"),
    (26, Protocol::Ipv4, "192.168.3.1", "224.0.0.251", 60, "IGMPv2 Membership Report"),
    (27, Protocol::Tcp, "52.15.72.14", "192.168.3.131", 54, "[SYN, ACK] Seq=0 Ack=1 Win=65535"),
];

/// The fixed packets every sample capture starts with.
pub fn seed_packets() -> Vec<Packet> {
    SEED_PACKETS
        .iter()
        .map(|&(id, protocol, source, destination, size, info)| Packet {
            id,
            time: "18:52".to_string(),
            protocol,
            source: source.to_string(),
            destination: destination.to_string(),
            size,
            info: info.to_string(),
        })
        .collect()
}

/// Seed packets followed by random filler up to [`LAST_SAMPLE_ID`].
pub fn sample_packets<R: Rng + ?Sized>(rng: &mut R) -> Vec<Packet> {
    let mut packets = seed_packets();
    let first = packets.last().map_or(1, |p| p.id + 1);
    for id in first..=LAST_SAMPLE_ID {
        let protocol = *Protocol::ALL.choose(rng).unwrap_or(&Protocol::Tcp);
        packets.push(Packet {
            id,
            time: "18:53".to_string(),
            protocol,
            source: format!("192.168.{}.{}", rng.gen_range(0..255), rng.gen_range(0..255)),
            destination: format!("52.15.{}.{}", rng.gen_range(0..255), rng.gen_range(0..255)),
            size: rng.gen_range(0..1500),
            info: format!("{} traffic detected", protocol),
        });
    }
    packets
}

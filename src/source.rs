use crate::error::SourceError;
use crate::model::{Capture, CaptureFormat, CaptureProbe, Packet};
use log::{debug, info};
use pcap_parser::{Block, PcapCapture, PcapNGCapture};
use std::path::Path;

pub const SAMPLE_FILE_NAME: &str = "sample_capture.pcap";

/// Turns uploaded bytes into the packets a capture is made of.
pub trait PacketSource {
    fn load(&self, file_name: &str, bytes: &[u8]) -> Capture;

    /// The built-in sample capture, used when the user asks for it explicitly.
    fn sample(&self) -> Capture;
}

/// Serves the same in-memory sample dataset for every upload. The uploaded
/// bytes are only probed so the header can say what was actually opened.
pub struct SampleSource {
    packets: Vec<Packet>,
}

impl SampleSource {
    pub fn new(packets: Vec<Packet>) -> Self {
        Self { packets }
    }
}

impl PacketSource for SampleSource {
    fn load(&self, file_name: &str, bytes: &[u8]) -> Capture {
        let probe = probe_capture(bytes);
        info!(
            "Opened {} ({:?}, {} frames on disk), substituting {} sample packets",
            file_name,
            probe.format,
            probe.frames,
            self.packets.len()
        );
        Capture {
            file_name: file_name.to_string(),
            packets: self.packets.clone(),
            probe: Some(probe),
        }
    }

    fn sample(&self) -> Capture {
        info!("Loading built-in sample capture");
        Capture {
            file_name: SAMPLE_FILE_NAME.to_string(),
            packets: self.packets.clone(),
            probe: None,
        }
    }
}

/// Reads `path` and hands it to `source`.
pub fn load_path(source: &dyn PacketSource, path: &Path) -> Result<Capture, SourceError> {
    let bytes = std::fs::read(path).map_err(|e| SourceError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(source.load(&name, &bytes))
}

/// Recognizes the capture container and counts its frames. Never decodes
/// frame contents; anything unparsable is reported as unrecognized.
pub fn probe_capture(bytes: &[u8]) -> CaptureProbe {
    if let Ok(capture) = PcapCapture::from_file(bytes) {
        return CaptureProbe {
            format: CaptureFormat::Pcap,
            frames: capture.blocks.len(),
        };
    }
    if let Ok(capture) = PcapNGCapture::from_file(bytes) {
        let frames = capture
            .sections
            .iter()
            .flat_map(|s| s.blocks.iter())
            .filter(|b| matches!(b, Block::EnhancedPacket(_) | Block::SimplePacket(_)))
            .count();
        return CaptureProbe {
            format: CaptureFormat::PcapNg,
            frames,
        };
    }
    debug!("Upload of {} bytes is not a pcap or pcapng file", bytes.len());
    CaptureProbe {
        format: CaptureFormat::Unrecognized,
        frames: 0,
    }
}

use crate::error::ExportError;
use crate::model::Packet;
use chrono::{DateTime, SecondsFormat, Utc};
use log::info;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

pub const CSV_HEADER: &str = "#,Time,Protocol,Source,Destination,Size,Info";

/// Renders packets as CSV. Only the info column is quoted.
pub fn to_csv(packets: &[&Packet]) -> String {
    let mut out = String::from(CSV_HEADER);
    for p in packets {
        let _ = write!(
            out,
            "\n{},{},{},{},{},{},\"{}\"",
            p.id,
            p.time,
            p.protocol,
            p.source,
            p.destination,
            p.size,
            p.info.replace('"', "\"\"")
        );
    }
    out
}

pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!(
        "intellipcap_export_{}.csv",
        now.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

/// Writes the filtered packets into `dir`. Refuses an empty set.
pub fn write_csv(dir: &Path, packets: &[&Packet], now: DateTime<Utc>) -> Result<PathBuf, ExportError> {
    if packets.is_empty() {
        return Err(ExportError::NothingToExport);
    }
    let path = dir.join(export_file_name(now));
    std::fs::write(&path, to_csv(packets)).map_err(|e| ExportError::Io {
        path: path.clone(),
        source: e,
    })?;
    info!("Exported {} packets to {}", packets.len(), path.display());
    Ok(path)
}

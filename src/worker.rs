use crate::assistant::Assistant;
use crate::export;
use crate::model::Packet;
use crate::source::{self, PacketSource};
use crate::state::{Action, Command};
use log::error;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::sync::Arc;

/// Runs reducer commands off the UI thread. Every outcome comes back as an
/// [`Action`] on `tx`, which the UI loop drains between frames.
pub struct Worker {
    tx: Sender<Action>,
    source: Arc<dyn PacketSource + Send + Sync>,
    assistant: Assistant,
    export_dir: PathBuf,
}

impl Worker {
    pub fn new(
        tx: Sender<Action>,
        source: Arc<dyn PacketSource + Send + Sync>,
        assistant: Assistant,
        export_dir: PathBuf,
    ) -> Self {
        Self { tx, source, assistant, export_dir }
    }

    /// Starts `command`. `Quit` is the caller's business and is ignored.
    pub fn dispatch(&self, command: Command) {
        let tx = self.tx.clone();
        match command {
            Command::Load(path) => {
                let packet_source = Arc::clone(&self.source);
                tokio::task::spawn_blocking(move || {
                    let action = match path {
                        None => Action::CaptureLoaded(packet_source.sample()),
                        Some(path) => match source::load_path(packet_source.as_ref(), &path) {
                            Ok(capture) => Action::CaptureLoaded(capture),
                            Err(e) => {
                                error!("{}", e);
                                Action::LoadFailed(e.to_string())
                            }
                        },
                    };
                    let _ = tx.send(action);
                });
            }
            Command::Analyze { session, tier, packets } => {
                let assistant = self.assistant.clone();
                tokio::spawn(async move {
                    let result = assistant
                        .run_analysis(tier, &packets)
                        .await
                        .map_err(|e| e.to_string());
                    let _ = tx.send(Action::AnalysisFinished { session, result });
                });
            }
            Command::Chat { session, history, summary, filtered, selected } => {
                let assistant = self.assistant.clone();
                tokio::spawn(async move {
                    let text = assistant
                        .chat_reply(&history, summary.as_ref(), &filtered, selected.as_ref())
                        .await;
                    let _ = tx.send(Action::ChatReplied { session, text });
                });
            }
            Command::Export(packets) => {
                let dir = self.export_dir.clone();
                tokio::task::spawn_blocking(move || {
                    let refs: Vec<&Packet> = packets.iter().collect();
                    let result = export::write_csv(&dir, &refs, chrono::Utc::now()).map_err(|e| {
                        error!("Export failed: {}", e);
                        e.to_string()
                    });
                    let _ = tx.send(Action::Exported(result));
                });
            }
            Command::Quit => {}
        }
    }
}

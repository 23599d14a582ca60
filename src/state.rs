use crate::filter::FilterState;
use crate::layers::{synthesize, ProtocolLayer};
use crate::model::{AnalysisSummary, Capture, ChatMessage, Packet, Protocol, TierId, CHAT_GREETING};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Upload,
    Analysis,
}

/// Which text buffer, if any, receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    EditPath,
    EditSource,
    EditDestination,
    Chat,
}

#[derive(Debug, Clone)]
pub enum Action {
    // Upload
    LoadSample,
    CaptureLoaded(Capture),
    LoadFailed(String),
    // Editing
    Edit(Mode),
    Type(char),
    Backspace,
    Submit,
    Cancel,
    // Table and filters
    ToggleProtocol(Protocol),
    ClearFilters,
    CursorUp,
    CursorDown,
    SelectAtCursor,
    ToggleHints,
    Export,
    Exported(Result<PathBuf, String>),
    // Analysis
    NextTier,
    RunAnalysis,
    AnalysisFinished { session: u64, result: Result<AnalysisSummary, String> },
    // Chat
    OpenChat,
    ChatReplied { session: u64, text: String },
    StartOver,
    Quit,
}

impl Action {
    /// Results of background work, as opposed to user input.
    fn is_completion(&self) -> bool {
        matches!(
            self,
            Action::CaptureLoaded(_)
                | Action::LoadFailed(_)
                | Action::Exported(_)
                | Action::AnalysisFinished { .. }
                | Action::ChatReplied { .. }
        )
    }
}

/// Work the reducer asks the outside world to do.
#[derive(Debug, Clone)]
pub enum Command {
    /// `None` loads the built-in sample.
    Load(Option<PathBuf>),
    Analyze {
        session: u64,
        tier: TierId,
        packets: Vec<Packet>,
    },
    Chat {
        session: u64,
        history: Vec<ChatMessage>,
        summary: Option<AnalysisSummary>,
        filtered: Vec<Packet>,
        selected: Option<Packet>,
    },
    Export(Vec<Packet>),
    Quit,
}

/// The single owner of everything the UI shows.
pub struct AppState {
    pub view: View,
    pub mode: Mode,
    pub capture: Option<Capture>,
    pub filter: FilterState,
    pub cursor: usize,
    pub selected: Option<u32>,
    pub layers: Vec<ProtocolLayer>,
    pub show_hints: bool,
    pub tier: TierId,
    pub summary: Option<AnalysisSummary>,
    pub analysis_loading: bool,
    pub chat: Vec<ChatMessage>,
    pub chat_open: bool,
    pub chat_loading: bool,
    pub chat_input: String,
    pub path_input: String,
    pub notice: Option<String>,
    pub assistant_label: &'static str,
    /// Bumped whenever the capture is replaced, so late results are dropped.
    session: u64,
    rng: StdRng,
}

impl AppState {
    pub fn new(rng: StdRng, assistant_label: &'static str) -> Self {
        Self {
            view: View::Upload,
            mode: Mode::EditPath,
            capture: None,
            filter: FilterState::default(),
            cursor: 0,
            selected: None,
            layers: Vec::new(),
            show_hints: false,
            tier: TierId::Comprehensive,
            summary: None,
            analysis_loading: false,
            chat: vec![ChatMessage::ai(CHAT_GREETING)],
            chat_open: false,
            chat_loading: false,
            chat_input: String::new(),
            path_input: String::new(),
            notice: None,
            assistant_label,
            session: 0,
            rng,
        }
    }

    pub fn packets(&self) -> &[Packet] {
        match &self.capture {
            Some(capture) => &capture.packets,
            None => &[],
        }
    }

    pub fn filtered(&self) -> Vec<&Packet> {
        self.filter.apply(self.packets())
    }

    pub fn selected_packet(&self) -> Option<&Packet> {
        let id = self.selected?;
        self.packets().iter().find(|p| p.id == id)
    }

    pub fn update(&mut self, action: Action) -> Option<Command> {
        if !action.is_completion() {
            self.notice = None;
        }
        match action {
            Action::LoadSample => {
                if self.view == View::Upload {
                    return Some(Command::Load(None));
                }
            }
            Action::CaptureLoaded(capture) => self.load(capture),
            Action::LoadFailed(reason) => self.notice = Some(reason),

            Action::Edit(mode) => self.mode = mode,
            Action::Type(c) => self.type_char(c),
            Action::Backspace => {
                if let Some(buf) = self.input_buffer() {
                    buf.pop();
                }
                self.clamp_cursor();
            }
            Action::Submit => return self.submit(),
            Action::Cancel => {
                if self.mode == Mode::Chat || self.chat_open {
                    self.chat_open = false;
                }
                self.mode = if self.view == View::Upload { Mode::EditPath } else { Mode::Normal };
            }

            Action::ToggleProtocol(protocol) => {
                self.filter.toggle(protocol);
                self.clamp_cursor();
            }
            Action::ClearFilters => {
                self.filter.clear();
                self.clamp_cursor();
            }
            Action::CursorUp => self.cursor = self.cursor.saturating_sub(1),
            Action::CursorDown => {
                self.cursor += 1;
                self.clamp_cursor();
            }
            Action::SelectAtCursor => self.select_at_cursor(),
            Action::ToggleHints => self.show_hints = !self.show_hints,
            Action::Export => {
                let filtered: Vec<Packet> = self.filtered().into_iter().cloned().collect();
                if filtered.is_empty() {
                    self.notice = Some("No packets to export.".to_string());
                } else {
                    return Some(Command::Export(filtered));
                }
            }
            Action::Exported(result) => {
                self.notice = Some(match result {
                    Ok(path) => format!("Exported to {}", path.display()),
                    Err(reason) => reason,
                });
            }

            Action::NextTier => {
                self.tier = match self.tier {
                    TierId::Quick => TierId::Standard,
                    TierId::Standard => TierId::Comprehensive,
                    TierId::Comprehensive => TierId::Quick,
                };
            }
            Action::RunAnalysis => return self.start_analysis(),
            Action::AnalysisFinished { session, result } => {
                if session != self.session {
                    debug!("Dropping analysis result from session {}", session);
                    return None;
                }
                self.analysis_loading = false;
                match result {
                    Ok(summary) => self.summary = Some(summary),
                    Err(reason) => {
                        warn!("Analysis failed: {}", reason);
                        self.notice = Some("Analysis failed. Please try again.".to_string());
                    }
                }
            }

            Action::OpenChat => {
                if self.view == View::Analysis {
                    self.chat_open = true;
                    self.mode = Mode::Chat;
                }
            }
            Action::ChatReplied { session, text } => {
                if session == self.session {
                    self.chat.push(ChatMessage::ai(text));
                    self.chat_loading = false;
                }
            }

            Action::StartOver => self.start_over(),
            Action::Quit => return Some(Command::Quit),
        }
        None
    }

    fn load(&mut self, capture: Capture) {
        info!("Loaded {} with {} packets", capture.file_name, capture.packets.len());
        self.start_over();
        self.capture = Some(capture);
        self.view = View::Analysis;
        self.mode = Mode::Normal;
    }

    fn start_over(&mut self) {
        self.session += 1;
        self.view = View::Upload;
        self.mode = Mode::EditPath;
        self.capture = None;
        self.filter.clear();
        self.cursor = 0;
        self.selected = None;
        self.layers.clear();
        self.summary = None;
        self.analysis_loading = false;
        self.chat = vec![ChatMessage::ai(CHAT_GREETING)];
        self.chat_open = false;
        self.chat_loading = false;
        self.chat_input.clear();
        self.path_input.clear();
    }

    fn input_buffer(&mut self) -> Option<&mut String> {
        match self.mode {
            Mode::Normal => None,
            Mode::EditPath => Some(&mut self.path_input),
            Mode::EditSource => Some(&mut self.filter.source),
            Mode::EditDestination => Some(&mut self.filter.destination),
            Mode::Chat => Some(&mut self.chat_input),
        }
    }

    fn type_char(&mut self, c: char) {
        if self.mode == Mode::Chat && self.chat_loading {
            return;
        }
        if let Some(buf) = self.input_buffer() {
            buf.push(c);
        }
        self.clamp_cursor();
    }

    fn submit(&mut self) -> Option<Command> {
        match self.mode {
            Mode::Normal => {
                self.select_at_cursor();
                None
            }
            Mode::EditPath => {
                let path = self.path_input.trim();
                if path.is_empty() {
                    self.notice = Some("Type a capture path, or press Tab for the sample.".to_string());
                    return None;
                }
                Some(Command::Load(Some(PathBuf::from(path))))
            }
            Mode::EditSource | Mode::EditDestination => {
                self.mode = Mode::Normal;
                None
            }
            Mode::Chat => self.send_chat(),
        }
    }

    fn send_chat(&mut self) -> Option<Command> {
        let text = self.chat_input.trim().to_string();
        if text.is_empty() || self.chat_loading {
            return None;
        }
        self.chat_input.clear();
        self.chat.push(ChatMessage::user(text));
        self.chat_loading = true;
        Some(Command::Chat {
            session: self.session,
            history: self.chat.clone(),
            summary: self.summary.clone(),
            filtered: self.filtered().into_iter().cloned().collect(),
            selected: self.selected_packet().cloned(),
        })
    }

    fn start_analysis(&mut self) -> Option<Command> {
        if self.analysis_loading || self.capture.is_none() {
            return None;
        }
        self.analysis_loading = true;
        self.summary = None;
        Some(Command::Analyze {
            session: self.session,
            tier: self.tier,
            packets: self.packets().to_vec(),
        })
    }

    fn select_at_cursor(&mut self) {
        let Some(packet) = self.filtered().get(self.cursor).map(|p| (*p).clone()) else {
            return;
        };
        self.layers = synthesize(&packet, &mut self.rng);
        self.selected = Some(packet.id);
    }

    fn clamp_cursor(&mut self) {
        let len = self.filtered().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Sender, ThreatCounts};
    use crate::sample::seed_packets;
    use rand::SeedableRng;

    fn state() -> AppState {
        AppState::new(StdRng::seed_from_u64(1), "mock")
    }

    fn loaded() -> AppState {
        let mut s = state();
        s.update(Action::CaptureLoaded(Capture {
            file_name: "trace.pcap".into(),
            packets: seed_packets(),
            probe: None,
        }));
        s
    }

    fn summary(total: u32) -> AnalysisSummary {
        AnalysisSummary {
            top_protocol: Protocol::Https,
            top_protocol_percentage: 25.0,
            generated_at: "now".into(),
            analyzed_packets: total,
            total_packets: total,
            threats_detected: ThreatCounts::default(),
            key_findings: vec![],
            protocol_distribution: vec![],
            recommendations: vec![],
        }
    }

    fn type_str(s: &mut AppState, text: &str) {
        for c in text.chars() {
            s.update(Action::Type(c));
        }
    }

    #[test]
    fn typed_path_is_submitted_for_loading() {
        let mut s = state();
        type_str(&mut s, " /tmp/x.pcap ");
        match s.update(Action::Submit) {
            Some(Command::Load(Some(path))) => assert_eq!(path, PathBuf::from("/tmp/x.pcap")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn empty_path_gives_a_notice() {
        let mut s = state();
        assert!(s.update(Action::Submit).is_none());
        assert!(s.notice.is_some());
    }

    #[test]
    fn loading_switches_view_and_clears_previous_session() {
        let mut s = loaded();
        s.summary = Some(summary(15));
        s.chat.push(ChatMessage::user("hello"));
        s.update(Action::CaptureLoaded(Capture {
            file_name: "other.pcap".into(),
            packets: seed_packets(),
            probe: None,
        }));
        assert_eq!(s.view, View::Analysis);
        assert!(s.summary.is_none());
        assert_eq!(s.chat.len(), 1);
        assert_eq!(s.chat[0].sender, Sender::Ai);
    }

    #[test]
    fn second_analysis_is_ignored_while_loading() {
        let mut s = loaded();
        assert!(matches!(
            s.update(Action::RunAnalysis),
            Some(Command::Analyze { tier: TierId::Comprehensive, .. })
        ));
        assert!(s.analysis_loading);
        assert!(s.update(Action::RunAnalysis).is_none());
    }

    #[test]
    fn analysis_failure_resets_loading_and_notifies() {
        let mut s = loaded();
        s.summary = Some(summary(15));
        let session = match s.update(Action::RunAnalysis) {
            Some(Command::Analyze { session, .. }) => session,
            other => panic!("unexpected {:?}", other),
        };
        assert!(s.summary.is_none());
        s.update(Action::AnalysisFinished { session, result: Err("boom".into()) });
        assert!(!s.analysis_loading);
        assert!(s.summary.is_none());
        assert!(s.notice.is_some());
    }

    #[test]
    fn late_results_from_an_old_session_are_dropped() {
        let mut s = loaded();
        let session = match s.update(Action::RunAnalysis) {
            Some(Command::Analyze { session, .. }) => session,
            other => panic!("unexpected {:?}", other),
        };
        s.update(Action::StartOver);
        s.update(Action::AnalysisFinished { session, result: Ok(summary(15)) });
        assert!(s.summary.is_none());
        assert_eq!(s.view, View::Upload);
    }

    #[test]
    fn empty_export_notifies_instead_of_exporting() {
        let mut s = loaded();
        s.update(Action::Edit(Mode::EditSource));
        type_str(&mut s, "no-such-host");
        assert!(s.filtered().is_empty());
        assert!(s.update(Action::Export).is_none());
        assert_eq!(s.notice.as_deref(), Some("No packets to export."));
    }

    #[test]
    fn export_carries_the_filtered_packets() {
        let mut s = loaded();
        s.update(Action::ToggleProtocol(Protocol::Arp));
        match s.update(Action::Export) {
            Some(Command::Export(packets)) => {
                assert_eq!(packets.iter().map(|p| p.id).collect::<Vec<_>>(), vec![17, 24])
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn selecting_synthesizes_layers() {
        let mut s = loaded();
        s.update(Action::ToggleProtocol(Protocol::Arp));
        s.update(Action::SelectAtCursor);
        assert_eq!(s.selected, Some(17));
        assert_eq!(s.layers.len(), 2);
        // Selection survives a filter that hides the packet.
        s.update(Action::ClearFilters);
        s.update(Action::ToggleProtocol(Protocol::Dns));
        assert_eq!(s.selected_packet().map(|p| p.id), Some(17));
    }

    #[test]
    fn cursor_stays_inside_the_filtered_view() {
        let mut s = loaded();
        for _ in 0..40 {
            s.update(Action::CursorDown);
        }
        assert_eq!(s.cursor, 14);
        s.update(Action::ToggleProtocol(Protocol::Udp));
        assert_eq!(s.cursor, 0);
    }

    #[test]
    fn chat_sends_context_and_gates_while_waiting() {
        let mut s = loaded();
        s.update(Action::SelectAtCursor);
        s.update(Action::OpenChat);
        assert_eq!(s.mode, Mode::Chat);

        assert!(s.update(Action::Submit).is_none(), "blank input is ignored");
        type_str(&mut s, "any risks?");
        let cmd = s.update(Action::Submit);
        match cmd {
            Some(Command::Chat { history, filtered, selected, .. }) => {
                assert_eq!(history.len(), 2);
                assert_eq!(history[1].text, "any risks?");
                assert_eq!(filtered.len(), 15);
                assert_eq!(selected.map(|p| p.id), Some(13));
            }
            other => panic!("unexpected {:?}", other),
        }
        type_str(&mut s, "again");
        assert!(s.update(Action::Submit).is_none());

        let session = s.session;
        s.update(Action::ChatReplied { session, text: "**Low** risk".into() });
        assert!(!s.chat_loading);
        assert_eq!(s.chat.last().map(|m| m.sender), Some(Sender::Ai));
    }

    #[test]
    fn tiers_cycle() {
        let mut s = state();
        s.update(Action::NextTier);
        assert_eq!(s.tier, TierId::Quick);
        s.update(Action::NextTier);
        assert_eq!(s.tier, TierId::Standard);
    }
}

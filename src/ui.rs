use crate::filter::FILTER_CHIPS;
use crate::layers::field_hint;
use crate::model::{CaptureFormat, Protocol, Sender, ANALYSIS_TIERS};
use crate::state::{AppState, Mode, View};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

const ACCENT: Color = Color::Green;

pub fn draw(f: &mut Frame, state: &AppState) {
    match state.view {
        View::Upload => draw_upload(f, state),
        View::Analysis => draw_analysis(f, state),
    }
    if state.chat_open {
        draw_chat(f, state);
    }
}

fn protocol_color(protocol: Protocol) -> Color {
    match protocol {
        Protocol::Https => Color::Magenta,
        Protocol::Dns => Color::Blue,
        Protocol::Http => Color::Yellow,
        Protocol::Arp => Color::Cyan,
        Protocol::Tcp => Color::Green,
        Protocol::Udp => Color::LightBlue,
        Protocol::Ipv4 => Color::Gray,
    }
}

/// Splits `**bold**` markers into styled spans. An unmatched trailing
/// marker is kept as literal text.
pub fn emphasis_spans(text: &str) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find("**") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("**") else { break };
        if start > 0 {
            spans.push(Span::raw(rest[..start].to_string()));
        }
        spans.push(Span::styled(
            after[..end].to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        rest = &after[end + 2..];
    }
    if !rest.is_empty() {
        spans.push(Span::raw(rest.to_string()));
    }
    spans
}

fn input_line<'a>(label: &'a str, value: &'a str, active: bool) -> Line<'a> {
    let style = if active {
        Style::default().fg(Color::Black).bg(ACCENT)
    } else {
        Style::default().fg(Color::White).bg(Color::DarkGray)
    };
    let shown = if active { format!("{}_", value) } else { value.to_string() };
    Line::from(vec![
        Span::styled(format!("{}: ", label), Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(format!(" {} ", shown), style),
    ])
}

fn draw_upload(f: &mut Frame, state: &AppState) {
    let area = centered(f.size(), 60, 40);
    let mut lines = vec![
        Line::from(Span::styled(
            "Upload a capture to get started",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Type the path of a .pcap or .pcapng file and press Enter,"),
        Line::from("or press Tab to explore the sample capture."),
        Line::from(""),
        input_line("Capture file", &state.path_input, state.mode == Mode::EditPath),
        Line::from(""),
        Line::from(Span::styled("Esc quits", Style::default().fg(Color::DarkGray))),
    ];
    if let Some(notice) = &state.notice {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(notice.as_str(), Style::default().fg(Color::Red))));
    }
    let upload = Paragraph::new(lines)
        .block(Block::default().title(" IntelliPcap ").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    f.render_widget(upload, area);
}

fn draw_analysis(f: &mut Frame, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(1),
        ])
        .split(f.size());

    draw_filter_bar(f, state, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(rows[1]);
    draw_analysis_panel(f, state, columns[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(columns[1]);
    draw_packet_table(f, state, right[0]);

    let details = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(right[1]);
    draw_packet_details(f, state, details[0]);
    draw_protocol_layers(f, state, details[1]);

    draw_status(f, state, rows[2]);
}

fn draw_filter_bar(f: &mut Frame, state: &AppState, area: Rect) {
    let mut spans = vec![Span::styled("Protocol ", Style::default().add_modifier(Modifier::BOLD))];
    for (i, protocol) in FILTER_CHIPS.iter().enumerate() {
        let style = if state.filter.protocols.contains(protocol) {
            Style::default().fg(Color::Black).bg(ACCENT)
        } else {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {}:{} ", i + 1, protocol), style));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::raw("  "));
    spans.extend(input_line("(s)ource", &state.filter.source, state.mode == Mode::EditSource).spans);
    spans.push(Span::raw("  "));
    spans.extend(
        input_line("(d)estination", &state.filter.destination, state.mode == Mode::EditDestination)
            .spans,
    );

    let title = if state.filter.is_empty() { " Filters " } else { " Filters (x clears) " };
    let bar = Paragraph::new(Line::from(spans))
        .block(Block::default().title(title).borders(Borders::ALL));
    f.render_widget(bar, area);
}

fn draw_packet_table(f: &mut Frame, state: &AppState, area: Rect) {
    let filtered = state.filtered();
    let total = state.packets().len();
    let file = state.capture.as_ref().map(|c| {
        let probe = match c.probe {
            Some(p) if p.format == CaptureFormat::Pcap => format!(" [pcap, {} frames]", p.frames),
            Some(p) if p.format == CaptureFormat::PcapNg => format!(" [pcapng, {} frames]", p.frames),
            Some(_) => " [unrecognized format]".to_string(),
            None => String::new(),
        };
        format!("{}{}", c.file_name, probe)
    });

    let rows: Vec<Row> = filtered
        .iter()
        .map(|p| {
            let marker = if state.selected == Some(p.id) { "*" } else { "" };
            Row::new(vec![
                format!("{}{}", marker, p.id),
                p.time.clone(),
                p.protocol.to_string(),
                p.source.clone(),
                p.destination.clone(),
                p.size.to_string(),
                p.info.clone(),
            ])
            .style(Style::default().fg(protocol_color(p.protocol)))
        })
        .collect();

    let widths = [
        Constraint::Length(5),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(16),
        Constraint::Length(16),
        Constraint::Length(5),
        Constraint::Min(10),
    ];
    let title = format!(
        " Packets ({} of {}) {} ",
        filtered.len(),
        total,
        file.unwrap_or_default()
    );
    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["#", "Time", "Proto", "Source", "Destination", "Size", "Info"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol(">> ");

    let mut table_state = TableState::default();
    if !filtered.is_empty() {
        table_state.select(Some(state.cursor));
    }
    f.render_stateful_widget(table, area, &mut table_state);
}

fn draw_packet_details(f: &mut Frame, state: &AppState, area: Rect) {
    let block = Block::default().title(" Packet Details ").borders(Borders::ALL);
    let Some(p) = state.selected_packet() else {
        let empty = Paragraph::new("No packet selected. Press Enter on a packet to view details.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block)
            .wrap(Wrap { trim: true });
        f.render_widget(empty, area);
        return;
    };
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let lines = vec![
        Line::from(vec![Span::styled("Time: ", bold), Span::raw(p.time.as_str())]),
        Line::from(vec![Span::styled("Source: ", bold), Span::raw(p.source.as_str())]),
        Line::from(vec![Span::styled("Destination: ", bold), Span::raw(p.destination.as_str())]),
        Line::from(vec![Span::styled("Protocol: ", bold), Span::raw(p.protocol.as_str())]),
        Line::from(vec![Span::styled("Size: ", bold), Span::raw(format!("{} bytes", p.size))]),
        Line::from(vec![Span::styled("Info: ", bold), Span::raw(p.info.as_str())]),
    ];
    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: true }), area);
}

fn draw_protocol_layers(f: &mut Frame, state: &AppState, area: Rect) {
    let title = if state.show_hints { " Protocol Analysis (h hides hints) " } else { " Protocol Analysis (h for hints) " };
    let block = Block::default().title(title).borders(Borders::ALL);
    if state.selected.is_none() {
        let empty = Paragraph::new("No packet selected. Press Enter on a packet to view protocol details.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block)
            .wrap(Wrap { trim: true });
        f.render_widget(empty, area);
        return;
    }

    let mut lines = Vec::new();
    for layer in &state.layers {
        lines.push(Line::from(Span::styled(
            format!("▾ {}", layer.name),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )));
        for (label, value) in &layer.fields {
            let mut spans = vec![
                Span::styled(format!("    {}: ", label), Style::default().fg(Color::Gray)),
                Span::raw(value.to_string()),
            ];
            if state.show_hints {
                if let Some(hint) = field_hint(label) {
                    spans.push(Span::styled(format!("  ({})", hint), Style::default().fg(Color::DarkGray)));
                }
            }
            lines.push(Line::from(spans));
        }
    }
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_analysis_panel(f: &mut Frame, state: &AppState, area: Rect) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![Line::from(Span::styled("Choose an analysis level (t)", bold))];
    for tier in ANALYSIS_TIERS.iter() {
        let chosen = tier.id == state.tier;
        let marker = if chosen { "(•)" } else { "( )" };
        let price_style = if tier.credits > 0 {
            Style::default().fg(Color::LightMagenta)
        } else {
            Style::default().fg(ACCENT)
        };
        let mut spans = vec![
            Span::styled(format!("{} {} ", marker, tier.name), if chosen { bold } else { Style::default() }),
            Span::styled(format!("[{}]", tier.price), price_style),
        ];
        if tier.recommended {
            spans.push(Span::styled(" Recommended", Style::default().fg(Color::LightYellow)));
        }
        lines.push(Line::from(spans));
        if chosen {
            for feature in tier.features {
                lines.push(Line::from(Span::styled(
                    format!("    - {}", feature),
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }
    }
    lines.push(Line::from(""));
    let run = if state.analysis_loading { "Analyzing..." } else { "Press a to Run Analysis" };
    lines.push(Line::from(Span::styled(run, Style::default().fg(Color::Black).bg(ACCENT))));
    lines.push(Line::from(""));

    match &state.summary {
        None => lines.push(Line::from(Span::styled(
            "Run an analysis to see the summary.",
            Style::default().fg(Color::DarkGray),
        ))),
        Some(s) => {
            lines.push(Line::from(vec![
                Span::styled(format!("{} ", s.total_packets), Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
                Span::raw("total packets   "),
                Span::styled(
                    format!("{} ", s.threats_detected.total),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!(
                    "threats (H{} M{} L{})",
                    s.threats_detected.high, s.threats_detected.medium, s.threats_detected.low
                )),
            ]));
            lines.push(Line::from(format!(
                "Top protocol: {} ({}% of traffic)",
                s.top_protocol, s.top_protocol_percentage
            )));
            lines.push(Line::from(format!(
                "Analyzed {} packets, generated {}",
                s.analyzed_packets, s.generated_at
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Protocol Distribution", bold)));
            // Values come from the model unchecked; u64 keeps the sum and the
            // scaled share from overflowing.
            let sum: u64 = s.protocol_distribution.iter().map(|d| u64::from(d.value)).sum();
            for share in &s.protocol_distribution {
                let pct = if sum == 0 { 0 } else { u64::from(share.value) * 100 / sum };
                lines.push(Line::from(format!(
                    "{:<6} {:<20} {:>3}%",
                    share.name,
                    "█".repeat((pct / 5) as usize),
                    pct
                )));
            }
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Key Findings", bold)));
            for finding in &s.key_findings {
                lines.push(Line::from(format!("✓ {}", finding)));
            }
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Recommendations", bold)));
            for rec in &s.recommendations {
                lines.push(Line::from(Span::styled(format!("✓ {}", rec), Style::default().fg(Color::LightYellow))));
            }
        }
    }

    let panel = Paragraph::new(lines)
        .block(Block::default().title(" Smart AI Analysis ").borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    f.render_widget(panel, area);
}

fn draw_status(f: &mut Frame, state: &AppState, area: Rect) {
    let line = match &state.notice {
        Some(notice) => Line::from(Span::styled(notice.as_str(), Style::default().fg(Color::Red))),
        None => Line::from(Span::styled(
            "↑↓ move  Enter select  1-5 protocols  s/d addresses  e export  c chat  o start over  q quit",
            Style::default().fg(Color::DarkGray),
        )),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_chat(f: &mut Frame, state: &AppState) {
    let area = centered(f.size(), 60, 70);
    f.render_widget(Clear, area);
    let block = Block::default()
        .title(format!(" Network Admin Assistant ({}) - Esc closes ", state.assistant_label))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(inner);

    // Newest messages win when the history outgrows the panel.
    let width = parts[0].width.max(1) as usize;
    let mut budget = parts[0].height as usize;
    let mut lines: Vec<Line> = Vec::new();
    for message in state.chat.iter().rev() {
        let needed = message.text.len() / width + 2;
        if needed > budget && !lines.is_empty() {
            break;
        }
        budget = budget.saturating_sub(needed);
        let (who, color) = match message.sender {
            Sender::User => ("You", ACCENT),
            Sender::Ai => ("Assistant", Color::Cyan),
        };
        let mut spans = vec![Span::styled(
            format!("{}: ", who),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )];
        spans.extend(emphasis_spans(&message.text));
        lines.insert(0, Line::from(""));
        lines.insert(0, Line::from(spans));
    }
    if state.chat_loading {
        lines.push(Line::from(Span::styled("Assistant is typing...", Style::default().fg(Color::DarkGray))));
    }
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), parts[0]);

    let input = if state.chat_loading {
        Line::from(Span::styled("waiting for reply...", Style::default().fg(Color::DarkGray)))
    } else {
        input_line("Ask", &state.chat_input, state.mode == Mode::Chat)
    };
    f.render_widget(Paragraph::new(input), parts[1]);
}

fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

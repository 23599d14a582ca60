use crate::config::{AssistantConfig, Backend};
use crate::error::AssistantError;
use crate::model::{
    AnalysisSummary, ChatMessage, Packet, Protocol, ProtocolShare, Sender, ThreatCounts, TierId,
};
use log::{error, info, warn};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

pub const CHAT_APOLOGY: &str =
    "Sorry, I encountered an error while trying to respond. Please try again.";

const SYSTEM_INSTRUCTION: &str = "You are a helpful and knowledgeable Network Admin Assistant.
You are assisting a user who is analyzing a packet capture file.
Your role is to answer questions about the network traffic, security risks, and provide recommendations based on the data.
Be concise and clear in your answers. Use markdown for formatting, like **bolding** for emphasis.
The user's chat history is provided below. Respond to the last user message.
When answering, you MUST consider all available context: the overall analysis summary, the list of packets currently displayed on the user's screen, and the specific packet the user has selected (if any). The user's question is likely related to what they are currently seeing.";

/// Where analysis and chat requests go.
#[derive(Clone)]
pub enum Assistant {
    Gemini(GeminiClient),
    Mock,
}

impl Assistant {
    /// Builds the configured backend. A remote backend without an API key
    /// in the environment degrades to the mock one.
    pub fn from_config(config: &AssistantConfig) -> Result<Self, AssistantError> {
        match config.backend {
            Backend::Mock => Ok(Assistant::Mock),
            Backend::Gemini => match std::env::var(&config.api_key_env) {
                Ok(key) if !key.trim().is_empty() => Ok(Assistant::Gemini(GeminiClient::new(config, key)?)),
                _ => {
                    warn!(
                        "{} is not set, falling back to the mock assistant",
                        config.api_key_env
                    );
                    Ok(Assistant::Mock)
                }
            },
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Assistant::Gemini(_) => "Gemini",
            Assistant::Mock => "mock",
        }
    }

    /// Produces a summary for `packets`. Fails on transport errors and on
    /// output that does not fit the summary schema.
    pub async fn run_analysis(
        &self,
        tier: TierId,
        packets: &[Packet],
    ) -> Result<AnalysisSummary, AssistantError> {
        info!("Running {} analysis with the {} assistant", tier, self.label());
        match self {
            Assistant::Gemini(client) => {
                let prompt = analysis_prompt(tier, packets, client.analysis_sample);
                let text = client
                    .generate(&prompt, None, Some(analysis_schema()))
                    .await?;
                parse_summary(&text)
            }
            Assistant::Mock => mock_summary(packets),
        }
    }

    /// Answers the last message in `history`. Never fails: errors turn into
    /// an apology the chat can display.
    pub async fn chat_reply(
        &self,
        history: &[ChatMessage],
        summary: Option<&AnalysisSummary>,
        filtered: &[Packet],
        selected: Option<&Packet>,
    ) -> String {
        match self {
            Assistant::Gemini(client) => {
                let contents = chat_contents(history, summary, filtered, selected, client.chat_sample);
                match client.generate(&contents, Some(SYSTEM_INSTRUCTION), None).await {
                    Ok(text) => text,
                    Err(e) => {
                        error!("Chat request failed: {}", e);
                        CHAT_APOLOGY.to_string()
                    }
                }
            }
            Assistant::Mock => mock_reply(history, summary, filtered, selected),
        }
    }
}

/// Thin client for the `generateContent` REST call.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    analysis_sample: usize,
    chat_sample: usize,
}

impl GeminiClient {
    pub fn new(config: &AssistantConfig, api_key: String) -> Result<Self, AssistantError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            client: builder.build()?,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            analysis_sample: config.analysis_sample,
            chat_sample: config.chat_sample,
        })
    }

    fn request_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    async fn generate(
        &self,
        contents: &str,
        system: Option<&str>,
        schema: Option<Value>,
    ) -> Result<String, AssistantError> {
        let body = request_body(contents, system, schema);
        let res = self
            .client
            .post(self.request_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(AssistantError::Status(res.status()));
        }
        let json: Value = res.json().await?;
        response_text(&json).ok_or(AssistantError::EmptyResponse)
    }
}

/// `generateContent` payload. A schema switches the reply to JSON output.
pub fn request_body(contents: &str, system: Option<&str>, schema: Option<Value>) -> Value {
    let mut body = json!({
        "contents": [{ "role": "user", "parts": [{ "text": contents }] }],
    });
    if let Some(system) = system {
        body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
    }
    if let Some(schema) = schema {
        body["generationConfig"] = json!({
            "responseMimeType": "application/json",
            "responseSchema": schema,
        });
    }
    body
}

/// Concatenated text parts of the first candidate.
fn response_text(json: &Value) -> Option<String> {
    let parts = json["candidates"][0]["content"]["parts"].as_array()?;
    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

pub fn analysis_schema() -> Value {
    let protocols: Vec<&str> = Protocol::ALL.iter().map(|p| p.as_str()).collect();
    json!({
        "type": "OBJECT",
        "properties": {
            "topProtocol": { "type": "STRING", "enum": protocols },
            "topProtocolPercentage": { "type": "NUMBER" },
            "generatedAt": {
                "type": "STRING",
                "description": "The timestamp when the analysis was generated, e.g., '6/21/2024, 5:30 PM'"
            },
            "analyzedPackets": { "type": "INTEGER" },
            "totalPackets": { "type": "INTEGER" },
            "threatsDetected": {
                "type": "OBJECT",
                "properties": {
                    "total": { "type": "INTEGER" },
                    "high": { "type": "INTEGER" },
                    "medium": { "type": "INTEGER" },
                    "low": { "type": "INTEGER" }
                },
                "required": ["total", "high", "medium", "low"]
            },
            "keyFindings": { "type": "ARRAY", "items": { "type": "STRING" } },
            "protocolDistribution": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "value": { "type": "INTEGER" }
                    },
                    "required": ["name", "value"]
                }
            },
            "recommendations": { "type": "ARRAY", "items": { "type": "STRING" } }
        },
        "required": [
            "topProtocol", "topProtocolPercentage", "generatedAt", "analyzedPackets",
            "totalPackets", "threatsDetected", "keyFindings", "protocolDistribution",
            "recommendations"
        ]
    })
}

pub fn analysis_prompt(tier: TierId, packets: &[Packet], sample: usize) -> String {
    let total = packets.len();
    let shown = &packets[..total.min(sample)];
    let packets_json = serde_json::to_string_pretty(shown).unwrap_or_default();
    format!(
        "Analyze the following sample of packet capture data and provide a summary. The total packet count is {total}.
The data contains a list of network packets with properties like id, time, protocol, source, destination, size, and info.
Based on the analysis, generate a summary that includes:
- The top protocol and its percentage.
- The time of generation (current time, e.g., '6/21/2024, 5:30 PM').
- The number of packets analyzed (which is {total}) and the total number of packets (which is {total}).
- A breakdown of detected threats by severity (high, medium, low).
- A list of 3-5 key findings from the analysis.
- The distribution of traffic across the top 5 protocols plus an 'Other' category.
- A list of 3-4 actionable recommendations for improving network security.

Here is a sample of the packet data:
{packets_json}

The analysis tier is \"{tier}\". Adjust the depth and detail of your analysis accordingly:
- quick: {quick}
- standard: {standard}
- comprehensive: {comprehensive}

Return the response in a JSON format matching the specified schema. For 'generatedAt', use the current date and time.
",
        quick = TierId::Quick.guidance(),
        standard = TierId::Standard.guidance(),
        comprehensive = TierId::Comprehensive.guidance(),
    )
}

pub fn chat_contents(
    history: &[ChatMessage],
    summary: Option<&AnalysisSummary>,
    filtered: &[Packet],
    selected: Option<&Packet>,
    sample: usize,
) -> String {
    let summary_json = match summary {
        Some(s) => serde_json::to_string_pretty(s).unwrap_or_default(),
        None => "No analysis has been run yet.".to_string(),
    };

    let displayed = if filtered.is_empty() {
        "No packets are currently displayed to the user.".to_string()
    } else {
        let shown = &filtered[..filtered.len().min(sample)];
        format!(
            "The user is currently viewing a list of {} packets. Here is a sample of the first {} packets:\n{}",
            filtered.len(),
            shown.len(),
            serde_json::to_string_pretty(shown).unwrap_or_default()
        )
    };

    let selected = match selected {
        Some(p) => format!(
            "The user has specifically selected the following packet:\n{}",
            serde_json::to_string_pretty(p).unwrap_or_default()
        ),
        None => "The user has not selected any specific packet.".to_string(),
    };

    let history: Vec<String> = history
        .iter()
        .map(|m| {
            let who = match m.sender {
                Sender::User => "User",
                Sender::Ai => "Assistant",
            };
            format!("{}: {}", who, m.text)
        })
        .collect();

    format!(
        "
CONTEXT: OVERALL ANALYSIS SUMMARY
```json
{}
```

CONTEXT: CURRENTLY DISPLAYED PACKETS
{}

CONTEXT: CURRENTLY SELECTED PACKET
{}

CHAT HISTORY:
{}
",
        summary_json,
        displayed,
        selected,
        history.join("\n")
    )
}

/// Parses model output into a summary and checks it is self-consistent.
pub fn parse_summary(text: &str) -> Result<AnalysisSummary, AssistantError> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .unwrap_or(trimmed);
    let summary: AnalysisSummary = serde_json::from_str(body.trim())?;
    if summary.total_packets < summary.analyzed_packets {
        return Err(AssistantError::Inconsistent(format!(
            "analyzedPackets {} exceeds totalPackets {}",
            summary.analyzed_packets, summary.total_packets
        )));
    }
    Ok(summary)
}

/// Local stand-in for the remote model. The distribution comes from the
/// capture; threats, findings and recommendations are canned.
pub fn mock_summary(packets: &[Packet]) -> Result<AnalysisSummary, AssistantError> {
    if packets.is_empty() {
        return Err(AssistantError::Inconsistent("capture has no packets".to_string()));
    }
    let total = packets.len() as u32;

    let mut counts: HashMap<Protocol, u32> = HashMap::new();
    for p in packets {
        *counts.entry(p.protocol).or_insert(0) += 1;
    }
    // Ties break on the canonical protocol order so the result is stable.
    let mut ranked: Vec<(Protocol, u32)> = Protocol::ALL
        .iter()
        .filter_map(|p| counts.get(p).map(|&c| (*p, c)))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let (top_protocol, top_count) = ranked[0];
    let top_protocol_percentage = (f64::from(top_count) * 1000.0 / f64::from(total)).round() / 10.0;

    let mut protocol_distribution: Vec<ProtocolShare> = ranked
        .iter()
        .take(5)
        .map(|(p, c)| ProtocolShare { name: p.to_string(), value: *c })
        .collect();
    let other: u32 = ranked.iter().skip(5).map(|(_, c)| c).sum();
    if other > 0 {
        protocol_distribution.push(ProtocolShare { name: "Other".to_string(), value: other });
    }

    Ok(AnalysisSummary {
        top_protocol,
        top_protocol_percentage,
        generated_at: chrono::Local::now().format("%-m/%-d/%Y, %-I:%M %p").to_string(),
        analyzed_packets: total,
        total_packets: total,
        threats_detected: ThreatCounts { total: 3, high: 1, medium: 1, low: 1 },
        key_findings: vec![
            format!("{} dominates the capture at {}% of packets.", top_protocol, top_protocol_percentage),
            "Cleartext HTTP requests include a POST to /login.".to_string(),
            "ARP broadcasts probe hosts on the local segment.".to_string(),
            "DNS lookups are resolved by a public resolver (8.8.8.8).".to_string(),
        ],
        protocol_distribution,
        recommendations: vec![
            "Redirect HTTP login endpoints to HTTPS.".to_string(),
            "Monitor ARP traffic for spoofing attempts.".to_string(),
            "Route DNS through an internal resolver with logging.".to_string(),
        ],
    })
}

fn mock_reply(
    history: &[ChatMessage],
    summary: Option<&AnalysisSummary>,
    filtered: &[Packet],
    selected: Option<&Packet>,
) -> String {
    let question = history
        .iter()
        .rev()
        .find(|m| m.sender == Sender::User)
        .map(|m| m.text.as_str())
        .unwrap_or("");
    let mut reply = format!(
        "(mock) You asked: \"{}\". You are viewing **{} packets**.",
        question,
        filtered.len()
    );
    if let Some(p) = selected {
        reply.push_str(&format!(
            " The selected packet **#{}** is {} from {} to {}.",
            p.id, p.protocol, p.source, p.destination
        ));
    }
    match summary {
        Some(s) => reply.push_str(&format!(
            " The last analysis flagged **{} threats**; top protocol is {}.",
            s.threats_detected.total, s.top_protocol
        )),
        None => reply.push_str(" Run an analysis for a fuller picture."),
    }
    reply
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CHAT_GREETING;
    use crate::sample::{sample_packets, seed_packets};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn summary_json() -> Value {
        json!({
            "topProtocol": "HTTPS",
            "topProtocolPercentage": 26.7,
            "generatedAt": "6/21/2024, 5:30 PM",
            "analyzedPackets": 50,
            "totalPackets": 88,
            "threatsDetected": { "total": 2, "high": 0, "medium": 1, "low": 1 },
            "keyFindings": ["a", "b"],
            "protocolDistribution": [{ "name": "HTTPS", "value": 4 }],
            "recommendations": ["c"]
        })
    }

    #[test]
    fn parses_conforming_summary_and_keeps_counts_distinct() {
        let summary = parse_summary(&summary_json().to_string()).unwrap();
        assert_eq!(summary.top_protocol, Protocol::Https);
        assert_eq!(summary.analyzed_packets, 50);
        assert_eq!(summary.total_packets, 88);
    }

    #[test]
    fn parses_fenced_output() {
        let text = format!("```json\n{}\n```", summary_json());
        assert!(parse_summary(&text).is_ok());
    }

    #[test]
    fn rejects_missing_fields_and_unknown_protocols() {
        let mut v = summary_json();
        v.as_object_mut().unwrap().remove("recommendations");
        assert!(matches!(parse_summary(&v.to_string()), Err(AssistantError::Schema(_))));

        let mut v = summary_json();
        v["topProtocol"] = json!("SMTP");
        assert!(matches!(parse_summary(&v.to_string()), Err(AssistantError::Schema(_))));

        assert!(parse_summary("not json").is_err());
    }

    #[test]
    fn rejects_more_analyzed_than_total() {
        let mut v = summary_json();
        v["analyzedPackets"] = json!(100);
        assert!(matches!(
            parse_summary(&v.to_string()),
            Err(AssistantError::Inconsistent(_))
        ));
    }

    #[test]
    fn schema_requires_every_summary_field() {
        let schema = analysis_schema();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 9);
        assert_eq!(schema["properties"]["topProtocol"]["enum"].as_array().unwrap().len(), 7);
    }

    #[test]
    fn analysis_prompt_samples_packets_and_names_tier() {
        let packets = seed_packets();
        let prompt = analysis_prompt(TierId::Quick, &packets, 2);
        assert!(prompt.contains("The total packet count is 15."));
        assert!(prompt.contains("The analysis tier is \"quick\"."));
        assert!(prompt.contains("\"id\": 14"));
        assert!(!prompt.contains("\"id\": 15"));
    }

    #[test]
    fn chat_contents_reports_missing_context() {
        let history = vec![ChatMessage::ai(CHAT_GREETING), ChatMessage::user("any risks?")];
        let text = chat_contents(&history, None, &[], None, 25);
        assert!(text.contains("No analysis has been run yet."));
        assert!(text.contains("No packets are currently displayed to the user."));
        assert!(text.contains("The user has not selected any specific packet."));
        assert!(text.contains("User: any risks?"));
        assert!(text.contains(&format!("Assistant: {}", CHAT_GREETING)));
    }

    #[test]
    fn chat_contents_samples_filtered_packets() {
        let packets = sample_packets(&mut StdRng::seed_from_u64(1));
        let text = chat_contents(&[], None, &packets, packets.first(), 25);
        assert!(text.contains(&format!(
            "viewing a list of {} packets. Here is a sample of the first 25 packets",
            packets.len()
        )));
        assert!(text.contains("specifically selected the following packet"));
    }

    #[test]
    fn mock_summary_counts_protocols() {
        let packets = seed_packets();
        let summary = mock_summary(&packets).unwrap();
        // Seeds carry four HTTPS packets out of fifteen.
        assert_eq!(summary.top_protocol, Protocol::Https);
        assert_eq!(summary.top_protocol_percentage, 26.7);
        assert_eq!(summary.total_packets, 15);
        assert!(summary.total_packets >= summary.analyzed_packets);
        let shares: u32 = summary.protocol_distribution.iter().map(|s| s.value).sum();
        assert_eq!(shares, 15);
        assert_eq!(summary.protocol_distribution.last().map(|s| s.name.as_str()), Some("Other"));
        assert!(summary.protocol_distribution.len() <= 6);
    }

    #[test]
    fn mock_summary_needs_packets() {
        assert!(mock_summary(&[]).is_err());
    }

    #[tokio::test]
    async fn mock_backend_answers_with_context() {
        let packets = seed_packets();
        let history = vec![ChatMessage::user("what is this?")];
        let reply = Assistant::Mock
            .chat_reply(&history, None, &packets, packets.first())
            .await;
        assert!(reply.contains("what is this?"));
        assert!(reply.contains("**15 packets**"));
        assert!(reply.contains("#13"));
    }

    #[tokio::test]
    async fn unreachable_endpoint_fails_analysis_but_not_chat() {
        let config = AssistantConfig {
            endpoint: "http://127.0.0.1:9".to_string(),
            timeout_secs: Some(2),
            ..AssistantConfig::default()
        };
        let assistant = Assistant::Gemini(GeminiClient::new(&config, "test-key".to_string()).unwrap());
        let packets = seed_packets();

        let analysis = assistant.run_analysis(TierId::Standard, &packets).await;
        assert!(matches!(analysis, Err(AssistantError::Http(_))));

        let reply = assistant
            .chat_reply(&[ChatMessage::user("hi")], None, &packets, None)
            .await;
        assert_eq!(reply, CHAT_APOLOGY);
    }

    #[test]
    fn response_text_joins_parts() {
        let json = json!({
            "candidates": [{ "content": { "parts": [{ "text": "Hello " }, { "text": "there" }] } }]
        });
        assert_eq!(response_text(&json).as_deref(), Some("Hello there"));
        assert_eq!(response_text(&json!({ "candidates": [] })), None);
    }

    fn gemini_at(endpoint: String) -> Assistant {
        let config = AssistantConfig {
            endpoint,
            timeout_secs: Some(5),
            ..AssistantConfig::default()
        };
        Assistant::Gemini(GeminiClient::new(&config, "test-key".to_string()).unwrap())
    }

    fn json_response(body: &str) -> String {
        format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            body.len(),
            body
        )
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(end) = text.find("\r\n\r\n") else {
            return false;
        };
        let length = text[..end]
            .lines()
            .filter_map(|l| l.split_once(':'))
            .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, v)| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        raw.len() >= end + 4 + length
    }

    /// Answers a single request with `response`; the task yields the raw
    /// request it received.
    async fn serve_once(response: String) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            while !request_complete(&request) {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });
        (endpoint, handle)
    }

    #[test]
    fn analysis_request_asks_for_json_against_the_schema() {
        let body = request_body("prompt", None, Some(analysis_schema()));
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "prompt");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"], analysis_schema());
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn chat_request_carries_the_system_instruction() {
        let body = request_body("context", Some(SYSTEM_INSTRUCTION), None);
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], SYSTEM_INSTRUCTION);
        assert_eq!(body["contents"][0]["parts"][0]["text"], "context");
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn url_targets_generate_content_for_the_model() {
        let config = AssistantConfig {
            endpoint: "https://example.test/v1beta/".to_string(),
            ..AssistantConfig::default()
        };
        let client = GeminiClient::new(&config, "k".to_string()).unwrap();
        assert_eq!(
            client.request_url(),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn error_status_fails_analysis() {
        let (endpoint, server) = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
                .to_string(),
        )
        .await;
        let result = gemini_at(endpoint).run_analysis(TierId::Quick, &seed_packets()).await;
        assert!(matches!(result, Err(AssistantError::Status(s)) if s.as_u16() == 503));

        let request = server.await.unwrap().to_lowercase();
        assert!(request.starts_with("post /models/gemini-2.5-flash:generatecontent "));
        assert!(request.contains("x-goog-api-key: test-key"));
        assert!(request.contains("\"responsemimetype\":\"application/json\""));
    }

    #[tokio::test]
    async fn reply_without_text_is_an_empty_response() {
        let (endpoint, server) = serve_once(json_response(r#"{"candidates":[]}"#)).await;
        let result = gemini_at(endpoint).run_analysis(TierId::Quick, &seed_packets()).await;
        assert!(matches!(result, Err(AssistantError::EmptyResponse)));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn chat_sends_system_instruction_and_returns_reply_text() {
        let (endpoint, server) = serve_once(json_response(
            r#"{"candidates":[{"content":{"parts":[{"text":"All **clear**."}]}}]}"#,
        ))
        .await;
        let reply = gemini_at(endpoint)
            .chat_reply(&[ChatMessage::user("anything odd?")], None, &seed_packets(), None)
            .await;
        assert_eq!(reply, "All **clear**.");

        let request = server.await.unwrap();
        assert!(request.contains("\"systemInstruction\""));
        assert!(!request.contains("\"generationConfig\""));
    }

    #[test]
    fn mock_backend_is_selected_without_a_key() {
        let config = AssistantConfig {
            api_key_env: "INTELLIPCAP_TEST_UNSET_KEY".to_string(),
            ..AssistantConfig::default()
        };
        assert!(matches!(Assistant::from_config(&config), Ok(Assistant::Mock)));
    }
}

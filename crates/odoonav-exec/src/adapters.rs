use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::process::Command;
use std::process::Stdio;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::debug;
use tracing::warn;

use odoonav_core::config::OracleConfig;
use odoonav_core::config::OracleProvider;
use odoonav_core::error::OracleError;
use odoonav_core::intent::IntentOracle;
use odoonav_core::intent::OracleGuess;

use crate::contracts::ChatMessage;
use crate::contracts::ChatRequest;
use crate::contracts::ChatResponse;
use crate::contracts::OracleReply;

pub const GROQ_ENDPOINT: &str = "https://api.groq.com/openai/v1";
pub const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";

const SYSTEM_PROMPT: &str = r#"You extract navigation intents for the Odoo ERP web client.

Keep the complete navigation path when the user names a compound destination.

Navigation hierarchy, general to specific:
1. Modules: sales, invoices, customers, contacts, products, inventory, purchases, employees, settings, apps
2. Sub-modules:
   - Sales: quotations, orders, analysis, products
   - Invoices: customer invoices, vendor bills, analysis
   - Products: items, variants, categories, analysis
   - Inventory: transfers, levels, valuation, reporting
   - CRM: leads, opportunities, pipeline, analysis
3. Views: list, kanban, form, graph, pivot, calendar
4. Reports: analysis, reporting, dashboard, statistics

Rules:
- Join every component the user mentions with "/" in the order mentioned.
- Only collapse to a single entity when the user clearly asks for a top-level module.
- Keep view types and report keywords when present.

Reply with a single JSON object and nothing else:
{"type": "navigation" or "unknown", "entity": "<path>", "all_entities": ["<component>", ...], "reasoning": "<short>", "confidence": <0..1>}

Examples:
- "go to sales" -> {"type": "navigation", "entity": "sales", "all_entities": ["sales"], "reasoning": "Single top-level module", "confidence": 0.95}
- "sales product analysis" -> {"type": "navigation", "entity": "sales/products/analysis", "all_entities": ["sales", "products", "analysis"], "reasoning": "Full analytical path", "confidence": 0.9}
- "open products list" -> {"type": "navigation", "entity": "products/list", "all_entities": ["products", "list"], "reasoning": "View type requested", "confidence": 0.9}
- "what's the weather" -> {"type": "unknown", "entity": "", "all_entities": [], "reasoning": "No Odoo entities", "confidence": 0.1}"#;

fn user_message(text: &str) -> String {
    format!("User input: {text}")
}

/// Builds the configured oracle. `Ok(None)` means rule-based parsing only: either no
/// provider is configured or a hosted provider has no API key.
pub fn build_oracle(
    config: &OracleConfig,
    api_key: Option<String>,
) -> Result<Option<Box<dyn IntentOracle>>, OracleError> {
    let timeout = Duration::from_secs(config.timeout_secs);
    let default_endpoint = match config.provider {
        OracleProvider::None => return Ok(None),
        OracleProvider::Ollama => {
            return Ok(Some(Box::new(OllamaOracle::new(&config.model, timeout))));
        }
        OracleProvider::Groq => GROQ_ENDPOINT,
        OracleProvider::OpenAi => OPENAI_ENDPOINT,
    };

    let Some(api_key) = api_key.filter(|key| !key.trim().is_empty()) else {
        warn!(
            provider = config.provider.as_str(),
            env = %config.api_key_env,
            "no API key for the oracle; falling back to rule-based parsing"
        );
        return Ok(None);
    };
    let oracle = ChatCompletionsOracle::new(
        config.provider.as_str(),
        config.endpoint.as_deref().unwrap_or(default_endpoint),
        &config.model,
        api_key,
        config.temperature,
        timeout,
    )?;
    Ok(Some(Box::new(oracle)))
}

pub struct ChatCompletionsOracle {
    client: Client,
    label: String,
    url: String,
    model: String,
    api_key: String,
    temperature: f64,
    timeout: Duration,
}

impl ChatCompletionsOracle {
    pub fn new(
        label: &str,
        endpoint: &str,
        model: &str,
        api_key: String,
        temperature: f64,
        timeout: Duration,
    ) -> Result<Self, OracleError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| OracleError::Unavailable(format!("failed to build http client: {err}")))?;
        Ok(Self {
            client,
            label: label.to_string(),
            url: format!("{}/chat/completions", endpoint.trim_end_matches('/')),
            model: model.to_string(),
            api_key,
            temperature,
            timeout,
        })
    }

    fn request(&self, text: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(user_message(text)),
            ],
            temperature: self.temperature,
        }
    }
}

impl IntentOracle for ChatCompletionsOracle {
    fn name(&self) -> &str {
        &self.label
    }

    fn extract_intent(&self, text: &str) -> Result<OracleGuess, OracleError> {
        debug!(oracle = %self.label, model = %self.model, "requesting chat completion");
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&self.request(text))
            .send()
            .map_err(|err| {
                if err.is_timeout() {
                    OracleError::Timeout(self.timeout)
                } else {
                    OracleError::Transport(err.to_string())
                }
            })?;

        let status = response.status();
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(OracleError::Unavailable(format!(
                "{} rejected the API key ({status})",
                self.label
            )));
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            return Err(OracleError::Transport(format!("http {status}: {snippet}")));
        }

        let completion: ChatResponse = response
            .json()
            .map_err(|err| OracleError::Malformed(format!("completion is not JSON: {err}")))?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| OracleError::Malformed("completion has no choices".to_string()))?;
        parse_oracle_reply(&content)
    }
}

pub struct OllamaOracle {
    program: String,
    model: String,
    timeout: Duration,
}

impl OllamaOracle {
    pub fn new(model: &str, timeout: Duration) -> Self {
        Self {
            program: "ollama".to_string(),
            model: model.to_string(),
            timeout,
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

impl IntentOracle for OllamaOracle {
    fn name(&self) -> &str {
        "ollama"
    }

    fn extract_intent(&self, text: &str) -> Result<OracleGuess, OracleError> {
        let prompt = format!("{SYSTEM_PROMPT}\n\n{}", user_message(text));
        let mut cmd = Command::new(&self.program);
        cmd.args(["run", self.model.as_str(), prompt.as_str()]);
        let output = run_command(cmd, &self.program, self.timeout)?;
        parse_oracle_reply(&output)
    }
}

fn run_command(mut cmd: Command, label: &str, timeout: Duration) -> Result<String, OracleError> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| OracleError::Unavailable(format!("failed to start {label}: {err}")))?;

    let stderr_handle = child.stderr.take().map(|mut stderr| {
        thread::spawn(move || {
            let mut stderr_text = String::new();
            let _ = stderr.read_to_string(&mut stderr_text);
            stderr_text
        })
    });

    let mut lines = Vec::new();
    if let Some(stdout) = child.stdout.take() {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines().map_while(Result::ok) {
                if tx.send(line).is_err() {
                    break;
                }
            }
        });

        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(remaining) {
                Ok(line) => lines.push(line),
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    warn!(program = label, "oracle process timed out");
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(OracleError::Timeout(timeout));
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }
    }

    let status = child
        .wait()
        .map_err(|err| OracleError::Transport(format!("{label} did not exit cleanly: {err}")))?;
    let stderr_text = stderr_handle
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
        .trim()
        .to_string();

    if !status.success() {
        let detail = if stderr_text.is_empty() {
            format!("{label} exited with {status}")
        } else {
            format!("{label} exited with {status}: {stderr_text}")
        };
        return Err(OracleError::Transport(detail));
    }

    let output = strip_ansi_sequences(&lines.join("\n"));
    if output.trim().is_empty() {
        return Err(OracleError::Malformed(format!("{label} produced no output")));
    }
    Ok(output)
}

fn strip_ansi_sequences(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            if chars.peek() == Some(&'[') {
                let _ = chars.next();
                for n in chars.by_ref() {
                    if ('@'..='~').contains(&n) {
                        break;
                    }
                }
            }
            continue;
        }
        if c == '\r' {
            continue;
        }
        out.push(c);
    }
    out
}

/// The JSON object inside an oracle reply: a fenced ```json block when present,
/// else the span from the first `{` to the last `}`, else the whole text.
pub fn extract_json_object(content: &str) -> &str {
    if let Some((_, fenced)) = content.split_once("```json") {
        let body = match fenced.find("```") {
            Some(end) => &fenced[..end],
            None => fenced,
        };
        return body.trim();
    }
    match (content.find('{'), content.rfind('}')) {
        (Some(start), Some(end)) if start < end => &content[start..=end],
        _ => content.trim(),
    }
}

pub fn parse_oracle_reply(content: &str) -> Result<OracleGuess, OracleError> {
    let candidate = extract_json_object(content);
    let reply: OracleReply = serde_json::from_str(candidate)
        .map_err(|err| OracleError::Malformed(format!("reply is not the expected JSON: {err}")))?;
    Ok(reply.into())
}

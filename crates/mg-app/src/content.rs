use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use mg_core::{DocumentStructure, Error, Result, SectionContent};
use crate::config::AppConfig;
use crate::generator::provider::{bearer, ensure_success};

const SERVICE: &str = "openai";
const TEMPERATURE: f32 = 0.7;

const STRUCTURE_SYSTEM_PROMPT: &str =
    "You are a document structure expert. You create well-organized, logical document outlines.";
const WRITER_SYSTEM_PROMPT: &str =
    "You are an expert content writer who creates clear, engaging, and informative content.";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Outline and prose from an OpenAI-compatible chat completions API
pub struct ContentClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ContentClient {
    pub fn new(client: Client, config: &AppConfig) -> Self {
        Self {
            client,
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
        }
    }

    /// Ask for a title with 3-4 sections of 2-3 subheadings each
    pub async fn structure(&self, topic: &str) -> Result<DocumentStructure> {
        let prompt = format!(
            r#"Create a detailed document structure for the topic "{topic}".
The response must be a valid JSON with this exact structure:
{{
    "title": "main title",
    "sections": [
        {{
            "heading": "section heading",
            "subheadings": ["subheading1", "subheading2"]
        }}
    ]
}}
Make it comprehensive but concise with 3-4 sections and 2-3 subheadings each.
Only return the JSON, no additional text."#
        );

        let reply = self.complete(STRUCTURE_SYSTEM_PROMPT, &prompt, true).await?;
        let structure = parse_structure(&reply)?;
        info!(
            topic,
            title = %structure.title,
            sections = structure.sections.len(),
            "Generated document structure"
        );
        Ok(structure)
    }

    /// Main paragraph for `heading` plus one paragraph per subheading.
    ///
    /// A failed subheading is logged and left out; a failed main paragraph
    /// fails the whole section.
    pub async fn section_content(&self, heading: &str, subheadings: &[String]) -> Result<SectionContent> {
        let main_prompt = format!(
            r#"Write a detailed, informative paragraph about "{heading}".
The content should be engaging, factual, and around 150 words.
Focus on providing valuable insights and clear explanations."#
        );
        let main = self.complete(WRITER_SYSTEM_PROMPT, &main_prompt, false).await?;
        let mut content = SectionContent::with_main(main.trim());

        for subheading in subheadings {
            let sub_prompt = format!(
                r#"Write a concise but detailed paragraph about "{subheading}"
in the context of {heading}. The content should be around 100 words,
specific, and informative."#
            );
            match self.complete(WRITER_SYSTEM_PROMPT, &sub_prompt, false).await {
                Ok(text) => content.insert(subheading.as_str(), text.trim()),
                Err(e) => warn!(heading, subheading = %subheading, "Skipping subheading: {}", e),
            }
        }

        Ok(content)
    }

    async fn complete(&self, system: &str, user: &str, json: bool) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
            temperature: TEMPERATURE,
            response_format: json.then_some(ResponseFormat { kind: "json_object" }),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", bearer(&self.api_key))
            .json(&body)
            .send()
            .await?;

        let reply: ChatResponse = ensure_success(SERVICE, response).await?.json().await?;
        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::parse("chat completion had no message content"))?;
        debug!(chars = content.len(), "chat completion received");
        Ok(content)
    }
}

/// Parse the outline, falling back to the outermost `{...}` when the
/// model wraps the JSON in prose.
fn parse_structure(reply: &str) -> Result<DocumentStructure> {
    match serde_json::from_str(reply.trim()) {
        Ok(structure) => Ok(structure),
        Err(first) => {
            let embedded = extract_json(reply)
                .ok_or_else(|| Error::parse(format!("no JSON object in structure reply: {first}")))?;
            Ok(serde_json::from_str(embedded)?)
        }
    }
}

fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::feed::Comment;
use crate::prompt;

/// Structured output of the completion service before it is flattened into a
/// comment. The three advisory fields are informational only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantReply {
    pub student_role: String,
    pub response_in_role: String,
    pub how_to_respond_reflectively: String,
    pub how_to_respond_specifically: String,
    pub how_to_respond_relately: String,
    pub final_response: String,
}

impl AssistantReply {
    /// Fixed reply used when no credentials are configured. A designed path,
    /// not an error.
    pub fn offline() -> Self {
        Self {
            student_role: "Constructive upstander".to_string(),
            response_in_role: "educator".to_string(),
            how_to_respond_reflectively: "Show empathy".to_string(),
            how_to_respond_specifically: "Address bullying directly".to_string(),
            how_to_respond_relately: "Build positive relationships".to_string(),
            final_response: "That's an interesting perspective! I appreciate you sharing your thoughts.".to_string(),
        }
    }

    /// Fixed reply substituted when the service fails or returns garbage.
    pub fn processing_problem() -> Self {
        Self {
            final_response: "I apologize, but I'm having trouble processing your comment at the moment.".to_string(),
            ..Self::offline()
        }
    }
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// Wire shape of the model's JSON reply. Required fields are validated after
/// parsing so a present-but-empty value counts as missing.
#[derive(Deserialize)]
struct RawReply {
    #[serde(default)]
    student_role: Option<String>,
    #[serde(default)]
    response_in_role: Option<String>,
    #[serde(default)]
    how_to_respond_reflectively: Option<String>,
    #[serde(default)]
    how_to_respond_specifically: Option<String>,
    #[serde(default)]
    how_to_respond_relately: Option<String>,
    #[serde(default)]
    final_response: Option<String>,
}

#[derive(Clone)]
struct Credentials {
    api_key: String,
    base_url: String,
}

/// Gateway to the completion service. `generate_reply` never fails: missing
/// credentials yield the offline reply, any request or parse failure yields
/// the processing-problem reply.
#[derive(Clone)]
pub struct AssistantClient {
    client: Client,
    credentials: Option<Credentials>,
    model: String,
}

impl AssistantClient {
    pub fn new(config: &Config) -> Result<Self> {
        // The original web demo had no timeout and could leave the UI in the
        // loading state forever; cap the request instead.
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        let credentials = match (&config.api_key, &config.base_url) {
            (Some(api_key), Some(base_url)) => Some(Credentials {
                api_key: api_key.clone(),
                base_url: base_url.trim_end_matches('/').to_string(),
            }),
            _ => None,
        };

        if credentials.is_none() {
            tracing::info!("no completion-service credentials, assistant runs offline");
        }

        Ok(Self {
            client,
            credentials,
            model: config.model.clone(),
        })
    }

    pub fn is_offline(&self) -> bool {
        self.credentials.is_none()
    }

    pub async fn generate_reply(
        &self,
        post_text: &str,
        comments: &[Comment],
        user_comment: &str,
    ) -> AssistantReply {
        let Some(credentials) = &self.credentials else {
            return AssistantReply::offline();
        };

        match self
            .request_reply(credentials, post_text, comments, user_comment)
            .await
        {
            Ok(reply) => reply,
            Err(error) => {
                tracing::warn!(%error, "assistant request failed");
                AssistantReply::processing_problem()
            }
        }
    }

    async fn request_reply(
        &self,
        credentials: &Credentials,
        post_text: &str,
        comments: &[Comment],
        user_comment: &str,
    ) -> Result<AssistantReply> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: prompt::system_prompt(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: build_context_message(post_text, comments, user_comment),
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object".to_string(),
            },
            temperature: 0.7,
        };

        let url = format!("{}/chat/completions", credentials.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", credentials.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("completion service error {}: {}", status, text));
        }

        let completion: ChatResponse = response.json().await?;
        let content = completion
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(anyhow!("empty response from assistant"));
        }

        parse_reply(content)
    }
}

/// Single contextual message: original post, an `Author: text` transcript of
/// the thread so far, and the new comment.
fn build_context_message(post_text: &str, comments: &[Comment], user_comment: &str) -> String {
    let transcript = comments
        .iter()
        .map(|comment| format!("{}: {}", comment.author.name, comment.content.text))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Context:\nOriginal post: \"{}\"\nPrevious comments:\n{}\n\nNew comment from user: \"{}\"\n\nPlease respond to this comment considering the context above.",
        post_text, transcript, user_comment
    )
}

fn parse_reply(content: &str) -> Result<AssistantReply> {
    let raw: RawReply = serde_json::from_str(content)?;

    let required = |field: Option<String>, name: &str| -> Result<String> {
        field
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| anyhow!("invalid assistant response format: missing {}", name))
    };

    Ok(AssistantReply {
        student_role: required(raw.student_role, "student_role")?,
        response_in_role: required(raw.response_in_role, "response_in_role")?,
        how_to_respond_reflectively: raw.how_to_respond_reflectively.unwrap_or_default(),
        how_to_respond_specifically: raw.how_to_respond_specifically.unwrap_or_default(),
        how_to_respond_relately: raw.how_to_respond_relately.unwrap_or_default(),
        final_response: required(raw.final_response, "final_response")?,
    })
}

//! DocsBuddy chat completions.
//!
//! Thin wrapper over a [`CompletionClient`] that applies the DocsBuddy
//! persona, trims conversation history and reformats README answers as a
//! single markdown code block the UI can copy verbatim.

use regex::Regex;
use std::sync::{Arc, LazyLock};

use crate::completion::AiError;
use crate::config::AiConfig;
use crate::models::ChatMessage;
use crate::traits::{CompletionClient, CompletionRequest};

/// Only the most recent turns are forwarded to the model.
pub const MAX_HISTORY: usize = 10;

const SYSTEM_PROMPT: &str = "You are DocsBuddy, an AI documentation assistant. You help users \
create, improve, and maintain technical documentation. You are knowledgeable about:

- API documentation and OpenAPI/Swagger specifications
- User guides and tutorials
- README files and project documentation
- Technical writing best practices
- Documentation tools and formats (Markdown, reStructuredText, etc.)
- Code documentation and inline comments
- Documentation site generators (GitBook, Docusaurus, etc.)

When generating README files, always format them as clean markdown code blocks. Provide \
helpful, clear, and actionable advice for documentation tasks. Be concise but thorough in \
your responses.";

const README_PREFACE: &str = "Got it 👍 Here's a simple README.md template for your project. \
You can copy and paste it directly:";

pub struct DocsBuddyChat {
    client: Arc<dyn CompletionClient>,
    model: String,
    max_tokens: u32,
    temperature: f64,
}

impl DocsBuddyChat {
    pub fn new(client: Arc<dyn CompletionClient>, config: &AiConfig) -> Self {
        Self {
            client,
            model: config.chat_model.clone(),
            max_tokens: config.chat_max_tokens,
            temperature: config.chat_temperature,
        }
    }

    pub async fn reply(&self, message: &str, history: &[ChatMessage]) -> Result<String, AiError> {
        let skip = history.len().saturating_sub(MAX_HISTORY);
        let mut messages: Vec<ChatMessage> = history
            .iter()
            .skip(skip)
            .map(|msg| ChatMessage {
                role: if msg.role == "user" { "user" } else { "assistant" }.to_string(),
                content: msg.content.clone(),
            })
            .collect();
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: message.to_string(),
        });

        let response = self
            .client
            .complete(CompletionRequest {
                model: self.model.clone(),
                system_prompt: SYSTEM_PROMPT.to_string(),
                messages,
                max_tokens: self.max_tokens,
                temperature: self.temperature,
            })
            .await?;

        if is_readme_request(message) {
            Ok(format_readme(&response))
        } else {
            Ok(response)
        }
    }
}

fn is_readme_request(message: &str) -> bool {
    message.to_lowercase().contains("readme")
}

/// Wrap the README body in a single ```` ```markdown ```` block.
///
/// If the model already fenced it, the first fenced block's content is used.
pub fn format_readme(response: &str) -> String {
    let content = extract_fenced_block(response).unwrap_or(response);
    format!("{}\n\n```markdown\n{}\n```", README_PREFACE, content)
}

/// A bare or `markdown` fence, optional whitespace, newline, body, closing fence.
static FENCED_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```(?:markdown)?\s*\n((?s:.*?))\n```").expect("fenced block pattern is valid")
});

/// Content of the first ```` ``` ```` or ```` ```markdown ```` block.
///
/// Inline fences that never open a block are skipped.
fn extract_fenced_block(text: &str) -> Option<&str> {
    FENCED_BLOCK_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|body| body.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct EchoClient {
        reply: String,
        seen: Mutex<Option<CompletionRequest>>,
    }

    #[async_trait::async_trait]
    impl CompletionClient for EchoClient {
        async fn complete(&self, request: CompletionRequest) -> Result<String, AiError> {
            *self.seen.lock().unwrap() = Some(request);
            Ok(self.reply.clone())
        }
    }

    fn chat(reply: &str) -> (DocsBuddyChat, Arc<EchoClient>) {
        let client = Arc::new(EchoClient {
            reply: reply.to_string(),
            seen: Mutex::new(None),
        });
        (DocsBuddyChat::new(client.clone(), &AiConfig::default()), client)
    }

    fn turn(role: &str, content: &str) -> ChatMessage {
        ChatMessage {
            role: role.to_string(),
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_history_trimmed_and_roles_normalized() {
        let (chat, client) = chat("ok");
        let history: Vec<ChatMessage> = (0..12)
            .map(|i| turn(if i % 2 == 0 { "user" } else { "bot" }, &format!("m{}", i)))
            .collect();

        let out = chat.reply("next", &history).await.unwrap();
        assert_eq!(out, "ok");

        let seen = client.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.messages.len(), MAX_HISTORY + 1);
        assert_eq!(seen.messages[0].content, "m2");
        assert_eq!(seen.messages[1].role, "assistant");
        assert_eq!(seen.messages.last().unwrap().content, "next");
        assert_eq!(seen.max_tokens, 1000);
        assert!(seen.system_prompt.starts_with("You are DocsBuddy"));
    }

    #[tokio::test]
    async fn test_readme_reply_is_fenced() {
        let (chat, _) = chat("Sure!\n```markdown\n# My Project\n\nUsage...\n```\nEnjoy.");
        let out = chat.reply("Generate README for my CLI", &[]).await.unwrap();
        assert!(out.starts_with(README_PREFACE));
        assert!(out.ends_with("```markdown\n# My Project\n\nUsage...\n```"));
    }

    #[test]
    fn test_format_readme_without_fence() {
        let out = format_readme("# Title");
        assert!(out.ends_with("```markdown\n# Title\n```"));
    }

    #[test]
    fn test_extract_plain_fence() {
        assert_eq!(extract_fenced_block("```\nabc\n```"), Some("abc"));
        assert_eq!(extract_fenced_block("```rust\nfn x() {}\n```"), None);
        assert_eq!(extract_fenced_block("no fences"), None);
    }

    #[test]
    fn test_extract_skips_inline_fences() {
        let reply = "Use `x` like ```inline``` then:\n```markdown\n# T\n```";
        assert_eq!(extract_fenced_block(reply), Some("# T"));
        assert!(format_readme(reply).ends_with("\n\n```markdown\n# T\n```"));
    }

    #[test]
    fn test_extract_allows_blank_lines_after_fence() {
        assert_eq!(
            extract_fenced_block("```markdown  \n\n# Title\n```"),
            Some("# Title")
        );
    }
}

use super::types::AnthropicMessage;
use crate::message::{Message, MessageRole};

/// Convert our messages to Anthropic format, returning the system text separately
pub(crate) fn convert_messages(messages: &[Message]) -> (Option<String>, Vec<AnthropicMessage>) {
    let mut system_parts = Vec::new();
    let mut anthropic_messages = Vec::new();

    for msg in messages {
        match msg.role {
            MessageRole::System => {
                if !msg.content.is_empty() {
                    system_parts.push(msg.content.as_str());
                }
            }
            MessageRole::User | MessageRole::Assistant => {
                anthropic_messages.push(AnthropicMessage {
                    role: msg.role.as_str(),
                    content: msg.content.clone(),
                });
            }
        }
    }

    let system_message = (!system_parts.is_empty()).then(|| system_parts.join("\n\n"));
    (system_message, anthropic_messages)
}

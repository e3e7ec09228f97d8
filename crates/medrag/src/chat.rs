//! Chat transcript handling on top of the answer pipeline
//!
//! The transcript is owned by the client; each turn takes the history shown
//! so far and returns it extended with the new exchange. Failures become an
//! assistant message instead of an error so the conversation can continue.

use crate::generation::AnswerPipeline;
use crate::types::ChatMessage;

/// Greeting shown when a conversation starts
pub const WELCOME: &str = "👋 Merhaba!

Ben Medipol Chatbot.
Tıbbi makalelerden derlenmiş bilgilerle sorularınıza yanıt veririm.

Örnek sorular:
• Bel fıtığı tedavi yöntemleri nelerdir?
• Kütletme sağlıklı mıdır?
• Migren atağı için kanıta dayalı yaklaşımlar neler?";

/// Prefix of the assistant message that reports a failed turn
pub const ERROR_PREFIX: &str = "⚠️ Hata:";

/// Fresh transcript holding only the greeting
pub fn welcome_transcript() -> Vec<ChatMessage> {
    vec![ChatMessage::assistant(WELCOME)]
}

/// Transcript after the user clears the conversation
pub fn clear() -> Vec<ChatMessage> {
    welcome_transcript()
}

/// Run one chat turn
///
/// The message is forwarded as typed and appended to the transcript,
/// followed by either the answer or an error notice.
pub async fn respond(
    pipeline: &AnswerPipeline,
    message: &str,
    mut history: Vec<ChatMessage>,
) -> Vec<ChatMessage> {
    history.push(ChatMessage::user(message));

    let reply = match pipeline.answer(message).await {
        Ok(answer) => answer.text,
        Err(e) => {
            tracing::error!("Chat turn failed: {}", e);
            format!("{} {}", ERROR_PREFIX, e)
        }
    };
    history.push(ChatMessage::assistant(reply));

    history
}

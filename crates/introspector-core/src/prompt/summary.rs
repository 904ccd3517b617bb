use crate::constants::session::{ASSISTANT_LABEL, USER_LABEL};
use crate::llm::{Message, Role};

/// Fixed instructions for the end-of-session summary. The section headers
/// and dash bullets are what `SummaryParser` reads back.
pub const SUMMARY_PROMPT: &str = "\
You are summarizing an introspective conversation. The user has reached an insight or \"aha\" moment.

Create a summary with these sections:

1. **Insights** - 3-5 bullet points capturing the key realizations, in the user's voice (use \"I\" statements)
2. **Suggested Links** - Based on the themes discussed, suggest 3-5 note titles that might exist in their notes and relate to this conversation (format as [[Note Title]])

Keep insights concise but meaningful. Each insight should be a complete thought.

Respond in this exact format:
INSIGHTS:
- [insight 1]
- [insight 2]
- [insight 3]

LINKS:
- [[Suggested Note 1]]
- [[Suggested Note 2]]
- [[Suggested Note 3]]";

pub fn build_summary_prompt() -> &'static str {
    SUMMARY_PROMPT
}

/// Join a transcript into one block, each turn labelled by speaker.
pub fn format_transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| {
            let speaker = match m.role {
                Role::User => USER_LABEL,
                Role::Assistant => ASSISTANT_LABEL,
            };
            format!("{speaker}: {}", m.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Wrap a formatted transcript as the user turn of the summary request.
pub fn format_summary_request(transcript: &str) -> String {
    format!("Here is the conversation to summarize:\n\n{transcript}\n\nPlease provide the summary.")
}

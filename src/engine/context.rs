// Reflectify Engine — Context Assembler
// Builds the ordered message sequence for one generation call:
// system prompt (+ optional "User Info" section), a fixed-size suffix of the
// conversation history, then the trimmed new user message. The window is
// bounded by message count, not tokens, so request size is deterministic.

use crate::atoms::types::ChatMessage;

/// Assemble the full generation message sequence.
///
/// History handling: the most recent `max_history` entries are kept (all of
/// them when history is shorter), blank entries are dropped after windowing,
/// and relative order is preserved. Caller-supplied messages are trimmed,
/// never mutated in place.
pub fn assemble(
    system_prompt: &str,
    profile_text: Option<&str>,
    history: &[ChatMessage],
    user_message: &str,
    max_history: usize,
) -> Vec<ChatMessage> {
    let mut system_content = system_prompt.to_string();
    if let Some(profile) = profile_text {
        let profile = profile.trim();
        if !profile.is_empty() {
            system_content.push_str("\n\nUser Info:\n");
            system_content.push_str(profile);
        }
    }

    let start = history.len().saturating_sub(max_history);

    let mut messages = Vec::with_capacity(history.len() - start + 2);
    messages.push(ChatMessage::system(system_content));
    for msg in &history[start..] {
        let content = msg.content.trim();
        if content.is_empty() {
            continue;
        }
        messages.push(ChatMessage { role: msg.role, content: content.to_string() });
    }
    messages.push(ChatMessage::user(user_message.trim()));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::types::Role;

    fn turn(i: usize) -> ChatMessage {
        if i % 2 == 0 {
            ChatMessage::user(format!("user turn {i}"))
        } else {
            ChatMessage::assistant(format!("assistant turn {i}"))
        }
    }

    #[test]
    fn test_empty_history_yields_system_plus_user() {
        let messages = assemble("base prompt", None, &[], "I'm feeling anxious", 10);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, "base prompt");
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "I'm feeling anxious");
    }

    #[test]
    fn test_window_keeps_last_n_in_order() {
        let history: Vec<ChatMessage> = (0..7).map(turn).collect();
        let messages = assemble("sys", None, &history, "now", 3);

        // system + 3 windowed turns + user
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[1].content, "user turn 4");
        assert_eq!(messages[2].content, "assistant turn 5");
        assert_eq!(messages[3].content, "user turn 6");
    }

    #[test]
    fn test_short_history_taken_whole() {
        let history: Vec<ChatMessage> = (0..2).map(turn).collect();
        let messages = assemble("sys", None, &history, "now", 10);
        assert_eq!(messages.len(), 4);
    }

    #[test]
    fn test_blank_history_entries_dropped() {
        let history = vec![
            ChatMessage::user("real"),
            ChatMessage::assistant("   "),
            ChatMessage::user(""),
            ChatMessage::assistant("also real"),
        ];
        let messages = assemble("sys", None, &history, "now", 10);
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[1].content, "real");
        assert_eq!(messages[2].content, "also real");
    }

    #[test]
    fn test_profile_text_appended_to_system() {
        let messages = assemble("base", Some("  Name: Sam\nLikes hiking  "), &[], "hi", 10);
        assert_eq!(messages[0].content, "base\n\nUser Info:\nName: Sam\nLikes hiking");
    }

    #[test]
    fn test_blank_profile_text_ignored() {
        let messages = assemble("base", Some("   "), &[], "hi", 10);
        assert_eq!(messages[0].content, "base");
    }

    #[test]
    fn test_user_message_trimmed() {
        let messages = assemble("sys", None, &[], "  hello there  ", 10);
        assert_eq!(messages.last().unwrap().content, "hello there");
    }
}

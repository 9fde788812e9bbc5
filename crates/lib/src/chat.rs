//! Conversation state for the chat screen.
//!
//! Owns the ordered transcript and the single in-flight-request gate. The UI
//! calls `submit` when the user sends, then `resolve` or `fail` once the
//! backend reply comes back. At most one send is in flight at a time.

/// Greeting seeded into every fresh transcript.
pub const GREETING: &str = "👋 Hi! I'm calPal. Try: \"Add team meeting tomorrow at 2pm\"";

/// Bot message appended when a send fails.
pub const SEND_FAILED: &str = "❌ Sorry, something went wrong. Please try again.";

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub text: String,
    pub is_user: bool,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_user: true,
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_user: false,
        }
    }
}

/// Transcript plus the at-most-one-in-flight send gate.
#[derive(Debug)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    pending: bool,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// Fresh transcript holding only the greeting.
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::bot(GREETING)],
            pending: false,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// True while a send is awaiting its reply; input stays disabled.
    pub fn pending(&self) -> bool {
        self.pending
    }

    /// Accept user input: append the trimmed message, enter the awaiting
    /// state, and return the text to send. Whitespace-only input or an
    /// in-flight request leaves the transcript untouched.
    pub fn submit(&mut self, input: &str) -> Option<String> {
        if self.pending {
            return None;
        }
        let text = input.trim();
        if text.is_empty() {
            return None;
        }
        self.messages.push(ChatMessage::user(text));
        self.pending = true;
        Some(text.to_string())
    }

    /// Record the backend's reply and return to idle.
    pub fn resolve(&mut self, reply: impl Into<String>) {
        self.messages.push(ChatMessage::bot(reply));
        self.pending = false;
    }

    /// Record the fixed failure message and return to idle; the user can
    /// retry immediately.
    pub fn fail(&mut self) {
        self.messages.push(ChatMessage::bot(SEND_FAILED));
        self.pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_count(c: &Conversation) -> usize {
        c.messages().iter().filter(|m| m.is_user).count()
    }

    #[test]
    fn starts_idle_with_greeting() {
        let c = Conversation::new();
        assert!(!c.pending());
        assert_eq!(c.messages(), &[ChatMessage::bot(GREETING)]);
    }

    #[test]
    fn submit_trims_appends_and_enters_awaiting() {
        let mut c = Conversation::new();
        let outbound = c.submit("  list my events  ").expect("accepted");
        assert_eq!(outbound, "list my events");
        assert!(c.pending());
        assert_eq!(c.messages().len(), 2);
        assert_eq!(c.messages()[1], ChatMessage::user("list my events"));
    }

    #[test]
    fn whitespace_only_input_is_ignored() {
        let mut c = Conversation::new();
        assert!(c.submit("").is_none());
        assert!(c.submit("   \t  ").is_none());
        assert!(!c.pending());
        assert_eq!(c.messages().len(), 1);
    }

    #[test]
    fn submit_while_awaiting_is_ignored() {
        let mut c = Conversation::new();
        c.submit("first").expect("accepted");
        assert!(c.submit("second").is_none());
        assert_eq!(c.messages().len(), 2);
        assert!(c.pending());
    }

    #[test]
    fn resolve_appends_bot_reply_and_returns_to_idle() {
        let mut c = Conversation::new();
        c.submit("Add team meeting tomorrow at 2pm").expect("accepted");
        c.resolve("Done!");
        assert!(!c.pending());
        assert_eq!(c.messages().last(), Some(&ChatMessage::bot("Done!")));
    }

    #[test]
    fn fail_appends_fixed_error_and_returns_to_idle() {
        let mut c = Conversation::new();
        c.submit("Add team meeting tomorrow at 2pm").expect("accepted");
        c.fail();
        assert!(!c.pending());
        assert_eq!(c.messages().last(), Some(&ChatMessage::bot(SEND_FAILED)));
    }

    #[test]
    fn sent_count_matches_replies_when_idle() {
        let mut c = Conversation::new();
        for (input, ok) in [("one", true), ("two", false), ("three", true)] {
            c.submit(input).expect("accepted");
            let bot_replies = c.messages().len() - 1 - user_count(&c);
            assert_eq!(user_count(&c), bot_replies + 1);
            if ok {
                c.resolve("ok");
            } else {
                c.fail();
            }
            let bot_replies = c.messages().len() - 1 - user_count(&c);
            assert_eq!(user_count(&c), bot_replies);
        }
    }
}

//! # Chat Log
//!
//! The ordered list of lines shown in the chat window. Append-only: a line,
//! once added, is never edited or removed for the lifetime of the app.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn label(self) -> &'static str {
        match self {
            Sender::User => "User",
            Sender::Bot => "Bot",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub sender: Sender,
    pub message: String,
}

impl ChatLine {
    /// The line as markup: `**Sender:** message`.
    ///
    /// The message is inserted verbatim; any markup it contains is kept.
    pub fn markup(&self) -> String {
        format!("**{}:** {}", self.sender.label(), self.message)
    }
}

#[derive(Debug, Default)]
pub struct ChatLog {
    lines: Vec<ChatLine>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a line and returns its index.
    pub fn append(&mut self, sender: Sender, message: impl Into<String>) -> usize {
        self.lines.push(ChatLine {
            sender,
            message: message.into(),
        });
        self.lines.len() - 1
    }

    pub fn lines(&self) -> &[ChatLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

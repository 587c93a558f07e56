use chrono::{DateTime, Utc};

/// One uploaded document. Callers replace the whole session on the next upload;
/// nothing in the engine keeps a "current document" of its own.
#[derive(Debug, Clone)]
pub struct DocumentSession {
    text: String,
    created_at: DateTime<Utc>,
}

impl DocumentSession {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Document prefix handed to the text generator, at most `budget` characters.
    pub fn prompt_context(&self, budget: usize) -> &str {
        match self.text.char_indices().nth(budget) {
            Some((end, _)) => &self.text[..end],
            None => &self.text,
        }
    }
}

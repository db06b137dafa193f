use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Product;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system<S: Into<String>>(s: S) -> Self {
        Self { role: Role::System, content: s.into() }
    }
    pub fn user<S: Into<String>>(s: S) -> Self {
        Self { role: Role::User, content: s.into() }
    }
    pub fn assistant<S: Into<String>>(s: S) -> Self {
        Self { role: Role::Assistant, content: s.into() }
    }
}

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("auth error: {0}")]
    Auth(String),
    #[error("rate limit: {0}")]
    RateLimit(String),
    #[error("timeout: {0}")]
    Timeout(String),
    #[error("network: {0}")]
    Network(String),
    #[error("decode: {0}")]
    Decode(String),
    #[error("protocol: {0}")]
    Protocol(String),
    #[error("other: {0}")]
    Other(String),
}

/// Ordered conversational context sent with every request.
///
/// The first message is always the single system message; every operation
/// below preserves that.
#[derive(Clone, Debug)]
pub struct ChatHistory {
    messages: Vec<Message>,
}

impl ChatHistory {
    pub fn new<S: Into<String>>(system_prompt: S) -> Self {
        Self { messages: vec![Message::system(system_prompt)] }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Always at least 1: the system message never leaves.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Truncate back to the system message. Used when a fresh routine
    /// generation begins.
    pub fn reset(&mut self) {
        self.messages.truncate(1);
    }

    pub fn push_user<S: Into<String>>(&mut self, content: S) {
        self.messages.push(Message::user(content));
    }

    pub fn push_assistant<S: Into<String>>(&mut self, content: S) {
        self.messages.push(Message::assistant(content));
    }

    /// Drop the trailing user message, if the tail is one. Called after a
    /// failed exchange so the failed turn does not pollute future context.
    pub fn rollback_user(&mut self) -> bool {
        if self.messages.len() > 1 && matches!(self.messages.last(), Some(m) if m.role == Role::User)
        {
            self.messages.pop();
            true
        } else {
            false
        }
    }
}

/// Build the routine-generation user turn: the selected products as a JSON
/// payload followed by the AM/PM instruction.
pub fn routine_prompt(products: &[&Product]) -> String {
    let payload: Vec<serde_json::Value> = products
        .iter()
        .map(|p| {
            serde_json::json!({
                "name": p.name,
                "brand": p.brand,
                "category": p.category,
                "description": p.description,
            })
        })
        .collect();
    format!(
        "Here are the products I have selected:\n{}\n\nBuild me a personalized \
         skincare routine from these products. Split it into an AM routine and \
         a PM routine, explain the order of application, and note anything that \
         should not be combined.",
        serde_json::to_string_pretty(&payload).unwrap_or_else(|_| "[]".into())
    )
}

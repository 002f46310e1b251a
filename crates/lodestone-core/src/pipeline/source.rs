//! The message-source collaborator boundary.

use async_trait::async_trait;

use crate::error::SourceError;

/// One chat message pulled from a source.
#[derive(Debug, Clone)]
pub struct Message {
    /// Message text content.
    pub content: String,
    /// Channel the message belongs to.
    pub channel_id: String,
    /// Unix timestamp of the message.
    pub timestamp: u64,
}

/// A paginated stream of messages for one channel.
///
/// `Ok(None)` signals end-of-source: a normal terminal condition for a
/// channel, not an error. A returned [`SourceError`] aborts only the worker
/// draining this source.
#[async_trait]
pub trait MessageSource: Send {
    /// The channel this source drains.
    fn channel_id(&self) -> &str;

    /// The next message, or `Ok(None)` at end-of-source.
    async fn next(&mut self) -> Result<Option<Message>, SourceError>;
}

/// A source backed by an in-memory message list.
///
/// Used by the CLI for chat-export files and by tests; messages are served
/// in order, then end-of-source.
#[derive(Debug, Clone)]
pub struct StaticMessageSource {
    channel_id: String,
    messages: Vec<Message>,
    cursor: usize,
}

impl StaticMessageSource {
    /// Creates a source serving `messages` for `channel_id`.
    pub fn new(channel_id: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            channel_id: channel_id.into(),
            messages,
            cursor: 0,
        }
    }

    /// Messages remaining to be served.
    pub fn remaining(&self) -> usize {
        self.messages.len() - self.cursor
    }
}

#[async_trait]
impl MessageSource for StaticMessageSource {
    fn channel_id(&self) -> &str {
        &self.channel_id
    }

    async fn next(&mut self) -> Result<Option<Message>, SourceError> {
        let msg = self.messages.get(self.cursor).cloned();
        if msg.is_some() {
            self.cursor += 1;
        }
        Ok(msg)
    }
}

//! Scripted backend for exercising the client stack without a network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{GenerationBackend, GenerationError};

type Reply = Result<String, GenerationError>;

pub(crate) struct ScriptedBackend {
    replies: Mutex<VecDeque<Reply>>,
    fallback: Option<Reply>,
    calls: AtomicU32,
}

impl ScriptedBackend {
    /// Replays `replies` in order; fails fatally once they run out.
    pub(crate) fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            fallback: None,
            calls: AtomicU32::new(0),
        }
    }

    /// Returns `reply` on every call.
    pub(crate) fn repeating(reply: Reply) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: Some(reply),
            calls: AtomicU32::new(0),
        }
    }

    pub(crate) fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    fn provider(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.replies.lock().unwrap().pop_front();
        next.or_else(|| self.fallback.clone())
            .unwrap_or_else(|| Err(GenerationError::Fatal("script exhausted".to_string())))
    }
}

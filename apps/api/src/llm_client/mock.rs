//! Scripted `ChatBackend` for tests: replays queued responses in order and
//! counts calls. When the script runs out it repeats the fallback answer.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ChatBackend, ChatRequest, ChatResponse, LlmError};

type Scripted = Result<ChatResponse, LlmError>;

pub struct ScriptedBackend {
    script: Mutex<VecDeque<Scripted>>,
    fallback: Fallback,
    calls: AtomicU32,
    last_request: Mutex<Option<ChatRequest>>,
}

enum Fallback {
    Fail,
    Answer(String),
}

impl ScriptedBackend {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self::build(script, Fallback::Fail)
    }

    /// Answers every call with `text` as the completion content.
    pub fn answering(text: &str) -> Self {
        Self::build(Vec::new(), Fallback::Answer(text.to_string()))
    }

    /// Fails every call with a 503.
    pub fn always_failing() -> Self {
        Self::build(Vec::new(), Fallback::Fail)
    }

    fn build(script: Vec<Scripted>, fallback: Fallback) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn json(body: &str) -> Scripted {
        Ok(serde_json::from_str(body).expect("scripted response must be valid JSON"))
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());

        if let Some(next) = self.script.lock().unwrap().pop_front() {
            return next;
        }

        match &self.fallback {
            Fallback::Fail => Err(LlmError::Api {
                status: 503,
                message: "service unavailable".to_string(),
            }),
            Fallback::Answer(text) => Ok(serde_json::from_value(serde_json::json!({
                "choices": [{ "message": { "content": text } }]
            }))
            .expect("canned response must deserialize")),
        }
    }
}

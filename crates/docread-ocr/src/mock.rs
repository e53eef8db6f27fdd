//! Scripted OCR engine for tests.
//!
//! [`MockOcrEngine`] answers from a queue of [`MockOcrResponse`]s and
//! records every request it receives. Once the queue is down to its last
//! entry, that entry is repeated for all further calls.

use async_trait::async_trait;
use docread_core::{OcrEngine, OcrError, OcrRequest};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One canned answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOcrResponse {
    /// Successful recognition
    Text(String),
    /// Service answered with a non-200 status
    Status(u16),
    /// Service unreachable
    Unavailable,
}

impl MockOcrResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    fn to_result(&self) -> Result<String, OcrError> {
        match self {
            Self::Text(text) => Ok(text.clone()),
            Self::Status(status) => Err(OcrError::Status {
                status: *status,
                body: String::new(),
            }),
            Self::Unavailable => Err(OcrError::Transport("connection refused".to_string())),
        }
    }
}

/// OCR engine with scripted responses.
#[derive(Debug)]
pub struct MockOcrEngine {
    responses: Mutex<VecDeque<MockOcrResponse>>,
    requests: Mutex<Vec<OcrRequest>>,
    call_count: AtomicUsize,
}

impl MockOcrEngine {
    /// Answer every request with `text`.
    #[must_use]
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::with_responses([MockOcrResponse::text(text)])
    }

    /// Answer every request with the same failure or text.
    #[must_use]
    pub fn always(response: MockOcrResponse) -> Self {
        Self::with_responses([response])
    }

    /// Answer requests in order; the last response repeats.
    ///
    /// An empty script answers every request with an empty string.
    #[must_use]
    pub fn with_responses(responses: impl IntoIterator<Item = MockOcrResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Number of `recognize` calls so far.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Snapshot of the requests received, in call order.
    pub fn requests(&self) -> Vec<OcrRequest> {
        lock(&self.requests).clone()
    }

    /// File names of the requests received, in call order.
    pub fn file_names(&self) -> Vec<String> {
        lock(&self.requests)
            .iter()
            .map(|r| r.file_name.clone())
            .collect()
    }

    fn next_response(&self) -> MockOcrResponse {
        let mut responses = lock(&self.responses);
        if responses.len() > 1 {
            responses.pop_front().unwrap_or(MockOcrResponse::Text(String::new()))
        } else {
            responses
                .front()
                .cloned()
                .unwrap_or(MockOcrResponse::Text(String::new()))
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl OcrEngine for MockOcrEngine {
    fn name(&self) -> &str {
        "mock"
    }

    async fn recognize(&self, request: OcrRequest) -> Result<String, OcrError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        lock(&self.requests).push(request);
        self.next_response().to_result()
    }
}

//! In-memory runner and surface for driving the pipeline in tests.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use tokio::sync::Notify;
use tower_lsp::lsp_types::{Diagnostic, Url};

use crate::{
    analysis::Surface,
    command::Invocation,
    runner::{Captured, RunError, Runner},
};

/// Replies in order; runs past the last reply fail to spawn.
#[derive(Default)]
pub(crate) struct FakeRunner {
    replies: Mutex<VecDeque<(Option<Arc<Notify>>, String)>>,
    pub(crate) calls: Mutex<Vec<Invocation>>,
}

impl FakeRunner {
    pub(crate) fn reply(self, stderr: &str) -> Self {
        self.replies.lock().unwrap().push_back((None, stderr.into()));
        self
    }

    /// The run blocks until `gate` is notified.
    pub(crate) fn gated_reply(self, gate: Arc<Notify>, stderr: &str) -> Self {
        self.replies.lock().unwrap().push_back((Some(gate), stderr.into()));
        self
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[tower_lsp::async_trait]
impl Runner for FakeRunner {
    async fn run(&self, invocation: &Invocation) -> Result<Captured, RunError> {
        self.calls.lock().unwrap().push(invocation.clone());
        let reply = self.replies.lock().unwrap().pop_front();
        let (gate, stderr) = match reply {
            Some(reply) => reply,
            None => {
                return Err(RunError::Spawn {
                    program: invocation.program.clone(),
                    source: std::io::ErrorKind::NotFound.into(),
                })
            }
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(Captured { code: Some(0), stderr })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    Log(String),
    Status(String),
    Warning(String),
    Publish(Url, usize),
}

#[derive(Default)]
pub(crate) struct Recorder {
    events: Mutex<Vec<Event>>,
    // (entered, release) for the next publish
    hold: Mutex<Option<(Arc<Notify>, Arc<Notify>)>>,
}

impl Recorder {
    pub(crate) fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn publishes(&self) -> Vec<usize> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Publish(_, count) => Some(count),
                _ => None,
            })
            .collect()
    }

    /// The next publish notifies `entered`, then waits for `release`.
    pub(crate) fn hold_next_publish(
        self,
        entered: Arc<Notify>,
        release: Arc<Notify>,
    ) -> Self {
        *self.hold.lock().unwrap() = Some((entered, release));
        self
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

#[tower_lsp::async_trait]
impl Surface for Recorder {
    async fn log(&self, message: String) {
        self.push(Event::Log(message));
    }

    async fn status(&self, message: String) {
        self.push(Event::Status(message));
    }

    async fn warning(&self, message: String) {
        self.push(Event::Warning(message));
    }

    async fn publish(&self, uri: Url, diagnostics: Vec<Diagnostic>) {
        let hold = self.hold.lock().unwrap().take();
        if let Some((entered, release)) = hold {
            entered.notify_one();
            release.notified().await;
        }
        self.push(Event::Publish(uri, diagnostics.len()));
    }
}

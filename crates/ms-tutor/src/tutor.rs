//! The request/reply state machine.

use std::fmt;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use ms_core::SimulationState;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{Prompt, TextProvider, Topic, TutorConfig, TutorError, TutorResult};

/// Identifies one call to [`Tutor::ask`].  Later requests have larger ids.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where the tutor is, from the user's point of view.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Phase {
    /// Nothing asked yet.
    Idle,
    /// A request newer than the displayed answer is in flight.
    Thinking,
    /// Showing provider text.
    Answered,
    /// Showing the fallback text after a failure.
    Fallback,
}

/// The text currently on display.
#[derive(Clone, PartialEq, Debug)]
pub struct Answer {
    pub id: RequestId,
    pub topic: Topic,
    pub text: String,
    /// `true` if `text` is the configured fallback.
    pub fell_back: bool,
}

struct Reply {
    id: RequestId,
    topic: Topic,
    result: TutorResult<String>,
}

/// Runs explanation requests off the tick loop and keeps the newest answer.
///
/// [`ask`][Self::ask] never blocks: it renders the prompt from a copy of the
/// state and spawns the provider call on the current Tokio runtime.  Replies
/// are picked up by [`poll`][Self::poll] (from a frame loop) or awaited with
/// [`next_answer`][Self::next_answer].
///
/// Overlapping requests are allowed.  Only a reply newer than the one on
/// display is shown; a slow reply to an older question is discarded.
pub struct Tutor<P> {
    provider: P,
    config:   TutorConfig,
    last_id:  u64,
    answer:   Option<Answer>,
    tx:       mpsc::UnboundedSender<Reply>,
    rx:       mpsc::UnboundedReceiver<Reply>,
}

impl<P: TextProvider> Tutor<P> {
    pub fn new(provider: P, config: TutorConfig) -> TutorResult<Self> {
        config.validate()?;
        let (tx, rx) = mpsc::unbounded_channel();
        Ok(Self { provider, config, last_id: 0, answer: None, tx, rx })
    }

    pub fn config(&self) -> &TutorConfig {
        &self.config
    }

    /// Start a request about `topic` for the given state.
    ///
    /// # Panics
    ///
    /// If called outside a Tokio runtime.
    pub fn ask(&mut self, topic: Topic, state: SimulationState) -> RequestId {
        self.last_id += 1;
        let id = RequestId(self.last_id);
        debug!(%id, topic = topic.key(), "tutor request");

        let reply_topic = topic.clone();
        let request = self.provider.generate(Prompt::build(topic, state, &self.config));
        let tx = self.tx.clone();
        tokio::spawn(async move {
            // Every request gets a reply, even when the provider panics.
            let result = AssertUnwindSafe(request)
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(TutorError::Provider("provider panicked".into())));
            // The tutor may have been dropped; nobody is left to show the reply.
            let _ = tx.send(Reply { id, topic: reply_topic, result });
        });
        id
    }

    /// Apply every reply that has arrived.  Returns `true` if the displayed
    /// answer changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(reply) = self.rx.try_recv() {
            changed |= self.accept(reply);
        }
        changed
    }

    /// Wait until a newer answer is displayed.
    ///
    /// Returns `None` immediately when nothing newer than the displayed
    /// answer is outstanding.
    pub async fn next_answer(&mut self) -> Option<&Answer> {
        while self.phase() == Phase::Thinking {
            let reply = self.rx.recv().await?;
            if self.accept(reply) {
                return self.answer.as_ref();
            }
        }
        None
    }

    pub fn phase(&self) -> Phase {
        let shown = self.answer.as_ref().map_or(0, |a| a.id.0);
        match &self.answer {
            _ if self.last_id > shown => Phase::Thinking,
            None => Phase::Idle,
            Some(a) if a.fell_back => Phase::Fallback,
            Some(_) => Phase::Answered,
        }
    }

    pub fn answer(&self) -> Option<&Answer> {
        self.answer.as_ref()
    }

    /// What to display: the current answer, or the placeholder while the
    /// first request is in flight.
    pub fn text(&self) -> Option<&str> {
        match &self.answer {
            Some(a) => Some(&a.text),
            None if self.last_id > 0 => Some(&self.config.placeholder_text),
            None => None,
        }
    }

    fn accept(&mut self, reply: Reply) -> bool {
        if let Some(shown) = self.answer.as_ref().filter(|a| reply.id <= a.id) {
            debug!(id = %reply.id, shown = %shown.id, "discarding stale tutor reply");
            return false;
        }

        let result = reply.result.and_then(|text| {
            if text.trim().is_empty() { Err(TutorError::EmptyResponse) } else { Ok(text) }
        });
        let (text, fell_back) = match result {
            Ok(text) => (text, false),
            Err(e) => {
                warn!(id = %reply.id, error = %e, "tutor request failed");
                (self.config.fallback_text.clone(), true)
            }
        };
        self.answer = Some(Answer { id: reply.id, topic: reply.topic, text, fell_back });
        true
    }
}

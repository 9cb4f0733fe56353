//! `ms-tutor` — plain-language explanations of what the drivetrain is doing.
//!
//! The tutor is a side channel: it reads a copy of a [`SimulationState`],
//! never writes one, and never blocks the tick loop.  Provider failures end
//! up as fallback text on screen and go no further.
//!
//! ```text
//!   ask(topic, state) ──▶ Prompt ──▶ TextProvider (spawned) ──▶ reply queue
//!                                                                  │
//!   poll() / next_answer() ◀── newest-wins filter ◀────────────────┘
//! ```
//!
//! [`OfflineProvider`] answers from local rules; network-backed providers
//! implement [`TextProvider`] in the application.
//!
//! [`SimulationState`]: ms_core::SimulationState

pub mod error;
pub mod prompt;
pub mod provider;
pub mod tutor;

#[cfg(test)]
mod tests;

pub use error::{TutorError, TutorResult};
pub use prompt::{Prompt, Topic, TutorConfig};
pub use provider::{OfflineProvider, TextProvider};
pub use tutor::{Answer, Phase, RequestId, Tutor};

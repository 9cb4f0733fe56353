//! Unit tests for ms-tutor.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use ms_core::{Gear, Pedal, SimulationState};

use crate::*;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Replies from a script, one entry per request, each after its own delay.
struct Scripted {
    replies: Mutex<VecDeque<(u64, TutorResult<String>)>>,
}

impl Scripted {
    fn new(replies: Vec<(u64, TutorResult<String>)>) -> Self {
        Self { replies: Mutex::new(replies.into()) }
    }
}

impl TextProvider for Scripted {
    fn generate(&self, _prompt: Prompt) -> BoxFuture<'static, TutorResult<String>> {
        let (delay_ms, result) = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or((0, Err(TutorError::Provider("script exhausted".into()))));
        async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            result
        }
        .boxed()
    }
}

/// A provider whose future panics when polled.
struct Crashing;

impl TextProvider for Crashing {
    fn generate(&self, _prompt: Prompt) -> BoxFuture<'static, TutorResult<String>> {
        futures::future::lazy(|_| -> TutorResult<String> { panic!("model backend crashed") })
            .boxed()
    }
}

fn ok(text: &str) -> TutorResult<String> {
    Ok(text.to_owned())
}

fn driving() -> SimulationState {
    SimulationState {
        rpm: 2_345.6,
        speed_kmh: 12.4,
        gear: Gear::First,
        clutch_pedal: Pedal::new(0.35).unwrap(),
        engine_on: true,
        ..SimulationState::new()
    }
}

fn stalled() -> SimulationState {
    SimulationState { gear: Gear::First, is_stalled: true, ..SimulationState::new() }
}

// ── Prompt ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod prompt_tests {
    use super::*;

    #[test]
    fn renders_state_fields() {
        let p = Prompt::build(Topic::ClutchState, driving(), &TutorConfig::default());
        for needle in [
            "Engine Status: Running",
            "RPM: 2346",
            "Speed: 12 km/h",
            "Gear: 1",
            "Clutch Pedal: 35% pressed",
            "Stalled: No",
            Topic::ClutchState.question(),
            "at most 3 sentences",
            "Answer in English",
        ] {
            assert!(p.user.contains(needle), "missing {needle:?} in:\n{}", p.user);
        }
        assert_eq!(p.model, "gemini-2.5-flash");
        assert!(p.system.contains("tutor"));
        assert_eq!(p.state, driving(), "prompt keeps its own copy");
    }

    #[test]
    fn renders_stall_and_language() {
        let config = TutorConfig {
            language: "Chinese".into(),
            max_sentences: 2,
            ..TutorConfig::default()
        };
        let p = Prompt::build(Topic::Custom("Why did it die?".into()), stalled(), &config);
        assert!(p.user.contains("Engine Status: Off"));
        assert!(p.user.contains("Stalled: YES"));
        assert!(p.user.contains("\"Why did it die?\""));
        assert!(p.user.contains("at most 2 sentences"));
        assert!(p.user.contains("Answer in Chinese"));
    }

    #[test]
    fn topic_from_key() {
        assert_eq!(Topic::from("launch"), Topic::Launch);
        assert_eq!(Topic::from(" clutch "), Topic::ClutchState);
        assert_eq!(Topic::from("gears"), Topic::GearRatios);
        assert_eq!(Topic::from("what is torque?"), Topic::Custom("what is torque?".into()));
        for preset in Topic::PRESETS {
            assert_eq!(Topic::from(preset.key()), preset);
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = TutorConfig { max_sentences: 0, ..TutorConfig::default() };
        assert!(matches!(Tutor::new(OfflineProvider, config), Err(TutorError::Config(_))));
        let config = TutorConfig { model: "  ".into(), ..TutorConfig::default() };
        assert!(config.validate().is_err());
    }
}

// ── OfflineProvider ───────────────────────────────────────────────────────────

#[cfg(test)]
mod offline_tests {
    use super::*;

    async fn answer(topic: Topic, state: SimulationState) -> String {
        OfflineProvider
            .generate(Prompt::build(topic, state, &TutorConfig::default()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn explains_a_stall() {
        assert!(answer(Topic::Launch, stalled()).await.contains("stalled"));
    }

    #[tokio::test]
    async fn launch_from_neutral_asks_for_first_gear() {
        let state = SimulationState { engine_on: true, rpm: 800.0, ..SimulationState::new() };
        assert!(answer(Topic::Launch, state).await.contains("first gear"));
    }

    #[tokio::test]
    async fn slipping_clutch_reports_engagement() {
        let text = answer(Topic::ClutchState, driving()).await;
        assert!(text.contains("65%"), "{text}");
    }

    #[tokio::test]
    async fn gear_ratios_name_the_gear() {
        let text = answer(Topic::GearRatios, driving()).await;
        assert!(text.contains("gear 1"), "{text}");
    }
}

// ── Tutor state machine ───────────────────────────────────────────────────────

#[cfg(test)]
mod tutor_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn idle_until_asked() {
        let mut tutor = Tutor::new(OfflineProvider, TutorConfig::default()).unwrap();
        assert_eq!(tutor.phase(), Phase::Idle);
        assert_eq!(tutor.text(), None);
        assert!(tutor.next_answer().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn placeholder_while_thinking() {
        let mut tutor = Tutor::new(Scripted::new(vec![(100, ok("done"))]), TutorConfig::default())
            .unwrap();
        let id = tutor.ask(Topic::Launch, driving());
        assert_eq!(id, RequestId(1));
        assert_eq!(tutor.phase(), Phase::Thinking);
        assert!(!tutor.poll());
        assert_eq!(tutor.text(), Some("The tutor is thinking..."));

        let answer = tutor.next_answer().await.unwrap();
        assert_eq!(answer.text, "done");
        assert_eq!(answer.topic, Topic::Launch);
        assert_eq!(tutor.phase(), Phase::Answered);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_older_reply_is_discarded() {
        let provider = Scripted::new(vec![(200, ok("slow")), (50, ok("fast"))]);
        let mut tutor = Tutor::new(provider, TutorConfig::default()).unwrap();
        tutor.ask(Topic::Launch, driving());
        let newer = tutor.ask(Topic::GearRatios, driving());

        let answer = tutor.next_answer().await.unwrap();
        assert_eq!((answer.id, answer.text.as_str()), (newer, "fast"));
        assert_eq!(tutor.phase(), Phase::Answered);

        tokio::time::sleep(Duration::from_millis(300)).await;
        tokio::task::yield_now().await;
        assert!(!tutor.poll(), "stale reply must not replace the newer one");
        assert_eq!(tutor.text(), Some("fast"));
    }

    #[tokio::test(start_paused = true)]
    async fn replies_in_order_are_all_shown() {
        let provider = Scripted::new(vec![(50, ok("first")), (200, ok("second"))]);
        let mut tutor = Tutor::new(provider, TutorConfig::default()).unwrap();
        tutor.ask(Topic::Launch, driving());
        tutor.ask(Topic::ClutchState, driving());

        assert_eq!(tutor.next_answer().await.unwrap().text, "first");
        assert_eq!(tutor.phase(), Phase::Thinking, "second request still in flight");
        assert_eq!(tutor.next_answer().await.unwrap().text, "second");
        assert_eq!(tutor.phase(), Phase::Answered);
        assert!(tutor.next_answer().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn provider_error_shows_fallback() {
        let provider = Scripted::new(vec![(10, Err(TutorError::Provider("503".into())))]);
        let mut tutor = Tutor::new(provider, TutorConfig::default()).unwrap();
        tutor.ask(Topic::Launch, driving());

        let answer = tutor.next_answer().await.unwrap();
        assert!(answer.fell_back);
        assert_eq!(answer.text, TutorConfig::default().fallback_text);
        assert_eq!(tutor.phase(), Phase::Fallback);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_reply_shows_fallback() {
        let provider = Scripted::new(vec![(10, ok("  \n"))]);
        let mut tutor = Tutor::new(provider, TutorConfig::default()).unwrap();
        tutor.ask(Topic::Custom("?".into()), stalled());
        assert!(tutor.next_answer().await.unwrap().fell_back);
    }

    #[tokio::test(start_paused = true)]
    async fn provider_panic_shows_fallback() {
        let mut tutor = Tutor::new(Crashing, TutorConfig::default()).unwrap();
        tutor.ask(Topic::Launch, driving());

        let answer = tokio::time::timeout(Duration::from_secs(2), tutor.next_answer())
            .await
            .expect("tutor kept thinking after the provider panicked")
            .unwrap();
        assert!(answer.fell_back);
        assert_eq!(tutor.phase(), Phase::Fallback);
        assert_eq!(tutor.text(), Some(TutorConfig::default().fallback_text.as_str()));
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_after_fallback() {
        let provider = Scripted::new(vec![
            (10, Err(TutorError::Provider("timeout".into()))),
            (10, ok("back online")),
        ]);
        let mut tutor = Tutor::new(provider, TutorConfig::default()).unwrap();
        tutor.ask(Topic::Launch, driving());
        tutor.next_answer().await;
        assert_eq!(tutor.phase(), Phase::Fallback);

        tutor.ask(Topic::Launch, driving());
        tutor.next_answer().await;
        assert_eq!(tutor.phase(), Phase::Answered);
        assert_eq!(tutor.text(), Some("back online"));
    }

    #[tokio::test(start_paused = true)]
    async fn offline_provider_through_tutor() {
        let mut tutor = Tutor::new(OfflineProvider, TutorConfig::default()).unwrap();
        tutor.ask(Topic::ClutchState, driving());
        let answer = tutor.next_answer().await.unwrap();
        assert!(!answer.fell_back);
        assert!(tutor.text().is_some_and(|t| t.contains("slipping")));
    }
}

//! Text providers: the seam between the tutor and whatever generates text.

use futures::future::{self, BoxFuture, FutureExt};
use ms_core::{EngineStatus, Gear, SimulationState};

use crate::{Prompt, Topic, TutorResult};

/// Something that turns a [`Prompt`] into free text.
///
/// The returned future is `'static` and `Send` so the tutor can run it on a
/// background task; it must not borrow the provider.  Implementations report
/// transport or API failures as [`TutorError::Provider`][crate::TutorError].
///
/// # Example
///
/// ```rust,ignore
/// struct Canned(&'static str);
///
/// impl TextProvider for Canned {
///     fn generate(&self, _prompt: Prompt) -> BoxFuture<'static, TutorResult<String>> {
///         let text = self.0.to_owned();
///         async move { Ok(text) }.boxed()
///     }
/// }
/// ```
pub trait TextProvider {
    fn generate(&self, prompt: Prompt) -> BoxFuture<'static, TutorResult<String>>;
}

impl<P: TextProvider + ?Sized> TextProvider for std::sync::Arc<P> {
    fn generate(&self, prompt: Prompt) -> BoxFuture<'static, TutorResult<String>> {
        (**self).generate(prompt)
    }
}

// ── OfflineProvider ───────────────────────────────────────────────────────────

/// Deterministic, rule-based explanations built from the snapshot alone.
///
/// Needs no network and answers immediately.  Always answers in English and
/// ignores the model name.
#[derive(Copy, Clone, Debug, Default)]
pub struct OfflineProvider;

impl TextProvider for OfflineProvider {
    fn generate(&self, prompt: Prompt) -> BoxFuture<'static, TutorResult<String>> {
        future::ready(Ok(explain(&prompt.topic, &prompt.state))).boxed()
    }
}

fn explain(topic: &Topic, s: &SimulationState) -> String {
    let engagement = s.engagement();
    let status = match s.status() {
        EngineStatus::Stalled => {
            "The engine has stalled: the clutch was engaged while the crank was \
             turning too slowly to carry the load, so it stopped. Press the clutch \
             and restart."
        }
        EngineStatus::Off => "The engine is off, so nothing is driving the wheels.",
        EngineStatus::Running => "",
    };
    if !status.is_empty() && !matches!(topic, Topic::GearRatios) {
        return status.to_owned();
    }

    match topic {
        Topic::Launch => match (s.gear, engagement) {
            (Gear::Neutral, _) => "Press the clutch fully and select first gear before \
                                   pulling away."
                .to_owned(),
            (_, e) if e > 0.8 && s.speed_kmh < 5.0 => format!(
                "The clutch is almost fully engaged at {:.0} rpm with the car barely \
                 moving; bring the revs up to around 1500 rpm and let the clutch out \
                 slowly so it can slip while the car gathers speed.",
                s.rpm
            ),
            _ => "Hold a little throttle and release the clutch gradually; the friction \
                  plate slips at first and then locks once engine and wheel speeds match."
                .to_owned(),
        },
        Topic::ClutchState => clutch_state(s, engagement),
        Topic::GearRatios => format!(
            "Each gear multiplies engine torque by its ratio at the cost of wheel speed. \
             Low gears give strong pulling force to get moving; high gears let the \
             engine turn slowly at cruising speed. You are in gear {}.",
            s.gear
        ),
        Topic::Custom(_) => format!(
            "{} The engine is at {:.0} rpm and the car at {:.0} km/h.",
            clutch_state(s, engagement),
            s.rpm,
            s.speed_kmh
        ),
    }
}

fn clutch_state(s: &SimulationState, engagement: f64) -> String {
    if s.gear.is_neutral() {
        "The gearbox is in neutral, so the clutch position makes no difference: the \
         engine spins freely."
            .to_owned()
    } else if engagement < 0.1 {
        "The clutch is pressed: the engine is disconnected from the gearbox and turns \
         freely."
            .to_owned()
    } else if engagement < 0.9 {
        format!(
            "The clutch is partly engaged ({:.0}%): the plates are slipping and transfer \
             only part of the engine's torque to the wheels.",
            engagement * 100.0
        )
    } else {
        "The clutch is fully engaged: engine and wheels are locked together through the \
         selected gear."
            .to_owned()
    }
}

//! Integration tests for ms-sim.

use ms_core::{DrivetrainConfig, Gear, Pedal, SimConfig, SimulationState, Tick};
use ms_drivetrain::StepReport;

use crate::{Command, NoopObserver, Sim, SimBuilder, SimError, SimObserver, Snapshot};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn test_config(total_ticks: u64) -> SimConfig {
    SimConfig {
        fixed_dt_secs:           0.1,
        max_dt_secs:             0.1,
        total_ticks,
        snapshot_interval_ticks: 10,
    }
}

fn sim(total_ticks: u64) -> Sim {
    SimBuilder::new(test_config(total_ticks)).build().unwrap()
}

/// Observer that records every callback.
#[derive(Default)]
struct Recorder {
    starts:    usize,
    ends:      usize,
    snapshots: Vec<Snapshot>,
    stalls:    Vec<Snapshot>,
    finished:  Option<Tick>,
}

impl SimObserver for Recorder {
    fn on_tick_start(&mut self, _t: Tick) { self.starts += 1; }
    fn on_tick_end(&mut self, _t: Tick, _r: &StepReport) { self.ends += 1; }
    fn on_snapshot(&mut self, s: &Snapshot) { self.snapshots.push(*s); }
    fn on_stall(&mut self, s: &Snapshot) { self.stalls.push(*s); }
    fn on_sim_end(&mut self, t: Tick) { self.finished = Some(t); }
}

// ── SimBuilder validation ─────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn builds_successfully_with_defaults() {
        let sim = SimBuilder::new(SimConfig::default()).build().unwrap();
        assert_eq!(sim.state(), SimulationState::new());
        assert_eq!(sim.clock.current_tick, Tick::ZERO);
    }

    #[test]
    fn invalid_sim_config_errors() {
        let cfg = SimConfig { max_dt_secs: -1.0, ..SimConfig::default() };
        let result = SimBuilder::new(cfg).build();
        assert!(matches!(result, Err(SimError::Core(_))));
    }

    #[test]
    fn invalid_profile_errors() {
        let mut profile = DrivetrainConfig::default();
        profile.coupling.rpm_per_kmh_ratio = 0.0;
        let result = SimBuilder::new(test_config(10)).drivetrain(profile).build();
        assert!(result.is_err());
    }

    #[test]
    fn out_of_range_initial_rpm_errors() {
        let state = SimulationState { rpm: 9_000.0, ..SimulationState::new() };
        let result = SimBuilder::new(test_config(10)).initial_state(state).build();
        assert!(matches!(result, Err(SimError::InvalidInitialState(_))));
    }

    #[test]
    fn running_stalled_state_errors() {
        let state = SimulationState { engine_on: true, is_stalled: true, ..SimulationState::new() };
        let result = SimBuilder::new(test_config(10)).initial_state(state).build();
        assert!(matches!(result, Err(SimError::InvalidInitialState(_))));
    }

    #[test]
    fn initial_state_is_committed() {
        let state = SimulationState { speed_kmh: 42.0, ..SimulationState::new() };
        let sim = SimBuilder::new(test_config(10)).initial_state(state).build().unwrap();
        assert_eq!(sim.snapshot().state.speed_kmh, 42.0);
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod command_tests {
    use super::*;

    #[test]
    fn cold_start_via_toggle() {
        let mut sim = sim(10);
        sim.apply(Command::ToggleEngine);
        let s = sim.state();
        assert_eq!(s.rpm, 800.0);
        assert!(s.engine_on);
        assert!(!s.is_stalled);
        assert_eq!(sim.clock.current_tick, Tick::ZERO, "apply must not advance time");
    }

    #[test]
    fn queued_commands_land_on_next_tick_in_order() {
        let mut sim = sim(10);
        let control = sim.control();
        control.set_clutch(1.0).unwrap();
        control.shift("2").unwrap();
        control.set_gear(Gear::Third).unwrap();
        control.set_throttle(0.4).unwrap();
        assert_eq!(sim.state().gear, Gear::Neutral, "nothing applied before a tick");

        sim.advance(0.0);
        let s = sim.state();
        assert_eq!(s.gear, Gear::Third);
        assert_eq!(s.clutch_pedal, Pedal::FLOORED);
        assert_eq!(s.throttle_pedal.value(), 0.4);
    }

    #[test]
    fn out_of_range_pedal_is_clamped() {
        let mut sim = sim(10);
        let control = sim.control();
        control.set_brake(2.5).unwrap();
        control.set_throttle(-1.0).unwrap();
        sim.advance(0.0);
        assert_eq!(sim.state().brake_pedal, Pedal::FLOORED);
        assert_eq!(sim.state().throttle_pedal, Pedal::RELEASED);
    }

    #[test]
    fn non_finite_pedal_is_rejected() {
        let sim = sim(10);
        let control = sim.control();
        assert!(matches!(control.set_clutch(f64::NAN), Err(SimError::Core(_))));
        assert!(control.shift("7").is_err());
    }

    #[test]
    fn handle_reports_dropped_sim() {
        let control = sim(10).control();
        assert!(matches!(control.start_engine(), Err(SimError::Disconnected(Command::StartEngine))));
    }

    #[test]
    fn gear_change_accepted_without_clutch() {
        let mut sim = sim(10);
        sim.apply(Command::StartEngine);
        sim.apply(Command::SetGear(Gear::Fifth));
        assert_eq!(sim.state().gear, Gear::Fifth);
    }

    #[test]
    fn restart_after_stall_reseeds_idle() {
        let mut sim = sim(100);
        sim.apply(Command::StartEngine);
        sim.apply(Command::SetGear(Gear::First));
        sim.advance(0.1);
        assert!(sim.state().is_stalled);

        sim.advance(0.1);
        assert_eq!(sim.state().rpm, 0.0);

        sim.apply(Command::SetClutch(Pedal::FLOORED));
        sim.apply(Command::ToggleEngine);
        let s = sim.state();
        assert!(s.engine_on && !s.is_stalled);
        assert_eq!(s.rpm, 800.0);
    }
}

// ── Stepping ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod step_tests {
    use std::time::{Duration, Instant};

    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn zero_dt_leaves_physics_untouched() {
        let state = SimulationState {
            rpm: 2_000.0,
            speed_kmh: 30.0,
            gear: Gear::Second,
            engine_on: true,
            ..SimulationState::new()
        };
        let mut sim = SimBuilder::new(test_config(10)).initial_state(state).build().unwrap();
        sim.advance(0.0);
        assert_eq!(sim.state(), state);
        assert_eq!(sim.clock.elapsed_secs, 0.0);
    }

    #[test]
    fn stall_scenario_within_one_tick() {
        let mut sim = sim(10);
        sim.apply(Command::StartEngine);
        sim.apply(Command::SetGear(Gear::First));
        let report = sim.advance(0.1);
        assert!(report.stalled);
        let s = sim.state();
        assert!(s.is_stalled);
        assert!(!s.engine_on);
    }

    #[test]
    fn coast_down_scenario() {
        let state = SimulationState { rpm: 1_000.0, speed_kmh: 60.0, ..SimulationState::new() };
        let mut sim = SimBuilder::new(test_config(10)).initial_state(state).build().unwrap();
        sim.advance(1.0);
        approx::assert_relative_eq!(sim.state().rpm, 135.0, max_relative = 0.05);
        approx::assert_relative_eq!(sim.state().speed_kmh, 36.4, max_relative = 0.05);
    }

    #[test]
    fn step_fixed_uses_configured_dt() {
        let mut sim = sim(10);
        sim.step_fixed();
        sim.step_fixed();
        assert_eq!(sim.clock.current_tick, Tick(2));
        assert_abs_diff_eq!(sim.clock.elapsed_secs, 0.2, epsilon = 1e-12);
    }

    #[test]
    fn wall_clock_steps_are_clamped() {
        let mut sim = sim(10);
        sim.apply(Command::StartEngine);
        let t0 = Instant::now();

        sim.step_wall_clock(t0);
        assert_eq!(sim.clock.elapsed_secs, 0.0, "first frame has nothing to measure");

        sim.step_wall_clock(t0 + Duration::from_millis(20));
        assert_abs_diff_eq!(sim.clock.elapsed_secs, 0.02, epsilon = 1e-9);

        // Process suspended for a minute.
        sim.step_wall_clock(t0 + Duration::from_secs(60));
        assert_abs_diff_eq!(sim.clock.elapsed_secs, 0.12, epsilon = 1e-9);
        assert_eq!(sim.clock.current_tick, Tick(3));
    }

    #[test]
    fn neutral_rev_stays_in_band() {
        let mut sim = sim(1_000);
        sim.apply(Command::StartEngine);
        sim.apply(Command::SetThrottle(Pedal::FLOORED));
        for _ in 0..300 {
            sim.step_fixed();
            let rpm = sim.state().rpm;
            assert!((800.0..=7_000.0).contains(&rpm), "{rpm}");
        }
        assert_eq!(sim.state().rpm, 7_000.0);
    }

    #[test]
    fn snapshot_carries_telemetry() {
        let mut sim = sim(10);
        sim.apply(Command::StartEngine);
        sim.step_fixed();
        let snap = sim.snapshot();
        assert_eq!(snap.tick, Tick(1));
        // idle 800 rpm → 4800 deg/s; 0.1 s → 480 → 120.
        assert!(snap.telemetry.shafts.engine_deg > 0.0);
        assert!(snap.telemetry.tachometer_deg > -135.0);
    }

    #[test]
    fn subscribers_see_committed_snapshots() {
        let mut sim = sim(10);
        let mut rx = sim.subscribe();
        assert_eq!(rx.borrow_and_update().tick, Tick::ZERO);

        sim.apply(Command::StartEngine);
        sim.run_ticks(3, &mut NoopObserver);
        assert!(rx.has_changed().unwrap());
        let latest = *rx.borrow_and_update();
        assert_eq!(latest.tick, Tick(3));
        assert_eq!(latest.state, sim.state());
    }
}

// ── Run loops ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod run_tests {
    use super::*;

    #[test]
    fn run_stops_at_end_tick() {
        let mut sim = sim(25);
        let mut obs = Recorder::default();
        sim.run(&mut obs);
        assert_eq!(sim.clock.current_tick, Tick(25));
        assert_eq!(obs.starts, 25);
        assert_eq!(obs.ends, 25);
        assert_eq!(obs.finished, Some(Tick(25)));
    }

    #[test]
    fn run_ticks_advances_clock() {
        let mut sim = sim(100);
        sim.run_ticks(5, &mut NoopObserver);
        assert_eq!(sim.clock.current_tick, Tick(5));
        sim.run_ticks(3, &mut NoopObserver);
        assert_eq!(sim.clock.current_tick, Tick(8));
    }

    #[test]
    fn snapshots_follow_interval() {
        let mut sim = sim(25);
        let mut obs = Recorder::default();
        sim.run(&mut obs);
        // Ticks 0, 10, 20.
        assert_eq!(obs.snapshots.len(), 3);
        assert_eq!(obs.snapshots[1].tick, Tick(11));
    }

    #[test]
    fn stall_reported_once() {
        let mut sim = sim(20);
        sim.apply(Command::StartEngine);
        sim.apply(Command::SetGear(Gear::First));
        let mut obs = Recorder::default();
        sim.run(&mut obs);
        assert_eq!(obs.stalls.len(), 1);
        assert!(obs.stalls[0].state.is_stalled);
    }

    #[test]
    fn smooth_launch_reaches_speed_without_stalling() {
        let mut sim = sim(0);
        let control = sim.control();
        control.set_clutch(1.0).unwrap();
        control.start_engine().unwrap();
        control.set_gear(Gear::First).unwrap();
        control.set_throttle(0.5).unwrap();
        sim.run_ticks(10, &mut NoopObserver);

        // Ease the clutch out over two seconds.
        for step in (0..=20).rev() {
            control.set_clutch(step as f64 / 20.0).unwrap();
            sim.run_ticks(1, &mut NoopObserver);
        }
        sim.run_ticks(30, &mut NoopObserver);

        let s = sim.state();
        assert!(s.engine_on, "stalled during launch: {s:?}");
        assert!(s.speed_kmh > 10.0, "{s:?}");
    }

    #[test]
    fn random_command_streams_respect_bounds() {
        use rand::rngs::SmallRng;
        use rand::{Rng, SeedableRng};

        let mut rng = SmallRng::seed_from_u64(42);
        let mut sim = sim(0);
        let control = sim.control();
        for _ in 0..3_000 {
            match rng.gen_range(0..6) {
                0 => control.set_throttle(rng.gen_range(-0.5..1.5)).unwrap(),
                1 => control.set_clutch(rng.gen_range(-0.5..1.5)).unwrap(),
                2 => control.set_brake(rng.gen_range(0.0..1.0)).unwrap(),
                3 => control.set_gear(Gear::ALL[rng.gen_range(0..7)]).unwrap(),
                4 if rng.gen_bool(0.1) => control.toggle_engine().unwrap(),
                _ => {}
            }
            sim.advance(rng.gen_range(0.0..0.1));
            let s = sim.state();
            assert!((0.0..=7_500.0).contains(&s.rpm));
            assert!(s.speed_kmh >= 0.0);
        }
    }
}

// ── Real-time loop ────────────────────────────────────────────────────────────

#[cfg(test)]
mod realtime_tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn stops_on_shutdown() {
        let mut sim = sim(1_000_000);
        let mut obs = Recorder::default();
        sim.run_realtime(
            Duration::from_millis(20),
            &mut obs,
            tokio::time::sleep(Duration::from_secs(1)),
        )
        .await;

        let ticks = sim.clock.current_tick.0;
        assert!((45..=51).contains(&ticks), "{ticks} ticks");
        assert!(sim.clock.elapsed_secs <= 1.0 + 1e-9);
        assert!(obs.finished.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn stops_at_end_tick() {
        let mut sim = sim(30);
        sim.run_realtime(
            Duration::from_millis(16),
            &mut NoopObserver,
            std::future::pending::<()>(),
        )
        .await;
        assert_eq!(sim.clock.current_tick, Tick(30));
    }

    #[tokio::test(start_paused = true)]
    async fn commands_from_another_task_are_applied() {
        let mut sim = sim(1_000_000);
        let control = sim.control();
        let driver = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            control.start_engine().unwrap();
            control.set_throttle(1.0).unwrap();
        });

        sim.run_realtime(
            Duration::from_millis(16),
            &mut NoopObserver,
            tokio::time::sleep(Duration::from_millis(500)),
        )
        .await;
        driver.await.unwrap();

        let s = sim.state();
        assert!(s.engine_on);
        assert!(s.rpm > 800.0, "{}", s.rpm);
    }
}

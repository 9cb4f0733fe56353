//! launch — scripted drive cycle for the manual_sim drivetrain simulator.
//!
//! Starts the engine, pulls away in first, shifts to second, brakes to a
//! stop, then dumps the clutch at idle to show a stall.  Prints a gauge row
//! every half second and asks the offline tutor about the final state.
//!
//! Usage: `launch [PROFILE.json]`.  The optional profile overrides the
//! default vehicle constants; missing fields keep their defaults.

use std::time::Instant;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use ms_core::{DrivetrainConfig, Gear, Pedal, SimConfig, Tick};
use ms_sim::{Command, SimBuilder, SimObserver, Snapshot, TracingObserver};
use ms_tutor::{OfflineProvider, Topic, Tutor, TutorConfig};

// ── Constants ─────────────────────────────────────────────────────────────────

const FRAME_HZ:              f64 = 60.0;
const DRIVE_SECS:            f64 = 24.0;
const OUTPUT_INTERVAL_TICKS: u64 = 30; // two rows per simulated second

// ── Drive script ──────────────────────────────────────────────────────────────

/// `(seconds, command)` cues, applied when the clock reaches them.
fn script() -> Result<Vec<(f64, Command)>> {
    let pedal = |x: f64| -> Result<Pedal> { Ok(Pedal::new(x)?) };
    let mut cues = vec![
        (0.0, Command::SetClutch(Pedal::FLOORED)),
        (0.2, Command::StartEngine),
        (1.0, Command::SetGear(Gear::First)),
        (1.5, Command::SetThrottle(pedal(0.35)?)),
    ];
    // Ease the clutch out over two seconds.
    cues.extend(clutch_release(2.0, 2.0)?);

    cues.extend([
        (6.0, Command::SetThrottle(Pedal::RELEASED)),
        (6.0, Command::SetClutch(Pedal::FLOORED)),
        (6.4, Command::SetGear(Gear::Second)),
        (6.6, Command::SetThrottle(pedal(0.5)?)),
    ]);
    cues.extend(clutch_release(6.8, 1.0)?);

    cues.extend([
        (12.0, Command::SetThrottle(Pedal::RELEASED)),
        (12.0, Command::SetClutch(Pedal::FLOORED)),
        (12.2, Command::SetBrake(pedal(0.6)?)),
        (16.0, Command::SetGear(Gear::Neutral)),
        (16.0, Command::SetBrake(Pedal::RELEASED)),
        // Stall: first gear, no throttle, clutch dropped at idle.
        (19.0, Command::SetGear(Gear::First)),
        (20.0, Command::SetClutch(Pedal::RELEASED)),
    ]);

    cues.sort_by(|a, b| a.0.total_cmp(&b.0));
    Ok(cues)
}

/// Clutch from floored to released in ten even steps.
fn clutch_release(start: f64, secs: f64) -> Result<Vec<(f64, Command)>> {
    (0..=10)
        .map(|i| {
            let frac = f64::from(i) / 10.0;
            Ok((start + frac * secs, Command::SetClutch(Pedal::new(1.0 - frac)?)))
        })
        .collect()
}

// ── Observer ──────────────────────────────────────────────────────────────────

/// Prints a gauge row per snapshot and forwards everything to tracing.
struct GaugePrinter {
    inner:  TracingObserver,
    rows:   usize,
    stalls: usize,
}

impl SimObserver for GaugePrinter {
    fn on_snapshot(&mut self, snap: &Snapshot) {
        let s = &snap.state;
        let t = &snap.telemetry;
        println!(
            "{:>6.2} {:>6.0} {:>6.1} {:>4} {:>5.2} {:>5.2} {:>5.2} {:>8} {:>5}",
            snap.elapsed_secs,
            s.rpm,
            s.speed_kmh,
            s.gear.as_str(),
            s.clutch_pedal.value(),
            s.throttle_pedal.value(),
            s.brake_pedal.value(),
            s.status().as_str(),
            if t.slipping { "slip" } else { "" },
        );
        self.rows += 1;
        self.inner.on_snapshot(snap);
    }

    fn on_stall(&mut self, snap: &Snapshot) {
        println!("  *** stalled at {:.2} s ***", snap.elapsed_secs);
        self.stalls += 1;
        self.inner.on_stall(snap);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.inner.on_sim_end(final_tick);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    println!("=== launch — manual_sim drive cycle ===");

    // 1. Vehicle profile.
    let profile = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            let profile: DrivetrainConfig =
                serde_json::from_str(&json).with_context(|| format!("parsing {path}"))?;
            println!("Profile: {path}");
            profile
        }
        None => {
            println!("Profile: stock");
            DrivetrainConfig::default()
        }
    };

    // 2. Sim.
    let config = SimConfig {
        fixed_dt_secs:           1.0 / FRAME_HZ,
        total_ticks:             (DRIVE_SECS * FRAME_HZ) as u64,
        snapshot_interval_ticks: OUTPUT_INTERVAL_TICKS,
        ..SimConfig::default()
    };
    let mut sim = SimBuilder::new(config).drivetrain(profile).build()?;
    println!(
        "Sim: {} ticks at {FRAME_HZ} Hz, row every {OUTPUT_INTERVAL_TICKS} ticks",
        sim.config.total_ticks
    );
    println!();
    println!(
        "{:>6} {:>6} {:>6} {:>4} {:>5} {:>5} {:>5} {:>8} {:>5}",
        "t", "rpm", "km/h", "gear", "cltch", "thr", "brk", "engine", ""
    );
    println!("{}", "-".repeat(58));

    // 3. Drive.
    let mut cues = script()?.into_iter().peekable();
    let mut obs = GaugePrinter { inner: TracingObserver, rows: 0, stalls: 0 };
    let t0 = Instant::now();
    while sim.clock.current_tick < sim.config.end_tick() {
        while let Some((_, command)) = cues.next_if(|(at, _)| *at <= sim.clock.elapsed_secs) {
            sim.apply(command);
        }
        sim.run_ticks(1, &mut obs);
    }
    obs.on_sim_end(sim.clock.current_tick);
    let elapsed = t0.elapsed();

    // 4. Summary.
    println!();
    println!("Simulated {} in {:.3} ms", sim.clock, elapsed.as_secs_f64() * 1e3);
    println!("  rows   : {}", obs.rows);
    println!("  stalls : {}", obs.stalls);
    println!();
    println!("Final snapshot:");
    println!("{}", serde_json::to_string_pretty(&sim.snapshot())?);

    // 5. Ask the tutor about where the drive ended.
    let mut tutor = Tutor::new(OfflineProvider, TutorConfig::default())?;
    println!();
    for topic in Topic::PRESETS {
        let key = topic.key().to_owned();
        tutor.ask(topic, sim.state());
        if let Some(answer) = tutor.next_answer().await {
            println!("[{key}] {}", answer.text);
        }
    }

    Ok(())
}

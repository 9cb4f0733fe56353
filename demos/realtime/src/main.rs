//! realtime — wall-clock driven manual_sim session.
//!
//! The simulation ticks on a 60 Hz Tokio interval while a separate task
//! plays the driver through a `ControlHandle` and another watches the
//! published snapshots.  Stops after `RUN_SECS` or on Ctrl-C.
//!
//! `RUST_LOG=debug` shows gear changes and clamped frame deltas.

use std::time::Duration;

use anyhow::Result;
use tokio::time::sleep;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ms_core::SimConfig;
use ms_sim::{ControlHandle, SimBuilder, SimResult, TracingObserver};
use ms_tutor::{OfflineProvider, Topic, Tutor, TutorConfig};

// ── Constants ─────────────────────────────────────────────────────────────────

const FRAME_PERIOD:   Duration = Duration::from_micros(16_667);
const RUN_SECS:       u64      = 15;
const MONITOR_PERIOD: Duration = Duration::from_millis(500);

// ── Driver task ───────────────────────────────────────────────────────────────

async fn drive(control: ControlHandle) -> SimResult<()> {
    control.set_clutch(1.0)?;
    control.start_engine()?;
    sleep(Duration::from_millis(500)).await;

    control.shift("1")?;
    control.set_throttle(0.35)?;
    release_clutch(&control, Duration::from_secs(2)).await?;
    sleep(Duration::from_secs(3)).await;

    control.set_throttle(0.0)?;
    control.set_clutch(1.0)?;
    sleep(Duration::from_millis(300)).await;
    control.shift("2")?;
    control.set_throttle(0.5)?;
    release_clutch(&control, Duration::from_secs(1)).await?;
    sleep(Duration::from_secs(4)).await;

    control.set_throttle(0.0)?;
    control.set_clutch(1.0)?;
    control.set_brake(0.6)?;
    sleep(Duration::from_secs(3)).await;
    control.shift("N")?;
    control.set_brake(0.0)?;
    control.stop_engine()
}

async fn release_clutch(control: &ControlHandle, over: Duration) -> SimResult<()> {
    const STEPS: u32 = 20;
    for step in (0..=STEPS).rev() {
        control.set_clutch(f64::from(step) / f64::from(STEPS))?;
        sleep(over / STEPS).await;
    }
    Ok(())
}

// ── main ──────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = SimConfig {
        total_ticks:             RUN_SECS * 60,
        snapshot_interval_ticks: 120,
        ..SimConfig::default()
    };
    let mut sim = SimBuilder::new(config).build()?;

    // Gauges, fed from the watch channel.
    let mut gauges = sim.subscribe();
    let monitor = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(MONITOR_PERIOD);
        loop {
            ticker.tick().await;
            if gauges.has_changed().is_err() {
                break;
            }
            let snap = *gauges.borrow_and_update();
            println!(
                "{:>6.2}s  {:>5.0} rpm  {:>5.1} km/h  gear {:<2} clutch {:>4.2}  tach {:>6.1}°{}",
                snap.elapsed_secs,
                snap.state.rpm,
                snap.state.speed_kmh,
                snap.state.gear.as_str(),
                snap.state.clutch_pedal.value(),
                snap.telemetry.tachometer_deg,
                if snap.telemetry.slipping { "  (slipping)" } else { "" },
            );
        }
    });

    let driver = tokio::spawn(drive(sim.control()));

    let shutdown = async {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => info!("interrupted"),
            () = sleep(Duration::from_secs(RUN_SECS)) => {}
        }
    };
    sim.run_realtime(FRAME_PERIOD, &mut TracingObserver, shutdown).await;

    driver.abort();
    monitor.abort();
    info!(clock = %sim.clock, status = %sim.state().status(), "session over");

    let mut tutor = Tutor::new(OfflineProvider, TutorConfig::default())?;
    tutor.ask(Topic::ClutchState, sim.state());
    if let Some(answer) = tutor.next_answer().await {
        println!("\ntutor: {}", answer.text);
    }
    Ok(())
}

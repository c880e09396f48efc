mod headless;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tempo_engine::logging::{init_logging, LoggingConfig};
use tempo_engine::{AnimationHost, FrameStatus, SchedulerConfig};

use headless::HeadlessSurface;

/// Animation time after which the demo stops, in milliseconds.
const RUN_FOR_MS: f64 = 5_000.0;

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let event_driven = std::env::args().skip(1).any(|a| a == "--event-driven");

    println!();
    println!("  ╔════════════════════════════════════════╗");
    println!("  ║            TEMPO STUDIO v0.1           ║");
    println!("  ║   {:<36} ║", if event_driven { "event-driven frames" } else { "constant-rate frames @ 30 fps" });
    println!("  ╚════════════════════════════════════════╝");
    println!();

    let config = if event_driven {
        SchedulerConfig::default().event_driven().with_max_fps(60.0)
    } else {
        SchedulerConfig::default().with_fps(30.0)
    };
    let surface = HeadlessSurface::new(
        Duration::from_millis(250),
        Duration::from_millis(120),
        "the quick brown fox jumps over the lazy dog ",
    );
    let mut host = AnimationHost::with_config("studio", config, surface)?;

    let keys = Arc::new(AtomicUsize::new(0));
    {
        let keys = Arc::clone(&keys);
        host.set_key_handler(move |ch| {
            keys.fetch_add(1, Ordering::Relaxed);
            log::debug!("key '{ch}'");
        })?;
    }
    let clicks = Arc::new(AtomicUsize::new(0));
    {
        let clicks = Arc::clone(&clicks);
        host.set_pointer_handler(move |click| {
            clicks.fetch_add(1, Ordering::Relaxed);
            log::debug!("click at column {}", click.x);
        })?;
    }

    host.start()?;
    let frames = if event_driven {
        run_event_driven(&mut host)?
    } else {
        run_constant_rate(&mut host)?
    };
    host.stop()?;

    let stats = host.scheduler().stats();
    println!();
    println!("  frames shown     {frames}");
    println!("  frames dropped   {}", stats.frames_dropped);
    println!("  clock resets     {}", stats.clock_resets);
    println!("  keys handled     {}", keys.load(Ordering::Relaxed));
    println!("  clicks handled   {}", clicks.load(Ordering::Relaxed));
    println!();
    Ok(())
}

/// Steady 30 fps, with a deliberately slow frame now and then so the drop
/// and reset policies show up in the log.
fn run_constant_rate(host: &mut AnimationHost<HeadlessSurface>) -> anyhow::Result<u64> {
    let mut frames = 0;
    while host.wait_for_next_frame()? == FrameStatus::Ready {
        frames += 1;
        let t = host.time_since_start();
        log::trace!("frame at {t:.0} ms");

        match frames % 60 {
            20 => thread::sleep(Duration::from_millis(80)),  // a couple of drops
            40 => thread::sleep(Duration::from_millis(400)), // a clock reset
            _ => {}
        }
        if frames % 90 == 0 {
            // Pretend to block on something, then re-sync the clock.
            thread::sleep(Duration::from_millis(300));
            if host.pause(0)? == FrameStatus::Stopped {
                break;
            }
        }
        if t >= RUN_FOR_MS {
            break;
        }
    }
    Ok(frames)
}

/// Frames only when something asks for one: a heartbeat every half second.
fn run_event_driven(host: &mut AnimationHost<HeadlessSurface>) -> anyhow::Result<u64> {
    let mut frames = 0;
    host.show_next_frame_by(0.0)?;
    while host.wait_for_next_frame()? == FrameStatus::Ready {
        frames += 1;
        let t = host.time_since_start();
        log::info!("frame {frames} at {t:.0} ms");
        if t >= RUN_FOR_MS {
            break;
        }
        host.show_next_frame_by(t + 500.0)?;
    }
    Ok(frames)
}

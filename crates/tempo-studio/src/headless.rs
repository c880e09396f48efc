use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use tempo_engine::{InputEvent, InputSource, PointerClick, Surface, SurfaceLink};

/// A surface with nothing to show.
///
/// "Opens" after a delay on a background thread, like a real window would,
/// and then types the letters of a script at a steady pace, with a click
/// after every word.
pub struct HeadlessSurface {
    open_delay: Duration,
    key_interval: Duration,
    script: &'static str,
    closing: Arc<AtomicBool>,
    worker: Option<thread::JoinHandle<()>>,
}

impl HeadlessSurface {
    pub fn new(open_delay: Duration, key_interval: Duration, script: &'static str) -> Self {
        Self {
            open_delay,
            key_interval,
            script,
            closing: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }
}

impl InputSource for HeadlessSurface {
    // Input arrives on the worker thread and goes through the link.
    fn poll_for_pending_input(&mut self, _want_pointer_events: bool) -> bool {
        false
    }
}

impl Surface for HeadlessSurface {
    fn start(&mut self, link: SurfaceLink) -> anyhow::Result<()> {
        let open_delay = self.open_delay;
        let key_interval = self.key_interval;
        let script = self.script;
        let closing = Arc::clone(&self.closing);

        let worker = thread::Builder::new()
            .name("headless-surface".into())
            .spawn(move || {
                thread::sleep(open_delay);
                log::info!("headless surface open");
                link.signal_opened();

                let mut column = 0;
                for ch in script.chars().cycle() {
                    thread::sleep(key_interval);
                    if closing.load(Ordering::Acquire) || !link.is_running() {
                        break;
                    }
                    if ch == ' ' {
                        if link.wants_pointer() {
                            link.dispatch(InputEvent::PointerClicked(PointerClick::new(column, 0)));
                        }
                        column = 0;
                    } else {
                        link.dispatch(InputEvent::KeyTyped(ch));
                        column += 1;
                    }
                }
            })
            .context("failed to spawn surface thread")?;

        self.worker = Some(worker);
        Ok(())
    }

    fn close(&mut self) {
        self.closing.store(true, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("headless surface thread panicked");
            }
        }
        log::info!("headless surface closed");
    }
}

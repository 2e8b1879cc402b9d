//! Quiet-period trigger: fires once after pokes stop arriving for a full window.

use std::thread;
use std::time::Duration;

use crossbeam_channel::{RecvTimeoutError, Sender};

pub struct Debouncer {
    tx: Sender<()>,
}

impl Debouncer {
    /// Spawn the timer thread. It exits when the debouncer is dropped.
    pub fn spawn<F>(name: &str, window: Duration, mut fire: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let (tx, rx) = crossbeam_channel::unbounded::<()>();
        let spawned = thread::Builder::new().name(name.into()).spawn(move || {
            while rx.recv().is_ok() {
                loop {
                    match rx.recv_timeout(window) {
                        Ok(()) => continue,
                        Err(RecvTimeoutError::Timeout) => {
                            fire();
                            break;
                        }
                        Err(RecvTimeoutError::Disconnected) => return,
                    }
                }
            }
        });
        if let Err(e) = spawned {
            log::error!(target: "sync", "failed to spawn {} thread: {}", name, e);
        }
        Self { tx }
    }

    /// Start or restart the window.
    pub fn poke(&self) {
        let _ = self.tx.send(());
    }
}

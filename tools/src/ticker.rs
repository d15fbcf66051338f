//! Cancellable repeating timers for the live loop.
//!
//! A `Ticker` owns a thread that sends `message` on `tx` every `interval`.
//! It never touches game state: the receiving loop is the single writer,
//! so ticks and autosaves are serialized onto one timeline. Dropping the
//! handle (or calling `cancel`) stops the thread and joins it.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub struct Ticker {
    name:   &'static str,
    cancel: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn spawn<T>(name: &'static str, interval: Duration, tx: Sender<T>, message: T) -> Self
    where
        T: Clone + Send + 'static,
    {
        let (cancel_tx, cancel_rx) = mpsc::channel::<()>();
        let handle = thread::spawn(move || loop {
            match cancel_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    if tx.send(message.clone()).is_err() {
                        break; // receiver gone
                    }
                }
                // Explicit cancel or handle dropped.
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });
        log::debug!("ticker '{name}' started every {interval:?}");
        Self { name, cancel: Some(cancel_tx), handle: Some(handle) }
    }

    /// Stop the timer and wait for its thread to exit.
    pub fn cancel(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("ticker '{}' thread panicked", self.name);
            }
            log::debug!("ticker '{}' stopped", self.name);
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}

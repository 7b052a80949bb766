//! Timer-to-task wake signal
//!
//! Single slot, non-blocking on the notifying side. Notifying twice before the
//! task gets round to waiting leaves one pending wake, not two: a busy task
//! skips periods instead of working through a backlog.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

pub struct WakeSignal {
    signal: Signal<CriticalSectionRawMutex, ()>,
}

impl WakeSignal {
    pub const fn new() -> Self {
        Self {
            signal: Signal::new(),
        }
    }

    /// Marks a wake as pending. Safe to call from interrupt context.
    pub fn notify(&self) {
        self.signal.signal(());
    }

    /// Waits for a pending wake and consumes it
    pub async fn wait(&self) {
        self.signal.wait().await
    }

    pub fn is_pending(&self) -> bool {
        self.signal.signaled()
    }
}

impl Default for WakeSignal {
    fn default() -> Self {
        Self::new()
    }
}

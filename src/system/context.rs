//! Shared runtime context
//!
//! Everything the tasks share lives in one [`SystemContext`]. The firmware
//! keeps a single `static` instance and hands tasks a `&'static` to it; the
//! timer tasks only ever touch the wake signals.

use crate::system::alert::AlertBoard;
use crate::system::command::CommandChannel;
use crate::system::wake::WakeSignal;

pub struct SystemContext {
    /// Distance sampling period elapsed
    pub distance_wake: WakeSignal,
    /// Accelerometer sampling period elapsed
    pub acceleration_wake: WakeSignal,
    /// Plotter stream period elapsed
    pub plotter_wake: WakeSignal,
    /// Waveform playback step elapsed
    pub waveform_wake: WakeSignal,
    /// Pending alerts of all sampling tasks
    pub alerts: AlertBoard,
    /// Switch and key commands for the distance task
    pub commands: CommandChannel,
}

impl SystemContext {
    pub const fn new() -> Self {
        Self {
            distance_wake: WakeSignal::new(),
            acceleration_wake: WakeSignal::new(),
            plotter_wake: WakeSignal::new(),
            waveform_wake: WakeSignal::new(),
            alerts: AlertBoard::new(),
            commands: CommandChannel::new(),
        }
    }
}

impl Default for SystemContext {
    fn default() -> Self {
        Self::new()
    }
}

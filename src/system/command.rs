//! Operator commands
//!
//! Switch presses and UART keys are turned into [`Command`]s and posted to the
//! distance sampling task, which applies them at the start of its next cycle.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

/// Requests from the input tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Toggle hold: keep waking, stop reading the sensor
    ToggleHold,
    /// Toggle the LEDs, buzzer and readout on or off
    ToggleOutput,
}

impl Command {
    /// Maps a key received on the serial port; `O` toggles output, `H` hold
    pub fn from_key(key: u8) -> Option<Command> {
        match key.to_ascii_uppercase() {
            b'O' => Some(Command::ToggleOutput),
            b'H' => Some(Command::ToggleHold),
            _ => None,
        }
    }
}

/// Bounded queue from the input tasks to the sampling task
pub type CommandChannel = Channel<CriticalSectionRawMutex, Command, 4>;

//! Serial output
//!
//! Alerts, readouts and plotter lines all leave the board as text. Sends are
//! fire-and-forget: callers log a failed write and move on.

use core::fmt;

/// Failure reported by a serial transmitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerialError {
    /// The transmitter rejected or aborted the write
    Write,
    /// The line did not fit the formatting buffer
    Overflow,
}

impl fmt::Display for SerialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerialError::Write => f.write_str("serial write failed"),
            SerialError::Overflow => f.write_str("serial line too long"),
        }
    }
}

/// Text transmitter
#[allow(async_fn_in_trait)]
pub trait SerialSink {
    /// Sends one line of text; the implementation adds the line terminator
    async fn send_str(&mut self, text: &str) -> Result<(), SerialError>;
}

impl<S: SerialSink> SerialSink for &mut S {
    async fn send_str(&mut self, text: &str) -> Result<(), SerialError> {
        (**self).send_str(text).await
    }
}

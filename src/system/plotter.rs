//! Serial plotter stream and readout lines
//!
//! Plotter lines use the `>label: value` form understood by serial plotter
//! extensions; the transmitter adds the `\r\n`. The readout line is what the
//! distance task prints in place of a segment display, e.g. `612 cm`.

use core::fmt::Write;

use heapless::String;

use crate::system::sample::{SensorError, Unit};
use crate::system::sampling::SensorReader;
use crate::system::serial::{SerialError, SerialSink};
use crate::system::wake::WakeSignal;

/// Longest line either formatter produces
pub const LINE_CAPACITY: usize = 32;

pub type Line = String<LINE_CAPACITY>;

/// `>label: value`, the value rounded to a whole number
pub fn plot_line(label: &str, value: f32) -> Result<Line, SerialError> {
    let mut line = Line::new();
    write!(line, ">{}: {}", label, whole(value)).map_err(|_| SerialError::Overflow)?;
    Ok(line)
}

/// `value unit`, the value rounded to a whole number
pub fn readout_line(value: f32, unit: Unit) -> Result<Line, SerialError> {
    let mut line = Line::new();
    write!(line, "{} {}", whole(value), unit.suffix()).map_err(|_| SerialError::Overflow)?;
    Ok(line)
}

fn whole(value: f32) -> i32 {
    // `as` saturates and maps NaN to 0
    libm::roundf(value) as i32
}

/// Streams one reading per wake to the serial plotter
pub struct PlotterTask<'a, R, S> {
    label: &'static str,
    wake: &'a WakeSignal,
    reader: R,
    serial: S,
}

impl<'a, R: SensorReader, S: SerialSink> PlotterTask<'a, R, S> {
    pub fn new(label: &'static str, wake: &'a WakeSignal, reader: R, serial: S) -> Self {
        Self {
            label,
            wake,
            reader,
            serial,
        }
    }

    pub async fn run(&mut self) -> ! {
        info!("plotter streaming {}", self.label);
        loop {
            if let Err(e) = self.run_cycle().await {
                debug!("plotter: {:?}", e);
            }
        }
    }

    /// Waits for one wake, then reads and sends one line
    pub async fn run_cycle(&mut self) -> Result<f32, PlotError> {
        self.wake.wait().await;
        let value = self.reader.read().await.map_err(PlotError::Sensor)?;
        let line = plot_line(self.label, value).map_err(PlotError::Serial)?;
        self.serial.send_str(&line).await.map_err(PlotError::Serial)?;
        Ok(value)
    }

    pub fn serial(&self) -> &S {
        &self.serial
    }
}

/// Why a plotter cycle sent nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlotError {
    Sensor(SensorError),
    Serial(SerialError),
}

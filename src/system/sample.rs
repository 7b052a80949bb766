//! Sensor samples
//!
//! A [`Sample`] is one reading taken by a sampling task at a given period
//! tick. Samples are plain values; a task keeps at most the last one (for the
//! hold policy) plus an optional running maximum.

use core::fmt;

/// Unit of a sample value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Unit {
    /// Distance in centimetres (HC-SR04)
    Centimeters,
    /// Acceleration in multiples of standard gravity
    Gravity,
}

impl Unit {
    /// Short suffix used on serial readouts
    pub const fn suffix(self) -> &'static str {
        match self {
            Unit::Centimeters => "cm",
            Unit::Gravity => "G",
        }
    }
}

/// One measurement, immutable once produced
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    value: f32,
    unit: Unit,
    tick: u32,
}

impl Sample {
    pub const fn new(value: f32, unit: Unit, tick: u32) -> Self {
        Self { value, unit, tick }
    }

    pub const fn value(&self) -> f32 {
        self.value
    }

    pub const fn unit(&self) -> Unit {
        self.unit
    }

    /// Period tick at which the sample was taken
    pub const fn tick(&self) -> u32 {
        self.tick
    }
}

/// Reasons a sensor read produced no usable value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// No echo (or no conversion) within the allowed window
    Timeout,
    /// The sensor answered, but outside its physical range
    OutOfRange,
    /// The analog converter reported a failure
    Adc,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorError::Timeout => f.write_str("sensor timed out"),
            SensorError::OutOfRange => f.write_str("sensor reading out of range"),
            SensorError::Adc => f.write_str("analog conversion failed"),
        }
    }
}

/// Running maximum over the samples seen so far
#[derive(Debug, Clone, Copy, Default)]
pub struct PeakTracker {
    peak: Option<Sample>,
}

impl PeakTracker {
    pub const fn new() -> Self {
        Self { peak: None }
    }

    /// Records a sample and returns `true` if it became the new peak.
    ///
    /// NaN never replaces an existing peak.
    pub fn update(&mut self, sample: Sample) -> bool {
        match self.peak {
            Some(peak) if !(sample.value() > peak.value()) => false,
            _ if sample.value().is_nan() => false,
            _ => {
                self.peak = Some(sample);
                true
            }
        }
    }

    pub const fn peak(&self) -> Option<Sample> {
        self.peak
    }

    pub fn reset(&mut self) {
        self.peak = None;
    }
}

//! Helmet accelerometer
//!
//! The analog accelerometer puts one voltage per axis on three ADC channels.
//! The fall detector does not resolve a vector; it sums the three voltages
//! and scales the sum by the sensitivity, which gives a G proxy that is
//! compared against the fall band.

use crate::system::config::FallConfig;
use crate::system::sample::SensorError;
use crate::system::sampling::SensorReader;

/// Accelerometer axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
}

/// Per-axis voltage source
#[allow(async_fn_in_trait)]
pub trait AxisInput {
    /// Voltage currently on `axis`, in volts
    async fn read_volts(&mut self, axis: Axis) -> Result<f32, SensorError>;
}

/// [`SensorReader`] producing the summed-axis acceleration proxy in G
pub struct FallSensor<I> {
    input: I,
    config: FallConfig,
}

impl<I: AxisInput> FallSensor<I> {
    pub fn new(input: I, config: FallConfig) -> Self {
        Self { input, config }
    }

    pub fn input(&self) -> &I {
        &self.input
    }
}

impl<I: AxisInput> SensorReader for FallSensor<I> {
    async fn read(&mut self) -> Result<f32, SensorError> {
        let mut volts_sum = 0.0;
        for axis in Axis::ALL {
            volts_sum += self.input.read_volts(axis).await?;
        }
        Ok(self.config.to_gravity(volts_sum))
    }
}

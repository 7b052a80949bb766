//! Helmet fall detection
//!
//! Samples the three accelerometer axes every 10ms through the shared ADC,
//! sums them into a G proxy and raises one fall alert per crossing of the
//! fall threshold. There are no local outputs; the alert goes out on the
//! serial port.
//!
//! # ADC Management
//! - Uses the mutex-protected global ADC instance
//! - The lock is held for one conversion at a time, so the plotter stream
//!   can interleave its own conversions

use embassy_rp::adc::Channel;
use embassy_rp::gpio::Pull;
use rider_alert::system::accelerometer::{Axis, AxisInput, FallSensor};
use rider_alert::system::classifier::Classifier;
use rider_alert::system::config::{adc_to_volts, FallConfig};
use rider_alert::system::context::SystemContext;
use rider_alert::system::sample::{SensorError, Unit};
use rider_alert::system::sampling::{HoldPolicy, SamplingTask, TaskConfig};

use crate::task::resources::{get_adc, AccelerometerResources};
use crate::task::serial::SharedSerial;

const TASK: TaskConfig = TaskConfig {
    name: "fall",
    unit: Unit::Gravity,
    hold_policy: HoldPolicy::Freeze,
    readout: false,
};

/// The accelerometer's three analog outputs
pub struct AdcAxes {
    x: Channel<'static>,
    y: Channel<'static>,
    z: Channel<'static>,
}

impl AxisInput for AdcAxes {
    async fn read_volts(&mut self, axis: Axis) -> Result<f32, SensorError> {
        let channel = match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        };
        let mut adc_guard = get_adc().lock().await;
        let adc = adc_guard.as_mut().ok_or(SensorError::Adc)?;
        let raw = adc.read(channel).await.map_err(|_| SensorError::Adc)?;
        Ok(adc_to_volts(raw))
    }
}

/// Fall detection task, woken by its periodic timer
#[embassy_executor::task]
pub async fn fall_sampling(
    r: AccelerometerResources,
    classifier: Classifier<2>,
    fall_config: FallConfig,
    context: &'static SystemContext,
) {
    let axes = AdcAxes {
        x: Channel::new_pin(r.x_pin, Pull::None),
        y: Channel::new_pin(r.y_pin, Pull::None),
        z: Channel::new_pin(r.z_pin, Pull::None),
    };

    let mut task = SamplingTask::new(
        TASK,
        classifier,
        &context.acceleration_wake,
        &context.alerts,
        FallSensor::new(axes, fall_config),
        (),
        SharedSerial,
    );

    task.run().await
}

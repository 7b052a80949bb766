//! Vehicle distance sampling
//!
//! Measures the distance to vehicles behind the bicycle with the HC-SR04
//! ultrasonic sensor and shows the distance band on the LEDs and buzzer.
//!
//! # Sensor Operation
//! - Uses the async HC-SR04 driver, distance in centimeters
//! - Assumes a fixed ambient temperature of 21.5°C
//! - Echoes beyond the rated range are clamped to it, so an empty road reads as clear
//! - Echoes shorter than the minimum range are rejected
//!
//! # Signal Processing
//! - Moving median over 3 readings filters single spurious echoes
//!
//! # Bands
//! - danger (< 300cm): all LEDs, buzzer, one danger alert on entry
//! - caution (300cm .. 500cm): LEDs 1 and 2, buzzer, one caution alert on entry
//! - clear (>= 500cm): LED 1 only
//!
//! The readout value is printed on the serial port as `<cm> cm`.

use defmt::warn;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use hcsr04_async::{Config, DistanceUnit, Hcsr04, TemperatureUnit};
use moving_median::MovingMedian;
use rider_alert::system::classifier::Classifier;
use rider_alert::system::context::SystemContext;
use rider_alert::system::output::{Actuators, Led, OutputState};
use rider_alert::system::plotter::readout_line;
use rider_alert::system::sample::{SensorError, Unit};
use rider_alert::system::sampling::{HoldPolicy, SamplingTask, SensorReader, TaskConfig};
use rider_alert::system::serial::SerialSink;

use crate::task::resources::{DistanceSensorResources, IndicatorResources};
use crate::task::serial::SharedSerial;

/// Size of median filter window (3 samples balances noise reduction vs. latency)
const MEDIAN_WINDOW_SIZE: usize = 3;

/// Fixed ambient temperature for the speed of sound (°C)
const TEMPERATURE: f64 = 21.5;

/// Readings are clamped to this (cm)
const MAX_RANGE_CM: f64 = 600.0;

/// Below this the echo is crosstalk, not an obstacle (cm)
const MIN_RANGE_CM: f64 = 2.0;

const TASK: TaskConfig = TaskConfig {
    name: "distance",
    unit: Unit::Centimeters,
    hold_policy: HoldPolicy::ReuseLast,
    readout: true,
};

/// HC-SR04 with a median filter over its accepted readings
pub struct DistanceSensor {
    sensor: Hcsr04<Output<'static>, Input<'static>>,
    median_filter: MovingMedian<f64, MEDIAN_WINDOW_SIZE>,
}

impl DistanceSensor {
    pub fn new(trigger: Output<'static>, echo: Input<'static>) -> Self {
        let config = Config {
            distance_unit: DistanceUnit::Centimeters,
            temperature_unit: TemperatureUnit::Celsius,
        };
        Self {
            sensor: Hcsr04::new(trigger, echo, config),
            median_filter: MovingMedian::new(),
        }
    }
}

impl SensorReader for DistanceSensor {
    async fn read(&mut self) -> Result<f32, SensorError> {
        // The driver only fails when the echo never starts or never ends.
        let distance_cm = self
            .sensor
            .measure(TEMPERATURE)
            .await
            .map_err(|_| SensorError::Timeout)?;
        if distance_cm < MIN_RANGE_CM {
            return Err(SensorError::OutOfRange);
        }

        self.median_filter.add_value(distance_cm.min(MAX_RANGE_CM));
        Ok(self.median_filter.median() as f32)
    }
}

/// LEDs, buzzer and the serial distance readout
pub struct Indicators {
    leds: [Output<'static>; 3],
    buzzer: Output<'static>,
    serial: SharedSerial,
}

impl Actuators for Indicators {
    async fn apply(&mut self, state: &OutputState) {
        for (output, led) in self.leds.iter_mut().zip(Led::ALL) {
            output.set_level(Level::from(state.leds.is_on(led)));
        }
        self.buzzer.set_level(Level::from(state.buzzer));

        if let Some(value) = state.readout {
            match readout_line(value, Unit::Centimeters) {
                Ok(line) => {
                    if let Err(e) = self.serial.send_str(&line).await {
                        warn!("Readout dropped: {}", e);
                    }
                }
                Err(e) => warn!("Readout dropped: {}", e),
            }
        }
    }
}

/// Distance sampling task, woken by its periodic timer
#[embassy_executor::task]
pub async fn distance_sampling(
    r: DistanceSensorResources,
    i: IndicatorResources,
    classifier: Classifier<3>,
    context: &'static SystemContext,
) {
    let trigger = Output::new(r.trigger_pin, Level::Low);
    let echo = Input::new(r.echo_pin, Pull::None);

    let indicators = Indicators {
        leds: [
            Output::new(i.led_1, Level::Low),
            Output::new(i.led_2, Level::Low),
            Output::new(i.led_3, Level::Low),
        ],
        buzzer: Output::new(i.buzzer, Level::Low),
        serial: SharedSerial,
    };

    let mut task = SamplingTask::new(
        TASK,
        classifier,
        &context.distance_wake,
        &context.alerts,
        DistanceSensor::new(trigger, echo),
        indicators,
        SharedSerial,
    )
    .with_commands(&context.commands);

    task.run().await
}

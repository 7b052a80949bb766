//! Rider alert firmware entry point
//!
//! Validates the band configuration, brings up the shared peripherals and
//! spawns the timer, sampling, input and signal lab tasks.

#![no_std]
#![no_main]

use crate::task::{
    distance_sampling::distance_sampling,
    fall_sampling::fall_sampling,
    periodic_wake::periodic_wake,
    resources::{self, AssignedResources},
    serial::{self, serial_input},
    signal_lab::{plotter_stream, waveform_output},
    switch_input::{self, switch_input},
};
use defmt::info;
use embassy_executor::Spawner;
use embassy_rp::block::ImageDef;
use embassy_rp::config::Config;
use embassy_time::Duration;
use rider_alert::system::classifier::Classifier;
use rider_alert::system::config::{self, FallConfig};
use rider_alert::system::context::SystemContext;
use {defmt_rtt as _, panic_probe as _};

/// Firmware image type for bootloader
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

/// Task implementations
mod task;

/// Wake signals, alert flags and the command queue shared by all tasks
static CONTEXT: SystemContext = SystemContext::new();

/// Firmware entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Config::default());
    info!("Rider alert starting");

    // A bad threshold table stops the firmware here, before anything runs.
    let distance_classifier = Classifier::new(config::distance_bands().unwrap());
    let fall_classifier = Classifier::new(config::fall_bands(config::FALL_THRESHOLD_G).unwrap());
    let fall_config = FallConfig::new(config::ACCELEROMETER_SENSITIVITY).unwrap();

    // Shared peripherals must exist before any task that uses them is spawned.
    resources::init_adc(p.ADC);
    let r = split_resources!(p);
    let serial_rx = serial::init(r.serial);

    // Timer sources
    for (wake, period_ms) in [
        (&CONTEXT.distance_wake, config::DISTANCE_PERIOD_MS),
        (&CONTEXT.acceleration_wake, config::ACCELERATION_PERIOD_MS),
        (&CONTEXT.plotter_wake, config::PLOTTER_PERIOD_MS),
        (&CONTEXT.waveform_wake, config::WAVEFORM_PERIOD_MS),
    ] {
        spawner.spawn(periodic_wake(wake, Duration::from_millis(period_ms))).unwrap();
    }

    // Sampling tasks
    spawner
        .spawn(distance_sampling(r.distance_sensor, r.indicators, distance_classifier, &CONTEXT))
        .unwrap();
    spawner
        .spawn(fall_sampling(r.accelerometer, fall_classifier, fall_config, &CONTEXT))
        .unwrap();

    // Inputs
    spawner.spawn(serial_input(serial_rx, &CONTEXT)).unwrap();
    for (button, command) in switch_input::inputs(r.switches) {
        spawner.spawn(switch_input(button, command, &CONTEXT)).unwrap();
    }

    // Signal lab
    spawner.spawn(plotter_stream(r.plotter, &CONTEXT)).unwrap();
    spawner.spawn(waveform_output(r.waveform, &CONTEXT)).unwrap();
}

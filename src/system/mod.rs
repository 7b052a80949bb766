//! Sampling, classification and alerting
pub mod accelerometer;
pub mod alert;
pub mod band;
pub mod classifier;
pub mod command;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod output;
pub mod plotter;
pub mod sample;
pub mod sampling;
pub mod serial;
pub mod wake;
pub mod waveform;

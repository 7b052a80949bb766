//! Cyclist hazard monitor core
//!
//! Hardware-independent part of the firmware: sample classification into
//! bands, one-shot alert dispatch and the periodic sampling task that ties
//! them together. Sensors, LEDs and the serial port are reached through the
//! collaborator traits in [`system::sampling`], [`system::output`] and
//! [`system::serial`]; the firmware binary provides the RP2350 implementations.

#![cfg_attr(not(test), no_std)]

// must stay first so the logging macros are visible to every module below
mod fmt;

/// Sampling, classification and alerting
pub mod system;

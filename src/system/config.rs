//! Firmware configuration
//!
//! Periods, thresholds and converter constants. Band tables are built here
//! and validated once at start-up; a table that fails validation stops the
//! firmware before any task is spawned.

use crate::system::alert::AlertKind;
use crate::system::band::{Band, BandTable, ConfigError};
use crate::system::output::{LedPattern, OutputState};

/// Distance sampling period (ms)
pub const DISTANCE_PERIOD_MS: u64 = 500;

/// Accelerometer sampling period (ms)
pub const ACCELERATION_PERIOD_MS: u64 = 10;

/// Plotter stream period (ms)
pub const PLOTTER_PERIOD_MS: u64 = 10;

/// Waveform playback step (ms)
pub const WAVEFORM_PERIOD_MS: u64 = 20;

/// Below this a vehicle is in the danger band (cm)
pub const DANGER_DISTANCE_CM: f32 = 300.0;

/// Below this a vehicle is in the caution band (cm)
pub const CAUTION_DISTANCE_CM: f32 = 500.0;

/// Acceleration treated as a fall (G)
pub const FALL_THRESHOLD_G: f32 = 4.0;

/// Accelerometer output per G (V/G)
pub const ACCELEROMETER_SENSITIVITY: f32 = 0.3;

/// ADC reference voltage (V)
pub const ADC_REF_VOLTAGE: f32 = 3.3;

/// ADC resolution (12-bit)
pub const ADC_RANGE: f32 = 4096.0;

/// Serial baud rate
pub const UART_BAUD: u32 = 115_200;

/// Label used for the plotter stream
pub const PLOTTER_LABEL: &str = "ECG";

/// Vehicle distance bands
///
/// | band    | range (cm)  | LEDs    | buzzer | alert   |
/// |---------|-------------|---------|--------|---------|
/// | danger  | < 300       | 1, 2, 3 | on     | danger  |
/// | caution | 300 .. 500  | 1, 2    | on     | caution |
/// | clear   | >= 500      | 1       | off    | -       |
pub fn distance_bands() -> Result<BandTable<3>, ConfigError> {
    BandTable::new([
        Band::new("danger", 0.0, OutputState::new(LedPattern::ALL, true)).alerting(AlertKind::Danger),
        Band::new("caution", DANGER_DISTANCE_CM, OutputState::new(LedPattern::bar(2), true))
            .alerting(AlertKind::Caution),
        Band::new("clear", CAUTION_DISTANCE_CM, OutputState::new(LedPattern::bar(1), false)),
    ])
}

/// Fall detection bands: anything at or above the threshold is a fall
pub fn fall_bands(threshold_g: f32) -> Result<BandTable<2>, ConfigError> {
    BandTable::new([
        Band::new("nominal", 0.0, OutputState::OFF),
        Band::new("fall", threshold_g, OutputState::OFF).alerting(AlertKind::Fall),
    ])
}

/// Converts the summed accelerometer channel voltages into G
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FallConfig {
    sensitivity: f32,
}

impl FallConfig {
    /// `sensitivity` in volts per G; must be finite and positive
    pub fn new(sensitivity: f32) -> Result<Self, ConfigError> {
        if !(sensitivity.is_finite() && sensitivity > 0.0) {
            return Err(ConfigError::NonPositiveSensitivity);
        }
        Ok(Self { sensitivity })
    }

    /// Acceleration proxy: `volts_sum / sensitivity`
    pub fn to_gravity(&self, volts_sum: f32) -> f32 {
        volts_sum / self.sensitivity
    }

    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }
}

/// Raw 12-bit ADC count to volts
pub fn adc_to_volts(raw: u16) -> f32 {
    f32::from(raw) * ADC_REF_VOLTAGE / ADC_RANGE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tables_validate() {
        assert!(distance_bands().is_ok());
        assert!(fall_bands(FALL_THRESHOLD_G).is_ok());
    }

    #[test]
    fn fall_threshold_must_sit_above_nominal() {
        assert_eq!(fall_bands(0.0), Err(ConfigError::NonMonotonic { index: 1 }));
        assert_eq!(fall_bands(f32::NAN), Err(ConfigError::NotFinite { index: 1 }));
    }

    #[test]
    fn sensitivity_must_be_positive() {
        assert_eq!(FallConfig::new(0.0), Err(ConfigError::NonPositiveSensitivity));
        assert_eq!(FallConfig::new(-0.3), Err(ConfigError::NonPositiveSensitivity));
        assert_eq!(FallConfig::new(f32::NAN), Err(ConfigError::NonPositiveSensitivity));
    }

    #[test]
    fn summed_voltage_converts_to_gravity() {
        let config = FallConfig::new(ACCELEROMETER_SENSITIVITY).unwrap();
        let g = config.to_gravity(1.5);
        assert!((g - 5.0).abs() < 1.0e-4);
    }

    #[test]
    fn adc_full_scale_is_reference_voltage() {
        assert_eq!(adc_to_volts(0), 0.0);
        assert!((adc_to_volts(4096) - ADC_REF_VOLTAGE).abs() < 1.0e-6);
    }
}

//! Classification bands
//!
//! A [`BandTable`] splits the sample axis into contiguous intervals. Each band
//! starts at its `floor` (inclusive) and runs up to the next band's floor
//! (exclusive), so every boundary value belongs to the band above it. The
//! first band also takes everything below its floor, the last band everything
//! above, which makes classification total.

use core::fmt;

use crate::system::alert::AlertKind;
use crate::system::output::OutputState;

/// When a band's alert fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Trigger {
    /// Once, on the cycle the sample enters the band
    Edge,
    /// On every cycle the sample stays in the band
    Level,
}

/// Alert attached to a band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BandAlert {
    pub kind: AlertKind,
    pub trigger: Trigger,
}

/// One classification interval
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Band {
    pub label: &'static str,
    /// Inclusive lower bound
    pub floor: f32,
    /// What the actuators show while samples fall in this band
    pub output: OutputState,
    pub alert: Option<BandAlert>,
}

impl Band {
    pub const fn new(label: &'static str, floor: f32, output: OutputState) -> Self {
        Self {
            label,
            floor,
            output,
            alert: None,
        }
    }

    /// Attaches an edge-triggered alert
    #[must_use]
    pub const fn alerting(mut self, kind: AlertKind) -> Self {
        self.alert = Some(BandAlert {
            kind,
            trigger: Trigger::Edge,
        });
        self
    }

    /// Attaches an alert with an explicit trigger
    #[must_use]
    pub const fn alerting_on(mut self, kind: AlertKind, trigger: Trigger) -> Self {
        self.alert = Some(BandAlert { kind, trigger });
        self
    }
}

/// Rejected band or sensor configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A table needs at least one band
    Empty,
    /// `bands[index].floor` is not above the previous floor
    NonMonotonic { index: usize },
    /// `bands[index].floor` is NaN or infinite
    NotFinite { index: usize },
    /// Accelerometer sensitivity must be a positive number of volts per G
    NonPositiveSensitivity,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Empty => f.write_str("band table is empty"),
            ConfigError::NonMonotonic { index } => {
                write!(f, "band {index} does not start above the previous band")
            }
            ConfigError::NotFinite { index } => write!(f, "band {index} has a non-finite floor"),
            ConfigError::NonPositiveSensitivity => f.write_str("sensitivity must be positive"),
        }
    }
}

/// Validated, ordered set of bands
#[derive(Debug, Clone, PartialEq)]
pub struct BandTable<const N: usize> {
    bands: [Band; N],
}

impl<const N: usize> BandTable<N> {
    /// Checks that the table is non-empty and its floors finite and strictly
    /// increasing.
    pub fn new(bands: [Band; N]) -> Result<Self, ConfigError> {
        if N == 0 {
            return Err(ConfigError::Empty);
        }
        for (index, band) in bands.iter().enumerate() {
            if !band.floor.is_finite() {
                return Err(ConfigError::NotFinite { index });
            }
            if index > 0 && band.floor <= bands[index - 1].floor {
                return Err(ConfigError::NonMonotonic { index });
            }
        }
        Ok(Self { bands })
    }

    /// Index of the band containing `value`
    ///
    /// NaN compares false against every floor and lands in the first band.
    pub fn index_of(&self, value: f32) -> usize {
        self.bands
            .iter()
            .rposition(|band| value >= band.floor)
            .unwrap_or(0)
    }

    pub fn band(&self, index: usize) -> Option<&Band> {
        self.bands.get(index)
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }
}

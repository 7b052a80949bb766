//! Sample classification
//!
//! Maps a sample to its band and decides which alert flags the cycle raises.
//! The classifier is pure: the only history it looks at is the previous
//! band, which the caller passes in.

use crate::system::alert::AlertFlags;
use crate::system::band::{Band, BandTable, Trigger};
use crate::system::sample::Sample;

/// Result of classifying one sample
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Classification {
    /// Index into the band table
    pub band: usize,
    /// Flags to raise for this cycle
    pub alerts: AlertFlags,
    /// `true` when the band differs from the previous one
    pub changed: bool,
}

/// Band table plus the edge/level alert rules attached to it
#[derive(Debug, Clone, PartialEq)]
pub struct Classifier<const N: usize> {
    table: BandTable<N>,
}

impl<const N: usize> Classifier<N> {
    pub const fn new(table: BandTable<N>) -> Self {
        Self { table }
    }

    /// Classifies `sample`, given the band the previous cycle ended in.
    pub fn classify(&self, sample: &Sample, previous: Option<usize>) -> Classification {
        let band = self.table.index_of(sample.value());
        let changed = previous != Some(band);

        let mut alerts = AlertFlags::NONE;
        if let Some(alert) = self.band(band).alert {
            let fire = match alert.trigger {
                Trigger::Edge => changed,
                Trigger::Level => true,
            };
            if fire {
                alerts.insert(alert.kind);
            }
        }

        Classification {
            band,
            alerts,
            changed,
        }
    }

    /// Band at `index`; out-of-range indices clamp to the last band
    pub fn band(&self, index: usize) -> &Band {
        let bands = self.table.bands();
        &bands[index.min(bands.len() - 1)]
    }

    pub fn table(&self) -> &BandTable<N> {
        &self.table
    }
}

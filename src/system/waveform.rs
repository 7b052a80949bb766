//! Stored waveform playback
//!
//! Steps through a table of 8-bit levels, one level per wake, wrapping at the
//! end. The firmware feeds the levels to a filtered PWM output to generate a
//! test signal for the plotter input.

use crate::system::wake::WakeSignal;

/// One heartbeat of ECG, 8-bit levels
pub const ECG: [u8; 231] = [
    76, 77, 78, 77, 79, 86, 81, 76, 84, 93, 85, 80, 89, 95, 89, 85, 93, 98, 94, 88, 98, 105, 96, 91,
    99, 105, 101, 96, 102, 106, 101, 96, 100, 107, 101, 94, 100, 104, 100, 91, 99, 103, 98, 91, 96,
    105, 95, 88, 95, 100, 94, 85, 93, 99, 92, 84, 91, 96, 87, 80, 83, 92, 86, 78, 84, 89, 79, 73,
    81, 83, 78, 70, 80, 82, 79, 69, 80, 82, 81, 70, 75, 81, 77, 74, 79, 83, 82, 72, 80, 87, 79, 76,
    85, 95, 87, 81, 88, 93, 88, 84, 87, 94, 86, 82, 85, 94, 85, 82, 85, 95, 86, 83, 92, 99, 91, 88,
    94, 98, 95, 90, 97, 105, 104, 94, 98, 114, 117, 124, 144, 180, 210, 236, 253, 227, 171, 99, 49,
    34, 29, 43, 69, 89, 89, 90, 98, 107, 104, 98, 104, 110, 102, 98, 103, 111, 101, 94, 103, 108,
    102, 95, 97, 106, 100, 92, 101, 103, 100, 94, 98, 103, 96, 90, 98, 103, 97, 90, 99, 104, 95,
    90, 99, 104, 100, 93, 100, 106, 101, 93, 101, 105, 103, 96, 105, 112, 105, 99, 103, 108, 99,
    96, 102, 106, 99, 90, 92, 100, 87, 80, 82, 88, 77, 69, 75, 79, 74, 67, 71, 78, 72, 67, 73, 81,
    77, 71, 75, 84, 79, 77, 77, 76, 76,
];

/// Output taking one 8-bit level per step
pub trait LevelOutput {
    fn set_level(&mut self, level: u8);
}

/// Cyclic cursor over a level table
#[derive(Debug, Clone)]
pub struct Waveform<'t> {
    table: &'t [u8],
    index: usize,
}

impl<'t> Waveform<'t> {
    /// `None` for an empty table
    pub fn new(table: &'t [u8]) -> Option<Self> {
        if table.is_empty() {
            None
        } else {
            Some(Self { table, index: 0 })
        }
    }

    /// Current level; advances and wraps
    pub fn next_level(&mut self) -> u8 {
        let level = self.table[self.index];
        self.index = (self.index + 1) % self.table.len();
        level
    }

    pub fn position(&self) -> usize {
        self.index
    }
}

/// Writes one level per wake for the rest of the process lifetime
pub async fn play<O: LevelOutput>(wake: &WakeSignal, mut waveform: Waveform<'_>, output: &mut O) -> ! {
    info!("waveform playback started");
    loop {
        wake.wait().await;
        output.set_level(waveform.next_level());
    }
}

/// PWM clock divider and counter top for a carrier frequency.
///
/// The divider is the smallest integer that keeps the counter within 16 bits.
/// Returns `None` when the divider does not fit the 8-bit integer part or the
/// carrier is too fast for the clock to give a period of at least two counts.
pub fn pwm_timing(clock_hz: u32, carrier_hz: u32) -> Option<(u8, u16)> {
    let counts = clock_hz.checked_div(carrier_hz)?;
    let divider = u8::try_from(counts / u32::from(u16::MAX) + 1).ok()?;
    let top = u16::try_from(counts / u32::from(divider)).ok()?.checked_sub(1)?;
    (top > 0).then_some((divider, top))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_at_table_end() {
        let mut wave = Waveform::new(&[1, 2, 3]).unwrap();
        let levels: std::vec::Vec<u8> = (0..7).map(|_| wave.next_level()).collect();
        assert_eq!(levels, [1, 2, 3, 1, 2, 3, 1]);
        assert_eq!(wave.position(), 1);
    }

    #[test]
    fn empty_table_is_rejected() {
        assert!(Waveform::new(&[]).is_none());
    }

    #[test]
    fn ecg_peak_is_the_r_wave() {
        let mut wave = Waveform::new(&ECG).unwrap();
        let max = (0..ECG.len()).map(|_| wave.next_level()).max();
        assert_eq!(max, Some(253));
        assert_eq!(wave.position(), 0);
    }

    #[test]
    fn pwm_timing_fits_counter() {
        assert_eq!(pwm_timing(150_000_000, 100_000), Some((1, 1499)));
        assert_eq!(pwm_timing(125_000_000, 1_000), Some((2, 62499)));
    }

    #[test]
    fn pwm_timing_rejects_unreachable_carriers() {
        // Needs a divider above 255
        assert_eq!(pwm_timing(150_000_000, 1), None);
        // Faster than the clock
        assert_eq!(pwm_timing(150_000_000, 200_000_000), None);
        assert_eq!(pwm_timing(150_000_000, 0), None);
    }
}

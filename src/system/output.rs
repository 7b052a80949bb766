//! Output state and actuators
//!
//! The LEDs, the buzzer and the distance readout are driven as one unit: each
//! sampling cycle computes a complete [`OutputState`] and hands it to the
//! [`Actuators`] implementation, which overwrites whatever was shown before.

/// LED identifiers on the board, `Led1` being the leftmost
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Led {
    Led1,
    Led2,
    Led3,
}

impl Led {
    pub const ALL: [Led; 3] = [Led::Led1, Led::Led2, Led::Led3];

    const fn mask(self) -> u8 {
        match self {
            Led::Led1 => 0b001,
            Led::Led2 => 0b010,
            Led::Led3 => 0b100,
        }
    }
}

/// Bitmask of lit LEDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LedPattern(u8);

impl LedPattern {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(0b111);

    /// Builds a pattern from a raw bitmask; bits above `Led3` are dropped
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Lights the first `count` LEDs, counting from `Led1`
    pub const fn bar(count: u8) -> Self {
        match count {
            0 => Self::NONE,
            1 => Self(0b001),
            2 => Self(0b011),
            _ => Self::ALL,
        }
    }

    pub const fn is_on(self, led: Led) -> bool {
        self.0 & led.mask() != 0
    }

    #[must_use]
    pub const fn with(self, led: Led, on: bool) -> Self {
        if on {
            Self(self.0 | led.mask())
        } else {
            Self(self.0 & !led.mask())
        }
    }
}

/// Everything the actuators show after one cycle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputState {
    pub leds: LedPattern,
    pub buzzer: bool,
    /// Value for the readout, `None` blanks it
    pub readout: Option<f32>,
}

impl OutputState {
    /// All outputs dark
    pub const OFF: Self = Self {
        leds: LedPattern::NONE,
        buzzer: false,
        readout: None,
    };

    pub const fn new(leds: LedPattern, buzzer: bool) -> Self {
        Self {
            leds,
            buzzer,
            readout: None,
        }
    }

    #[must_use]
    pub const fn with_readout(mut self, value: f32) -> Self {
        self.readout = Some(value);
        self
    }
}

/// Sink for the output state of a sampling task
#[allow(async_fn_in_trait)]
pub trait Actuators {
    /// Replaces the current output with `state`
    async fn apply(&mut self, state: &OutputState);
}

/// For tasks without any local outputs
impl Actuators for () {
    async fn apply(&mut self, _state: &OutputState) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_lights_from_first_led() {
        let two = LedPattern::bar(2);
        assert!(two.is_on(Led::Led1));
        assert!(two.is_on(Led::Led2));
        assert!(!two.is_on(Led::Led3));
        assert_eq!(LedPattern::bar(9), LedPattern::ALL);
        assert_eq!(LedPattern::bar(0), LedPattern::NONE);
    }

    #[test]
    fn single_led_updates_keep_the_others() {
        let pattern = LedPattern::ALL.with(Led::Led2, false);
        assert_eq!(pattern.bits(), 0b101);
        assert_eq!(pattern.with(Led::Led2, true), LedPattern::ALL);
    }

    #[test]
    fn raw_bits_are_masked() {
        assert_eq!(LedPattern::from_bits(0xff), LedPattern::ALL);
    }
}

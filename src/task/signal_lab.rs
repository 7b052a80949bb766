//! Signal lab
//!
//! Two independent periodic tasks for exercising the analog chain:
//! - the plotter stream reads one ADC input and prints `>ECG: <mV>` lines for
//!   a serial plotter
//! - the waveform task steps through a stored ECG beat on a PWM output; with
//!   an RC low-pass on the pin it makes a test signal for the plotter input

use defmt::error;
use embassy_rp::adc::Channel;
use embassy_rp::gpio::Pull;
use embassy_rp::pwm::{self, Pwm, SetDutyCycle};
use rider_alert::system::config::{adc_to_volts, PLOTTER_LABEL};
use rider_alert::system::context::SystemContext;
use rider_alert::system::plotter::PlotterTask;
use rider_alert::system::sample::SensorError;
use rider_alert::system::sampling::SensorReader;
use rider_alert::system::waveform::{self, pwm_timing, LevelOutput, Waveform, ECG};

use crate::task::resources::{get_adc, PlotterResources, WaveformResources};
use crate::task::serial::SharedSerial;

/// PWM carrier (Hz); far above the waveform so a simple RC filter smooths it
const PWM_FREQUENCY_HZ: u32 = 100_000;

/// One ADC input read as millivolts
pub struct AdcMillivolts {
    channel: Channel<'static>,
}

impl SensorReader for AdcMillivolts {
    async fn read(&mut self) -> Result<f32, SensorError> {
        let mut adc_guard = get_adc().lock().await;
        let adc = adc_guard.as_mut().ok_or(SensorError::Adc)?;
        let raw = adc.read(&mut self.channel).await.map_err(|_| SensorError::Adc)?;
        Ok(adc_to_volts(raw) * 1000.0)
    }
}

/// Plotter stream task, woken by its periodic timer
#[embassy_executor::task]
pub async fn plotter_stream(r: PlotterResources, context: &'static SystemContext) {
    let input = AdcMillivolts {
        channel: Channel::new_pin(r.input_pin, Pull::None),
    };
    let mut plotter = PlotterTask::new(PLOTTER_LABEL, &context.plotter_wake, input, SharedSerial);
    plotter.run().await
}

/// PWM duty cycle as an 8-bit analog level
pub struct PwmLevel {
    pwm: Pwm<'static>,
}

impl LevelOutput for PwmLevel {
    fn set_level(&mut self, level: u8) {
        let _ = self.pwm.set_duty_cycle_fraction(u16::from(level), u16::from(u8::MAX));
    }
}

/// Waveform playback task, woken by its periodic timer
#[embassy_executor::task]
pub async fn waveform_output(r: WaveformResources, context: &'static SystemContext) {
    let clock_freq_hz = embassy_rp::clocks::clk_sys_freq();
    let Some((divider, period)) = pwm_timing(clock_freq_hz, PWM_FREQUENCY_HZ) else {
        error!("No PWM timing for {} Hz at clk_sys {} Hz", PWM_FREQUENCY_HZ, clock_freq_hz);
        return;
    };

    let mut config = pwm::Config::default();
    config.divider = divider.into();
    config.top = period;
    let mut output = PwmLevel {
        pwm: Pwm::new_output_a(r.slice, r.pin, config),
    };

    // ECG is a non-empty constant table
    if let Some(wave) = Waveform::new(&ECG) {
        waveform::play(&context.waveform_wake, wave, &mut output).await
    }
}

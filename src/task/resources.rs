//! Hardware Resource Management
//!
//! Assigns pins and peripherals to the tasks that own them and keeps the two
//! peripherals that are shared between tasks:
//! - the ADC, used by the accelerometer and the plotter input
//! - the UART transmitter, used by every task that writes serial text
//!   (see [`crate::task::serial`])
//!
//! # Resource Groups
//! - Distance Sensor: HC-SR04 trigger/echo pins
//! - Indicators: three LEDs and the buzzer
//! - Accelerometer: three analog axis inputs
//! - Plotter: one analog input
//! - Waveform: PWM output (RC-filtered to an analog level)
//! - Switches: hold and output toggles
//! - Serial: UART0 with its DMA channels

use assign_resources::assign_resources;
use embassy_rp::adc::InterruptHandler as AdcInterruptHandler;
use embassy_rp::adc::{Adc, Async as AdcAsync};
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::{self, ADC, UART0};
use embassy_rp::uart::InterruptHandler as UartInterruptHandler;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;

/// Global ADC instance protected by a mutex.
///
/// The accelerometer and plotter tasks take turns on the converter; each
/// holds the lock only for a single conversion.
static ADC: Mutex<CriticalSectionRawMutex, Option<Adc<'static, AdcAsync>>> = Mutex::new(None);

/// Initializes the ADC peripheral.
///
/// Must be called once from main, before any task using the ADC is spawned.
pub fn init_adc(adc: ADC) {
    let adc = Adc::new(adc, Irqs, embassy_rp::adc::Config::default());
    critical_section::with(|_| {
        *ADC.try_lock().unwrap() = Some(adc);
    });
}

/// Returns the protected ADC instance.
pub fn get_adc() -> &'static Mutex<CriticalSectionRawMutex, Option<Adc<'static, AdcAsync>>> {
    &ADC
}

assign_resources! {
    /// HC-SR04 ultrasonic distance sensor pins
    distance_sensor: DistanceSensorResources {
        trigger_pin: PIN_15,
        echo_pin: PIN_14,
    },
    /// Distance band LEDs and buzzer
    indicators: IndicatorResources {
        led_1: PIN_6,
        led_2: PIN_7,
        led_3: PIN_8,
        buzzer: PIN_9,
    },
    /// Analog accelerometer axes
    accelerometer: AccelerometerResources {
        x_pin: PIN_26,
        y_pin: PIN_27,
        z_pin: PIN_28,
    },
    /// Plotter analog input
    plotter: PlotterResources {
        input_pin: PIN_29,
    },
    /// Waveform PWM output
    waveform: WaveformResources {
        slice: PWM_SLICE0,
        pin: PIN_16,
    },
    /// Switch 1 toggles outputs, switch 2 toggles hold
    switches: SwitchResources {
        output_pin: PIN_10,
        hold_pin: PIN_11,
    },
    /// Serial port to the host or Bluetooth module
    serial: SerialResources {
        uart: UART0,
        tx_pin: PIN_0,
        rx_pin: PIN_1,
        tx_dma: DMA_CH0,
        rx_dma: DMA_CH1,
    },
}

bind_interrupts!(pub struct Irqs {
    ADC_IRQ_FIFO => AdcInterruptHandler;
    UART0_IRQ => UartInterruptHandler<UART0>;
});

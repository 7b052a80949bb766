//! Serial port
//!
//! Owns UART0. The transmit half sits behind a mutex and is shared by the
//! sampling tasks (alerts, distance readout) and the plotter stream. The
//! receive half feeds the key command task.

use defmt::{info, warn};
use embassy_rp::uart::{Async, Config, Uart, UartRx, UartTx};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use rider_alert::system::command::Command;
use rider_alert::system::config::UART_BAUD;
use rider_alert::system::context::SystemContext;
use rider_alert::system::serial::{SerialError, SerialSink};

use crate::task::resources::{Irqs, SerialResources};

/// Line terminator appended to every message
const LINE_END: &[u8] = b"\r\n";

/// Shared transmitter, set once by [`init`]
static SERIAL_TX: Mutex<CriticalSectionRawMutex, Option<UartTx<'static, Async>>> = Mutex::new(None);

/// Brings up UART0, stores the transmitter and returns the receiver.
///
/// Must be called once from main, before any task writing serial text is spawned.
pub fn init(r: SerialResources) -> UartRx<'static, Async> {
    let mut config = Config::default();
    config.baudrate = UART_BAUD;
    let uart = Uart::new(r.uart, r.tx_pin, r.rx_pin, Irqs, r.tx_dma, r.rx_dma, config);
    let (tx, rx) = uart.split();
    critical_section::with(|_| {
        *SERIAL_TX.try_lock().unwrap() = Some(tx);
    });
    rx
}

/// Handle to the shared transmitter; cheap to copy into every task
#[derive(Clone, Copy)]
pub struct SharedSerial;

impl SerialSink for SharedSerial {
    async fn send_str(&mut self, text: &str) -> Result<(), SerialError> {
        let mut guard = SERIAL_TX.lock().await;
        let tx = guard.as_mut().ok_or(SerialError::Write)?;
        tx.write(text.as_bytes()).await.map_err(|_| SerialError::Write)?;
        tx.write(LINE_END).await.map_err(|_| SerialError::Write)
    }
}

/// Turns keys received on the serial port into commands
///
/// `O`/`o` toggles the outputs, `H`/`h` toggles hold; other bytes are ignored.
#[embassy_executor::task]
pub async fn serial_input(mut rx: UartRx<'static, Async>, context: &'static SystemContext) {
    info!("Serial input started");
    let mut key = [0u8; 1];
    loop {
        if let Err(e) = rx.read(&mut key).await {
            warn!("Serial read failed: {:?}", e);
            continue;
        }
        if let Some(command) = Command::from_key(key[0]) {
            info!("Key command: {:?}", command);
            context.commands.send(command).await;
        }
    }
}

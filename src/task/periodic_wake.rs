//! Periodic wake source
//!
//! Stands in for a hardware countdown timer: on every period it marks a wake
//! pending on one [`WakeSignal`] and does nothing else. Wakes that the
//! consumer has not picked up yet are coalesced by the signal.

use embassy_time::{Duration, Ticker};
use rider_alert::system::wake::WakeSignal;

/// One instance per sampling concern
#[embassy_executor::task(pool_size = 4)]
pub async fn periodic_wake(wake: &'static WakeSignal, period: Duration) {
    let mut ticker = Ticker::every(period);
    loop {
        ticker.next().await;
        wake.notify();
    }
}

//! Alert dispatch
//!
//! Drains the [`AlertBoard`] in the fixed order caution, danger, fall, sending
//! one serial message per pending flag. A flag is cleared before its message
//! goes out, so a failed write is not retried and a flag is never sent twice.

use crate::system::alert::{AlertBoard, AlertFlags, AlertKind};
use crate::system::serial::SerialSink;

/// Sends the message of every pending flag and clears it.
///
/// Returns the flags that were handled, whether or not the write succeeded.
pub async fn dispatch<S: SerialSink>(board: &AlertBoard, serial: &mut S) -> AlertFlags {
    let mut handled = AlertFlags::NONE;
    for kind in AlertKind::ORDER {
        if !board.take(kind) {
            continue;
        }
        handled.insert(kind);
        match serial.send_str(kind.message()).await {
            Ok(()) => info!("alert sent: {:?}", kind),
            Err(e) => warn!("alert {:?} dropped: {:?}", kind, e),
        }
    }
    handled
}

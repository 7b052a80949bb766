//! Switch handling
//!
//! Two push buttons, each toggling one setting of the distance task:
//! - switch 1: outputs (LEDs, buzzer, readout) on/off
//! - switch 2: hold the current reading
//!
//! Presses are debounced and posted as commands; the distance task applies
//! them at the start of its next cycle.

use defmt::info;
use embassy_rp::gpio::{Input, Level, Pull};
use embassy_time::{Duration, Timer};
use rider_alert::system::command::Command;
use rider_alert::system::context::SystemContext;

use crate::task::resources::SwitchResources;

/// Button debounce delay (ms)
const DEBOUNCE_DURATION: Duration = Duration::from_millis(30);

/// Splits the switch resources into one handler per switch
pub fn inputs(r: SwitchResources) -> [(Input<'static>, Command); 2] {
    [
        (Input::new(r.output_pin, Pull::Down), Command::ToggleOutput),
        (Input::new(r.hold_pin, Pull::Down), Command::ToggleHold),
    ]
}

/// Posts `command` on every debounced press of `button`
#[embassy_executor::task(pool_size = 2)]
pub async fn switch_input(mut button: Input<'static>, command: Command, context: &'static SystemContext) {
    loop {
        if debounce(&mut button).await != Level::High {
            continue;
        }
        info!("Switch command: {:?}", command);
        context.commands.send(command).await;
    }
}

/// Ensures stable button state
async fn debounce(button: &mut Input<'static>) -> Level {
    loop {
        let st_level = button.get_level();
        button.wait_for_any_edge().await;
        Timer::after(DEBOUNCE_DURATION).await;
        let end_level = button.get_level();
        if st_level != end_level {
            break end_level;
        }
    }
}

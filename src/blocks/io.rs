//! Input and output pin blocks.

use crate::simulation::{BlockSimulation, Drives, PinView};

/// Drives its non-input pins with the level set through
/// [`Network::set_input`](crate::network::Network::set_input).
///
/// Until a level is set the block drives nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputPin;

impl BlockSimulation for InputPin {
    fn name(&self) -> &str {
        "INPUT"
    }

    fn evaluate(&mut self, pins: &PinView<'_>, drives: &mut Drives<'_>) {
        if let Some(level) = pins.stimulus() {
            drives.drive_writable(level);
        }
    }
}

/// Observation point. Reads its pin and drives nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct OutputProbe;

impl BlockSimulation for OutputProbe {
    fn name(&self) -> &str {
        "OUTPUT"
    }

    fn evaluate(&mut self, _pins: &PinView<'_>, _drives: &mut Drives<'_>) {}
}

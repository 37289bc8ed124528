use super::{CommandSink, OutputError};
use crate::pointer::{Button, PointerCommand, Report};
use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AttributeSet, EventType, InputEvent, Key, RelativeAxisType, Synchronization};

const VIRTUAL_DEVICE_NAME: &str = "Adaptive Virtual Touchpad";

pub struct VirtualPointer {
    device: VirtualDevice,
}

impl VirtualPointer {
    pub fn new() -> Result<Self, OutputError> {
        let device = VirtualDeviceBuilder::new()
            .and_then(|builder| {
                builder
                    .name(VIRTUAL_DEVICE_NAME)
                    .with_keys(&AttributeSet::from_iter([Key::BTN_LEFT, Key::BTN_RIGHT]))?
                    .with_relative_axes(&AttributeSet::from_iter([
                        RelativeAxisType::REL_X,
                        RelativeAxisType::REL_Y,
                        RelativeAxisType::REL_WHEEL,
                    ]))?
                    .build()
            })
            .map_err(OutputError::CreateFailed)?;
        log::info!("created virtual pointer \"{}\"", VIRTUAL_DEVICE_NAME);
        Ok(Self { device })
    }
}

impl CommandSink for VirtualPointer {
    fn send(&mut self, reports: &[Report]) -> Result<(), OutputError> {
        let events = to_input_events(reports);
        if events.is_empty() {
            return Ok(());
        }
        // emit() appends the final SYN_REPORT
        self.device.emit(&events).map_err(OutputError::WriteFailed)
    }
}

fn button_code(button: Button) -> u16 {
    match button {
        Button::Left => Key::BTN_LEFT.code(),
        Button::Right => Key::BTN_RIGHT.code(),
    }
}

fn push_command(events: &mut Vec<InputEvent>, command: PointerCommand) {
    match command {
        PointerCommand::Button { button, pressed } => events.push(InputEvent::new(
            EventType::KEY,
            button_code(button),
            i32::from(pressed),
        )),
        PointerCommand::Motion { dx, dy } => {
            events.push(InputEvent::new(
                EventType::RELATIVE,
                RelativeAxisType::REL_X.0,
                dx,
            ));
            events.push(InputEvent::new(
                EventType::RELATIVE,
                RelativeAxisType::REL_Y.0,
                dy,
            ));
        }
        PointerCommand::Wheel(delta) => events.push(InputEvent::new(
            EventType::RELATIVE,
            RelativeAxisType::REL_WHEEL.0,
            delta,
        )),
    }
}

/// Flatten reports into kernel events with a `SYN_REPORT` between
/// consecutive reports, leaving off the trailing one.
fn to_input_events(reports: &[Report]) -> Vec<InputEvent> {
    let mut events = Vec::new();
    for report in reports.iter().filter(|r| !r.commands.is_empty()) {
        if !events.is_empty() {
            events.push(InputEvent::new(
                EventType::SYNCHRONIZATION,
                Synchronization::SYN_REPORT.0,
                0,
            ));
        }
        for &command in &report.commands {
            push_command(&mut events, command);
        }
    }
    events
}

#[cfg(target_os = "linux")]
use evdev::{AbsoluteAxisType, EventType, InputEvent, Synchronization};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// The slice of the type-B multitouch protocol the gesture engine consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchEvent {
    /// `ABS_MT_SLOT`: following events refer to this slot.
    SlotSelect(i32),
    /// `ABS_MT_TRACKING_ID` with a nonnegative id.
    ContactBegin(i32),
    /// `ABS_MT_TRACKING_ID` of -1.
    ContactEnd,
    Position(Axis, i32),
    /// `SYN_REPORT`
    BatchEnd,
}

impl TouchEvent {
    /// Map a tracking id value to begin/end.
    pub fn tracking(value: i32) -> Self {
        if value < 0 {
            TouchEvent::ContactEnd
        } else {
            TouchEvent::ContactBegin(value)
        }
    }
}

#[cfg(target_os = "linux")]
pub fn decode(event: &InputEvent) -> Option<TouchEvent> {
    let value = event.value();
    match event.event_type() {
        EventType::ABSOLUTE => match AbsoluteAxisType(event.code()) {
            AbsoluteAxisType::ABS_MT_SLOT => Some(TouchEvent::SlotSelect(value)),
            AbsoluteAxisType::ABS_MT_TRACKING_ID => Some(TouchEvent::tracking(value)),
            AbsoluteAxisType::ABS_MT_POSITION_X => Some(TouchEvent::Position(Axis::X, value)),
            AbsoluteAxisType::ABS_MT_POSITION_Y => Some(TouchEvent::Position(Axis::Y, value)),
            _ => None,
        },
        EventType::SYNCHRONIZATION if event.code() == Synchronization::SYN_REPORT.0 => {
            Some(TouchEvent::BatchEnd)
        }
        _ => None,
    }
}

#[cfg(target_os = "linux")]
pub fn describe_event(event: &InputEvent) -> String {
    let type_name = match event.event_type() {
        EventType::KEY => "EV_KEY",
        EventType::ABSOLUTE => "EV_ABS",
        EventType::MISC => "EV_MSC",
        EventType::SYNCHRONIZATION => "EV_SYN",
        _ => "EV_???",
    };
    match code_lookup(event.event_type(), event.code()) {
        Some(name) => format!("{}({}, {})", type_name, name, event.value()),
        None => format!("{}(0x{:X}, {})", type_name, event.code(), event.value()),
    }
}

#[cfg(target_os = "linux")]
fn code_lookup(event_type: EventType, code: u16) -> Option<&'static str> {
    match event_type {
        EventType::SYNCHRONIZATION => match code {
            0x00 => Some("SYN_REPORT"),
            0x03 => Some("SYN_DROPPED"),
            _ => None,
        },
        EventType::ABSOLUTE => match code {
            0x00 => Some("X"),
            0x01 => Some("Y"),
            0x2f => Some("SLOT"),
            0x35 => Some("POSITION_X"),
            0x36 => Some("POSITION_Y"),
            0x39 => Some("TRACKING_ID"),
            _ => None,
        },
        EventType::KEY => match code {
            0x14a => Some("BTN_TOUCH"),
            0x145 => Some("BTN_TOOL_FINGER"),
            0x14d => Some("BTN_TOOL_DOUBLETAP"),
            _ => None,
        },
        _ => None,
    }
}

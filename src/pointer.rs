#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Button {
    Left,
    Right,
}

/// One change on the virtual pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerCommand {
    Button { button: Button, pressed: bool },
    Motion { dx: i32, dy: i32 },
    Wheel(i32),
}

impl PointerCommand {
    pub fn press(button: Button) -> Self {
        PointerCommand::Button {
            button,
            pressed: true,
        }
    }

    pub fn release(button: Button) -> Self {
        PointerCommand::Button {
            button,
            pressed: false,
        }
    }
}

/// Commands the virtual device observes as happening together
/// (terminated by one `SYN_REPORT`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    pub commands: Vec<PointerCommand>,
}

impl Report {
    pub fn single(command: PointerCommand) -> Self {
        Self {
            commands: vec![command],
        }
    }

    /// A press and a release as two consecutive reports.
    pub fn click(button: Button) -> [Report; 2] {
        [
            Report::single(PointerCommand::press(button)),
            Report::single(PointerCommand::release(button)),
        ]
    }
}

use super::{InputError, TouchSource};
use crate::multitouch::{self, TouchEvent};
use crate::tracker::MAX_TOUCH_POINTS;
use evdev::{AbsoluteAxisType, Device};
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::Path;

/// Upper bound on how long a read blocks, so a signal that lands between
/// the loop's flag check and the read is noticed on the next wakeup.
const POLL_TIMEOUT_MS: libc::c_int = 100;

pub struct EvdevBackend {
    device: Device,
    verbose: bool,
}

impl EvdevBackend {
    pub fn open_with_verbose(device_path: &Path, verbose: bool) -> Result<Self, InputError> {
        let device = Device::open(device_path).map_err(|e| InputError::open(device_path, e))?;

        let has_mt = device.supported_absolute_axes().is_some_and(|axes| {
            axes.contains(AbsoluteAxisType::ABS_MT_SLOT)
                && axes.contains(AbsoluteAxisType::ABS_MT_POSITION_X)
                && axes.contains(AbsoluteAxisType::ABS_MT_POSITION_Y)
        });
        if !has_mt {
            log::warn!(
                "{} does not advertise multitouch slots, expect no input",
                device_path.display()
            );
        }

        Ok(Self { device, verbose })
    }

    pub fn name(&self) -> &str {
        self.device.name().unwrap_or("unnamed device")
    }
}

impl TouchSource for EvdevBackend {
    fn open(device_path: &Path) -> Result<Self, InputError> {
        Self::open_with_verbose(device_path, false)
    }

    fn grab(&mut self) -> Result<(), InputError> {
        self.device.grab().map_err(InputError::GrabFailed)
    }

    fn ungrab(&mut self) -> Result<(), InputError> {
        self.device.ungrab().map_err(InputError::GrabFailed)
    }

    fn slot_count(&self) -> usize {
        let reported = self.device.get_abs_state().ok().and_then(|state| {
            let info = state.get(usize::from(AbsoluteAxisType::ABS_MT_SLOT.0))?;
            usize::try_from(info.maximum).ok().map(|max| max + 1)
        });
        match reported {
            Some(count) if count > 0 => count,
            _ => {
                log::debug!("slot range unavailable, assuming {}", MAX_TOUCH_POINTS);
                MAX_TOUCH_POINTS
            }
        }
    }

    fn read_batch(&mut self) -> Result<Vec<TouchEvent>, InputError> {
        let mut pollfd = libc::pollfd {
            fd: self.device.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        // SAFETY: one valid pollfd, borrowed for the duration of the call.
        let ret = unsafe { libc::poll(&mut pollfd, 1, POLL_TIMEOUT_MS) };
        if ret < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Err(InputError::Interrupted);
            }
            return Err(InputError::ReadError(err));
        }
        if ret == 0 {
            return Ok(Vec::new());
        }

        match self.device.fetch_events() {
            Ok(events) => {
                let mut decoded = Vec::new();
                for event in events {
                    if self.verbose {
                        log::trace!("{}", multitouch::describe_event(&event));
                    }
                    decoded.extend(multitouch::decode(&event));
                }
                Ok(decoded)
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Err(InputError::Interrupted),
            Err(e) => Err(InputError::ReadError(e)),
        }
    }
}

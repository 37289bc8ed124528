#[cfg(target_os = "linux")]
pub mod evdev_backend;

use crate::multitouch::TouchEvent;
use std::io;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("permission denied opening {}", .0.display())]
    PermissionDenied(PathBuf),
    #[error("failed to open {}: {source}", path.display())]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to grab device: {0}")]
    GrabFailed(#[source] io::Error),
    #[error("failed to read events: {0}")]
    ReadError(#[source] io::Error),
    #[error("read interrupted")]
    Interrupted,
}

impl InputError {
    pub fn open(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::PermissionDenied {
            InputError::PermissionDenied(path.to_path_buf())
        } else {
            InputError::OpenFailed {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        match self {
            InputError::PermissionDenied(_) => true,
            InputError::GrabFailed(e) => e.kind() == io::ErrorKind::PermissionDenied,
            _ => false,
        }
    }
}

/// A multitouch device delivering type-B protocol events.
pub trait TouchSource {
    fn open(device_path: &Path) -> Result<Self, InputError>
    where
        Self: Sized;
    fn grab(&mut self) -> Result<(), InputError>;
    fn ungrab(&mut self) -> Result<(), InputError>;
    /// Number of multitouch slots the hardware reports.
    fn slot_count(&self) -> usize;
    /// Wait a bounded time for device events and return the decoded ones.
    /// An empty batch means the wait timed out.
    fn read_batch(&mut self) -> Result<Vec<TouchEvent>, InputError>;
}

/// Exclusive hold on a source, released when dropped.
pub struct Grabbed<'a, S: TouchSource> {
    source: &'a mut S,
}

impl<'a, S: TouchSource> Grabbed<'a, S> {
    pub fn acquire(source: &'a mut S) -> Result<Self, InputError> {
        source.grab()?;
        Ok(Self { source })
    }
}

impl<S: TouchSource> Deref for Grabbed<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.source
    }
}

impl<S: TouchSource> DerefMut for Grabbed<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.source
    }
}

impl<S: TouchSource> Drop for Grabbed<'_, S> {
    fn drop(&mut self) {
        match self.source.ungrab() {
            Ok(()) => log::debug!("device released"),
            Err(e) => log::warn!("failed to release device: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeSource {
        grabbed: bool,
        grabs: usize,
        refuse_grab: bool,
    }

    impl TouchSource for FakeSource {
        fn open(_: &Path) -> Result<Self, InputError> {
            Ok(Self::default())
        }

        fn grab(&mut self) -> Result<(), InputError> {
            if self.refuse_grab {
                return Err(InputError::GrabFailed(io::Error::from(
                    io::ErrorKind::PermissionDenied,
                )));
            }
            self.grabbed = true;
            self.grabs += 1;
            Ok(())
        }

        fn ungrab(&mut self) -> Result<(), InputError> {
            self.grabbed = false;
            Ok(())
        }

        fn slot_count(&self) -> usize {
            2
        }

        fn read_batch(&mut self) -> Result<Vec<TouchEvent>, InputError> {
            Err(InputError::Interrupted)
        }
    }

    #[test]
    fn grab_is_released_on_drop() {
        let mut source = FakeSource::open(Path::new("/dev/null")).expect("fake source");
        {
            let mut guard = Grabbed::acquire(&mut source).expect("grab");
            assert!(guard.grabbed);
            assert!(matches!(guard.read_batch(), Err(InputError::Interrupted)));
        }
        assert!(!source.grabbed);
        assert_eq!(source.grabs, 1);
    }

    #[test]
    fn grab_is_released_when_loop_bails_out() {
        fn run(source: &mut FakeSource) -> Result<(), InputError> {
            let mut guard = Grabbed::acquire(source)?;
            guard.read_batch()?;
            Ok(())
        }

        let mut source = FakeSource::default();
        assert!(run(&mut source).is_err());
        assert!(!source.grabbed);
    }

    #[test]
    fn refused_grab_reports_permission_problem() {
        let mut source = FakeSource {
            refuse_grab: true,
            ..FakeSource::default()
        };
        let err = Grabbed::acquire(&mut source).err().expect("grab refused");
        assert!(err.is_permission_denied());
    }

    #[test]
    fn open_error_classification() {
        let path = Path::new("/dev/input/event3");
        let denied = InputError::open(path, io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(denied.is_permission_denied());
        assert_eq!(
            denied.to_string(),
            "permission denied opening /dev/input/event3"
        );

        let missing = InputError::open(path, io::Error::from(io::ErrorKind::NotFound));
        assert!(!missing.is_permission_denied());
    }
}

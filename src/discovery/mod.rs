#[cfg(target_os = "linux")]
pub mod udev_discovery;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub devnode: PathBuf,
    pub name: Option<String>,
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("udev error: {0}")]
    UdevError(#[from] std::io::Error),
    #[error("no touchscreen found, pass --device explicitly")]
    NotFound,
}

pub trait DeviceDiscovery {
    fn find_touchscreens() -> Result<Vec<DeviceInfo>, DiscoveryError>;
}

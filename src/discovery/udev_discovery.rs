use super::{DeviceDiscovery, DeviceInfo, DiscoveryError};
use std::path::PathBuf;

pub struct UdevDiscovery;

impl DeviceDiscovery for UdevDiscovery {
    fn find_touchscreens() -> Result<Vec<DeviceInfo>, DiscoveryError> {
        let mut enumerator = udev::Enumerator::new()?;
        enumerator.match_subsystem("input")?;
        enumerator.match_property("ID_INPUT_TOUCHSCREEN", "1")?;

        let mut results = Vec::new();
        for device in enumerator.scan_devices()? {
            // only evdev nodes, not the parent inputN or legacy mouseN/jsN
            let sysname = device.sysname().to_string_lossy();
            if !sysname.starts_with("event") {
                continue;
            }

            if let Some(devnode) = device.devnode() {
                let name = device
                    .parent()
                    .and_then(|parent| {
                        parent
                            .property_value("NAME")
                            .map(|n| n.to_string_lossy().trim_matches('"').to_string())
                    });
                log::debug!("touchscreen candidate {} ({:?})", devnode.display(), name);
                results.push(DeviceInfo {
                    devnode: PathBuf::from(devnode),
                    name,
                });
            }
        }

        if results.is_empty() {
            Err(DiscoveryError::NotFound)
        } else {
            Ok(results)
        }
    }
}

//! Remote control receivers which report codes through a Linux input device.
//! The receiver reports each decoded code as `EV_MSC`, and release as the
//! reserved code `0xffffffff`. Any `EV_SW` events from the same device are
//! passed on as is.

use crate::clock::system_time_to_ticks;
use evdev::{Device, InputEventKind};
use nix::fcntl::{fcntl, FcntlArg, OFlag};
use std::{
    fmt, fs, io,
    os::unix::{
        fs::FileTypeExt,
        io::{AsRawFd, RawFd},
    },
    path::{Path, PathBuf},
};

/// Only the first few event devices are probed
pub const MAX_EVENT_DEVICES: u32 = 10;

pub const DEFAULT_DEVICE_NAME: &str = "FAB4 IR";

/// Input read from the device
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DeviceEvent {
    Code { code: u32, ticks: u32 },
    Switch { code: u16, value: i32, ticks: u32 },
}

impl DeviceEvent {
    pub fn from_input(kind: InputEventKind, value: i32, ticks: u32) -> Option<Self> {
        match kind {
            InputEventKind::Misc(_) => Some(DeviceEvent::Code {
                code: value as u32,
                ticks,
            }),
            InputEventKind::Switch(switch) => Some(DeviceEvent::Switch {
                code: switch.0,
                value,
                ticks,
            }),
            _ => None,
        }
    }
}

pub fn event_device_paths() -> impl Iterator<Item = PathBuf> {
    (0..MAX_EVENT_DEVICES).map(|n| PathBuf::from(format!("/dev/input/event{n}")))
}

pub struct InputDevice {
    path: PathBuf,
    device: Device,
}

impl InputDevice {
    pub fn open(path: &Path) -> io::Result<Self> {
        if !fs::metadata(path)?.file_type().is_char_device() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a character device",
            ));
        }

        let device = Device::open(path)?;

        Ok(InputDevice {
            path: path.to_owned(),
            device,
        })
    }

    /// Find the first event device whose name contains `name`
    pub fn probe(name: &str) -> Option<Self> {
        for path in event_device_paths() {
            let dev = match InputDevice::open(&path) {
                Ok(dev) => dev,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => {
                    log::debug!("{}: {e}", path.display());
                    continue;
                }
            };

            if dev.name().contains(name) {
                log::debug!("{dev}: using as remote control receiver");

                return Some(dev);
            }

            log::info!("{dev}: skipping input device");
        }

        None
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        self.device.name().unwrap_or_default()
    }

    pub fn set_nonblocking(&self) -> io::Result<()> {
        fcntl(self.device.as_raw_fd(), FcntlArg::F_SETFL(OFlag::O_NONBLOCK))?;

        Ok(())
    }

    /// Read all pending events. Returns once the device would block.
    pub fn read_events<F>(&mut self, mut callback: F) -> io::Result<()>
    where
        F: FnMut(DeviceEvent),
    {
        match self.device.fetch_events() {
            Ok(events) => {
                for ev in events {
                    let ticks = system_time_to_ticks(ev.timestamp());

                    if let Some(ev) = DeviceEvent::from_input(ev.kind(), ev.value(), ticks) {
                        callback(ev);
                    }
                }

                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl AsRawFd for InputDevice {
    fn as_raw_fd(&self) -> RawFd {
        self.device.as_raw_fd()
    }
}

impl fmt::Display for InputDevice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.path.display(), self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evdev::{Key, MiscType, SwitchType, Synchronization};

    #[test]
    fn event_kinds() {
        assert_eq!(
            DeviceEvent::from_input(InputEventKind::Misc(MiscType::MSC_RAW), -1, 10),
            Some(DeviceEvent::Code {
                code: 0xffff_ffff,
                ticks: 10
            })
        );

        assert_eq!(
            DeviceEvent::from_input(InputEventKind::Misc(MiscType::MSC_RAW), 0x7689a05f, 10),
            Some(DeviceEvent::Code {
                code: 0x7689a05f,
                ticks: 10
            })
        );

        assert_eq!(
            DeviceEvent::from_input(
                InputEventKind::Switch(SwitchType::SW_HEADPHONE_INSERT),
                1,
                20
            ),
            Some(DeviceEvent::Switch {
                code: SwitchType::SW_HEADPHONE_INSERT.0,
                value: 1,
                ticks: 20
            })
        );

        assert_eq!(
            DeviceEvent::from_input(
                InputEventKind::Synchronization(Synchronization::SYN_REPORT),
                0,
                20
            ),
            None
        );

        assert_eq!(
            DeviceEvent::from_input(InputEventKind::Key(Key::KEY_PLAY), 1, 20),
            None
        );
    }

    #[test]
    fn paths() {
        let paths: Vec<PathBuf> = event_device_paths().collect();

        assert_eq!(paths.len(), 10);
        assert_eq!(paths[0], PathBuf::from("/dev/input/event0"));
        assert_eq!(paths[9], PathBuf::from("/dev/input/event9"));
    }

    #[test]
    fn not_a_device() {
        let e = InputDevice::open(Path::new("testdata/keytables/fab4.toml")).err().unwrap();

        assert_eq!(e.kind(), io::ErrorKind::InvalidInput);
    }
}

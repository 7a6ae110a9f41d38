use rckeys::inputdev::{event_device_paths, InputDevice};
use std::io::ErrorKind;

pub fn list() {
    for path in event_device_paths() {
        match InputDevice::open(&path) {
            Ok(dev) => println!("{}: {}", dev.path().display(), dev.name()),
            Err(e) if e.kind() == ErrorKind::NotFound => (),
            Err(e) => println!("{}: {e}", path.display()),
        }
    }
}

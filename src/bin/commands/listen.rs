use itertools::Itertools;
use rckeys::{
    classifier::Classifier,
    clock::RealtimeClock,
    inputdev::InputDevice,
    lircd::Lircd,
    pump::{Pump, PumpEvent},
    uevent::UeventSocket,
};

pub fn listen(listen: &crate::Listen) {
    let classifier = Classifier::new(super::normalizer(&listen.classify), RealtimeClock);

    let mut pump = match Pump::new(classifier) {
        Ok(pump) => pump,
        Err(e) => {
            log::error!("poll: {e}");
            std::process::exit(1);
        }
    };

    let mut sources = Vec::new();

    if !listen.no_device {
        match InputDevice::probe(&listen.device_name) {
            Some(dev) => {
                let name = dev.to_string();

                match pump.add_input(dev) {
                    Ok(()) => sources.push(name),
                    Err(e) => log::warn!("{name}: {e}"),
                }
            }
            None => log::warn!("no input device named ‘{}’ found", listen.device_name),
        }
    }

    if !listen.no_lircd {
        match Lircd::connect(&listen.lircd) {
            Ok(lircd) => {
                let name = lircd.path().display().to_string();

                match pump.add_lircd(lircd) {
                    Ok(()) => sources.push(name),
                    Err(e) => log::warn!("{name}: {e}"),
                }
            }
            Err(e) => log::warn!("{}: {e}", listen.lircd.display()),
        }
    }

    if listen.uevents {
        match UeventSocket::open().and_then(|socket| pump.add_uevent(socket)) {
            Ok(()) => sources.push("uevents".to_owned()),
            Err(e) => log::warn!("uevent socket: {e}"),
        }
    }

    if !pump.has_sources() {
        log::error!("no remote control sources available");
        std::process::exit(1);
    }

    log::info!("listening on {}", sources.iter().join(", "));

    loop {
        let res = pump.cycle(Some(listen.poll_timeout), |ev| match ev {
            PumpEvent::Key(ev) => {
                if listen.classify.wanted(ev.kind) {
                    println!("{ev}");
                }
            }
            PumpEvent::Switch { code, value, ticks } => {
                println!("switch code={code:#x} value={value} ticks={ticks}");
            }
            PumpEvent::Uevent(uevent) => {
                println!("uevent {uevent}");
            }
        });

        if let Err(e) = res {
            log::error!("{e}");
            std::process::exit(1);
        }
    }
}

//! Kernel hotplug notifications, received on a netlink socket

use nix::{
    errno::Errno,
    sys::socket::{
        bind, recv, setsockopt, socket, sockopt, AddressFamily, MsgFlags, NetlinkAddr, SockFlag,
        SockProtocol, SockType,
    },
};
use std::{
    fmt, io,
    os::fd::{AsRawFd, OwnedFd, RawFd},
};

const RECEIVE_BUFFER_SIZE: usize = 16 * 1024 * 1024;
const KERNEL_GROUP: u32 = 1;

/// A single uevent, e.g. `add@/devices/virtual/input/input5` followed by
/// its environment
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Uevent {
    pub header: String,
    pub vars: Vec<(String, String)>,
}

impl Uevent {
    /// Parse a netlink datagram. Entries without `=` are skipped.
    pub fn parse(buf: &[u8]) -> Option<Uevent> {
        let mut parts = buf.split(|b| *b == 0);

        let header = parts.next().filter(|h| !h.is_empty())?;

        let vars = parts
            .filter_map(|part| {
                let part = String::from_utf8_lossy(part);
                let (key, value) = part.split_once('=')?;

                Some((key.to_owned(), value.to_owned()))
            })
            .collect();

        Some(Uevent {
            header: String::from_utf8_lossy(header).into_owned(),
            vars,
        })
    }

    /// The action from the header, e.g. `add` or `remove`
    pub fn action(&self) -> Option<&str> {
        self.header.split_once('@').map(|(action, _)| action)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for Uevent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.header)?;

        for (key, value) in &self.vars {
            write!(f, " {key}={value}")?;
        }

        Ok(())
    }
}

/// Non-blocking netlink socket subscribed to kernel uevents
pub struct UeventSocket {
    fd: OwnedFd,
}

impl UeventSocket {
    pub fn open() -> io::Result<Self> {
        let fd = socket(
            AddressFamily::Netlink,
            SockType::Datagram,
            SockFlag::SOCK_NONBLOCK | SockFlag::SOCK_CLOEXEC,
            SockProtocol::NetlinkKObjectUEvent,
        )?;

        // needs CAP_NET_ADMIN, the default size will do otherwise
        if let Err(e) = setsockopt(&fd, sockopt::RcvBufForce, &RECEIVE_BUFFER_SIZE) {
            log::debug!("uevent: cannot set receive buffer size: {e}");
        }

        bind(
            fd.as_raw_fd(),
            &NetlinkAddr::new(std::process::id(), KERNEL_GROUP),
        )?;

        Ok(UeventSocket { fd })
    }

    #[cfg(test)]
    pub(crate) fn from_fd(fd: OwnedFd) -> Self {
        UeventSocket { fd }
    }

    /// Receive all pending uevents. Receive errors are logged, they never
    /// stop remote control input.
    pub fn receive<F>(&mut self, mut callback: F)
    where
        F: FnMut(Uevent),
    {
        let mut buf = [0u8; 2048];

        loop {
            match recv(self.fd.as_raw_fd(), &mut buf, MsgFlags::empty()) {
                Ok(len) => match Uevent::parse(&buf[..len]) {
                    Some(uevent) => callback(uevent),
                    None => log::trace!("uevent: empty message"),
                },
                Err(Errno::EAGAIN) => return,
                Err(Errno::EINTR) => (),
                // the kernel dropped messages, the rest is still queued
                Err(Errno::ENOBUFS) => log::warn!("uevent: receive buffer overrun"),
                Err(e) => {
                    log::warn!("uevent: {e}");
                    return;
                }
            }
        }
    }
}

impl AsRawFd for UeventSocket {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }
}

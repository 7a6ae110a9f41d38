//! Client for the lircd socket. lircd decodes IR and broadcasts a line like
//! `0000000000f40bf0 00 KEY_UP ANY` to every connected client for each
//! decoded code: the code, the repeat counter, the key name and the remote.

use crate::normalize::{KeyName, RawInput};
use std::{
    io::{self, ErrorKind, Read},
    os::unix::{
        io::{AsRawFd, RawFd},
        net::UnixStream,
    },
    path::{Path, PathBuf},
};

pub const DEFAULT_SOCKET: &str = "/var/run/lirc/lircd";

/// One decoded line from lircd
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct LircdCode<'a> {
    pub code: u64,
    pub repeat: &'a str,
    pub key: &'a str,
    pub remote: &'a str,
}

impl<'a> LircdCode<'a> {
    /// Parse a line; lines which are not decoded codes give `None`
    pub fn parse(line: &'a str) -> Option<Self> {
        let mut words = line.split_whitespace();

        let code = u64::from_str_radix(words.next()?, 16).ok()?;
        let repeat = words.next()?;
        let key = words.next()?;
        let remote = words.next()?;

        if words.next().is_some() {
            return None;
        }

        Some(LircdCode {
            code,
            repeat,
            key,
            remote,
        })
    }

    pub fn input(&self, ticks: u32) -> RawInput<'a> {
        RawInput::Named {
            command: None,
            key: Some(KeyName {
                name: self.key,
                repeat: self.repeat,
            }),
            ticks,
        }
    }
}

/// lircd lines are short; anything longer than this is not lircd
const MAX_LINE: usize = 4096;

/// Collects bytes until complete lines are available
#[derive(Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
    overflow: bool,
}

impl LineBuffer {
    pub fn push<F>(&mut self, data: &[u8], mut callback: F)
    where
        F: FnMut(&str),
    {
        self.buf.extend_from_slice(data);

        let mut start = 0;

        while let Some(pos) = self.buf[start..].iter().position(|b| *b == b'\n') {
            let line = &self.buf[start..start + pos];

            if self.overflow {
                // tail of an overlong line
                self.overflow = false;
            } else {
                match std::str::from_utf8(line) {
                    Ok(line) => callback(line.trim_end_matches('\r')),
                    Err(_) => log::trace!("lircd: dropping line which is not utf-8"),
                }
            }

            start += pos + 1;
        }

        self.buf.drain(..start);

        if self.buf.len() > MAX_LINE {
            log::trace!("lircd: dropping line longer than {MAX_LINE} bytes");
            self.buf.clear();
            self.overflow = true;
        }
    }

    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

/// Non-blocking connection to lircd
pub struct Lircd {
    path: PathBuf,
    stream: UnixStream,
    lines: LineBuffer,
}

impl Lircd {
    pub fn connect(path: &Path) -> io::Result<Self> {
        let stream = UnixStream::connect(path)?;

        stream.set_nonblocking(true)?;

        Ok(Lircd {
            path: path.to_owned(),
            stream,
            lines: LineBuffer::default(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read everything available and call back for each decoded code.
    /// Returns once the socket would block.
    pub fn read_codes<F>(&mut self, mut callback: F) -> io::Result<()>
    where
        F: FnMut(LircdCode),
    {
        let mut buf = [0u8; 1024];

        loop {
            match self.stream.read(&mut buf) {
                Ok(0) => {
                    return Err(io::Error::new(
                        ErrorKind::UnexpectedEof,
                        "lircd closed the connection",
                    ))
                }
                Ok(len) => self.lines.push(&buf[..len], |line| {
                    match LircdCode::parse(line) {
                        Some(code) => callback(code),
                        None => log::trace!("lircd: ignoring ‘{line}’"),
                    }
                }),
                Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(()),
                Err(e) if e.kind() == ErrorKind::Interrupted => (),
                Err(e) => return Err(e),
            }
        }
    }
}

impl AsRawFd for Lircd {
    fn as_raw_fd(&self) -> RawFd {
        self.stream.as_raw_fd()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_line() {
        assert_eq!(
            LircdCode::parse("0000000000f40bf0 00 KEY_UP ANY"),
            Some(LircdCode {
                code: 0xf40bf0,
                repeat: "00",
                key: "KEY_UP",
                remote: "ANY"
            })
        );

        assert_eq!(LircdCode::parse("BEGIN"), None);
        assert_eq!(LircdCode::parse("SIGHUP"), None);
        assert_eq!(LircdCode::parse("0000000000f40bf0 00 KEY_UP"), None);
        assert_eq!(LircdCode::parse("0000000000f40bf0 00 KEY_UP ANY extra"), None);
        assert_eq!(LircdCode::parse("xyz 00 KEY_UP ANY"), None);
    }

    #[test]
    fn input() {
        let code = LircdCode::parse("0000000000f40bf0 1a KEY_UP ANY").unwrap();

        assert_eq!(
            code.input(77),
            RawInput::Named {
                command: None,
                key: Some(KeyName {
                    name: "KEY_UP",
                    repeat: "1a"
                }),
                ticks: 77
            }
        );
    }

    #[test]
    fn partial_lines() {
        let mut lines = LineBuffer::default();
        let mut seen = Vec::new();

        lines.push(b"0000000000f40bf0 00 KEY", |l| seen.push(l.to_owned()));

        assert!(seen.is_empty());
        assert_eq!(lines.pending(), 23);

        lines.push(b"_UP ANY\r\n0000000000f40bf0 01 KEY_UP ANY\nBEG", |l| {
            seen.push(l.to_owned())
        });

        assert_eq!(
            seen,
            vec![
                "0000000000f40bf0 00 KEY_UP ANY",
                "0000000000f40bf0 01 KEY_UP ANY"
            ]
        );
        assert_eq!(lines.pending(), 3);
    }

    #[test]
    fn overlong_line() {
        let mut lines = LineBuffer::default();
        let mut seen = Vec::new();

        lines.push(&[b'a'; MAX_LINE + 1], |l| seen.push(l.to_owned()));

        assert_eq!(lines.pending(), 0);

        lines.push(b"aaaa\n0000000000f40bf0 00 KEY_UP ANY\n", |l| {
            seen.push(l.to_owned())
        });

        assert_eq!(seen, vec!["0000000000f40bf0 00 KEY_UP ANY"]);
        assert_eq!(lines.pending(), 0);
    }
}

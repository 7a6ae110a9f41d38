//! Classify remote control input into key lifecycle events.
//!
//! Samples from a remote control source are first resolved to a command
//! code by the [`normalize::Normalizer`], and then run through the press
//! [`session::Session`], which emits down, repeat, hold, press and up events.

pub mod classifier;
pub mod clock;
pub mod event;
pub mod inputdev;
pub mod keytable;
pub mod lircd;
pub mod normalize;
pub mod pump;
pub mod replay;
pub mod session;
pub mod uevent;

//! # MultiTx Library
//!
//! Drive a JP4in1 multiprotocol RF transmitter module over USB serial.
//!
//! This library encodes 16-channel RC command values into the module's
//! compact serial frames and sequences the link protocol: priming, an
//! optional bind burst, failsafe configuration, and the steady-state
//! control stream.

pub mod config;
pub mod error;
pub mod flash;
pub mod multi;
pub mod serial;
pub mod session;

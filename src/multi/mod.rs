//! # Multi Serial Protocol Module
//!
//! Implementation of the JP4in1 multiprotocol module serial protocol.
//!
//! This module handles:
//! - Channel value encoding (16 channels, 11-bit resolution, LSB-first packing)
//! - Frame assembly for the four frame kinds (control, bind, priming, failsafe)
//! - Protocol family selection (FrSky V8 / D8 / D16)

pub mod encoder;
pub mod frame;
pub mod protocol;

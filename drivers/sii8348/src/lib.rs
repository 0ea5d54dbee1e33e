//! SiI8348 MHL transmitter - protocol and state engine
//! Register access and board signals are supplied by the caller through `hal`.

#![cfg_attr(not(test), no_std)]

// ===== Hardware seams and shared types =====
pub mod config;     // Timing constants and driver options
pub mod error;      // Error types
pub mod hal;        // Register bus and platform traits
pub mod regs;       // Register map
pub mod mhl;        // MHL protocol constants and local device capabilities
pub mod notify;     // Upward event report
pub mod state;      // Link, video and EDID read state machines

// ===== Engine =====
mod device;         // Device context and locked handle
pub mod intr;       // Interrupt dispatch
pub mod cbus;       // CBUS command encoder
pub mod edid;       // EDID block reader
pub mod video;      // Video and audio sequencer
mod lifecycle;      // Chip bring-up, discovery and power states

#[cfg(feature = "hdcp")]
pub mod hdcp;       // Content protection sequencing

#[cfg(test)]
pub(crate) mod testing;

pub use cbus::CbusRequest;
pub use config::DriverConfig;
pub use device::{ChipId, MhlTx, Sii8348};
pub use edid::parser::{CeaEdid, EdidParser};
pub use error::{EdidError, MhlError, Result};
pub use hal::{BusError, Platform, RegAddr, RegisterBus};
pub use notify::{DrvIntrFlags, InterruptInfo};
pub use state::{EdidReadState, LinkState, VideoState};
pub use video::audio::AudioMode;

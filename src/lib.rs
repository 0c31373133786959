//! ESP32-MeshKit-Sense board support.
//!
//! [`board::BoardManager`] brings up the board's GPIO outputs, I²C bus 0
//! and SPI bus 2 behind the [`ports::BoardHal`] port, and controls the
//! sensor and screen power rails.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]`; on the host the
//! [`adapters::sim::SimBoardHal`] stands in for the hardware.

#![deny(unused_must_use)]

pub mod adapters;
pub mod board;
pub mod config;
pub mod error;
pub mod pins;
pub mod ports;

pub use board::{BoardManager, BoardStatus, ResourceId};
pub use config::{BoardConfig, ConfigError};
pub use error::{BoardError, BusId, DriverStatus};

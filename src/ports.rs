//! Port trait — the boundary between the board manager and the vendor SDK.
//!
//! ```text
//!   BoardManager ──▶ BoardHal ──▶ EspBoardHal (ESP-IDF)
//!                             └─▶ SimBoardHal (host)
//! ```
//!
//! The GPIO, I²C and SPI drivers are black boxes reached only through
//! [`BoardHal`].  Bus handles are associated types owned by value, so a
//! handle exists exactly as long as the bus is live.

pub use embedded_hal::digital::PinState;

use crate::config::{I2cBusConfig, SpiBusConfig};
use crate::error::DriverStatus;

/// ESP-IDF `gpio_num_t`.
pub type GpioNum = i32;

/// Digital output configuration for a group of pins (`gpio_config_t`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    pub pin_bit_mask: u64,
    pub pull_up: bool,
    pub pull_down: bool,
}

impl OutputConfig {
    /// Push-pull outputs, no pulls, interrupts disabled.
    pub const fn push_pull(pin_bit_mask: u64) -> Self {
        Self {
            pin_bit_mask,
            pull_up: false,
            pull_down: false,
        }
    }
}

/// A bus the driver refused to release, handed back to its owner.
#[derive(Debug)]
pub struct Retained<B> {
    pub bus: B,
    pub status: DriverStatus,
}

/// Vendor SDK operations the board needs.
pub trait BoardHal {
    /// Live I²C bus driver.
    type I2cBus;
    /// Live SPI bus driver.
    type SpiBus;

    /// Configure every pin in `cfg.pin_bit_mask` as a digital output.
    fn configure_outputs(&mut self, cfg: &OutputConfig) -> Result<(), DriverStatus>;

    fn i2c_bus_create(&mut self, cfg: &I2cBusConfig) -> Result<Self::I2cBus, DriverStatus>;

    /// Tear the bus down.  On failure the handle comes back in [`Retained`].
    fn i2c_bus_delete(&mut self, bus: Self::I2cBus) -> Result<(), Retained<Self::I2cBus>>;

    fn spi_bus_create(&mut self, cfg: &SpiBusConfig) -> Result<Self::SpiBus, DriverStatus>;

    /// Tear the bus down.  On failure the handle comes back in [`Retained`].
    fn spi_bus_delete(&mut self, bus: Self::SpiBus) -> Result<(), Retained<Self::SpiBus>>;

    /// Drive an output pin.
    fn set_level(&mut self, pin: GpioNum, level: PinState) -> Result<(), DriverStatus>;

    /// Read back a pin's current level.
    fn level(&self, pin: GpioNum) -> PinState;
}

//! In-memory board used on the host.
//!
//! Behaves like the ESP-IDF drivers where it matters to the board manager:
//! a pin must be configured before it can be driven, and a bus port can
//! only be installed once until it is deleted.

use crate::config::{I2cBusConfig, SpiBusConfig};
use crate::error::DriverStatus;
use crate::ports::{BoardHal, GpioNum, OutputConfig, PinState, Retained};

/// Live simulated I²C bus.
#[derive(Debug, PartialEq, Eq)]
pub struct SimI2cBus {
    port: u8,
    id: u32,
}

impl SimI2cBus {
    pub fn port(&self) -> u8 {
        self.port
    }

    /// Unique per create, so a re-created bus is distinguishable.
    pub fn id(&self) -> u32 {
        self.id
    }
}

/// Live simulated SPI bus.
#[derive(Debug, PartialEq, Eq)]
pub struct SimSpiBus {
    host: u8,
    id: u32,
}

impl SimSpiBus {
    pub fn host(&self) -> u8 {
        self.host
    }

    pub fn id(&self) -> u32 {
        self.id
    }
}

#[derive(Debug, Default)]
pub struct SimBoardHal {
    outputs: u64,
    levels: u64,
    i2c_ports: u8,
    spi_hosts: u8,
    next_id: u32,
}

impl SimBoardHal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_output(&self, pin: GpioNum) -> bool {
        bit(pin).is_some_and(|b| self.outputs & b != 0)
    }

    /// Current level of `pin`, configured or not.
    pub fn pin(&self, pin: GpioNum) -> PinState {
        PinState::from(bit(pin).is_some_and(|b| self.levels & b != 0))
    }

    pub fn live_i2c_buses(&self) -> u32 {
        self.i2c_ports.count_ones()
    }

    pub fn live_spi_buses(&self) -> u32 {
        self.spi_hosts.count_ones()
    }

    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

fn bit(pin: GpioNum) -> Option<u64> {
    (0..64).contains(&pin).then(|| 1u64 << pin)
}

impl BoardHal for SimBoardHal {
    type I2cBus = SimI2cBus;
    type SpiBus = SimSpiBus;

    fn configure_outputs(&mut self, cfg: &OutputConfig) -> Result<(), DriverStatus> {
        if cfg.pin_bit_mask == 0 {
            return Err(DriverStatus::INVALID_ARG);
        }
        self.outputs |= cfg.pin_bit_mask;
        // Freshly configured outputs start LOW.
        self.levels &= !cfg.pin_bit_mask;
        Ok(())
    }

    fn i2c_bus_create(&mut self, cfg: &I2cBusConfig) -> Result<SimI2cBus, DriverStatus> {
        let port = 1u8.checked_shl(u32::from(cfg.port)).ok_or(DriverStatus::INVALID_ARG)?;
        if self.i2c_ports & port != 0 {
            return Err(DriverStatus::INVALID_STATE);
        }
        self.i2c_ports |= port;
        Ok(SimI2cBus { port: cfg.port, id: self.next_id() })
    }

    fn i2c_bus_delete(&mut self, bus: SimI2cBus) -> Result<(), Retained<SimI2cBus>> {
        self.i2c_ports &= !(1u8 << bus.port);
        Ok(())
    }

    fn spi_bus_create(&mut self, cfg: &SpiBusConfig) -> Result<SimSpiBus, DriverStatus> {
        let host = 1u8.checked_shl(u32::from(cfg.host)).ok_or(DriverStatus::INVALID_ARG)?;
        if self.spi_hosts & host != 0 {
            return Err(DriverStatus::INVALID_STATE);
        }
        self.spi_hosts |= host;
        Ok(SimSpiBus { host: cfg.host, id: self.next_id() })
    }

    fn spi_bus_delete(&mut self, bus: SimSpiBus) -> Result<(), Retained<SimSpiBus>> {
        self.spi_hosts &= !(1u8 << bus.host);
        Ok(())
    }

    fn set_level(&mut self, pin: GpioNum, level: PinState) -> Result<(), DriverStatus> {
        let b = bit(pin)
            .filter(|b| self.outputs & b != 0)
            .ok_or(DriverStatus::INVALID_ARG)?;
        match level {
            PinState::High => self.levels |= b,
            PinState::Low => self.levels &= !b,
        }
        Ok(())
    }

    fn level(&self, pin: GpioNum) -> PinState {
        self.pin(pin)
    }
}

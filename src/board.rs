//! Board lifecycle and power-rail control.
//!
//! [`BoardManager`] owns the HAL, the bus handles and the two guard flags.
//! Bring-up order is GPIO → I²C 0 → SPI 2 → default power states.  Every
//! stage fails fast; nothing already brought up is rolled back, and a
//! repeated `init` skips whatever is still live.
//!
//! ## Power rails
//!
//! Both power switches are active LOW.  Setters invert before driving the
//! pin.  [`BoardManager::sensor_power`] inverts the level it reads back;
//! [`BoardManager::screen_power`] reports the raw pin level.

use core::fmt;

use log::{error, info};

use crate::config::{BoardConfig, ConfigError};
use crate::error::{BoardError, BusId};
use crate::pins;
use crate::ports::{BoardHal, GpioNum, OutputConfig, PinState, Retained};

const TAG: &str = "board";

/// Log a failed stage as `file:line (module): message` and return its error.
macro_rules! board_check {
    ($res:expr, $msg:literal) => {
        match $res {
            Ok(v) => v,
            Err(e) => {
                error!(target: TAG, "{}:{} ({}): {}: {}", file!(), line!(), module_path!(), $msg, e);
                return Err(e);
            }
        }
    };
}

// ── Resource ids ──────────────────────────────────────────────

/// Identifier for a board-owned resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceId(pub u32);

impl ResourceId {
    /// I²C bus 0.
    pub const I2C0: Self = Self(1);
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::I2C0 => write!(f, "i2c0"),
            Self(raw) => write!(f, "resource#{}", raw),
        }
    }
}

// ── Status snapshot ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoardStatus {
    pub initialized: bool,
    pub gpio_initialized: bool,
    pub i2c0_live: bool,
    pub spi2_live: bool,
}

// ── BoardManager ──────────────────────────────────────────────

pub struct BoardManager<H: BoardHal> {
    hal: H,
    config: BoardConfig,
    board_initialized: bool,
    gpio_initialized: bool,
    i2c0: Option<H::I2cBus>,
    spi2: Option<H::SpiBus>,
}

impl<H: BoardHal> BoardManager<H> {
    /// Validate `config` and take ownership of the HAL.  Nothing is touched
    /// until [`init`](Self::init).
    pub fn new(config: BoardConfig, hal: H) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            hal,
            config,
            board_initialized: false,
            gpio_initialized: false,
            i2c0: None,
            spi2: None,
        })
    }

    pub fn init(&mut self) -> Result<(), BoardError> {
        if self.board_initialized {
            return Ok(());
        }

        board_check!(self.gpio_init(), "gpio init failed");
        board_check!(self.i2c_bus_init(), "i2c init failed");
        board_check!(self.spi_bus_init(), "spi init failed");

        let BoardConfig { sensor_default_on, screen_default_on, .. } = self.config;
        board_check!(self.set_sensor_power(sensor_default_on), "sensor power init failed");
        board_check!(self.set_screen_power(screen_default_on), "screen power init failed");

        self.board_initialized = true;
        info!(target: TAG, "Board Info: {}", self.info());
        info!(target: TAG, "Init Done ...");
        Ok(())
    }

    /// Power rails that default on are switched off first, while GPIO is
    /// still configured, and GPIO goes last so a failed deinit can be
    /// retried.
    pub fn deinit(&mut self) -> Result<(), BoardError> {
        if !self.board_initialized {
            return Ok(());
        }

        if self.config.sensor_default_on {
            board_check!(self.set_sensor_power(false), "sensor power off failed");
        }
        if self.config.screen_default_on {
            board_check!(self.set_screen_power(false), "screen power off failed");
        }

        board_check!(self.i2c_bus_deinit(), "i2c de-init failed");
        board_check!(self.spi_bus_deinit(), "spi de-init failed");
        self.gpio_deinit();

        self.board_initialized = false;
        info!(target: TAG, "Deinit Done ...");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.board_initialized
    }

    /// Only [`ResourceId::I2C0`] maps to a handle.
    pub fn resource_handle(&self, id: ResourceId) -> Option<&H::I2cBus> {
        match id {
            ResourceId::I2C0 => self.i2c0.as_ref(),
            _ => None,
        }
    }

    pub fn spi_bus(&self) -> Option<&H::SpiBus> {
        self.spi2.as_ref()
    }

    pub fn info(&self) -> &'static str {
        pins::BOARD_NAME
    }

    pub fn status(&self) -> BoardStatus {
        BoardStatus {
            initialized: self.board_initialized,
            gpio_initialized: self.gpio_initialized,
            i2c0_live: self.i2c0.is_some(),
            spi2_live: self.spi2.is_some(),
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn hal(&self) -> &H {
        &self.hal
    }

    /// Direct driver access.  Bus handles stay owned by the manager.
    pub fn hal_mut(&mut self) -> &mut H {
        &mut self.hal
    }

    /// Deinit the board and give the HAL back.  If teardown fails the
    /// manager is returned with its remaining buses still owned.
    pub fn into_hal(mut self) -> Result<H, (Self, BoardError)> {
        match self.deinit() {
            Ok(()) => Ok(self.hal),
            Err(e) => Err((self, e)),
        }
    }

    // ── Power rails ───────────────────────────────────────────

    pub fn set_sensor_power(&mut self, on: bool) -> Result<(), BoardError> {
        self.drive_active_low(self.config.pins.sensor_power_n, on)
    }

    pub fn sensor_power(&self) -> bool {
        if !self.gpio_initialized {
            return false;
        }
        self.hal.level(self.config.pins.sensor_power_n) == PinState::Low
    }

    pub fn set_screen_power(&mut self, on: bool) -> Result<(), BoardError> {
        self.drive_active_low(self.config.pins.screen_power_n, on)
    }

    /// Raw pin level: HIGH reads as `true`, which means the rail is *off*.
    // TODO: confirm with hardware owners whether this should invert like `sensor_power`.
    pub fn screen_power(&self) -> bool {
        if !self.gpio_initialized {
            return false;
        }
        self.hal.level(self.config.pins.screen_power_n) == PinState::High
    }

    fn drive_active_low(&mut self, pin: GpioNum, on: bool) -> Result<(), BoardError> {
        if !self.gpio_initialized {
            return Err(BoardError::NotInitialized);
        }
        self.hal
            .set_level(pin, PinState::from(!on))
            .map_err(BoardError::ConfigurationFailed)
    }

    // ── Stages ────────────────────────────────────────────────

    fn gpio_init(&mut self) -> Result<(), BoardError> {
        if self.gpio_initialized {
            return Ok(());
        }
        let cfg = OutputConfig::push_pull(self.config.pins.output_mask);
        self.hal
            .configure_outputs(&cfg)
            .map_err(BoardError::ConfigurationFailed)?;
        self.gpio_initialized = true;
        Ok(())
    }

    fn gpio_deinit(&mut self) {
        self.gpio_initialized = false;
    }

    fn i2c_bus_init(&mut self) -> Result<(), BoardError> {
        if !self.config.i2c0_enabled || self.i2c0.is_some() {
            return Ok(());
        }
        let bus = self
            .hal
            .i2c_bus_create(&self.config.pins.i2c0)
            .map_err(|status| BoardError::BusCreateFailed { bus: BusId::I2c0, status })?;
        self.i2c0 = Some(bus);
        Ok(())
    }

    fn i2c_bus_deinit(&mut self) -> Result<(), BoardError> {
        let Some(bus) = self.i2c0.take() else {
            return Ok(());
        };
        if let Err(Retained { bus, status }) = self.hal.i2c_bus_delete(bus) {
            self.i2c0 = Some(bus);
            return Err(BoardError::BusDeleteFailed { bus: BusId::I2c0, status });
        }
        Ok(())
    }

    fn spi_bus_init(&mut self) -> Result<(), BoardError> {
        if !self.config.spi2_enabled || self.spi2.is_some() {
            return Ok(());
        }
        let bus = self
            .hal
            .spi_bus_create(&self.config.pins.spi2)
            .map_err(|status| BoardError::BusCreateFailed { bus: BusId::Spi2, status })?;
        self.spi2 = Some(bus);
        Ok(())
    }

    fn spi_bus_deinit(&mut self) -> Result<(), BoardError> {
        let Some(bus) = self.spi2.take() else {
            return Ok(());
        };
        if let Err(Retained { bus, status }) = self.hal.spi_bus_delete(bus) {
            self.spi2 = Some(bus);
            return Err(BoardError::BusDeleteFailed { bus: BusId::Spi2, status });
        }
        Ok(())
    }
}

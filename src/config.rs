//! Board configuration.
//!
//! Which buses are brought up, the default state of the power rails, and
//! the pin table.  [`BoardConfig::default`] describes a stock
//! ESP32-MeshKit-Sense; variants can be loaded from JSON with
//! [`BoardConfig::from_json`], where omitted fields keep their defaults.

use core::fmt;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::pins;

/// I²C master bus parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct I2cBusConfig {
    pub port: u8,
    pub sda_gpio: i32,
    pub scl_gpio: i32,
    pub sda_pullup: bool,
    pub scl_pullup: bool,
    pub clk_speed_hz: u32,
}

impl Default for I2cBusConfig {
    fn default() -> Self {
        Self {
            port: pins::I2C0_PORT,
            sda_gpio: pins::I2C0_SDA_GPIO,
            scl_gpio: pins::I2C0_SCL_GPIO,
            sda_pullup: pins::I2C0_SDA_PULLUP,
            scl_pullup: pins::I2C0_SCL_PULLUP,
            clk_speed_hz: pins::I2C0_SPEED_HZ,
        }
    }
}

/// SPI master bus parameters.  A signal set to [`pins::GPIO_NC`] is unused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpiBusConfig {
    pub host: u8,
    pub miso_gpio: i32,
    pub mosi_gpio: i32,
    pub sclk_gpio: i32,
}

impl Default for SpiBusConfig {
    fn default() -> Self {
        Self {
            host: pins::SPI2_HOST,
            miso_gpio: pins::SPI2_MISO_GPIO,
            mosi_gpio: pins::SPI2_MOSI_GPIO,
            sclk_gpio: pins::SPI2_SCLK_GPIO,
        }
    }
}

/// Pin assignments consumed by the board manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinAssignment {
    pub i2c0: I2cBusConfig,
    pub spi2: SpiBusConfig,
    /// Bitmask of every GPIO configured as a digital output.
    pub output_mask: u64,
    /// Active-low sensor rail switch.
    pub sensor_power_n: i32,
    /// Active-low screen rail switch.
    pub screen_power_n: i32,
}

impl Default for PinAssignment {
    fn default() -> Self {
        Self {
            i2c0: I2cBusConfig::default(),
            spi2: SpiBusConfig::default(),
            output_mask: pins::OUTPUT_PIN_MASK,
            sensor_power_n: pins::POWER_ON_SENSOR_N_GPIO,
            screen_power_n: pins::POWER_ON_SCREEN_N_GPIO,
        }
    }
}

/// Runtime board configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Bring up I²C bus 0 during init.
    pub i2c0_enabled: bool,
    /// Bring up SPI bus 2 during init.
    pub spi2_enabled: bool,
    /// Sensor rail state applied at init (and forced off at deinit when set).
    pub sensor_default_on: bool,
    /// Screen rail state applied at init (and forced off at deinit when set).
    pub screen_default_on: bool,
    pub pins: PinAssignment,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            i2c0_enabled: true,
            spi2_enabled: true,
            sensor_default_on: true,
            screen_default_on: false,
            pins: PinAssignment::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// ESP32 I²C controllers top out at fast-mode plus.
const I2C_MAX_SPEED_HZ: u32 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Pin number outside GPIO 0 – 39.
    InvalidPin { field: &'static str, pin: i32 },
    /// Pin must drive a signal but sits in the input-only range.
    InputOnlyPin { field: &'static str, pin: i32 },
    /// Power switch pin is not part of the output mask.
    NotInOutputMask { field: &'static str, pin: i32 },
    /// Two functions were assigned the same pin.
    PinConflict { field: &'static str, pin: i32 },
    /// I²C clock of zero or above 1 MHz.
    InvalidBusSpeed(u32),
    /// JSON could not be parsed into a configuration.
    Malformed,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPin { field, pin } => write!(f, "{field}: GPIO {pin} does not exist"),
            Self::InputOnlyPin { field, pin } => write!(f, "{field}: GPIO {pin} is input-only"),
            Self::NotInOutputMask { field, pin } => {
                write!(f, "{field}: GPIO {pin} missing from output mask")
            }
            Self::PinConflict { field, pin } => write!(f, "{field}: GPIO {pin} already assigned"),
            Self::InvalidBusSpeed(hz) => write!(f, "I2C clock {hz} Hz out of range"),
            Self::Malformed => write!(f, "malformed board configuration"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Tracks which pins have been claimed while walking the table.
struct PinClaims(u64);

impl PinClaims {
    fn claim(&mut self, field: &'static str, pin: i32) -> Result<(), ConfigError> {
        let bit = 1u64 << pin;
        if self.0 & bit != 0 {
            return Err(ConfigError::PinConflict { field, pin });
        }
        self.0 |= bit;
        Ok(())
    }
}

fn check_exists(field: &'static str, pin: i32) -> Result<(), ConfigError> {
    if (0..=pins::GPIO_NUM_MAX).contains(&pin) {
        Ok(())
    } else {
        Err(ConfigError::InvalidPin { field, pin })
    }
}

fn check_output(field: &'static str, pin: i32) -> Result<(), ConfigError> {
    check_exists(field, pin)?;
    if pin >= pins::GPIO_INPUT_ONLY_FIRST {
        return Err(ConfigError::InputOnlyPin { field, pin });
    }
    Ok(())
}

impl BoardConfig {
    /// Parse a board variant.  Missing fields fall back to the defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            warn!(target: "board", "config parse failed: {}", e);
            ConfigError::Malformed
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check the pin table for pins that do not exist, cannot drive, or
    /// are assigned twice.  Disabled buses are not checked.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.pins;

        if p.output_mask >> (pins::GPIO_NUM_MAX + 1) != 0 {
            let pin = 63 - p.output_mask.leading_zeros() as i32;
            return Err(ConfigError::InvalidPin { field: "output_mask", pin });
        }
        for pin in 0..=pins::GPIO_NUM_MAX {
            if p.output_mask & (1u64 << pin) != 0 {
                check_output("output_mask", pin)?;
            }
        }

        check_output("sensor_power_n", p.sensor_power_n)?;
        check_output("screen_power_n", p.screen_power_n)?;
        if p.sensor_power_n == p.screen_power_n {
            return Err(ConfigError::PinConflict { field: "screen_power_n", pin: p.screen_power_n });
        }
        for (field, pin) in [("sensor_power_n", p.sensor_power_n), ("screen_power_n", p.screen_power_n)] {
            if p.output_mask & (1u64 << pin) == 0 {
                return Err(ConfigError::NotInOutputMask { field, pin });
            }
        }

        // Bus signals may not overlap any plain output or each other.
        let mut claims = PinClaims(p.output_mask);

        if self.i2c0_enabled {
            let i2c = &p.i2c0;
            check_output("i2c0.sda_gpio", i2c.sda_gpio)?;
            check_output("i2c0.scl_gpio", i2c.scl_gpio)?;
            claims.claim("i2c0.sda_gpio", i2c.sda_gpio)?;
            claims.claim("i2c0.scl_gpio", i2c.scl_gpio)?;
            if i2c.clk_speed_hz == 0 || i2c.clk_speed_hz > I2C_MAX_SPEED_HZ {
                return Err(ConfigError::InvalidBusSpeed(i2c.clk_speed_hz));
            }
        }

        if self.spi2_enabled {
            let spi = &p.spi2;
            check_output("spi2.mosi_gpio", spi.mosi_gpio)?;
            check_output("spi2.sclk_gpio", spi.sclk_gpio)?;
            claims.claim("spi2.mosi_gpio", spi.mosi_gpio)?;
            claims.claim("spi2.sclk_gpio", spi.sclk_gpio)?;
            if spi.miso_gpio != pins::GPIO_NC {
                check_exists("spi2.miso_gpio", spi.miso_gpio)?;
                claims.claim("spi2.miso_gpio", spi.miso_gpio)?;
            }
        }

        Ok(())
    }
}

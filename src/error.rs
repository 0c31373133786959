//! Error types for the board-support layer.
//!
//! Driver failures are not classified any further than the stage that
//! produced them: the raw `esp_err_t` rides along unchanged in
//! [`DriverStatus`] so callers can still compare against ESP-IDF codes.
//! All variants are `Copy`.

use core::fmt;

// ---------------------------------------------------------------------------
// Raw driver status
// ---------------------------------------------------------------------------

/// Status code returned by the vendor SDK (`esp_err_t`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DriverStatus(pub i32);

impl DriverStatus {
    /// `ESP_FAIL`: generic failure, also used for failed post-conditions.
    pub const FAIL: Self = Self(-1);
    /// `ESP_ERR_INVALID_ARG`
    pub const INVALID_ARG: Self = Self(0x102);
    /// `ESP_ERR_INVALID_STATE`
    pub const INVALID_STATE: Self = Self(0x103);

    /// Convert an `esp_err_t` into a `Result`, treating `ESP_OK` (0) as success.
    pub const fn check(code: i32) -> Result<(), Self> {
        if code == 0 { Ok(()) } else { Err(Self(code)) }
    }

    pub const fn code(self) -> i32 {
        self.0
    }
}

impl fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::FAIL => write!(f, "ESP_FAIL"),
            Self::INVALID_ARG => write!(f, "ESP_ERR_INVALID_ARG"),
            Self::INVALID_STATE => write!(f, "ESP_ERR_INVALID_STATE"),
            Self(rc) => write!(f, "esp_err 0x{:x}", rc),
        }
    }
}

// ---------------------------------------------------------------------------
// Bus identity
// ---------------------------------------------------------------------------

/// The buses this board owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusId {
    I2c0,
    Spi2,
}

impl fmt::Display for BusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I2c0 => write!(f, "i2c0"),
            Self::Spi2 => write!(f, "spi2"),
        }
    }
}

// ---------------------------------------------------------------------------
// Board errors
// ---------------------------------------------------------------------------

/// Every fallible board operation returns this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    /// GPIO output configuration or a pin write was rejected by the driver.
    ConfigurationFailed(DriverStatus),
    /// A bus driver could not be brought up.
    BusCreateFailed { bus: BusId, status: DriverStatus },
    /// A bus driver refused to release its handle.
    BusDeleteFailed { bus: BusId, status: DriverStatus },
    /// The GPIO subsystem has not been configured yet.
    NotInitialized,
}

impl BoardError {
    /// The underlying driver status, or `ESP_FAIL` for precondition failures.
    pub const fn status(&self) -> DriverStatus {
        match *self {
            Self::ConfigurationFailed(status)
            | Self::BusCreateFailed { status, .. }
            | Self::BusDeleteFailed { status, .. } => status,
            Self::NotInitialized => DriverStatus::FAIL,
        }
    }
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigurationFailed(s) => write!(f, "GPIO configuration failed ({s})"),
            Self::BusCreateFailed { bus, status } => write!(f, "{bus} bus create failed ({status})"),
            Self::BusDeleteFailed { bus, status } => write!(f, "{bus} bus delete failed ({status})"),
            Self::NotInitialized => write!(f, "GPIO subsystem not initialised"),
        }
    }
}

impl std::error::Error for BoardError {}

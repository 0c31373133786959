//! GPIO / peripheral pin assignments for the ESP32-MeshKit-Sense board.
//!
//! These are the factory defaults that [`BoardConfig::default`] is built
//! from.  A board variant overrides them through its own `BoardConfig`
//! rather than by editing this table.
//!
//! [`BoardConfig::default`]: crate::config::BoardConfig

/// Identity string reported by [`BoardManager::info`](crate::board::BoardManager::info).
pub const BOARD_NAME: &str = "ESP32-MESHKIT-SENSE";

/// Highest GPIO number on the ESP32 (GPIO 0 – 39).
pub const GPIO_NUM_MAX: i32 = 39;
/// GPIO 34 – 39 are input-only on the ESP32 and cannot drive a power switch.
pub const GPIO_INPUT_ONLY_FIRST: i32 = 34;
/// Sentinel for an unused bus signal (ESP-IDF `GPIO_NUM_NC`).
pub const GPIO_NC: i32 = -1;

// ---------------------------------------------------------------------------
// I²C bus 0 (HTS221, BH1750, ...)
// ---------------------------------------------------------------------------

pub const I2C0_PORT: u8 = 0;
pub const I2C0_SDA_GPIO: i32 = 32;
pub const I2C0_SCL_GPIO: i32 = 33;
pub const I2C0_SDA_PULLUP: bool = true;
pub const I2C0_SCL_PULLUP: bool = true;
/// Standard mode.
pub const I2C0_SPEED_HZ: u32 = 100_000;

// ---------------------------------------------------------------------------
// SPI bus 2 (e-paper screen)
// ---------------------------------------------------------------------------

/// `SPI2_HOST` (HSPI).
pub const SPI2_HOST: u8 = 2;
/// The screen is write-only.
pub const SPI2_MISO_GPIO: i32 = GPIO_NC;
pub const SPI2_MOSI_GPIO: i32 = 21;
pub const SPI2_SCLK_GPIO: i32 = 22;

// ---------------------------------------------------------------------------
// Power switches (P-channel, active LOW)
// ---------------------------------------------------------------------------

/// LOW = sensor rail powered.
pub const POWER_ON_SENSOR_N_GPIO: i32 = 27;
/// LOW = screen rail powered.
pub const POWER_ON_SCREEN_N_GPIO: i32 = 19;

/// Every pin the board drives as a plain digital output.
pub const OUTPUT_PIN_MASK: u64 = (1u64 << POWER_ON_SENSOR_N_GPIO) | (1u64 << POWER_ON_SCREEN_N_GPIO);

//! Adapters — concrete implementations of the [`BoardHal`](crate::ports::BoardHal) port.
//!
//! | Adapter | Target  | Connects to                          |
//! |---------|---------|--------------------------------------|
//! | `esp`   | espidf  | ESP-IDF GPIO / I²C / SPI drivers     |
//! | `sim`   | any     | In-memory pins and bus bookkeeping   |

#[cfg(all(target_os = "espidf", feature = "espidf"))]
pub mod esp;
pub mod sim;

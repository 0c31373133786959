//! MeshKit-Sense bring-up firmware.
//!
//! Initialises the board with its stock configuration, then idles and
//! reports the power-rail state once a minute.

#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use log::{info, warn};

use meshkit_bsp::adapters::esp::EspBoardHal;
use meshkit_bsp::{BoardConfig, BoardManager, ResourceId};

const STATUS_INTERVAL_MS: u32 = 60_000;

fn main() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("MeshKit-Sense BSP v{}", env!("CARGO_PKG_VERSION"));

    let mut board = BoardManager::new(BoardConfig::default(), EspBoardHal::new())?;
    board.init()?;

    match board.resource_handle(ResourceId::I2C0) {
        Some(bus) => info!("I2C{} ready for sensors", bus.port()),
        None => warn!("I2C0 disabled in board config"),
    }

    loop {
        let status = board.status();
        info!(
            "STATUS | init={} i2c0={} spi2={} | sensor_power={} screen_level={}",
            status.initialized,
            status.i2c0_live,
            status.spi2_live,
            board.sensor_power(),
            board.screen_power(),
        );
        FreeRtos::delay_ms(STATUS_INTERVAL_MS);
    }
}

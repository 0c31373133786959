//! ESP-IDF implementation of [`BoardHal`].
//!
//! Thin wrappers over the raw `esp_idf_svc::sys` GPIO, legacy I²C master
//! and SPI master bus calls.  Outputs are configured input+output so that
//! `gpio_get_level` reads back the driven level.

use esp_idf_svc::sys::*;
use log::info;

use crate::config::{I2cBusConfig, SpiBusConfig};
use crate::error::DriverStatus;
use crate::pins;
use crate::ports::{BoardHal, GpioNum, OutputConfig, PinState, Retained};

const TAG: &str = "board";

/// Installed legacy I²C master driver on `port`.
#[derive(Debug)]
pub struct EspI2cBus {
    port: i2c_port_t,
}

impl EspI2cBus {
    pub fn port(&self) -> i2c_port_t {
        self.port
    }
}

/// Initialised SPI master bus on `host`.
#[derive(Debug)]
pub struct EspSpiBus {
    host: spi_host_device_t,
}

impl EspSpiBus {
    pub fn host(&self) -> spi_host_device_t {
        self.host
    }
}

pub struct EspBoardHal {
    _private: (),
}

impl EspBoardHal {
    /// Only one instance should exist per chip; the drivers behind it are global.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl Default for EspBoardHal {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardHal for EspBoardHal {
    type I2cBus = EspI2cBus;
    type SpiBus = EspSpiBus;

    fn configure_outputs(&mut self, cfg: &OutputConfig) -> Result<(), DriverStatus> {
        let io_conf = gpio_config_t {
            pin_bit_mask: cfg.pin_bit_mask,
            mode: gpio_mode_t_GPIO_MODE_INPUT_OUTPUT,
            pull_up_en: if cfg.pull_up {
                gpio_pullup_t_GPIO_PULLUP_ENABLE
            } else {
                gpio_pullup_t_GPIO_PULLUP_DISABLE
            },
            pull_down_en: if cfg.pull_down {
                gpio_pulldown_t_GPIO_PULLDOWN_ENABLE
            } else {
                gpio_pulldown_t_GPIO_PULLDOWN_DISABLE
            },
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        // SAFETY: io_conf outlives the call; gpio_config copies it.
        DriverStatus::check(unsafe { gpio_config(&io_conf) })?;
        info!(target: TAG, "GPIO outputs configured (mask=0x{:010x})", cfg.pin_bit_mask);
        Ok(())
    }

    fn i2c_bus_create(&mut self, cfg: &I2cBusConfig) -> Result<EspI2cBus, DriverStatus> {
        let port = cfg.port as i2c_port_t;
        let conf = i2c_config_t {
            mode: i2c_mode_t_I2C_MODE_MASTER,
            sda_io_num: cfg.sda_gpio,
            scl_io_num: cfg.scl_gpio,
            sda_pullup_en: cfg.sda_pullup,
            scl_pullup_en: cfg.scl_pullup,
            __bindgen_anon_1: i2c_config_t__bindgen_ty_1 {
                master: i2c_config_t__bindgen_ty_1__bindgen_ty_1 {
                    clk_speed: cfg.clk_speed_hz,
                },
            },
            clk_flags: 0,
        };
        // SAFETY: conf is copied by i2c_param_config; driver state is owned
        // by the returned handle and released only through i2c_bus_delete.
        unsafe {
            DriverStatus::check(i2c_param_config(port, &conf))?;
            DriverStatus::check(i2c_driver_install(port, i2c_mode_t_I2C_MODE_MASTER, 0, 0, 0))?;
        }
        info!(
            target: TAG,
            "I2C{} up (sda={} scl={} {} Hz)",
            port, cfg.sda_gpio, cfg.scl_gpio, cfg.clk_speed_hz
        );
        Ok(EspI2cBus { port })
    }

    fn i2c_bus_delete(&mut self, bus: EspI2cBus) -> Result<(), Retained<EspI2cBus>> {
        // SAFETY: the driver was installed by i2c_bus_create for this port.
        let ret = unsafe { i2c_driver_delete(bus.port) };
        DriverStatus::check(ret).map_err(|status| Retained { bus, status })
    }

    fn spi_bus_create(&mut self, cfg: &SpiBusConfig) -> Result<EspSpiBus, DriverStatus> {
        let host = cfg.host as spi_host_device_t;
        let conf = spi_bus_config_t {
            __bindgen_anon_1: spi_bus_config_t__bindgen_ty_1 { mosi_io_num: cfg.mosi_gpio },
            __bindgen_anon_2: spi_bus_config_t__bindgen_ty_2 { miso_io_num: cfg.miso_gpio },
            sclk_io_num: cfg.sclk_gpio,
            __bindgen_anon_3: spi_bus_config_t__bindgen_ty_3 { quadwp_io_num: pins::GPIO_NC },
            __bindgen_anon_4: spi_bus_config_t__bindgen_ty_4 { quadhd_io_num: pins::GPIO_NC },
            data4_io_num: pins::GPIO_NC,
            data5_io_num: pins::GPIO_NC,
            data6_io_num: pins::GPIO_NC,
            data7_io_num: pins::GPIO_NC,
            ..Default::default()
        };
        // SAFETY: conf is copied by spi_bus_initialize; the bus is released
        // only through spi_bus_delete.
        let ret = unsafe { spi_bus_initialize(host, &conf, spi_common_dma_t_SPI_DMA_CH_AUTO) };
        DriverStatus::check(ret)?;
        info!(
            target: TAG,
            "SPI{} up (mosi={} miso={} sclk={})",
            cfg.host, cfg.mosi_gpio, cfg.miso_gpio, cfg.sclk_gpio
        );
        Ok(EspSpiBus { host })
    }

    fn spi_bus_delete(&mut self, bus: EspSpiBus) -> Result<(), Retained<EspSpiBus>> {
        // SAFETY: the bus was initialised by spi_bus_create; spi_bus_free
        // fails with ESP_ERR_INVALID_STATE while devices are still attached.
        let ret = unsafe { spi_bus_free(bus.host) };
        DriverStatus::check(ret).map_err(|status| Retained { bus, status })
    }

    fn set_level(&mut self, pin: GpioNum, level: PinState) -> Result<(), DriverStatus> {
        let high = u32::from(level == PinState::High);
        // SAFETY: register write; gpio_set_level validates the pin number.
        DriverStatus::check(unsafe { gpio_set_level(pin, high) })
    }

    fn level(&self, pin: GpioNum) -> PinState {
        // SAFETY: read-only register access.
        PinState::from(unsafe { gpio_get_level(pin) } != 0)
    }
}

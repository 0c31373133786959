//! Bring-up / tear-down sequencing, idempotence and failure propagation.

use crate::mock_hw::{Faults, HalCall, MockHal};

use meshkit_bsp::adapters::sim::SimBoardHal;
use meshkit_bsp::pins::{OUTPUT_PIN_MASK, POWER_ON_SCREEN_N_GPIO, POWER_ON_SENSOR_N_GPIO};
use meshkit_bsp::ports::PinState;
use meshkit_bsp::{BoardConfig, BoardError, BoardManager, BusId, DriverStatus, ResourceId};

fn make_board(hal: MockHal) -> BoardManager<MockHal> {
    BoardManager::new(BoardConfig::default(), hal).unwrap()
}

fn i2c_id(board: &BoardManager<MockHal>) -> Option<u32> {
    board.resource_handle(ResourceId::I2C0).map(|b| b.id)
}

// ── Happy path ────────────────────────────────────────────────

#[test]
fn init_runs_stages_in_order() {
    let mut board = make_board(MockHal::new());
    board.init().unwrap();

    assert_eq!(
        board.hal().calls,
        vec![
            HalCall::ConfigureOutputs(OUTPUT_PIN_MASK),
            HalCall::I2cCreate(0),
            HalCall::SpiCreate(2),
            HalCall::SetLevel(POWER_ON_SENSOR_N_GPIO, PinState::Low),
            HalCall::SetLevel(POWER_ON_SCREEN_N_GPIO, PinState::High),
        ]
    );
    assert!(board.is_initialized());
}

#[test]
fn second_init_is_a_noop() {
    let mut board = make_board(MockHal::new());
    board.init().unwrap();
    let calls = board.hal().calls.len();
    let status = board.status();
    let handle = i2c_id(&board);

    assert_eq!(board.init(), Ok(()));
    assert_eq!(board.hal().calls.len(), calls, "no driver calls on repeated init");
    assert_eq!(board.status(), status);
    assert_eq!(i2c_id(&board), handle);
}

#[test]
fn deinit_before_init_touches_nothing() {
    let mut board = make_board(MockHal::new());
    assert_eq!(board.deinit(), Ok(()));
    assert!(board.hal().calls.is_empty());
    assert!(!board.is_initialized());
}

#[test]
fn round_trip_releases_both_buses() {
    let mut board = make_board(MockHal::new());
    board.init().unwrap();
    let i2c = i2c_id(&board).unwrap();
    let spi = board.spi_bus().map(|b| b.id).unwrap();
    board.hal_mut().calls.clear();

    board.deinit().unwrap();

    assert_eq!(
        board.hal().calls,
        vec![
            HalCall::SetLevel(POWER_ON_SENSOR_N_GPIO, PinState::High),
            HalCall::I2cDelete(i2c),
            HalCall::SpiDelete(spi),
        ]
    );
    assert!(!board.is_initialized());
    assert!(board.resource_handle(ResourceId::I2C0).is_none());
    assert!(board.spi_bus().is_none());
    assert!(!board.status().gpio_initialized);
}

#[test]
fn reinit_after_deinit_creates_fresh_buses() {
    let mut board = make_board(MockHal::new());
    board.init().unwrap();
    let first = i2c_id(&board);
    board.deinit().unwrap();
    board.init().unwrap();

    assert!(board.is_initialized());
    assert_ne!(i2c_id(&board), first);
    assert_eq!(board.hal().count(|c| matches!(c, HalCall::ConfigureOutputs(_))), 2);
}

#[test]
fn disabled_buses_are_never_created() {
    let config = BoardConfig {
        i2c0_enabled: false,
        spi2_enabled: false,
        ..BoardConfig::default()
    };
    let mut board = BoardManager::new(config, MockHal::new()).unwrap();
    board.init().unwrap();
    board.deinit().unwrap();

    let hal = board.hal();
    assert_eq!(hal.count(|c| matches!(c, HalCall::I2cCreate(_) | HalCall::SpiCreate(_))), 0);
    assert_eq!(hal.count(|c| matches!(c, HalCall::I2cDelete(_) | HalCall::SpiDelete(_))), 0);
}

#[test]
fn unknown_resource_id_yields_none() {
    let mut board = make_board(MockHal::new());
    board.init().unwrap();
    assert!(board.resource_handle(ResourceId::I2C0).is_some());
    assert!(board.resource_handle(ResourceId(7)).is_none());
    assert!(board.resource_handle(ResourceId(0xdead_beef)).is_none());
}

#[test]
fn info_does_not_depend_on_state() {
    let mut board = make_board(MockHal::new());
    let name = board.info();
    board.init().unwrap();
    assert_eq!(board.info(), name);
    board.deinit().unwrap();
    assert_eq!(board.info(), name);
}

// ── Failure propagation ───────────────────────────────────────

#[test]
fn gpio_failure_aborts_before_buses() {
    let status = DriverStatus(0x105);
    let mut board = make_board(MockHal::failing(Faults {
        configure: Some(status),
        ..Faults::default()
    }));

    assert_eq!(board.init(), Err(BoardError::ConfigurationFailed(status)));
    assert!(!board.is_initialized());
    assert_eq!(board.hal().calls, vec![HalCall::ConfigureOutputs(OUTPUT_PIN_MASK)]);
    assert_eq!(board.set_sensor_power(true), Err(BoardError::NotInitialized));
}

#[test]
fn i2c_failure_keeps_gpio_and_skips_spi() {
    let status = DriverStatus::FAIL;
    let mut board = make_board(MockHal::failing(Faults {
        i2c_create: Some(status),
        ..Faults::default()
    }));

    assert_eq!(
        board.init(),
        Err(BoardError::BusCreateFailed { bus: BusId::I2c0, status })
    );
    let s = board.status();
    assert!(!s.initialized);
    assert!(s.gpio_initialized, "completed stages are not rolled back");
    assert_eq!(board.hal().count(|c| matches!(c, HalCall::SpiCreate(_))), 0);
}

#[test]
fn retry_after_failure_resumes_at_failed_stage() {
    let mut board = make_board(MockHal::failing(Faults {
        spi_create: Some(DriverStatus::INVALID_STATE),
        ..Faults::default()
    }));

    assert!(matches!(
        board.init(),
        Err(BoardError::BusCreateFailed { bus: BusId::Spi2, .. })
    ));
    let i2c = i2c_id(&board);
    assert!(i2c.is_some(), "I2C bus stays live after SPI failure");

    board.hal_mut().faults = Faults::default();
    board.init().unwrap();

    let hal = board.hal();
    assert_eq!(hal.count(|c| matches!(c, HalCall::ConfigureOutputs(_))), 1);
    assert_eq!(hal.count(|c| matches!(c, HalCall::I2cCreate(_))), 1);
    assert_eq!(hal.count(|c| matches!(c, HalCall::SpiCreate(_))), 2);
    assert_eq!(i2c_id(&board), i2c);
}

#[test]
fn power_failure_during_init_is_reported() {
    let mut board = make_board(MockHal::failing(Faults {
        set_level: Some(DriverStatus::INVALID_ARG),
        ..Faults::default()
    }));
    assert_eq!(
        board.init(),
        Err(BoardError::ConfigurationFailed(DriverStatus::INVALID_ARG))
    );
    assert!(!board.is_initialized());
}

#[test]
fn retained_i2c_handle_fails_deinit_and_stays_owned() {
    let mut board = make_board(MockHal::new());
    board.init().unwrap();
    let handle = i2c_id(&board);
    board.hal_mut().faults.i2c_delete = Some(DriverStatus::FAIL);

    assert_eq!(
        board.deinit(),
        Err(BoardError::BusDeleteFailed { bus: BusId::I2c0, status: DriverStatus::FAIL })
    );
    assert!(board.is_initialized());
    assert_eq!(i2c_id(&board), handle);
    assert_eq!(board.hal().count(|c| matches!(c, HalCall::SpiDelete(_))), 0);

    board.hal_mut().faults = Faults::default();
    board.deinit().unwrap();
    assert!(!board.is_initialized());
    assert!(board.resource_handle(ResourceId::I2C0).is_none());
}

#[test]
fn retained_spi_handle_fails_deinit_after_i2c_is_gone() {
    let mut board = make_board(MockHal::new());
    board.init().unwrap();
    board.hal_mut().faults.spi_delete = Some(DriverStatus::INVALID_STATE);

    assert_eq!(
        board.deinit(),
        Err(BoardError::BusDeleteFailed {
            bus: BusId::Spi2,
            status: DriverStatus::INVALID_STATE
        })
    );
    assert!(board.resource_handle(ResourceId::I2C0).is_none());
    assert!(board.spi_bus().is_some());
    assert!(board.status().gpio_initialized);
}

// ── Handing the HAL back ──────────────────────────────────────

#[test]
fn into_hal_deletes_live_buses_first() {
    let mut board = make_board(MockHal::new());
    board.init().unwrap();
    let i2c = i2c_id(&board).unwrap();
    let spi = board.spi_bus().map(|b| b.id).unwrap();

    let Ok(hal) = board.into_hal() else {
        panic!("into_hal should succeed on a healthy board");
    };
    assert!(hal.calls.contains(&HalCall::I2cDelete(i2c)));
    assert!(hal.calls.contains(&HalCall::SpiDelete(spi)));
}

#[test]
fn returned_hal_can_be_brought_up_again() {
    let mut board = BoardManager::new(BoardConfig::default(), SimBoardHal::new()).unwrap();
    board.init().unwrap();

    let Ok(hal) = board.into_hal() else {
        panic!("into_hal should succeed on a healthy board");
    };
    assert_eq!(hal.live_i2c_buses(), 0);
    assert_eq!(hal.live_spi_buses(), 0);

    let mut again = BoardManager::new(BoardConfig::default(), hal).unwrap();
    assert_eq!(again.init(), Ok(()));
    assert!(again.resource_handle(ResourceId::I2C0).is_some());
}

#[test]
fn into_hal_returns_the_board_when_teardown_fails() {
    let mut board = make_board(MockHal::new());
    board.init().unwrap();
    let handle = i2c_id(&board);
    board.hal_mut().faults.i2c_delete = Some(DriverStatus::FAIL);

    let Err((board, err)) = board.into_hal() else {
        panic!("into_hal should fail while the I2C bus is retained");
    };
    assert_eq!(err, BoardError::BusDeleteFailed { bus: BusId::I2c0, status: DriverStatus::FAIL });
    assert!(board.is_initialized());
    assert_eq!(i2c_id(&board), handle);
}

#[test]
fn into_hal_before_init_touches_nothing() {
    let board = make_board(MockHal::new());
    let Ok(hal) = board.into_hal() else {
        panic!("into_hal should succeed on an idle board");
    };
    assert!(hal.calls.is_empty());
}

//! Expander driver against a scripted I²C bus

use clock_core::hal::{DisplayBus, HalError, SwitchBus};
use clock_firmware::expander::*;
use embedded_hal::i2c::ErrorKind;
use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};

fn init_transactions() -> Vec<I2cTrans> {
    vec![
        I2cTrans::write(TCA6424_ADDR, vec![TCA_CONFIG_PORT0, 0xFF]),
        I2cTrans::write(TCA6424_ADDR, vec![TCA_CONFIG_PORT1, 0x00]),
        I2cTrans::write(TCA6424_ADDR, vec![TCA_CONFIG_PORT2, 0x00]),
        I2cTrans::write(PCA9557_ADDR, vec![PCA_CONFIG, 0x00]),
        I2cTrans::write(PCA9557_ADDR, vec![PCA_OUTPUT, 0xFF]),
    ]
}

#[test]
fn test_init_configures_ports() {
    let mut board = ExpanderBoard::new(I2cMock::new(&init_transactions()));
    assert!(!board.is_initialized());
    board.init().unwrap();
    assert!(board.is_initialized());
    board.release().done();
}

#[test]
fn test_writes_before_init_are_refused() {
    let mut board = ExpanderBoard::new(I2cMock::new(&[]));
    assert_eq!(board.write_segment(0x3F), Err(HalError::NotInitialized));
    assert_eq!(board.read_switch_vector(), 0x00);
    board.release().done();
}

#[test]
fn test_frame_and_leds() {
    let mut expected = init_transactions();
    expected.extend([
        I2cTrans::write(TCA6424_ADDR, vec![TCA_OUTPUT_PORT1, 0x3F]),
        I2cTrans::write(TCA6424_ADDR, vec![TCA_OUTPUT_PORT2, 0x01]),
        I2cTrans::write(PCA9557_ADDR, vec![PCA_OUTPUT, 0xFE]),
    ]);
    let mut board = ExpanderBoard::new(I2cMock::new(&expected));
    board.init().unwrap();
    board.write_segment(0x3F).unwrap();
    board.write_column_mask(0x01).unwrap();
    board.write_leds(0xFE).unwrap();
    board.release().done();
}

#[test]
fn test_switch_read() {
    let mut expected = init_transactions();
    expected.push(I2cTrans::write_read(
        TCA6424_ADDR,
        vec![TCA_INPUT_PORT0],
        vec![0b1111_1011],
    ));
    let mut board = ExpanderBoard::new(I2cMock::new(&expected));
    board.init().unwrap();
    assert_eq!(board.read_switch_vector(), 0b1111_1011);
    board.release().done();
}

#[test]
fn test_bus_error_reads_as_failed_sample() {
    let mut expected = init_transactions();
    expected.push(
        I2cTrans::write_read(TCA6424_ADDR, vec![TCA_INPUT_PORT0], vec![0xFF])
            .with_error(ErrorKind::Other),
    );
    expected.push(
        I2cTrans::write(TCA6424_ADDR, vec![TCA_OUTPUT_PORT2, 0x02]).with_error(ErrorKind::Other),
    );
    let mut board = ExpanderBoard::new(I2cMock::new(&expected));
    board.init().unwrap();
    assert_eq!(board.read_switch_vector(), 0x00);
    assert_eq!(board.write_column_mask(0x02), Err(HalError::Bus));
    board.release().done();
}

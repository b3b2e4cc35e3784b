//! Loopback board and user-key pins driven through the core

use clock_core::hal::{Persistence, SwitchBus, UserKeyInput};
use clock_core::{persist, Date};
use clock_core::{ClockConfig, DisplayMode, Foreground, SharedClock};
use clock_firmware::keys::UserKeyPins;
use clock_firmware::line::LineAssembler;
use clock_firmware::loopback::LoopbackBoard;
use embedded_hal::delay::DelayNs;
use embedded_hal_mock::eh1::pin::{Mock as PinMock, State, Transaction as PinTrans};

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

fn run_ms(clock: &SharedClock, fg: &mut Foreground, board: &mut LoopbackBoard<String, NoDelay>, ms: u32) {
    for _ in 0..ms * ClockConfig::DEFAULT.ticks_per_ms() {
        clock.on_tick();
        fg.poll(clock, board);
    }
}

#[test]
fn test_loopback_board_runs_the_clock() {
    let config = ClockConfig::DEFAULT;
    let clock = SharedClock::new(config);
    let mut fg = Foreground::new(&config);
    let mut board = LoopbackBoard::new(String::new(), NoDelay);

    fg.boot(&clock, &mut board);
    assert!(board.serial.contains("Welcome"));
    assert_eq!(board.panel.leds(), 0xFF);
    board.serial.clear();

    // a received line goes through the assembler into the mailbox
    let mut rx: LineAssembler = LineAssembler::new();
    for &byte in b"RUN DATE\r\n" {
        if let Some(line) = rx.push(byte) {
            assert!(clock.on_line(&line));
        }
    }
    run_ms(&clock, &mut fg, &mut board, 2);
    assert_eq!(board.serial, "Display date!\r\n");
    assert_eq!(clock.with_state(|s| s.mode), DisplayMode::Date);

    // switch 2 through the panel
    board.panel.set_switches(!0b10);
    run_ms(&clock, &mut fg, &mut board, 100);
    assert_eq!(clock.with_state(|s| s.mode), DisplayMode::Time);
    assert_eq!(board.panel.read_switch_vector(), !0b10);
}

#[test]
fn test_alarm_reaches_the_tone_output() {
    let config = ClockConfig::DEFAULT;
    let clock = SharedClock::new(config);
    let mut fg = Foreground::new(&config);
    let mut board = LoopbackBoard::new(String::new(), NoDelay);
    fg.boot(&clock, &mut board);

    assert!(clock.on_line(b"RUN ALARM"));
    run_ms(&clock, &mut fg, &mut board, 100);
    assert_eq!(board.tone.sounding(), Some(262));
}

#[test]
fn test_loopback_record_lives_in_ram() {
    let config = ClockConfig::DEFAULT;
    let clock = SharedClock::new(config);
    let mut fg = Foreground::new(&config);
    let mut board = LoopbackBoard::new(String::new(), NoDelay);
    fg.boot(&clock, &mut board);

    assert!(clock.on_line(b"SET DATE 2030.01.02"));
    run_ms(&clock, &mut fg, &mut board, 1);
    assert!(clock.on_line(b"SAVE"));
    run_ms(&clock, &mut fg, &mut board, 1);
    let saved = persist::load(&mut board.record).unwrap();
    assert_eq!(saved.date, Date::from_ymd_unchecked(2030, 1, 2));

    // a new board starts erased, so nothing carries over a reset
    let mut fresh = LoopbackBoard::new(String::new(), NoDelay);
    assert_eq!(fresh.record.read(), Some([0xFF; 8]));
    let clock = SharedClock::new(config);
    Foreground::new(&config).boot(&clock, &mut fresh);
    assert_eq!(clock.with_state(|s| s.clock.date()), config.default_date);
}

#[test]
fn test_user_key_pins_are_active_low() {
    let one = PinMock::new(&[
        PinTrans::get(State::High),
        PinTrans::get(State::Low),
    ]);
    let two = PinMock::new(&[
        PinTrans::get(State::Low),
        PinTrans::get(State::High),
    ]);
    let mut keys = UserKeyPins::new(one, two);

    assert_eq!(keys.read_user_keys() & 0b11, 0b01);
    assert_eq!(keys.read_user_keys() & 0b11, 0b10);

    let (mut one, mut two) = keys.release();
    one.done();
    two.done();
}

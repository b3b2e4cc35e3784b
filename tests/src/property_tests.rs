//! Property tests for counters, calendar and the command interpreter

use clock_core::calendar::{days_in_month, Date};
use clock_core::controller::{apply, DeviceState};
use clock_core::display::{Multiplexer, View};
use clock_core::{
    interpret, Action, AdjustGroup, ClockConfig, DigitBuffer, DisplayMode, Request, SavedState,
    SwitchEventProcessor, TimeKeeper,
};
use proptest::prelude::*;

fn device() -> DeviceState {
    let mut state = DeviceState::new(ClockConfig::DEFAULT);
    state.restore(None);
    state
}

fn valid_date() -> impl Strategy<Value = Date> {
    (1u16..=9999, 1u8..=12)
        .prop_flat_map(|(year, month)| (Just(year), Just(month), 1..=days_in_month(year, month)))
        .prop_map(|(year, month, day)| Date::from_ymd_unchecked(year, month, day))
}

fn execute(state: &mut DeviceState, line: &str) -> String {
    match interpret(line.as_bytes()) {
        Ok(Request::Execute(action)) => apply(state, action).reply.as_str().to_owned(),
        other => panic!("{:?} not executable: {:?}", line, other),
    }
}

proptest! {
    #[test]
    fn set_time_round_trips(h in 0u8..24, m in 0u8..60, s in 0u8..60) {
        let mut state = device();
        let hms = format!("{:02}:{:02}:{:02}", h, m, s);
        execute(&mut state, &format!("SET TIME {}", hms));
        prop_assert_eq!(
            execute(&mut state, "GET TIME"),
            format!("Current time is {}:00.", hms)
        );
    }

    #[test]
    fn set_date_round_trips(date in valid_date()) {
        let mut state = device();
        execute(
            &mut state,
            &format!("SET DATE {:04}.{:02}.{:02}", date.year, date.month, date.day),
        );
        prop_assert_eq!(state.clock.date(), date);
    }

    #[test]
    fn out_of_range_times_are_rejected(h in 24u8..100, m in 0u8..100) {
        let line = format!("SET ALARM {:02}:{:02}:00", h, m);
        let rejected = matches!(
            interpret(line.as_bytes()),
            Err(clock_core::CommandError::InvalidArgument { index: 2, .. })
        );
        prop_assert!(rejected);
    }

    #[test]
    fn interpreter_never_panics(raw in proptest::collection::vec(any::<u8>(), 0..80)) {
        let _ = interpret(&raw);
    }

    #[test]
    fn next_day_is_always_valid(date in valid_date()) {
        let mut next = date;
        next.add_one_day();
        prop_assert!(next.is_valid());
        prop_assert_ne!(next, date);
    }

    #[test]
    fn group_increments_keep_counters_in_range(
        start in valid_date(),
        steps in proptest::collection::vec((0usize..5, 0u8..=4), 1..200),
    ) {
        let mut clock = TimeKeeper::new(start);
        clock.set_time(8_639_999);
        for (mode, group) in steps {
            let group = AdjustGroup::new(group).unwrap_or(AdjustGroup::NONE);
            clock.increment(DisplayMode::ALL[mode], group);
        }
        prop_assert!(clock.time_cs() < 8_640_000);
        prop_assert!(clock.alarm_cs() < 8_640_000);
        prop_assert!(clock.stopwatch_cs() < 8_640_000);
        prop_assert!(clock.runtime_ms() < 86_400_000);
        prop_assert!(clock.date().is_valid() || clock.date().year == 0);
    }

    #[test]
    fn stopwatch_arms_once_and_stops_at_zero(start in 1u32..5000) {
        let mut clock = TimeKeeper::new(Date::from_ymd_unchecked(2023, 6, 11));
        clock.set_stopwatch(start);
        clock.restart_stopwatch();

        let mut armed = 0;
        for _ in 0..start + 10 {
            if clock.advance_stopwatch(false) {
                armed += 1;
            }
        }
        prop_assert_eq!(armed, 1);
        prop_assert_eq!(clock.stopwatch_cs(), 0);
        prop_assert!(!clock.stopwatch_running());
    }

    #[test]
    fn saved_state_round_trips(date in valid_date(), time_cs in 0u32..8_640_000) {
        let record = SavedState { date, time_cs };
        prop_assert_eq!(SavedState::from_bytes(record.to_bytes()), Some(record));
    }

    #[test]
    fn column_mask_is_single_hot_or_dark(
        reverse in any::<bool>(),
        phase in 1u16..=20,
        half in any::<bool>(),
        freeze in any::<bool>(),
        group in 0u8..=4,
    ) {
        let buffer = DigitBuffer::from_bytes(*b"12345678");
        let view = View {
            buffer: &buffer,
            mode: DisplayMode::Time,
            reverse,
            freeze,
            adjust_group: AdjustGroup::new(group).unwrap_or(AdjustGroup::NONE),
        };
        let mut mux = Multiplexer::new(ClockConfig::DEFAULT.duty_window);
        for _ in 0..8 {
            let column = mux.frame(&view, phase, half).column;
            prop_assert!(column == 0 || column.count_ones() == 1);
            mux.advance();
        }
    }

    #[test]
    fn every_press_is_reported_once(presses in proptest::collection::vec(1u8..=8, 1..20)) {
        let mut sw = SwitchEventProcessor::new();
        for index in presses {
            let pressed = !(1u8 << (index - 1));
            prop_assert_eq!(sw.sample(pressed), Some(index));
            prop_assert_eq!(sw.sample(pressed), None);
            prop_assert_eq!(sw.sample(0xFF), None);
        }
    }
}

#[test]
fn year_of_days_from_2023() {
    let mut date = Date::from_ymd_unchecked(2023, 1, 1);
    for _ in 0..365 {
        date.add_one_day();
    }
    assert_eq!(date, Date::from_ymd_unchecked(2024, 1, 1));

    // 2024 is a leap year
    for _ in 0..365 {
        date.add_one_day();
    }
    assert_eq!(date, Date::from_ymd_unchecked(2024, 12, 31));
}

#[test]
fn init_clock_property() {
    let mut state = device();
    for _ in 0..1234 {
        state.on_millisecond();
    }
    assert_eq!(state.clock.runtime_ms(), 1234);
    apply(&mut state, Action::ToggleReverse);
    apply(&mut state, Action::ToggleFreeze);
    apply(&mut state, Action::InitClock);
    assert_eq!(state.clock.runtime_ms(), 0);
    assert_eq!(state.clock.stopwatch_cs(), 3000);
    assert_eq!(state.clock.alarm_cs(), 3_240_000);
    assert!(!state.reverse && !state.freeze);
}

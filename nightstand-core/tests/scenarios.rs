//! End-to-end scenarios driven through `Clock::tick`

use core::ops::Range;

use nightstand_core::alarm::AlarmState;
use nightstand_core::config::{ClockConfig, SettingsBlock};
use nightstand_core::display::DisplayFrame;
use nightstand_core::input::ControlSamples;
use nightstand_core::signal::{OutputKind, SignalSource};
use nightstand_core::state::{Command, DatePage, Mode};
use nightstand_core::time::{ClockTime, Instant, TimeSourceKind};
use nightstand_core::traits::{
    AlertOutput, DisplayDriver, NoLightSensor, NoTemperatureSensor, SettingsStore, StorageError,
    TimeSource, TimeSourceError,
};
use nightstand_core::{Clock, Peripherals};

#[derive(Default)]
struct MockDisplay {
    last: Option<DisplayFrame>,
}

impl DisplayDriver for MockDisplay {
    fn render(&mut self, frame: &DisplayFrame) {
        self.last = Some(*frame);
    }

    fn set_brightness(&mut self, _level: u8) {}

    fn clear(&mut self, _positions: Range<u8>) {}
}

struct MockRtc {
    time: ClockTime,
    fail: bool,
}

impl TimeSource for MockRtc {
    fn read_time(&mut self) -> Result<ClockTime, TimeSourceError> {
        if self.fail {
            Err(TimeSourceError::SourceUnavailable)
        } else {
            Ok(self.time)
        }
    }

    fn write_time(&mut self, time: ClockTime) -> Result<(), TimeSourceError> {
        self.time = time;
        Ok(())
    }
}

#[derive(Default)]
struct MemoryStore {
    block: Option<SettingsBlock>,
}

impl SettingsStore for MemoryStore {
    fn load_settings(&mut self) -> Result<SettingsBlock, StorageError> {
        self.block.ok_or(StorageError::Absent)
    }

    fn save_settings(&mut self, block: &SettingsBlock) -> Result<(), StorageError> {
        self.block = Some(*block);
        Ok(())
    }
}

#[derive(Default)]
struct RecordingAlert {
    pulses: Vec<(u32, OutputKind)>,
    now: u32,
}

impl AlertOutput for RecordingAlert {
    fn emit_pulse(&mut self, kind: OutputKind, _duration_ms: u16) {
        self.pulses.push((self.now, kind));
    }

    fn set_switch(&mut self, _on: bool) {}
}

type Board =
    Peripherals<MockDisplay, MockRtc, MemoryStore, NoLightSensor, RecordingAlert, NoTemperatureSensor>;

/// A clock on a simulated board with a controllable millisecond counter
struct Rig {
    clock: Clock,
    board: Board,
    now: u32,
}

const TICK_MS: u32 = 10;

impl Rig {
    fn new(config: ClockConfig, time: ClockTime, start_ms: u32) -> Self {
        let mut board = Peripherals::new(
            MockDisplay::default(),
            MockRtc { time, fail: false },
            MemoryStore::default(),
            NoLightSensor,
            RecordingAlert::default(),
            NoTemperatureSensor,
        );
        let clock = Clock::new(config, &mut board, Instant::from_millis(start_ms));
        Self {
            clock,
            board,
            now: start_ms,
        }
    }

    fn at(time: ClockTime) -> Self {
        Self::new(ClockConfig::default(), time, 0)
    }

    fn step(&mut self, samples: &ControlSamples) {
        self.now = self.now.wrapping_add(TICK_MS);
        self.board.alert.now = self.now;
        self.clock
            .tick(Instant::from_millis(self.now), samples, &mut self.board);
    }

    fn idle(&mut self, ms: u32) {
        for _ in 0..ms / TICK_MS {
            self.step(&ControlSamples::default());
        }
    }

    fn press(&mut self, samples: ControlSamples, hold_ms: u32) {
        for _ in 0..hold_ms / TICK_MS {
            self.step(&samples);
        }
        self.idle(50);
    }

    fn apply(&mut self, command: Command) {
        self.clock
            .apply(command, Instant::from_millis(self.now), &mut self.board);
    }
}

fn t(y: u16, mo: u8, d: u8, h: u8, mi: u8, s: u8) -> ClockTime {
    ClockTime::new(y, mo, d, h, mi, s).unwrap()
}

fn select() -> ControlSamples {
    ControlSamples {
        select: true,
        ..Default::default()
    }
}

fn up() -> ControlSamples {
    ControlSamples {
        up: true,
        ..Default::default()
    }
}

#[test]
fn alarm_fires_once_per_minute() {
    let mut rig = Rig::at(t(2024, 9, 3, 6, 59, 50));
    rig.clock.update_settings(|s| s.alarm.state = AlarmState::On);

    rig.idle(9_000);
    assert!(rig.board.alert.pulses.is_empty());

    rig.idle(1_000);
    assert_eq!(rig.clock.now(), t(2024, 9, 3, 7, 0, 0));
    assert_eq!(rig.board.alert.pulses.len(), 1);

    // Silence it and keep polling for the rest of the minute
    rig.apply(Command::DismissSignal);
    rig.idle(55_000);
    assert_eq!(rig.board.alert.pulses.len(), 1);
    assert!(!rig.clock.signal().is_active());
}

#[test]
fn alarm_follows_fibonacci_spacing() {
    let mut rig = Rig::at(t(2024, 9, 3, 6, 59, 59));
    rig.clock.update_settings(|s| s.alarm.state = AlarmState::On);
    rig.idle(20_000);

    let times: Vec<u32> = rig.board.alert.pulses.iter().map(|(ms, _)| *ms).collect();
    assert!(times.len() >= 6);
    let start = times[0];
    let offsets: Vec<u32> = times.iter().map(|ms| ms - start).collect();
    assert_eq!(&offsets[..6], &[0, 1000, 2000, 4000, 7000, 12000]);
}

#[test]
fn ten_second_countdown() {
    let mut rig = Rig::at(t(2024, 9, 3, 12, 0, 0));
    rig.apply(Command::SetTimerPreset { seconds: 10 });
    rig.apply(Command::TimerStartPause);
    let started = rig.now;

    while rig.now.wrapping_sub(started) < 9_990 {
        rig.step(&ControlSamples::default());
        assert!(rig.clock.timer().is_running());
    }
    rig.step(&ControlSamples::default());
    assert_eq!(rig.now - started, 10_000);
    assert!(rig.clock.timer().is_expired());
    assert_eq!(
        rig.clock.signal().active().map(|s| s.source),
        Some(SignalSource::Timer)
    );
}

#[test]
fn minute_edit_clamps_at_59() {
    let mut rig = Rig::at(t(2024, 9, 3, 12, 58, 0));

    // Short hold opens the time edit on the hour, a second commits it
    rig.press(select(), 1_200);
    assert!(rig.clock.navigator().is_editing());
    rig.press(select(), 1_200);

    let view = rig.clock.navigator().edit_view().unwrap();
    assert_eq!(view.index, 1);
    assert_eq!(view.values[1], 58);

    for _ in 0..3 {
        rig.press(up(), 100);
    }
    assert_eq!(rig.clock.navigator().edit_view().unwrap().values[1], 59);

    rig.press(select(), 1_200);
    assert!(!rig.clock.navigator().is_editing());
    let now = rig.clock.now();
    assert_eq!((now.hour(), now.minute()), (12, 59));
}

#[test]
fn rtc_failure_keeps_time_moving() {
    let mut config = ClockConfig::default();
    config.features.time_source = TimeSourceKind::Hardware;
    let mut rig = Rig::new(config, t(2024, 9, 3, 12, 0, 0), 0);

    rig.idle(1_000);
    assert_eq!(rig.clock.now(), t(2024, 9, 3, 12, 0, 0));

    rig.board.time_source.fail = true;
    rig.idle(3_000);
    assert!(!rig.clock.timekeeper().source_ok());
    assert_eq!(rig.clock.now(), t(2024, 9, 3, 12, 0, 3));
}

#[test]
fn counter_wrap_is_seamless() {
    let start = u32::MAX - 2_000;
    let mut rig = Rig::new(ClockConfig::default(), t(2024, 9, 3, 12, 0, 0), start);
    rig.apply(Command::SetTimerPreset { seconds: 5 });
    rig.apply(Command::TimerStartPause);

    rig.idle(5_000);
    assert!(rig.now < start);
    assert_eq!(rig.clock.now(), t(2024, 9, 3, 12, 0, 5));
    assert!(rig.clock.timer().is_expired());
}

#[test]
fn date_page_times_out_to_time() {
    let mut rig = Rig::at(t(2024, 9, 3, 12, 0, 0));
    rig.press(select(), 100);
    assert_eq!(rig.clock.mode(), Mode::Date(DatePage::Date));

    let frame = rig.board.display.last.unwrap();
    assert_eq!(&frame.digits, &[Some(0), Some(9), Some(0), Some(3), Some(2), Some(4)]);

    rig.idle(5_000);
    assert_eq!(rig.clock.mode(), Mode::Time);
}

#[test]
fn settings_survive_restart() {
    let mut rig = Rig::at(t(2024, 9, 3, 12, 0, 0));
    rig.apply(Command::SetAlarmTime { hour: 6, minute: 15 });
    rig.apply(Command::SwitchAlarmState(1));
    rig.idle(20);

    let mut board = Peripherals::new(
        MockDisplay::default(),
        MockRtc {
            time: t(2024, 9, 3, 12, 5, 0),
            fail: false,
        },
        MemoryStore {
            block: rig.board.store.block,
        },
        NoLightSensor,
        RecordingAlert::default(),
        NoTemperatureSensor,
    );
    let clock = Clock::new(ClockConfig::default(), &mut board, Instant::from_millis(0));
    let alarm = clock.settings().alarm;
    assert_eq!((alarm.hour, alarm.minute), (6, 15));
    assert_eq!(alarm.state, AlarmState::On);
}

//! Integration tests for stepper-remote
//!
//! These tests drive a controller over recording pins and check position
//! bookkeeping, persistence and pin-level behaviour end to end.

mod common;

use std::time::Duration;

use proptest::prelude::*;
use serde_json::{json, Value};

use common::{controller, scratch_path, Rig};
use stepper_remote::config::parse_config;
use stepper_remote::error::{MotorError, PositionError};
use stepper_remote::{
    Error, HomeOutcome, JsonFileStore, Line, MemoryStore, MicrostepMode, PositionRecord,
    PositionStore,
};

const FAST: Duration = Duration::from_micros(1);

fn record(current: i64, home: i64) -> PositionRecord {
    PositionRecord {
        current_position: current,
        home_position: home,
        ..PositionRecord::default()
    }
}

// =============================================================================
// Relative and absolute moves
// =============================================================================

proptest! {
    #[test]
    fn relative_moves_sum(start in -1_000i64..1_000, deltas in prop::collection::vec(-200i64..200, 0..8)) {
        let (mut ctrl, rig) = controller(MemoryStore::with_record(record(start, 0)));

        for &d in &deltas {
            ctrl.move_relative(d, FAST).unwrap();
        }

        let total: i64 = deltas.iter().sum();
        let pulses: u64 = deltas.iter().map(|d| d.unsigned_abs()).sum();
        prop_assert_eq!(ctrl.get_position(), start + total);
        prop_assert_eq!(rig.step.high_count() as u64, pulses);
        prop_assert_eq!(ctrl.store().record().map(|r| r.current_position), if deltas.is_empty() { None } else { Some(start + total) });
    }

    #[test]
    fn move_absolute_reaches_target(start in -1_000i64..1_000, target in -1_000i64..1_000) {
        let (mut ctrl, rig) = controller(MemoryStore::with_record(record(start, 0)));

        ctrl.move_absolute(target, FAST).unwrap();

        prop_assert_eq!(ctrl.get_position(), target);
        prop_assert_eq!(rig.step.high_count() as u64, (target - start).unsigned_abs());
    }

    #[test]
    fn json_store_round_trip(
        current in any::<i64>(),
        home in any::<i64>(),
        names in prop::collection::btree_map("[a-z_]{1,12}", any::<i64>(), 0..6),
    ) {
        let mut original = record(current, home);
        for (name, pos) in &names {
            original.set_named(name, *pos).unwrap();
        }

        let path = scratch_path("prop");
        let mut store = JsonFileStore::new(&path);
        store.save(&original).unwrap();
        let loaded = store.load().unwrap();
        let _ = std::fs::remove_file(&path);

        prop_assert_eq!(loaded, original);
    }
}

#[test]
fn pulse_train_timing() {
    let (mut ctrl, rig) = controller(MemoryStore::new());

    ctrl.step(3, Duration::from_millis(1)).unwrap();

    // Build drives STEP low once, then each pulse is high/low
    assert_eq!(
        rig.step.writes(),
        vec![false, true, false, true, false, true, false]
    );
    assert_eq!(rig.delay.total_ns(), 6_000_000);
}

#[test]
fn direction_written_once_per_command() {
    let (mut ctrl, rig) = controller(MemoryStore::new());

    ctrl.move_relative(4, FAST).unwrap();
    ctrl.move_relative(-2, FAST).unwrap();

    assert_eq!(rig.dir.writes(), vec![false, true, false]);
    assert_eq!(ctrl.get_position(), 2);
}

#[test]
fn inverted_direction_flips_level() {
    let rig = Rig::new();
    let mut ctrl = rig
        .builder()
        .store(MemoryStore::new())
        .invert_direction(true)
        .build()
        .unwrap();

    ctrl.move_relative(1, FAST).unwrap();
    assert_eq!(rig.dir.level(), Some(false));
    ctrl.move_relative(-1, FAST).unwrap();
    assert_eq!(rig.dir.level(), Some(true));
}

#[test]
fn zero_delta_emits_nothing_but_persists() {
    let (mut ctrl, rig) = controller(MemoryStore::with_record(record(12, 0)));

    ctrl.move_relative(0, FAST).unwrap();

    assert_eq!(ctrl.get_position(), 12);
    assert_eq!(rig.step.high_count(), 0);
    assert_eq!(rig.dir.level(), Some(false));
    assert_eq!(ctrl.store().writes(), 1);
}

// =============================================================================
// Home, zero and named positions
// =============================================================================

#[test]
fn zero_keeps_bookmarks() {
    let (mut ctrl, rig) = controller(MemoryStore::new());
    ctrl.move_relative(30, FAST).unwrap();
    ctrl.set_home().unwrap();
    ctrl.save_named("a").unwrap();
    ctrl.move_relative(10, FAST).unwrap();
    let step_writes = rig.step.write_count();

    ctrl.zero().unwrap();

    assert_eq!(ctrl.get_position(), 0);
    assert_eq!(ctrl.home_position(), 30);
    assert_eq!(ctrl.named_position("a"), Some(30));
    assert_eq!(rig.step.write_count(), step_writes);
    assert_eq!(ctrl.store().record().unwrap().current_position, 0);
}

#[test]
fn set_home_then_go_home_is_no_op() {
    let (mut ctrl, rig) = controller(MemoryStore::with_record(record(-40, 0)));
    ctrl.set_home().unwrap();
    let step_writes = rig.step.write_count();

    assert_eq!(ctrl.go_home(FAST).unwrap(), HomeOutcome::AlreadyHome);
    assert_eq!(ctrl.get_position(), -40);
    assert_eq!(rig.step.write_count(), step_writes);
}

#[test]
fn go_home_travels_back() {
    let (mut ctrl, rig) = controller(MemoryStore::with_record(record(10, 0)));
    ctrl.set_home().unwrap();
    ctrl.move_relative(25, FAST).unwrap();

    assert_eq!(ctrl.go_home(FAST).unwrap(), HomeOutcome::Moved);
    assert_eq!(ctrl.get_position(), 10);
    assert_eq!(rig.step.high_count(), 50);
}

#[test]
fn save_then_goto_same_name_is_round_trip() {
    let (mut ctrl, rig) = controller(MemoryStore::with_record(record(77, 0)));

    ctrl.save_named("A").unwrap();
    ctrl.goto_named("A", FAST).unwrap();

    assert_eq!(ctrl.get_position(), 77);
    assert_eq!(rig.step.high_count(), 0);
}

#[test]
fn park_scenario() {
    let (mut ctrl, _rig) = controller(MemoryStore::new());
    ctrl.move_relative(50, FAST).unwrap();

    ctrl.save_named("park").unwrap();
    ctrl.move_relative(-50, FAST).unwrap();
    assert_eq!(ctrl.get_position(), 0);
    ctrl.goto_named("park", FAST).unwrap();

    assert_eq!(ctrl.get_position(), 50);
}

#[test]
fn save_named_overwrites_and_accepts_numbers() {
    let (mut ctrl, _rig) = controller(MemoryStore::new());
    ctrl.save_named(&3).unwrap();
    ctrl.move_relative(5, FAST).unwrap();
    ctrl.save_named("3").unwrap();

    assert_eq!(ctrl.named_position("3"), Some(5));
    assert_eq!(ctrl.record().saved_positions.len(), 1);
}

#[test]
fn goto_unknown_name_reports_not_found() {
    let (mut ctrl, rig) = controller(MemoryStore::with_record(record(5, 0)));

    let err = ctrl.goto_named("missing", FAST).unwrap_err();

    assert_eq!(err.kind(), "NamedPositionNotFoundError");
    assert!(matches!(err, Error::Position(PositionError::NotFound(ref n)) if n.as_str() == "missing"));
    assert_eq!(rig.dir.write_count(), 1);
    assert_eq!(ctrl.get_position(), 5);
}

#[test]
fn long_names_and_large_tables_survive_restart() {
    let path = scratch_path("names");
    let long = "sample_holder_position_left_side_x";
    {
        let (mut ctrl, _rig) = controller(JsonFileStore::new(&path));
        ctrl.move_relative(120, FAST).unwrap();
        ctrl.save_named(long).unwrap();
        for i in 0..40 {
            ctrl.move_relative(1, FAST).unwrap();
            ctrl.save_named(&format!("p{}", i)).unwrap();
        }
        ctrl.shutdown().unwrap();
    }

    let (mut ctrl, _rig) = controller(JsonFileStore::new(&path));
    assert_eq!(ctrl.record().saved_positions.len(), 41);
    assert_eq!(ctrl.named_position("p39"), Some(160));
    ctrl.goto_named(long, FAST).unwrap();
    assert_eq!(ctrl.get_position(), 120);
    let _ = std::fs::remove_file(&path);
}

// =============================================================================
// Microstepping
// =============================================================================

#[test]
fn microstep_modes_follow_table() {
    let (mut ctrl, rig) = controller(MemoryStore::new());

    for mode in MicrostepMode::ALL {
        ctrl.set_microstepping(mode.index() as i64).unwrap();
        assert_eq!(rig.ms_levels(), mode.levels().map(Some));
    }
    assert_eq!(ctrl.microstep_mode(), Some(MicrostepMode::ThirtySecond));
}

#[test]
fn invalid_microstep_mode_leaves_lines() {
    let (mut ctrl, rig) = controller(MemoryStore::new());
    ctrl.set_microstepping(3).unwrap();
    let before: Vec<usize> = rig.ms.iter().map(|p| p.write_count()).collect();

    for bad in [-1, 6, 32] {
        let err = ctrl.set_microstepping(bad).unwrap_err();
        assert_eq!(err, Error::Motor(MotorError::InvalidMode(bad)));
        assert_eq!(err.kind(), "InvalidModeError");
    }

    assert_eq!(rig.ms_levels(), [Some(true), Some(true), Some(false)]);
    let after: Vec<usize> = rig.ms.iter().map(|p| p.write_count()).collect();
    assert_eq!(before, after);
    assert_eq!(ctrl.microstep_mode(), Some(MicrostepMode::Eighth));
}

// =============================================================================
// Device failures
// =============================================================================

#[test]
fn step_line_failure_keeps_position() {
    let (mut ctrl, rig) = controller(MemoryStore::with_record(record(100, 0)));
    // Two full pulses and the rising edge of the third succeed
    rig.step.fail_after(5);

    let err = ctrl.move_relative(10, FAST).unwrap_err();

    assert_eq!(
        err,
        Error::Motor(MotorError::Device {
            line: Line::Step,
            pulses_emitted: 2,
        })
    );
    assert_eq!(err.kind(), "DeviceError");
    assert_eq!(ctrl.get_position(), 100);
    assert_eq!(ctrl.store().writes(), 0);
}

#[test]
fn direction_line_failure_emits_no_pulses() {
    let (mut ctrl, rig) = controller(MemoryStore::new());
    rig.dir.fail_after(0);
    let step_writes = rig.step.write_count();

    let err = ctrl.move_relative(-3, FAST).unwrap_err();

    assert_eq!(
        err,
        Error::Motor(MotorError::Device {
            line: Line::Direction,
            pulses_emitted: 0,
        })
    );
    assert_eq!(rig.step.write_count(), step_writes);
    assert_eq!(ctrl.get_position(), 0);
}

#[test]
fn select_line_failure_names_line() {
    let (mut ctrl, rig) = controller(MemoryStore::new());
    rig.ms[1].fail_after(0);

    assert_eq!(
        ctrl.set_microstepping(2),
        Err(Error::Motor(MotorError::Device {
            line: Line::Microstep(1),
            pulses_emitted: 0,
        }))
    );
    assert_eq!(ctrl.microstep_mode(), None);
}

// =============================================================================
// File persistence
// =============================================================================

#[test]
fn fresh_start_writes_three_keys() {
    let path = scratch_path("fresh");
    let (mut ctrl, _rig) = controller(JsonFileStore::new(&path));
    assert_eq!(ctrl.get_position(), 0);

    ctrl.move_relative(50, FAST).unwrap();

    assert_eq!(ctrl.get_position(), 50);
    let on_disk: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        on_disk,
        json!({"current_position": 50, "home_position": 0, "saved_positions": {}})
    );
    let _ = std::fs::remove_file(&path);
}

#[test]
fn state_survives_restart() {
    let path = scratch_path("restart");
    {
        let (mut ctrl, _rig) = controller(JsonFileStore::new(&path));
        ctrl.move_relative(-20, FAST).unwrap();
        ctrl.set_home().unwrap();
        ctrl.move_relative(70, FAST).unwrap();
        ctrl.save_named("park").unwrap();
        let (_pins, store) = ctrl.shutdown().unwrap();
        assert_eq!(store.path(), path.as_path());
    }

    let (ctrl, _rig) = controller(JsonFileStore::new(&path));
    assert_eq!(ctrl.get_position(), 50);
    assert_eq!(ctrl.home_position(), -20);
    assert_eq!(ctrl.named_position("park"), Some(50));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn corrupt_state_file_fails_build() {
    let path = scratch_path("corrupt");
    std::fs::write(&path, "{\"current_position\": \"fifty\"}").unwrap();

    let rig = Rig::new();
    let err = rig
        .builder()
        .store(JsonFileStore::new(&path))
        .build()
        .err()
        .expect("corrupt file must not load");

    assert_eq!(err.kind(), "CorruptStateError");
    assert_eq!(rig.step.write_count(), 0);
    let _ = std::fs::remove_file(&path);
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn controller_from_toml_settings() {
    let config = parse_config(
        r#"
[pins]
step = 17
direction = 27
microstep = [5, 6, 13]

[motor]
invert_direction = true
pulse_delay_us = 250
microstep_mode = 2
"#,
    )
    .unwrap();

    let rig = Rig::new();
    let mut ctrl = rig
        .builder()
        .store(MemoryStore::new())
        .from_settings(&config.motor)
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(ctrl.default_pulse_delay(), Duration::from_micros(250));
    assert_eq!(ctrl.microstep_mode(), Some(MicrostepMode::Quarter));
    assert_eq!(rig.ms_levels(), [Some(false), Some(true), Some(false)]);

    ctrl.move_relative(2, ctrl.default_pulse_delay()).unwrap();
    assert_eq!(rig.dir.level(), Some(false));
    assert_eq!(rig.delay.total_ns(), 1_000_000);
}

#[test]
fn out_of_range_configured_mode_rejected() {
    let mut settings = stepper_remote::MotorSettings::default();
    settings.microstep_mode = Some(9);

    let rig = Rig::new();
    let result = rig.builder::<MemoryStore>().from_settings(&settings);

    assert!(matches!(result, Err(ref e) if e.kind() == "ConfigError"));
}

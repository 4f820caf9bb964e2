//! Shared test doubles: recording GPIO lines and a timing delay.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};

use stepper_remote::{MotionController, MotionControllerBuilder, PositionStore};

/// Pin write failure.
#[derive(Debug)]
pub struct PinFault;

impl embedded_hal::digital::Error for PinFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Output pin that records every level written. Clones share the log.
#[derive(Clone, Default)]
pub struct RecordingPin {
    log: Arc<Mutex<Vec<bool>>>,
    fail_after: Arc<Mutex<Option<usize>>>,
}

impl RecordingPin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write after the first `n` successful ones fail.
    pub fn fail_after(&self, n: usize) {
        let done = self.log.lock().unwrap().len();
        *self.fail_after.lock().unwrap() = Some(done + n);
    }

    pub fn writes(&self) -> Vec<bool> {
        self.log.lock().unwrap().clone()
    }

    pub fn write_count(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    pub fn level(&self) -> Option<bool> {
        self.log.lock().unwrap().last().copied()
    }

    pub fn high_count(&self) -> usize {
        self.log.lock().unwrap().iter().filter(|&&l| l).count()
    }

    fn record(&mut self, level: bool) -> Result<(), PinFault> {
        let mut log = self.log.lock().unwrap();
        if let Some(limit) = *self.fail_after.lock().unwrap() {
            if log.len() >= limit {
                return Err(PinFault);
            }
        }
        log.push(level);
        Ok(())
    }
}

impl ErrorType for RecordingPin {
    type Error = PinFault;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.record(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.record(true)
    }
}

/// Delay that only adds up the requested time.
#[derive(Clone, Default)]
pub struct TallyDelay {
    total_ns: Arc<AtomicU64>,
}

impl TallyDelay {
    pub fn total_ns(&self) -> u64 {
        self.total_ns.load(Ordering::SeqCst)
    }
}

impl DelayNs for TallyDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns.fetch_add(u64::from(ns), Ordering::SeqCst);
    }
}

/// Handles onto the five lines and the delay of a test controller.
pub struct Rig {
    pub step: RecordingPin,
    pub dir: RecordingPin,
    pub ms: [RecordingPin; 3],
    pub delay: TallyDelay,
}

impl Rig {
    pub fn new() -> Self {
        Self {
            step: RecordingPin::new(),
            dir: RecordingPin::new(),
            ms: [RecordingPin::new(), RecordingPin::new(), RecordingPin::new()],
            delay: TallyDelay::default(),
        }
    }

    /// Builder wired to this rig's lines; the store is left to the caller.
    pub fn builder<S: PositionStore>(&self) -> TestBuilder<S> {
        MotionController::builder()
            .step_pin(self.step.clone())
            .dir_pin(self.dir.clone())
            .microstep_pins(self.ms.clone())
            .delay(self.delay.clone())
    }

    pub fn ms_levels(&self) -> [Option<bool>; 3] {
        [self.ms[0].level(), self.ms[1].level(), self.ms[2].level()]
    }
}

pub type TestController<S> = MotionController<RecordingPin, RecordingPin, RecordingPin, TallyDelay, S>;
pub type TestBuilder<S> = MotionControllerBuilder<RecordingPin, RecordingPin, RecordingPin, TallyDelay, S>;

pub fn controller<S: PositionStore>(store: S) -> (TestController<S>, Rig) {
    let rig = Rig::new();
    let ctrl = rig.builder().store(store).build().expect("controller builds");
    (ctrl, rig)
}

static SCRATCH: AtomicUsize = AtomicUsize::new(0);

/// Unique, not-yet-existing file path under the temp dir.
pub fn scratch_path(tag: &str) -> PathBuf {
    let n = SCRATCH.fetch_add(1, Ordering::SeqCst);
    let path = std::env::temp_dir().join(format!(
        "stepper-remote-it-{}-{}-{}.json",
        tag,
        std::process::id(),
        n
    ));
    let _ = std::fs::remove_file(&path);
    path
}

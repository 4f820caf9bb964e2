//! Raspberry Pi stepper server.
//!
//! Usage: `stepper-server [config.toml]`. Without a file, pins come from
//! `STEP_PIN`, `DIRECTION_PIN` and `MICROSTEPPING_PIN_0..2`.

use std::process;
use std::sync::Arc;

use rppal::gpio::Gpio;
use rppal::hal::Delay;

use stepper_remote::rpc::{Dispatcher, Server};
use stepper_remote::{load_config, JsonFileStore, MotionController, ServiceConfig};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => load_config(path)?,
        None => ServiceConfig::from_env()?,
    };
    let pins = config.pins.resolve()?;
    log::info!(
        "pins: step {}, direction {}, microstep {:?}",
        pins.step,
        pins.direction,
        pins.microstep
    );

    let gpio = Gpio::new()?;
    let output = |pin: u8| gpio.get(pin).map(|p| p.into_output());

    let controller = MotionController::builder()
        .step_pin(output(pins.step)?)
        .dir_pin(output(pins.direction)?)
        .microstep_pins([
            output(pins.microstep[0])?,
            output(pins.microstep[1])?,
            output(pins.microstep[2])?,
        ])
        .delay(Delay::new())
        .store(JsonFileStore::new(config.storage.path.as_str()))
        .from_settings(&config.motor)?
        .build()?;

    let dispatcher = Arc::new(Dispatcher::new(controller));

    let on_signal = Arc::clone(&dispatcher);
    ctrlc::set_handler(move || {
        log::info!("signal received, shutting down");
        // Waits for an in-flight command to finish before persisting.
        let code = match on_signal.shutdown() {
            Ok(()) => 0,
            Err(e) => {
                log::error!("shutdown failed: {}", e);
                1
            }
        };
        process::exit(code);
    })?;

    let server = Server::bind(config.server.bind.as_str(), Arc::clone(&dispatcher))?;
    server.run()?;

    dispatcher.shutdown()?;
    Ok(())
}

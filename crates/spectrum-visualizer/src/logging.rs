//! Logger setup: the browser console on wasm, `env_logger` everywhere else

use log::{LevelFilter, SetLoggerError};

/// Install the logger. Later calls only adjust the level.
pub fn init(level: LevelFilter) {
    if install(level).is_err() {
        log::debug!("Logger already installed");
    }
    log::set_max_level(level);
}

#[cfg(target_arch = "wasm32")]
fn install(level: LevelFilter) -> Result<(), SetLoggerError> {
    console_log::init_with_level(level.to_level().unwrap_or(log::Level::Error))
}

#[cfg(not(target_arch = "wasm32"))]
fn install(level: LevelFilter) -> Result<(), SetLoggerError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_str()))
        .is_test(cfg!(test))
        .try_init()
}

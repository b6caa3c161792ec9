//! This module defines the main functionality of the time-lapse camera controller.

pub mod module; // Import the module submodule that contains other modules
use crate::module::define; // Import the define module that contains constants and types
use crate::module::util::init::resource::init; // Import the resource initialization function

// The main function of the time-lapse controller
pub fn main() {
    if let Err(err) = run() {
        log::error!("Stopped: {}", err);
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

/// Bootstrap resources and logging, then hand over to the capture loop.
fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Prepare the resources by initializing the property struct
    let property = init()?;

    // Initialize the logging system with the log directory and the system name
    init_log(
        property.path.dir.log.as_str(),
        define::system::NAME,
        &property.conf.system.log_level,
    )?;
    log::info!("Starting Timelapse..."); // Log an info message

    // Open the configured camera and run the loop on this thread
    let mut camera = module::device::open(&property.conf)?;
    module::drive::run(&property, camera.as_mut())?;
    Ok(())
}

/// This function initializes the logger system using the log4rs crate.
///
/// # Arguments
/// * `dir` - A string slice that holds the directory where the log file will be stored
/// * `name` - A string slice that holds the name of the logger and the log file
/// * `level` - Root level name, `INFO` when unrecognised
///
/// # Log Example
/// ```
/// log::debug!("Debug Message"); // Log a debug message
/// log::info!("Info Message"); // Log an info message
/// log::warn!("Warning Message"); // Log a warning message
/// log::error!("Error Message"); // Log an error message
/// ```
fn init_log(dir: &str, name: &str, level: &str) -> Result<(), Box<dyn std::error::Error>> {
    use crate::module::util::path::join;
    use log::LevelFilter;
    use log4rs::append::console::ConsoleAppender;
    use log4rs::append::file::FileAppender;
    use log4rs::config::{Appender, Config, Root};
    use log4rs::encode::pattern::PatternEncoder;

    const PATTERN: &str = "{d} - {l}: {m}{n}";

    let logfile = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(join(&[dir, &format!("{}.log", name)]))?;
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build();

    let level = level.parse::<LevelFilter>().unwrap_or(LevelFilter::Info);
    let config = Config::builder()
        .appender(Appender::builder().build("logfile", Box::new(logfile)))
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(
            Root::builder()
                .appender("logfile")
                .appender("stdout")
                .build(level),
        )?;
    log4rs::init_config(config)?;
    Ok(())
}

use std::str::FromStr;
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use crate::errors::ConfigError;
use crate::initialization::General;

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {h({l})} {t} - {m}{n}";

/// Initializes log4rs as the global logger
///
/// # Arguments
///
/// * 'general' - logging part of the configuration
pub fn setup_logger(general: &General) -> Result<(), ConfigError> {
    log4rs::init_config(log_config(general)?)?;
    Ok(())
}

/// Builds the log4rs configuration, a console appender and/or a file appender
///
/// # Arguments
///
/// * 'general' - logging part of the configuration
fn log_config(general: &General) -> Result<Config, ConfigError> {
    let level = LevelFilter::from_str(&general.log_level)
        .map_err(|_| ConfigError(format!("unknown log level: {}", general.log_level)))?;

    let mut builder = Config::builder();
    let mut root = Root::builder();

    if general.log_to_stdout {
        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(PATTERN)))
            .build();
        builder = builder.appender(Appender::builder().build("stdout", Box::new(stdout)));
        root = root.appender("stdout");
    }

    if let Some(log_path) = &general.log_path {
        let file = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(PATTERN)))
            .build(log_path)?;
        builder = builder.appender(Appender::builder().build("file", Box::new(file)));
        root = root.appender("file");
    }

    Ok(builder.build(root.build(level))?)
}

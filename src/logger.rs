use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;

/// Initializes the global logger. `verbosity` follows the usual CLI
/// convention of counting repeated `-v` flags: 0 = warnings and errors only,
/// 1 = info, 2 = debug, 3+ = trace.
pub fn init_logger(verbosity: u8) -> log4rs::Handle {
    let pattern = PatternEncoder::new("{d(%Y-%m-%d %H:%M:%S%.3f)} [{M}:{L} {T}] {h({l})} {m}{n}");

    let console = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(pattern))
        .build();

    let root_level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    let rustls_level = if verbosity >= 2 {
        log::LevelFilter::Error
    } else {
        log::LevelFilter::Off
    };

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(console)))
        .logger(Logger::builder().build("rustls", rustls_level))
        .logger(Logger::builder().build("html5ever", log::LevelFilter::Error))
        .build(Root::builder().appender("stderr").build(root_level))
        .expect("could not configure logger");

    log4rs::init_config(config).expect("could not start logger")
}

use env_logger::Env;
use log::LevelFilter;

/// Initialize logging using env_logger.
///
/// `RUST_LOG` wins when set, e.g. `RUST_LOG=upstage_core=debug upstage-ssh list`.
/// Otherwise the level follows the number of `-v` flags: none → warn,
/// one → info, two or more → debug. Output goes to stderr so it never
/// mixes with command output.
pub fn init_logging(verbosity: u8) {
    let default = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(default.as_str()))
        .format_timestamp(None)
        .init();
}

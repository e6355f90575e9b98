use log::LevelFilter;

/// Initializes process-wide logging. `verbosity` counts repeated `-v` flags, `quiet` is `-q`;
/// quiet wins outright, otherwise each `-v` steps one level louder than the default `Info`.
pub fn init(verbosity: u8, quiet: bool) {
  let level = if quiet {
    LevelFilter::Error
  } else {
    match verbosity {
      0 => LevelFilter::Info,
      1 => LevelFilter::Debug,
      _ => LevelFilter::Trace,
    }
  };

  env_logger::Builder::new().filter_level(level).format_timestamp_millis().init();
}

use log::LevelFilter;
use std::io::Write;

pub const DEFAULT_LEVEL: &str = "info";
const LEVEL_VAR: &str = "FITLOG_LOG";

/// Level name from `FITLOG_LOG`, `info` when unset or blank
pub fn level_from_env() -> String {
  std::env::var(LEVEL_VAR)
    .ok()
    .map(|v| v.trim().to_string())
    .filter(|v| !v.is_empty())
    .unwrap_or_else(|| DEFAULT_LEVEL.to_string())
}

/// Parse a level name into a filter. Unknown names yield `None`.
pub fn parse_level(level: &str) -> Option<LevelFilter> {
  match level.trim().to_lowercase().as_str() {
    "off" => Some(LevelFilter::Off),
    "error" => Some(LevelFilter::Error),
    "warn" | "warning" => Some(LevelFilter::Warn),
    "info" => Some(LevelFilter::Info),
    "debug" => Some(LevelFilter::Debug),
    "trace" => Some(LevelFilter::Trace),
    _ => None,
  }
}

/// Install the process logger. Returns false for an unknown level name,
/// in which case nothing is installed.
pub fn init(level: &str) -> bool {
  let Some(filter) = parse_level(level) else {
    return false;
  };

  let mut builder = env_logger::Builder::new();
  builder
    .format(|buf, record| {
      writeln!(
        buf,
        "{}: {} - {}",
        record.level(),
        record.target(),
        record.args()
      )
    })
    .target(env_logger::Target::Stdout)
    .filter_level(filter);

  // A second init (tests, re-setup) keeps the first logger
  let _ = builder.try_init();
  log::set_max_level(filter);
  true
}

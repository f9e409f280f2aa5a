//! Browser console backend for the `log` facade.

use log::Level;

/// Routes `log` records to the browser console. Calling it again only
/// updates the level.
pub fn init(level: Level) {
    if console_log::init_with_level(level).is_err() {
        log::set_max_level(level.to_level_filter());
        log::debug!("console logger already installed");
    }
}

/// Unknown names fall back to `info`.
pub fn parse_level(name: &str) -> Level {
    name.parse().unwrap_or(Level::Info)
}

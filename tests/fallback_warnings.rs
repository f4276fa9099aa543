//! Fallback warnings go through the `log` facade.
//!
//! Installs a global logger, so it lives in its own test binary.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use log::{Level, LevelFilter, Log, Metadata, Record};

use chime_backend::config::Config;

struct CapturingLogger {
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for CapturingLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        self.records
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger {
    records: Mutex::new(Vec::new()),
};

#[test]
fn unparseable_values_are_reported_as_warnings() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Trace);

    let env: HashMap<&str, &str> = [
        ("SERVER_PORT", "abc"),
        ("SERVER_IDLE_TIMEOUT", "soon"),
        ("DB_PORT", "6543"),
    ]
    .into_iter()
    .collect();
    let config = Config::from_lookup(|key| env.get(key).map(|v| v.to_string()));

    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.idle_timeout, Duration::from_secs(60));
    assert_eq!(config.database.port, 6543);

    let warnings: Vec<String> = LOGGER
        .records
        .lock()
        .unwrap()
        .iter()
        .filter(|(level, _)| *level == Level::Warn)
        .map(|(_, msg)| msg.clone())
        .collect();

    assert_eq!(warnings.len(), 2, "unexpected warnings: {warnings:?}");
    assert!(warnings.iter().any(|w| w.starts_with("SERVER_PORT") && w.contains("\"abc\"")));
    assert!(warnings.iter().any(|w| w.starts_with("SERVER_IDLE_TIMEOUT") && w.contains("\"soon\"")));
}

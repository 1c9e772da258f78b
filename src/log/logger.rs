use crate::log::Level;
use crate::log::tag_list::TagList;
use crate::time::FormatTime;
use std::sync::{Mutex, OnceLock};
use std::time::SystemTime;

#[derive(Clone, Eq, Hash, PartialEq)]
pub struct LogEvent {
    pub time: SystemTime,
    pub level: Level,
    pub tags: TagList,
}
impl LogEvent {
    pub fn new(level: Level, tags: impl Into<TagList>) -> Self {
        Self {
            time: SystemTime::now(),
            level,
            tags: tags.into(),
        }
    }
}

pub trait Logger: Send {
    fn add(&self, event: LogEvent);
}

/// Writes one line per event to stdout:
/// `2024-05-02T17:10:05Z info listening "addr":"127.0.0.1:8000"`.
#[derive(Clone)]
pub struct StdoutLogger {}
impl Logger for StdoutLogger {
    fn add(&self, event: LogEvent) {
        let time = event.time.iso8601_utc();
        let level = event.level;
        let mut tags = event.tags;
        if let Some(msg_index) = tags.iter().position(|tag| tag.name == "msg") {
            let msg_tag = tags.remove(msg_index);
            let msg = msg_tag.value;
            println!("{time} {level} {msg} {tags}");
        } else {
            println!("{time} {level} {tags}");
        }
    }
}

static GLOBAL_LOGGER: OnceLock<Mutex<Box<dyn Logger>>> = OnceLock::new();
static STDOUT_LOGGER: StdoutLogger = StdoutLogger {};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct GlobalLoggerAlreadySetError {}

/// Installs `logger` as the process-wide logger.
///
/// # Errors
/// Returns an error when a global logger was already set.
pub fn set_global_logger(logger: impl Logger + 'static) -> Result<(), GlobalLoggerAlreadySetError> {
    GLOBAL_LOGGER
        .set(Mutex::new(Box::new(logger)))
        .map_err(|_| GlobalLoggerAlreadySetError {})
}

pub fn log(time: SystemTime, level: Level, tags: impl Into<TagList>) {
    let event = LogEvent {
        time,
        level,
        tags: tags.into(),
    };
    if let Some(mutex_logger) = GLOBAL_LOGGER.get() {
        mutex_logger.lock().unwrap().add(event);
    } else {
        STDOUT_LOGGER.add(event);
    }
}

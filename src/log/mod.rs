//! Structured logging with tagged events.
//!
//! Events go to the logger installed with
//! [`set_global_logger`](logger::set_global_logger),
//! or to stdout when none was installed.
mod logger;
mod tag;
mod tag_list;
mod tag_value;

pub use logger::{GlobalLoggerAlreadySetError, LogEvent, Logger, StdoutLogger, set_global_logger};
pub use tag::{Tag, tag};
pub use tag_list::TagList;
pub use tag_value::TagValue;

use logger::log;
use std::fmt::{Display, Formatter};
use std::time::SystemTime;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Level {
    Error,
    Info,
    Debug,
}
impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Level::Error => write!(f, "error"),
            Level::Info => write!(f, "info"),
            Level::Debug => write!(f, "debug"),
        }
    }
}

/// Makes a new log event with 'error' level and sends it to the global logger.
pub fn error(msg: impl Into<String>, tags: impl Into<TagList>) {
    let mut tags = tags.into();
    tags.insert(0, tag("msg", msg.into()));
    log(SystemTime::now(), Level::Error, tags);
}

/// Makes a new log event with 'info' level and sends it to the global logger.
pub fn info(msg: impl Into<String>, tags: impl Into<TagList>) {
    let mut tags = tags.into();
    tags.insert(0, tag("msg", msg.into()));
    log(SystemTime::now(), Level::Info, tags);
}

/// Makes a new log event with 'debug' level and sends it to the global logger.
pub fn debug(msg: impl Into<String>, tags: impl Into<TagList>) {
    let mut tags = tags.into();
    tags.insert(0, tag("msg", msg.into()));
    log(SystemTime::now(), Level::Debug, tags);
}

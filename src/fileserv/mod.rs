//! The reference plugin: a filesystem-backed content server mapping
//! request paths to local files.
//!
//! GET and HEAD always read; POST, PUT, and DELETE change the filesystem
//! and are registered only in [`FileServerMode::ReadAndWrite`].
mod consumers;
mod mapper;
mod producer;

pub use consumers::{DirectoryPolicy, FileDeleteConsumer, FileReadConsumer, FileWriteConsumer};
pub use mapper::{MapError, MapperError, UriMapper};
pub use producer::{probe_content_type, send_file};

use crate::RequestConsumer;
use crate::dispatch::{ConsumerSelector, RequestDispatcher};
use crate::method::Method;
use std::path::PathBuf;
use std::sync::Arc;

/// Which filesystem operations the plugin exposes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FileServerMode {
    ReadOnly,
    ReadAndWrite,
}

/// Builds the file-server plugin: a request dispatcher wired to read,
/// write, and delete consumers over one mapped root directory.
///
/// # Example
/// ```no_run
/// use hutch::fileserv::{DirectoryPolicy, FileServerBuilder, FileServerMode};
///
/// let plugin = FileServerBuilder::new("/var/www")
///     .mode(FileServerMode::ReadOnly)
///     .directory_policy(DirectoryPolicy::ServeIndexFile("index.html".to_string()))
///     .build()
///     .unwrap();
/// ```
pub struct FileServerBuilder {
    root: PathBuf,
    mode: FileServerMode,
    directory_policy: DirectoryPolicy,
}
impl FileServerBuilder {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            mode: FileServerMode::ReadOnly,
            directory_policy: DirectoryPolicy::Forbid,
        }
    }

    #[must_use]
    pub fn mode(mut self, mode: FileServerMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn directory_policy(mut self, policy: DirectoryPolicy) -> Self {
        self.directory_policy = policy;
        self
    }

    /// Validates the root directory and assembles the consumer table.
    ///
    /// # Errors
    /// Returns an error unless the root is an absolute path naming an
    /// existing, readable directory.
    pub fn build(self) -> Result<Arc<dyn RequestConsumer>, MapperError> {
        let mapper = Arc::new(UriMapper::new(self.root)?);
        let read_consumer = Arc::new(FileReadConsumer::new(
            mapper.clone(),
            self.directory_policy,
        ));
        let mut selector = ConsumerSelector::new()
            .with_consumer(Method::Get, read_consumer.clone())
            .with_consumer(Method::Head, read_consumer);
        if self.mode == FileServerMode::ReadAndWrite {
            let write_consumer = Arc::new(FileWriteConsumer::new(mapper.clone()));
            let delete_consumer = Arc::new(FileDeleteConsumer::new(mapper));
            selector = selector
                .with_consumer(Method::Post, write_consumer.clone())
                .with_consumer(Method::Put, write_consumer)
                .with_consumer(Method::Delete, delete_consumer);
        }
        Ok(Arc::new(RequestDispatcher::new(selector)))
    }
}

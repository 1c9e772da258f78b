use crate::url::percent_decode;
use std::fmt::{Display, Formatter};
use std::path::{Component, Path, PathBuf};

/// Why a root directory was rejected at construction time.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MapperError {
    RootNotAbsolute(PathBuf),
    RootNotADirectory(PathBuf),
    RootNotReadable(PathBuf, String),
}
impl Display for MapperError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            MapperError::RootNotAbsolute(path) => {
                write!(f, "root directory path is not absolute: {path:?}")
            }
            MapperError::RootNotADirectory(path) => {
                write!(f, "root directory path is not a directory: {path:?}")
            }
            MapperError::RootNotReadable(path, msg) => {
                write!(f, "root directory is not readable: {path:?}: {msg}")
            }
        }
    }
}
impl std::error::Error for MapperError {}

/// Why a request path could not be mapped.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MapError {
    EmptyPath,
    NotAbsolute,
}

/// Pure function from request paths to absolute local paths under a fixed
/// root directory.
///
/// Every path returned by [`UriMapper::map`] is lexically confined to the
/// root: `..` segments collapse against earlier segments and cannot climb
/// above `/`, mirroring how lexical normalization treats an absolute path.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UriMapper {
    root: PathBuf,
}
impl UriMapper {
    /// # Errors
    /// Returns an error unless `root` is an absolute path naming an
    /// existing, readable directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, MapperError> {
        let mut root = root.into();
        if !root.is_absolute() {
            return Err(MapperError::RootNotAbsolute(root));
        }
        if !root.is_dir() {
            return Err(MapperError::RootNotADirectory(root));
        }
        // Prove readability now rather than on the first request.
        if let Err(e) = std::fs::read_dir(&root) {
            return Err(MapperError::RootNotReadable(root, e.to_string()));
        }
        // Normalize away a trailing separator so joined paths are uniform.
        if let Some(parent) = root.parent() {
            if let Some(name) = root.file_name() {
                root = parent.join(name);
            }
        }
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a request path onto the local filesystem.
    ///
    /// Percent-decodes `uri_path`, lexically collapses `.` and `..`
    /// segments (clamping at the root), and joins the result onto the root
    /// directory.  The returned path is absolute and has no trailing
    /// separator.
    ///
    /// # Errors
    /// Returns an error when `uri_path` is empty or does not start with
    /// `/`.
    pub fn map(&self, uri_path: &str) -> Result<PathBuf, MapError> {
        if uri_path.is_empty() {
            return Err(MapError::EmptyPath);
        }
        if !uri_path.starts_with('/') {
            return Err(MapError::NotAbsolute);
        }
        let decoded = percent_decode(uri_path.as_bytes());
        let mut segments: Vec<&str> = Vec::new();
        for segment in decoded.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    // Clamped at the root; cannot climb above it.
                    let _ignored = segments.pop();
                }
                other => segments.push(other),
            }
        }
        let mut path = self.root.clone();
        for segment in segments {
            // Only plain single-name components may extend the path;
            // anything the OS would treat as a separator or prefix is
            // discarded.
            let mut components = Path::new(segment).components();
            if let (Some(Component::Normal(_)), None) = (components.next(), components.next()) {
                path.push(segment);
            }
        }
        Ok(path)
    }
}

use crate::fileserv::mapper::UriMapper;
use crate::fileserv::producer::send_file;
use crate::log::tag;
use crate::{Request, RequestConsumer, Response, log};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// What a read consumer does when the mapped path is a directory.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DirectoryPolicy {
    /// Respond `403 Forbidden`.
    Forbid,
    /// Serve the named file from inside the requested directory,
    /// responding `404` when it is absent.
    ServeIndexFile(String),
}

fn respond_not_found(response: &mut Response, message: String) {
    *response = Response::text(404, message).with_reason("NOT FOUND");
}

fn respond_forbidden(response: &mut Response, message: String) {
    *response = Response::text(403, message).with_reason("FORBIDDEN");
}

fn respond_internal_error(response: &mut Response, message: String) {
    *response = Response::text(500, message).with_reason("INTERNAL SERVER ERROR");
}

fn respond_mapping_failed(response: &mut Response, request: &Request) {
    log::error(
        "cannot map request path",
        (tag("path", request.url.raw_path().to_string()),),
    );
    respond_internal_error(
        response,
        format!("cannot map request path: {}", request.url.raw_path()),
    );
}

/// Serves GET and HEAD requests from the mapped filesystem tree.
///
/// Stateless and shared by every connection thread; all state lives in the
/// per-call request/response pair and the filesystem.
pub struct FileReadConsumer {
    mapper: Arc<UriMapper>,
    directory_policy: DirectoryPolicy,
}
impl FileReadConsumer {
    #[must_use]
    pub fn new(mapper: Arc<UriMapper>, directory_policy: DirectoryPolicy) -> Self {
        Self {
            mapper,
            directory_policy,
        }
    }

    fn serve_directory(&self, request: &Request, response: &mut Response, directory: &Path) {
        match &self.directory_policy {
            DirectoryPolicy::Forbid => respond_forbidden(
                response,
                format!(
                    "the requested resource is a directory and cannot be fetched: {}",
                    request.url.raw_path()
                ),
            ),
            DirectoryPolicy::ServeIndexFile(name) => {
                let index_path = directory.join(name);
                if index_path.is_file() {
                    send_file(&index_path, response);
                } else {
                    respond_not_found(
                        response,
                        format!(
                            "the default resource for the requested directory was not found: {}",
                            request.url.raw_path()
                        ),
                    );
                }
            }
        }
    }
}
impl RequestConsumer for FileReadConsumer {
    fn consume(&self, request: &Request, response: &mut Response) {
        let Ok(path) = self.mapper.map(request.url.raw_path()) else {
            respond_mapping_failed(response, request);
            return;
        };
        if !path.exists() {
            respond_not_found(
                response,
                format!(
                    "the requested resource was not found: {}",
                    request.url.raw_path()
                ),
            );
        } else if path.is_dir() {
            self.serve_directory(request, response, &path);
        } else {
            send_file(&path, response);
        }
    }
}

/// Handles POST and PUT by replacing the mapped file's contents with the
/// request body.
pub struct FileWriteConsumer {
    mapper: Arc<UriMapper>,
}
impl FileWriteConsumer {
    #[must_use]
    pub fn new(mapper: Arc<UriMapper>) -> Self {
        Self { mapper }
    }
}
impl RequestConsumer for FileWriteConsumer {
    fn consume(&self, request: &Request, response: &mut Response) {
        let Ok(path) = self.mapper.map(request.url.raw_path()) else {
            respond_mapping_failed(response, request);
            return;
        };
        if path.is_dir() {
            respond_forbidden(
                response,
                format!(
                    "the requested resource is a directory and cannot be overwritten: {}",
                    request.url.raw_path()
                ),
            );
            return;
        }
        let body = match request.body.as_bytes() {
            Ok(bytes) => bytes,
            Err(_) => {
                respond_internal_error(
                    response,
                    format!(
                        "the request body was not received: {}",
                        request.url.raw_path()
                    ),
                );
                return;
            }
        };
        // Creating the file can fail for a missing parent directory or an
        // unwritable one; both surface as an absent resource.
        let mut file = match std::fs::File::create(&path) {
            Ok(file) => file,
            Err(e) => {
                log::error(
                    "cannot create file",
                    (
                        tag("path", path.to_string_lossy().to_string()),
                        tag("err", e.to_string()),
                    ),
                );
                respond_not_found(
                    response,
                    format!(
                        "cannot find the resource or resources in the requested path: {}",
                        request.url.raw_path()
                    ),
                );
                return;
            }
        };
        match file.write_all(body).and_then(|()| file.flush()) {
            Ok(()) => {
                response.set_code(201);
                response.set_reason("CREATED");
            }
            Err(e) => {
                log::error(
                    "error writing file",
                    (
                        tag("path", path.to_string_lossy().to_string()),
                        tag("err", e.to_string()),
                    ),
                );
                respond_internal_error(
                    response,
                    format!(
                        "there was an unexpected failure writing the resource: {}",
                        request.url.raw_path()
                    ),
                );
            }
        }
    }
}

/// Handles DELETE for plain files; directories are never deleted through
/// this interface.
pub struct FileDeleteConsumer {
    mapper: Arc<UriMapper>,
}
impl FileDeleteConsumer {
    #[must_use]
    pub fn new(mapper: Arc<UriMapper>) -> Self {
        Self { mapper }
    }
}
impl RequestConsumer for FileDeleteConsumer {
    fn consume(&self, request: &Request, response: &mut Response) {
        let Ok(path) = self.mapper.map(request.url.raw_path()) else {
            respond_mapping_failed(response, request);
            return;
        };
        if !path.exists() {
            respond_not_found(
                response,
                format!("resource cannot be found: {}", request.url.raw_path()),
            );
        } else if path.is_dir() {
            respond_forbidden(
                response,
                format!("the requested resource is forbidden: {}", request.url.raw_path()),
            );
        } else if let Err(e) = std::fs::remove_file(&path) {
            log::error(
                "error deleting file",
                (
                    tag("path", path.to_string_lossy().to_string()),
                    tag("err", e.to_string()),
                ),
            );
            respond_internal_error(
                response,
                format!(
                    "the server was unable to fulfil the delete request: {}",
                    request.url.raw_path()
                ),
            );
        } else {
            response.set_code(204);
            response.set_reason("DELETED");
        }
    }
}

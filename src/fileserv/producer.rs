use crate::log::tag;
use crate::{ContentType, Response, ResponseBody, log};
use std::path::Path;

/// Fills `response` with the bytes of `path`, streamed at send time.
///
/// The content type comes from a best-effort probe of the file name; a
/// file with no recognizable extension is served without a content-type
/// header rather than failing.
pub fn send_file(path: &Path, response: &mut Response) {
    // Open eagerly so an unreadable file becomes a 500 response instead of
    // a failure in the middle of sending.
    let metadata = match std::fs::File::open(path).and_then(|file| file.metadata()) {
        Ok(metadata) => metadata,
        Err(e) => {
            log::error(
                "cannot open file for response",
                (
                    tag("path", path.to_string_lossy().to_string()),
                    tag("err", e.to_string()),
                ),
            );
            *response = Response::text(500, "error reading server resource");
            return;
        }
    };
    if let Some(content_type) = probe_content_type(path) {
        response.set_content_type(content_type);
    }
    response.set_body(ResponseBody::File(path.to_path_buf(), metadata.len()));
}

/// Best-effort content-type probe.  Absence never becomes an error.
#[must_use]
pub fn probe_content_type(path: &Path) -> Option<ContentType> {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(ContentType::from_file_extension)
}

use std::io::{Read, Write};

pub enum CopyResult {
    Ok(u64),
    ReaderErr(std::io::Error),
    WriterErr(std::io::Error),
}

/// Copies bytes from `reader` to `writer` until `reader` returns EOF,
/// reporting which side failed.
pub fn copy(mut reader: impl Read, mut writer: impl Write) -> CopyResult {
    let mut buf = [0_u8; 65536];
    let mut num_copied = 0;
    loop {
        let num_read = match reader.read(&mut buf) {
            Ok(0) => return CopyResult::Ok(num_copied),
            Ok(n) => n,
            Err(e) => return CopyResult::ReaderErr(e),
        };
        match writer.write_all(&buf[..num_read]) {
            Ok(()) => num_copied += num_read as u64,
            Err(e) => return CopyResult::WriterErr(e),
        }
    }
}

/// Convert a byte slice into a string.
/// Includes printable ASCII characters as-is.
/// Converts non-printable or non-ASCII characters to strings like "\n" and "\x19".
#[must_use]
#[allow(clippy::missing_panics_doc)]
pub fn escape_ascii(input: &[u8]) -> String {
    let mut result = String::new();
    for byte in input {
        for ascii_byte in core::ascii::escape_default(*byte) {
            result.push_str(core::str::from_utf8(&[ascii_byte]).unwrap());
        }
    }
    result
}

#[must_use]
pub fn escape_and_elide(input: &[u8], max_len: usize) -> String {
    if input.len() > max_len {
        escape_ascii(&input[..max_len]) + "..."
    } else {
        escape_ascii(input)
    }
}

pub fn find_slice<T: std::cmp::PartialEq>(needle: &[T], haystack: &[T]) -> Option<usize> {
    if needle.len() <= haystack.len() {
        for n in 0..=(haystack.len() - needle.len()) {
            if &haystack[n..(n + needle.len())] == needle {
                return Some(n);
            }
        }
    }
    None
}

/// Wraps a writer and counts the bytes that reach it.
/// The response producer uses the count to decide whether a failed send
/// left the connection in an unusable state.
pub struct WriteCounter<W>(W, u64);
impl<W: Write> WriteCounter<W> {
    pub fn new(writer: W) -> Self {
        Self(writer, 0)
    }

    pub fn num_bytes_written(&self) -> u64 {
        self.1
    }
}
impl<W: Write> Write for WriteCounter<W> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, std::io::Error> {
        let n = self.0.write(buf)?;
        self.1 += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> Result<(), std::io::Error> {
        self.0.flush()
    }
}

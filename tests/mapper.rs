use hutch::fileserv::{MapError, MapperError, UriMapper};
use std::path::{Path, PathBuf};
use temp_dir::TempDir;

#[test]
fn new_rejects_relative_root() {
    assert!(matches!(
        UriMapper::new("relative/dir"),
        Err(MapperError::RootNotAbsolute(..))
    ));
}

#[test]
fn new_rejects_missing_root() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nonexistent");
    assert!(matches!(
        UriMapper::new(missing),
        Err(MapperError::RootNotADirectory(..))
    ));
}

#[test]
fn new_rejects_file_root() {
    let temp = TempDir::new().unwrap();
    let file = temp.child("plain.txt");
    std::fs::write(&file, b"x").unwrap();
    assert!(matches!(
        UriMapper::new(file),
        Err(MapperError::RootNotADirectory(..))
    ));
}

#[test]
fn map_rejects_empty_and_relative_paths() {
    let temp = TempDir::new().unwrap();
    let mapper = UriMapper::new(temp.path()).unwrap();
    assert_eq!(mapper.map(""), Err(MapError::EmptyPath));
    assert_eq!(mapper.map("x/y"), Err(MapError::NotAbsolute));
    assert_eq!(mapper.map("*"), Err(MapError::NotAbsolute));
}

#[test]
fn map_joins_onto_root() {
    let temp = TempDir::new().unwrap();
    let mapper = UriMapper::new(temp.path()).unwrap();
    assert_eq!(mapper.map("/").unwrap(), mapper.root());
    assert_eq!(mapper.map("/a.txt").unwrap(), mapper.root().join("a.txt"));
    assert_eq!(
        mapper.map("/d/e/f.txt").unwrap(),
        mapper.root().join("d").join("e").join("f.txt")
    );
}

#[test]
fn map_produces_no_trailing_separator() {
    let temp = TempDir::new().unwrap();
    let mapper = UriMapper::new(temp.path()).unwrap();
    for uri_path in ["/", "/d/", "/d/e/"] {
        let mapped = mapper.map(uri_path).unwrap();
        assert!(
            !mapped.to_string_lossy().ends_with(std::path::MAIN_SEPARATOR),
            "{mapped:?} has a trailing separator"
        );
    }
}

#[test]
fn map_normalizes_dot_segments() {
    let temp = TempDir::new().unwrap();
    let mapper = UriMapper::new(temp.path()).unwrap();
    assert_eq!(
        mapper.map("/a/./b.txt").unwrap(),
        mapper.root().join("a").join("b.txt")
    );
    assert_eq!(
        mapper.map("/a/c/../b.txt").unwrap(),
        mapper.root().join("a").join("b.txt")
    );
    assert_eq!(mapper.map("//a.txt").unwrap(), mapper.root().join("a.txt"));
}

#[test]
fn map_decodes_percent_encoding() {
    let temp = TempDir::new().unwrap();
    let mapper = UriMapper::new(temp.path()).unwrap();
    assert_eq!(
        mapper.map("/a%20b.txt").unwrap(),
        mapper.root().join("a b.txt")
    );
}

fn assert_confined(mapper: &UriMapper, uri_path: &str) {
    let mapped: PathBuf = mapper.map(uri_path).unwrap();
    assert!(
        mapped.starts_with(mapper.root()),
        "mapping {uri_path:?} escaped the root: {mapped:?}"
    );
}

#[test]
fn map_confines_traversal_to_root() {
    let temp = TempDir::new().unwrap();
    let mapper = UriMapper::new(temp.path()).unwrap();
    for uri_path in [
        "/..",
        "/../..",
        "/../../etc/passwd",
        "/a/../../../etc/passwd",
        "/a/b/../../../..",
        "/./../.",
    ] {
        assert_confined(&mapper, uri_path);
    }
    assert_eq!(mapper.map("/../../etc/passwd").unwrap(), mapper.root().join("etc").join("passwd"));
}

#[test]
fn map_confines_encoded_traversal_to_root() {
    // Percent-decoding happens before normalization, so encoded dot
    // segments cannot escape either.
    let temp = TempDir::new().unwrap();
    let mapper = UriMapper::new(temp.path()).unwrap();
    for uri_path in [
        "/%2e%2e",
        "/%2e%2e/%2e%2e/etc/passwd",
        "/a/%2E%2E/%2E%2E/secret",
        "/%2e%2e%2fetc%2fpasswd",
        "/a%2f..%2f..%2fetc",
    ] {
        assert_confined(&mapper, uri_path);
    }
}

#[test]
fn map_is_prefixed_by_root_for_ordinary_paths() {
    let temp = TempDir::new().unwrap();
    let mapper = UriMapper::new(temp.path()).unwrap();
    for uri_path in ["/", "/a", "/a/b/c.txt", "/a%20b/c", "/.well-known/x"] {
        assert_confined(&mapper, uri_path);
    }
}

#[test]
fn root_keeps_no_trailing_separator() {
    let temp = TempDir::new().unwrap();
    let with_sep = format!("{}{}", temp.path().to_string_lossy(), std::path::MAIN_SEPARATOR);
    let mapper = UriMapper::new(Path::new(&with_sep)).unwrap();
    assert_eq!(mapper.map("/a.txt").unwrap(), temp.path().join("a.txt"));
}

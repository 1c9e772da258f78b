
use hutch::fileserv::{DirectoryPolicy, FileServerMode};
use test_util::{TestServer, assert_contains, assert_starts_with};

#[test]
fn get_serves_file_bytes() {
    let server = TestServer::start_read_only();
    std::fs::write(server.root().join("hello.txt"), b"Hello, world!").unwrap();
    let response = server
        .exchange("GET /hello.txt HTTP/1.1\r\n\r\n")
        .unwrap();
    assert_starts_with(&response, "HTTP/1.1 200 OK");
    assert_contains(&response, "content-type: text/plain");
    assert_contains(&response, "content-length: 13");
    assert_contains(&response, "\r\n\r\nHello, world!");
}

#[test]
fn get_serves_unknown_extension_without_content_type() {
    let server = TestServer::start_read_only();
    std::fs::write(server.root().join("blob.zzz"), b"\x01\x02\x03").unwrap();
    let response = server.exchange("GET /blob.zzz HTTP/1.1\r\n\r\n").unwrap();
    assert_starts_with(&response, "HTTP/1.1 200 OK");
    assert!(!response.contains("content-type"), "{response:?}");
    assert_contains(&response, "content-length: 3");
}

#[test]
fn get_missing_file_mentions_uri() {
    let server = TestServer::start_read_only();
    let response = server
        .exchange("GET /missing.txt HTTP/1.1\r\n\r\n")
        .unwrap();
    assert_starts_with(&response, "HTTP/1.1 404 NOT FOUND");
    assert_contains(&response, "/missing.txt");
}

#[test]
fn get_percent_encoded_path() {
    let server = TestServer::start_read_only();
    std::fs::write(server.root().join("a b.txt"), b"spaced").unwrap();
    let response = server
        .exchange("GET /a%20b.txt HTTP/1.1\r\n\r\n")
        .unwrap();
    assert_starts_with(&response, "HTTP/1.1 200 OK");
    assert_contains(&response, "\r\n\r\nspaced");
}

#[test]
fn get_encoded_traversal_cannot_escape_root() {
    let server = TestServer::start_read_only();
    let response = server
        .exchange("GET /%2e%2e/%2e%2e/etc/passwd HTTP/1.1\r\n\r\n")
        .unwrap();
    // The traversal clamps at the root, where no such file exists.
    assert_starts_with(&response, "HTTP/1.1 404 NOT FOUND");
}

#[test]
fn head_suppresses_body() {
    let server = TestServer::start_read_only();
    std::fs::write(server.root().join("hello.txt"), b"Hello, world!").unwrap();
    let response = server
        .exchange("HEAD /hello.txt HTTP/1.1\r\n\r\n")
        .unwrap();
    assert_starts_with(&response, "HTTP/1.1 200 OK");
    assert_contains(&response, "content-length: 13");
    assert!(response.ends_with("\r\n\r\n"), "{response:?}");
}

#[test]
fn get_directory_with_forbid_policy() {
    let server =
        TestServer::start_file_server(FileServerMode::ReadOnly, DirectoryPolicy::Forbid);
    std::fs::create_dir(server.root().join("docs")).unwrap();
    let response = server.exchange("GET /docs HTTP/1.1\r\n\r\n").unwrap();
    assert_starts_with(&response, "HTTP/1.1 403 FORBIDDEN");
    assert_contains(&response, "/docs");
}

#[test]
fn get_directory_with_index_policy_serves_index() {
    let server = TestServer::start_file_server(
        FileServerMode::ReadOnly,
        DirectoryPolicy::ServeIndexFile("index.html".to_string()),
    );
    std::fs::create_dir(server.root().join("docs")).unwrap();
    std::fs::write(
        server.root().join("docs").join("index.html"),
        b"<p>docs</p>",
    )
    .unwrap();
    let response = server.exchange("GET /docs HTTP/1.1\r\n\r\n").unwrap();
    assert_starts_with(&response, "HTTP/1.1 200 OK");
    assert_contains(&response, "content-type: text/html");
    assert_contains(&response, "\r\n\r\n<p>docs</p>");
}

#[test]
fn get_directory_with_index_policy_missing_index() {
    let server = TestServer::start_file_server(
        FileServerMode::ReadOnly,
        DirectoryPolicy::ServeIndexFile("index.html".to_string()),
    );
    std::fs::create_dir(server.root().join("docs")).unwrap();
    let response = server.exchange("GET /docs HTTP/1.1\r\n\r\n").unwrap();
    assert_starts_with(&response, "HTTP/1.1 404 NOT FOUND");
    assert_contains(&response, "/docs");
}

#[test]
fn put_creates_file_with_exact_bytes() {
    let server = TestServer::start_read_write();
    let response = server
        .exchange("PUT /new.txt HTTP/1.1\r\ncontent-length: 10\r\n\r\nfresh data")
        .unwrap();
    assert_starts_with(&response, "HTTP/1.1 201 CREATED");
    let written = std::fs::read(server.root().join("new.txt")).unwrap();
    assert_eq!(written, b"fresh data");
}

#[test]
fn put_replaces_existing_contents() {
    let server = TestServer::start_read_write();
    std::fs::write(server.root().join("old.txt"), b"previous contents").unwrap();
    let response = server
        .exchange("PUT /old.txt HTTP/1.1\r\ncontent-length: 3\r\n\r\nnew")
        .unwrap();
    assert_starts_with(&response, "HTTP/1.1 201 CREATED");
    assert_eq!(std::fs::read(server.root().join("old.txt")).unwrap(), b"new");
}

#[test]
fn put_empty_body_truncates_file() {
    let server = TestServer::start_read_write();
    std::fs::write(server.root().join("full.txt"), b"not empty").unwrap();
    let response = server
        .exchange("PUT /full.txt HTTP/1.1\r\ncontent-length: 0\r\n\r\n")
        .unwrap();
    assert_starts_with(&response, "HTTP/1.1 201 CREATED");
    assert_eq!(
        std::fs::read(server.root().join("full.txt")).unwrap().len(),
        0
    );
}

#[test]
fn put_without_body_creates_empty_file() {
    let server = TestServer::start_read_write();
    let response = server.exchange("PUT /empty.txt HTTP/1.1\r\n\r\n").unwrap();
    assert_starts_with(&response, "HTTP/1.1 201 CREATED");
    assert_eq!(
        std::fs::read(server.root().join("empty.txt")).unwrap().len(),
        0
    );
}

#[test]
fn put_to_directory_is_forbidden() {
    let server = TestServer::start_read_write();
    std::fs::create_dir(server.root().join("docs")).unwrap();
    let response = server
        .exchange("PUT /docs HTTP/1.1\r\ncontent-length: 1\r\n\r\nx")
        .unwrap();
    assert_starts_with(&response, "HTTP/1.1 403 FORBIDDEN");
    assert!(server.root().join("docs").is_dir());
}

#[test]
fn put_into_missing_directory_is_not_found() {
    let server = TestServer::start_read_write();
    let response = server
        .exchange("PUT /no/such/dir.txt HTTP/1.1\r\ncontent-length: 1\r\n\r\nx")
        .unwrap();
    assert_starts_with(&response, "HTTP/1.1 404 NOT FOUND");
}

#[test]
fn post_writes_like_put() {
    let server = TestServer::start_read_write();
    let response = server
        .exchange("POST /posted.txt HTTP/1.1\r\ncontent-length: 6\r\n\r\nposted")
        .unwrap();
    assert_starts_with(&response, "HTTP/1.1 201 CREATED");
    assert_eq!(
        std::fs::read(server.root().join("posted.txt")).unwrap(),
        b"posted"
    );
}

#[test]
fn delete_removes_file() {
    let server = TestServer::start_read_write();
    std::fs::write(server.root().join("doomed.txt"), b"x").unwrap();
    let response = server
        .exchange("DELETE /doomed.txt HTTP/1.1\r\n\r\n")
        .unwrap();
    assert_starts_with(&response, "HTTP/1.1 204 DELETED");
    assert!(!server.root().join("doomed.txt").exists());
}

#[test]
fn delete_is_idempotent_from_the_callers_view() {
    let server = TestServer::start_read_write();
    std::fs::write(server.root().join("doomed.txt"), b"x").unwrap();
    assert_starts_with(
        server.exchange("DELETE /doomed.txt HTTP/1.1\r\n\r\n").unwrap(),
        "HTTP/1.1 204 DELETED",
    );
    // The second delete is an ordinary 404, not a distinct error.
    assert_starts_with(
        server.exchange("DELETE /doomed.txt HTTP/1.1\r\n\r\n").unwrap(),
        "HTTP/1.1 404 NOT FOUND",
    );
}

#[test]
fn delete_directory_is_forbidden() {
    let server = TestServer::start_read_write();
    std::fs::create_dir(server.root().join("docs")).unwrap();
    let response = server.exchange("DELETE /docs HTTP/1.1\r\n\r\n").unwrap();
    assert_starts_with(&response, "HTTP/1.1 403 FORBIDDEN");
    assert!(server.root().join("docs").is_dir());
}

#[test]
fn unknown_method_token_is_405() {
    let server = TestServer::start_read_write();
    let response = server.exchange("FOO /x HTTP/1.1\r\n\r\n").unwrap();
    assert_starts_with(&response, "HTTP/1.1 405 Method Not Allowed");
}

#[test]
fn unmapped_method_under_read_only_is_501() {
    let server = TestServer::start_read_only();
    std::fs::write(server.root().join("safe.txt"), b"x").unwrap();
    for request in [
        "DELETE /safe.txt HTTP/1.1\r\n\r\n",
        "PUT /safe.txt HTTP/1.1\r\ncontent-length: 1\r\n\r\ny",
        "POST /safe.txt HTTP/1.1\r\ncontent-length: 1\r\n\r\ny",
    ] {
        let response = server.exchange(request).unwrap();
        assert_starts_with(&response, "HTTP/1.1 501 Not Implemented");
    }
    // The read-only tree is untouched.
    assert_eq!(std::fs::read(server.root().join("safe.txt")).unwrap(), b"x");
}

#[test]
fn options_is_unmapped_by_design() {
    let server = TestServer::start_read_write();
    let response = server.exchange("OPTIONS * HTTP/1.1\r\n\r\n").unwrap();
    assert_starts_with(&response, "HTTP/1.1 501 Not Implemented");
}

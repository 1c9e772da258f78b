
use hutch::fileserv::{DirectoryPolicy, FileServerMode};
use hutch::internal::{ConnectionExecutor, bind_listener};
use hutch::{
    ConnectionListener, ListenerState, Request, RequestConsumer, Response, SocketConfig,
};
use std::io::{ErrorKind, Read, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};
use test_util::{TestServer, assert_starts_with, read_response};

struct PathEcho;
impl RequestConsumer for PathEcho {
    fn consume(&self, request: &Request, response: &mut Response) {
        *response = Response::text(200, request.url().path().to_string());
    }
}

struct PanicOnBoom;
impl RequestConsumer for PanicOnBoom {
    fn consume(&self, request: &Request, response: &mut Response) {
        assert!(request.url().path() != "/boom", "boom");
        *response = Response::text(200, "survived");
    }
}

#[test]
fn server_starts_and_stops() {
    let mut server = TestServer::start_read_only();
    assert_eq!(server.server.listener().state(), ListenerState::Running);
    assert!(server.server.stop(Duration::from_secs(3)));
    assert_eq!(server.server.listener().state(), ListenerState::Stopped);
    // A second stop is a no-op.
    assert!(server.server.stop(Duration::from_secs(3)));
    // Drop runs stop() again; that must also be harmless.
}

#[test]
fn stop_while_stopped_is_a_noop() {
    let listener = ConnectionListener::new(
        ConnectionExecutor::new(1),
        SocketConfig::new(),
        64 * 1024,
        Arc::new(PathEcho),
    );
    assert_eq!(listener.state(), ListenerState::Stopped);
    assert!(!listener.stop());
    assert_eq!(listener.state(), ListenerState::Stopped);
}

#[test]
fn second_listen_call_is_a_noop() {
    let config = SocketConfig::new();
    let socket1 = bind_listener(&config).unwrap();
    let addr1 = socket1.local_addr().unwrap();
    let listener = Arc::new(ConnectionListener::new(
        ConnectionExecutor::new(2),
        config.clone(),
        64 * 1024,
        Arc::new(PathEcho),
    ));
    let listener_clone = listener.clone();
    let join_handle = std::thread::spawn(move || listener_clone.listen(socket1));
    // Wait for the first loop to take the Running state.
    let deadline = Instant::now() + Duration::from_secs(3);
    while listener.state() != ListenerState::Running {
        assert!(Instant::now() < deadline, "listener did not start");
        std::thread::sleep(Duration::from_millis(10));
    }
    // The second call must return immediately instead of starting another
    // accept loop.
    let socket2 = bind_listener(&config).unwrap();
    listener.listen(socket2);
    assert_eq!(listener.state(), ListenerState::Running);
    // The first loop is the one accepting connections.
    let mut stream = std::net::TcpStream::connect(addr1).unwrap();
    stream.write_all(b"GET /alive HTTP/1.1\r\n\r\n").unwrap();
    let response = read_response(&mut stream).unwrap();
    assert_starts_with(&response, "HTTP/1.1 200 OK");
    drop(stream);
    listener.stop();
    join_handle.join().unwrap();
    assert_eq!(listener.state(), ListenerState::Stopped);
}

#[test]
fn concurrent_gets_return_distinct_bodies() {
    let server = Arc::new(TestServer::start_read_only());
    let num_files = 8;
    for n in 0..num_files {
        let contents = format!("file-{n}-").repeat(1000);
        std::fs::write(server.root().join(format!("f{n}.txt")), contents).unwrap();
    }
    let mut join_handles = Vec::new();
    for n in 0..num_files {
        let server = server.clone();
        join_handles.push(std::thread::spawn(move || {
            let expected = format!("file-{n}-").repeat(1000);
            let response = server
                .exchange(format!("GET /f{n}.txt HTTP/1.1\r\n\r\n"))
                .unwrap();
            assert_starts_with(&response, "HTTP/1.1 200 OK");
            let body = response.split("\r\n\r\n").nth(1).unwrap();
            assert_eq!(body, expected, "body mismatch for f{n}.txt");
        }));
    }
    for join_handle in join_handles {
        join_handle.join().unwrap();
    }
}

#[test]
fn pool_never_exceeds_configured_concurrency() {
    let server = TestServer::start_with_consumer(Arc::new(PathEcho), 1);
    // The first connection takes the only worker slot and keeps it while
    // the connection stays open.
    let mut conn1 = server.connect_and_send("GET /one HTTP/1.1\r\n\r\n").unwrap();
    let response1 = read_response(&mut conn1).unwrap();
    assert_starts_with(&response1, "HTTP/1.1 200 OK");
    // A second connection waits in the backlog, unserved.
    let mut conn2 = server.connect_and_send("GET /two HTTP/1.1\r\n\r\n").unwrap();
    conn2
        .set_read_timeout(Some(Duration::from_millis(300)))
        .unwrap();
    let mut byte = [0_u8; 1];
    match conn2.read(&mut byte) {
        Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {}
        other => panic!("second connection was served early: {other:?}"),
    }
    // Closing the first connection frees the slot.
    drop(conn1);
    let response2 = read_response(&mut conn2).unwrap();
    assert_starts_with(&response2, "HTTP/1.1 200 OK");
}

#[test]
fn pipelined_requests_are_answered_in_order() {
    let server = TestServer::start_read_only();
    std::fs::write(server.root().join("one.txt"), b"first bytes").unwrap();
    std::fs::write(server.root().join("two.txt"), b"second bytes").unwrap();
    let mut conn = server
        .connect_and_send("GET /one.txt HTTP/1.1\r\n\r\nGET /two.txt HTTP/1.1\r\n\r\n")
        .unwrap();
    let response1 = read_response(&mut conn).unwrap();
    assert_starts_with(&response1, "HTTP/1.1 200 OK");
    assert!(response1.ends_with("first bytes"), "{response1:?}");
    let response2 = read_response(&mut conn).unwrap();
    assert_starts_with(&response2, "HTTP/1.1 200 OK");
    assert!(response2.ends_with("second bytes"), "{response2:?}");
}

#[test]
fn sequential_requests_reuse_the_connection() {
    let server = TestServer::start_read_write();
    let mut conn = server
        .connect_and_send("PUT /a.txt HTTP/1.1\r\ncontent-length: 1\r\n\r\na")
        .unwrap();
    assert_starts_with(read_response(&mut conn).unwrap(), "HTTP/1.1 201 CREATED");
    conn.write_all(b"GET /a.txt HTTP/1.1\r\n\r\n").unwrap();
    let response = read_response(&mut conn).unwrap();
    assert_starts_with(&response, "HTTP/1.1 200 OK");
    assert!(response.ends_with("a"), "{response:?}");
}

#[test]
fn expect_continue_sends_interim_response_before_body() {
    let server = TestServer::start_read_write();
    let mut conn = server
        .connect_and_send(
            "PUT /c.txt HTTP/1.1\r\nexpect: 100-continue\r\ncontent-length: 5\r\n\r\n",
        )
        .unwrap();
    let interim = read_response(&mut conn).unwrap();
    assert_eq!(interim, "HTTP/1.1 100 Continue\r\n\r\n");
    conn.write_all(b"hello").unwrap();
    let response = read_response(&mut conn).unwrap();
    assert_starts_with(&response, "HTTP/1.1 201 CREATED");
    assert_eq!(std::fs::read(server.root().join("c.txt")).unwrap(), b"hello");
}

#[test]
fn chunked_request_body_is_decoded_and_framing_survives() {
    let server = TestServer::start_read_write();
    let mut conn = server
        .connect_and_send(
            "PUT /chunked.txt HTTP/1.1\r\ntransfer-encoding: chunked\r\n\r\n\
             5\r\nhello\r\n6\r\n world\r\n0\r\n\r\n",
        )
        .unwrap();
    assert_starts_with(read_response(&mut conn).unwrap(), "HTTP/1.1 201 CREATED");
    assert_eq!(
        std::fs::read(server.root().join("chunked.txt")).unwrap(),
        b"hello world"
    );
    // The zero chunk restored request framing; the connection still works.
    conn.write_all(b"GET /chunked.txt HTTP/1.1\r\n\r\n").unwrap();
    let response = read_response(&mut conn).unwrap();
    assert_starts_with(&response, "HTTP/1.1 200 OK");
    assert!(response.ends_with("hello world"), "{response:?}");
}

#[test]
fn oversized_body_gets_413_without_reading_it() {
    let server = TestServer::start_read_write();
    let mut conn = server
        .connect_and_send("PUT /big.txt HTTP/1.1\r\ncontent-length: 70000\r\n\r\n")
        .unwrap();
    let response = read_response(&mut conn).unwrap();
    assert_starts_with(&response, "HTTP/1.1 413 Payload Too Large");
}

#[test]
fn body_without_content_length_is_read_to_eof() {
    let server = TestServer::start_read_write();
    let response = server
        .exchange("POST /eof.txt HTTP/1.1\r\n\r\nunframed body bytes")
        .unwrap();
    assert_starts_with(&response, "HTTP/1.1 201 CREATED");
    assert_eq!(
        std::fs::read(server.root().join("eof.txt")).unwrap(),
        b"unframed body bytes"
    );
}

#[test]
fn consumer_panic_becomes_500_and_spares_the_connection() {
    let server = TestServer::start_with_consumer(Arc::new(PanicOnBoom), 10);
    let mut conn = server.connect_and_send("GET /boom HTTP/1.1\r\n\r\n").unwrap();
    let response1 = read_response(&mut conn).unwrap();
    assert_starts_with(&response1, "HTTP/1.1 500 Internal Server Error");
    // The same connection keeps serving requests.
    conn.write_all(b"GET /fine HTTP/1.1\r\n\r\n").unwrap();
    let response2 = read_response(&mut conn).unwrap();
    assert_starts_with(&response2, "HTTP/1.1 200 OK");
    assert!(response2.ends_with("survived"), "{response2:?}");
}

#[test]
fn socket_read_timeout_closes_idle_connections() {
    let plugin = Arc::new(PathEcho);
    let server = hutch::HttpServerBuilder::new()
        .socket_config(SocketConfig::new().with_read_timeout(Duration::from_millis(200)))
        .start(plugin)
        .unwrap();
    let mut conn = std::net::TcpStream::connect(server.addr()).unwrap();
    conn.set_read_timeout(Some(Duration::from_secs(3))).unwrap();
    // Send nothing; the server must give up on us and close.
    let mut buf = [0_u8; 1];
    assert_eq!(conn.read(&mut buf).unwrap(), 0);
    drop(conn);
    let mut server = server;
    assert!(server.stop(Duration::from_secs(3)));
}

#[test]
fn directory_policy_is_selectable_at_construction() {
    // Same tree, two policies, two different outcomes.
    let forbid = TestServer::start_file_server(FileServerMode::ReadOnly, DirectoryPolicy::Forbid);
    std::fs::create_dir(forbid.root().join("d")).unwrap();
    assert_starts_with(
        forbid.exchange("GET /d HTTP/1.1\r\n\r\n").unwrap(),
        "HTTP/1.1 403 FORBIDDEN",
    );
    let index = TestServer::start_file_server(
        FileServerMode::ReadOnly,
        DirectoryPolicy::ServeIndexFile("main.html".to_string()),
    );
    std::fs::create_dir(index.root().join("d")).unwrap();
    std::fs::write(index.root().join("d").join("main.html"), b"<html/>").unwrap();
    let response = index.exchange("GET /d HTTP/1.1\r\n\r\n").unwrap();
    assert_starts_with(&response, "HTTP/1.1 200 OK");
    assert!(response.ends_with("<html/>"), "{response:?}");
}

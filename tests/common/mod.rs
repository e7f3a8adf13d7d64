#![allow(dead_code)]

pub mod fixtures {
    use jukebox::model::{Album, Artist, EntityKey, EntityKind, Playlist, Song};
    use jukebox::store::MemoryStore;

    pub const USERNAME: &str = "bob";
    pub const PASSWORD: &str = "secret";

    /// Artist 1, song 1 "Test", album 1, user 1 (`bob`/`secret`) with a
    /// playlist and two plays.
    pub fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .insert_artist(Artist {
                id: Some(1),
                name: "The Testers".to_string(),
            })
            .unwrap();
        store
            .insert_song(Song {
                id: Some(1),
                name: "Test".to_string(),
                artist_ids: vec![1],
            })
            .unwrap();
        store
            .insert_album(Album {
                id: Some(1),
                name: "Greatest Tests".to_string(),
                artist_ids: vec![1],
                song_ids: vec![1],
            })
            .unwrap();
        store.add_user(Some(1), USERNAME, PASSWORD).unwrap();
        store
            .insert_playlist(Playlist {
                id: Some(1),
                name: "Mix".to_string(),
                user_id: 1,
                song_ids: vec![1],
            })
            .unwrap();
        store.record_play(
            1,
            EntityKey {
                kind: EntityKind::Song,
                id: 1,
            },
        );
        store.record_play(
            1,
            EntityKey {
                kind: EntityKind::Album,
                id: 1,
            },
        );
        store
    }
}

pub mod test_server {
    use super::fixtures::seeded_store;
    use jukebox::api::{build_router, AppContext};
    use jukebox::dispatcher::Dispatcher;
    use jukebox::server::{AppService, HttpServer, ServerHandle};
    use std::sync::{Arc, Once};

    /// Ensures May coroutines are configured only once
    static MAY_INIT: Once = Once::new();

    pub fn setup_may_runtime() {
        MAY_INIT.call_once(|| {
            may::config().set_stack_size(0x8000);
        });
    }

    /// The seeded catalog served on a free local port.
    pub fn start_service() -> ServerHandle {
        setup_may_runtime();
        let ctx = AppContext::from_memory(seeded_store());
        let router = build_router(&ctx, &[1]).unwrap();
        let service = AppService::new(Arc::new(Dispatcher::new(Arc::new(router))));
        let handle = HttpServer(service).start("127.0.0.1:0").unwrap();
        handle.wait_ready().unwrap();
        handle
    }
}

pub mod http {
    use serde_json::Value;
    use std::io::{Read, Write};
    use std::net::{SocketAddr, TcpStream};
    use std::time::Duration;

    /// Write `req` (one or more pipelined requests) and read until a full
    /// response for each has arrived, or the connection goes quiet.
    pub fn send_request(addr: &SocketAddr, req: &str) -> String {
        let expected = req.matches(" HTTP/1.1\r\n").count().max(1);
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(req.as_bytes()).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let mut buf = Vec::new();
        while complete_responses(&buf) < expected {
            let mut tmp = [0u8; 1024];
            match stream.read(&mut tmp) {
                Ok(0) => break,
                Ok(n) => buf.extend_from_slice(&tmp[..n]),
                Err(ref e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    break
                }
                Err(e) => panic!("read error: {e:?}"),
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    /// Number of complete `Content-Length` framed responses at the start of `buf`.
    fn complete_responses(buf: &[u8]) -> usize {
        let text = String::from_utf8_lossy(buf);
        let mut rest: &str = &text;
        let mut count = 0;
        while let Some((head, tail)) = rest.split_once("\r\n\r\n") {
            let length = head
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            let Some(next) = tail.get(length..) else {
                break;
            };
            count += 1;
            rest = next;
        }
        count
    }

    pub fn get(addr: &SocketAddr, path: &str) -> String {
        send_request(
            addr,
            &format!("GET {path} HTTP/1.1\r\nHost: localhost\r\n\r\n"),
        )
    }

    /// Status line code, raw header block and body.
    pub fn parse_response_parts(resp: &str) -> (u16, String, String) {
        let (headers, body) = resp.split_once("\r\n\r\n").unwrap_or((resp, ""));
        let status = headers
            .lines()
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .and_then(|code| code.parse().ok())
            .unwrap_or(0);
        (status, headers.to_string(), body.to_string())
    }

    pub fn parse_response(resp: &str) -> (u16, Value) {
        let (status, _, body) = parse_response_parts(resp);
        let json = serde_json::from_str(&body).unwrap_or_default();
        (status, json)
    }
}

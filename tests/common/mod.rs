use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Clone)]
pub struct Route {
    pub status: u16,
    pub body: String,
    pub delay: Option<Duration>,
}

impl Route {
    pub fn json(body: Value) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
            delay: None,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: json!({"status": status}).to_string(),
            delay: None,
        }
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

pub fn bare_cmd() -> Command {
    let mut cmd = cargo_bin_cmd!("check_b2share");
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Loopback HTTP server answering canned responses keyed by path and query.
pub struct FixtureServer {
    pub base: String,
    routes: Arc<Mutex<HashMap<String, Route>>>,
}

impl FixtureServer {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let base = format!("http://{}", listener.local_addr().expect("local addr"));
        let routes: Arc<Mutex<HashMap<String, Route>>> = Arc::default();
        let shared = Arc::clone(&routes);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let routes = Arc::clone(&shared);
                thread::spawn(move || serve(stream, &routes));
            }
        });
        Self { base, routes }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn route(&self, path: &str, route: Route) -> &Self {
        self.routes
            .lock()
            .expect("routes lock")
            .insert(path.to_string(), route);
        self
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("check_b2share");
        cmd.env_remove("RUST_LOG")
            .args(["-u", self.base.as_str(), "-t", "5"]);
        cmd
    }

    /// A healthy RDM instance with one record that has one file.
    pub fn healthy_rdm(&self) -> &Self {
        let record = self.url("/api/records/abc-123");
        let schema = self.url("/schemas/records/record-v6.0.0.json");
        let bucket = self.url("/api/records/abc-123/files");
        let content = self.url("/api/records/abc-123/files/data.csv/content");
        self.route(
            "/api/records?sort=newest&size=10",
            Route::json(json!({"hits": {"total": 1, "hits": [{
                "id": "abc-123",
                "links": {"self": record},
                "files": {"enabled": true, "count": 1}
            }]}})),
        )
        .route(
            "/api/records/abc-123",
            Route::json(json!({
                "id": "abc-123",
                "links": {"self": record, "files": bucket, "$schema": schema},
                "metadata": {
                    "title": "Survey data",
                    "resource_type": {"id": "dataset", "title": {"en": "Dataset"}, "icon": "table"}
                }
            })),
        )
        .route(
            "/schemas/records/record-v6.0.0.json",
            Route::json(json!({
                "$schema": "http://json-schema.org/draft-07/schema#",
                "type": "object",
                "required": ["id", "metadata"],
                "properties": {
                    "id": {"type": "string"},
                    "metadata": {
                        "type": "object",
                        "required": ["title"],
                        "additionalProperties": false,
                        "properties": {
                            "title": {"type": "string"},
                            "resource_type": {"$ref": "#/definitions/vocabulary"}
                        }
                    }
                },
                "definitions": {
                    "vocabulary": {
                        "type": "object",
                        "additionalProperties": false,
                        "properties": {"id": {"type": "string"}}
                    }
                }
            })),
        )
        .route(
            "/api/records/abc-123/files",
            Route::json(json!({"enabled": true, "entries": [
                {"key": "data.csv", "links": {"content": content}}
            ]})),
        )
        .route(
            "/api/records/abc-123/files/data.csv/content",
            Route::status(200),
        )
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    }
}

fn serve(stream: TcpStream, routes: &Mutex<HashMap<String, Route>>) {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    loop {
        let mut header = String::new();
        match reader.read_line(&mut header) {
            Ok(0) => break,
            Ok(_) if header == "\r\n" || header == "\n" => break,
            Ok(_) => continue,
            Err(_) => return,
        }
    }

    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();
    let route = routes
        .lock()
        .expect("routes lock")
        .get(&path)
        .cloned()
        .unwrap_or_else(|| Route::status(404));
    if let Some(delay) = route.delay {
        thread::sleep(delay);
    }

    let mut stream = reader.into_inner();
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        route.status,
        reason(route.status),
        route.body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    if method != "HEAD" {
        let _ = stream.write_all(route.body.as_bytes());
    }
    let _ = stream.flush();
}

//! Fixtures shared by the unit tests: a tiny HTTP responder standing in for
//! the registry, plus tarball and package builders.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

type Routes = Arc<Mutex<HashMap<String, (u16, Vec<u8>)>>>;

/// Serves canned responses by exact path; unknown paths answer 404.
pub(crate) struct HttpStub {
    addr: SocketAddr,
    routes: Routes,
}

impl HttpStub {
    pub(crate) async fn start(routes: Vec<(&str, u16, Vec<u8>)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let routes: Routes = Arc::new(Mutex::new(
            routes
                .into_iter()
                .map(|(path, status, body)| (path.to_string(), (status, body)))
                .collect(),
        ));

        let shared = routes.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let routes = shared.clone();
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => buf.extend_from_slice(&chunk[..n]),
                        }
                    }
                    let head = String::from_utf8_lossy(&buf);
                    let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                    let (status, body) = routes
                        .lock()
                        .unwrap()
                        .get(&path)
                        .cloned()
                        .unwrap_or((404, b"{\"error\":\"Not found\"}".to_vec()));
                    let header = format!(
                        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nContent-Type: application/json\r\nConnection: close\r\n\r\n",
                        status,
                        if status < 400 { "OK" } else { "Error" },
                        body.len()
                    );
                    let _ = socket.write_all(header.as_bytes()).await;
                    let _ = socket.write_all(&body).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self { addr, routes }
    }

    pub(crate) fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub(crate) fn route(&self, path: &str, status: u16, body: Vec<u8>) {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, body));
    }
}

/// Registry document listing `versions`, each pointing at a tarball under `tarball_base`.
pub(crate) fn registry_document_at(name: &str, versions: &[&str], tarball_base: &str) -> Vec<u8> {
    let versions: serde_json::Map<String, serde_json::Value> = versions
        .iter()
        .map(|v| {
            (
                v.to_string(),
                serde_json::json!({
                    "name": name,
                    "version": v,
                    "main": "index.js",
                    "dist": { "tarball": format!("{}/tarballs/{}-{}.tgz", tarball_base, name.replace('/', "-"), v) }
                }),
            )
        })
        .collect();
    serde_json::to_vec(&serde_json::json!({ "name": name, "versions": versions })).unwrap()
}

pub(crate) fn registry_document(name: &str, versions: &[&str]) -> Vec<u8> {
    registry_document_at(name, versions, "http://127.0.0.1:9")
}

/// Gzipped tarball with every file under `package/`, the way npm packs them.
pub(crate) fn npm_tarball(files: &[(&str, &str)]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (path, contents) in files {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, format!("package/{}", path), contents.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// Write files (creating parents) under `root`.
pub(crate) fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (path, contents) in files {
        let target = root.join(path);
        std::fs::create_dir_all(target.parent().unwrap()).unwrap();
        std::fs::write(target, contents).unwrap();
    }
}

/// Product wiring used by config and command tests.
#[derive(Clone)]
pub(crate) struct TestProduct;

impl crate::product::ProductConfig for TestProduct {
    fn name(&self) -> &'static str {
        "scaffold-test"
    }

    fn display_name(&self) -> &'static str {
        "Scaffold Test"
    }

    fn default_catalog_url(&self) -> &'static str {
        "http://catalog.test/api"
    }

    fn catalog_url_env(&self) -> &'static str {
        "TEST_CLI_BASE_URL"
    }

    fn registry_env(&self) -> &'static str {
        "TEST_CLI_REGISTRY"
    }

    fn home_env(&self) -> &'static str {
        "TEST_CLI_HOME"
    }

    fn default_home_dir(&self) -> &'static str {
        ".scaffold-cli"
    }

    fn default_commands(&self) -> Vec<(&'static str, &'static str)> {
        vec![("lint", "@scaffold/lint")]
    }

    fn cli_description(&self) -> &'static str {
        "test product"
    }

    fn next_steps(&self, _dir: &Path, project: &crate::project::ProjectInfo) -> Vec<String> {
        vec![format!("cd {}", project.project_name())]
    }
}

use anyhow::{Context, Result};
use interprocess::local_socket::{
    GenericFilePath, Listener, ListenerOptions, Name, Stream, ToFsName,
    traits::{ListenerExt, Stream as StreamTrait},
};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::messaging::{Ack, Request};
use crate::store::{SlideStore, append_slide};
use crate::types::Slide;

/// Slide store shared by every client connection
///
/// Requests are applied one at a time while holding the lock, so a
/// `CREATE_SLIDE` from one client never overwrites another's.
pub type SharedStore = Arc<Mutex<Box<dyn SlideStore>>>;

/// Background service that owns the slide store
pub struct Daemon {
    store: SharedStore,
}

/// Messages that can be sent to the daemon
#[derive(Debug, Serialize, Deserialize)]
pub enum DaemonRequest {
    /// A cross-view message, applied to the store where relevant
    Message(Request),
    GetSlides,
    Ping,
    Shutdown,
}

/// Responses from the daemon
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub enum DaemonResponse {
    Ack(Ack),
    Slides(Vec<Slide>),
    Pong,
    Error(String),
}

impl Daemon {
    pub fn new(store: impl SlideStore + 'static) -> Self {
        Self {
            store: Arc::new(Mutex::new(Box::new(store))),
        }
    }

    pub fn store(&self) -> SharedStore {
        Arc::clone(&self.store)
    }

    pub fn get_socket_path() -> Result<PathBuf> {
        let runtime_dir = dirs::runtime_dir()
            .or_else(dirs::cache_dir)
            .or_else(|| std::env::temp_dir().into())
            .context("Could not determine runtime directory")?;

        Ok(runtime_dir.join("webpresenter-daemon.sock"))
    }

    fn get_socket_name() -> Result<Name<'static>> {
        let socket_path = Self::get_socket_path()?;
        let path_string = socket_path
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("Socket path is not valid UTF-8"))?
            .to_owned();
        // Leaked once per process; the name lives as long as the daemon
        let path_str: &'static str = Box::leak(path_string.into_boxed_str());
        Ok(path_str.to_fs_name::<GenericFilePath>()?)
    }

    pub fn is_running() -> bool {
        if let Ok(name) = Self::get_socket_name() {
            // Connect only; sending nothing reads as a liveness check
            Stream::connect(name).is_ok()
        } else {
            false
        }
    }

    pub async fn start(&mut self) -> Result<()> {
        if Self::is_running() {
            anyhow::bail!("Daemon is already running");
        }

        self.store
            .lock()
            .await
            .initialize()
            .context("Failed to initialize slide store")?;

        let socket_path = Self::get_socket_path()?;
        if socket_path.exists() {
            std::fs::remove_file(&socket_path)?;
        }

        let name = Self::get_socket_name()?;
        let listener = ListenerOptions::new().name(name).create_sync()?;
        info!("Daemon listening on {:?}", socket_path);

        self.run_server(listener).await
    }

    async fn run_server(&self, listener: Listener) -> Result<()> {
        let mut connections: u64 = 0;
        for stream in listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                    continue;
                }
            };
            connections += 1;
            debug!("Accepted connection #{}", connections);

            let store = self.store();
            tokio::spawn(async move {
                if let Err(e) = Self::handle_client(store, stream).await {
                    error!("Error handling client: {}", e);
                }
            });
        }
        anyhow::bail!("Daemon listener stopped accepting connections")
    }

    async fn handle_client(store: SharedStore, mut stream: Stream) -> Result<()> {
        let mut reader = BufReader::new(&mut stream);
        let mut request_line = String::new();
        let bytes_read = reader.read_line(&mut request_line)?;

        // Nothing sent: a liveness check from is_running
        if bytes_read == 0 || request_line.trim().is_empty() {
            return Ok(());
        }

        let request: DaemonRequest = match serde_json::from_str(request_line.trim_end()) {
            Ok(request) => request,
            Err(e) => {
                let response = DaemonResponse::Error(format!("Invalid request: {}", e));
                return Self::write_response(&mut stream, &response);
            }
        };
        info!("Received request: {:?}", request);

        if matches!(request, DaemonRequest::Shutdown) {
            info!("Daemon shutting down");
            // Held until exit so in-flight store writes finish first
            let _store = store.lock().await;
            Self::write_response(&mut stream, &DaemonResponse::Ack(Ack::default()))?;

            if let Ok(socket_path) = Self::get_socket_path() {
                let _ = std::fs::remove_file(&socket_path);
            }

            // Let the client read the acknowledgement first
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
            std::process::exit(0);
        }

        let response = Self::dispatch(&store, request).await;
        Self::write_response(&mut stream, &response)
    }

    /// Apply one request while holding the store lock
    pub async fn dispatch(store: &SharedStore, request: DaemonRequest) -> DaemonResponse {
        let store = store.lock().await;
        Self::handle_request(&**store, request)
    }

    fn write_response(stream: &mut Stream, response: &DaemonResponse) -> Result<()> {
        let response_json = serde_json::to_string(response)?;
        stream.write_all(response_json.as_bytes())?;
        stream.write_all(b"\n")?;
        stream.flush()?;
        Ok(())
    }

    /// Apply one request to `store`
    ///
    /// Page-only messages (picker control, navigation) are acknowledged
    /// without touching the store.
    pub fn handle_request(store: &dyn SlideStore, request: DaemonRequest) -> DaemonResponse {
        let result = match request {
            DaemonRequest::Ping => return DaemonResponse::Pong,
            DaemonRequest::Shutdown => return DaemonResponse::Ack(Ack::default()),
            DaemonRequest::GetSlides => return match store.get() {
                Ok(slides) => DaemonResponse::Slides(slides),
                Err(e) => DaemonResponse::Error(format!("{:#}", e)),
            },
            DaemonRequest::Message(message) => Self::apply_message(store, message),
        };

        match result {
            Ok(()) => DaemonResponse::Ack(Ack::default()),
            Err(e) => DaemonResponse::Error(format!("{:#}", e)),
        }
    }

    fn apply_message(store: &dyn SlideStore, message: Request) -> Result<()> {
        match message {
            Request::CreateSlide(slide) => {
                let count = append_slide(store, slide)?;
                info!("Stored slide, {} total", count);
            }
            Request::UpdateSlide { slides } => {
                store.set(&slides)?;
                info!("Replaced slides, {} total", slides.len());
            }
            Request::ClearSlides => {
                store.set(&[])?;
                info!("Cleared slides");
            }
            other => debug!("{} has no effect on the store", other.kind()),
        }
        Ok(())
    }
}

/// Client for communicating with the daemon
pub struct DaemonClient;

impl DaemonClient {
    pub fn send_request(request: DaemonRequest) -> Result<DaemonResponse> {
        let name = Daemon::get_socket_name()?;

        let mut stream =
            Stream::connect(name).context("Failed to connect to daemon. Is it running?")?;

        let request_json = serde_json::to_string(&request)?;
        stream.write_all(request_json.as_bytes())?;
        stream.write_all(b"\n")?;
        stream.flush()?;

        let mut reader = BufReader::new(stream);
        let mut response_line = String::new();
        match reader.read_line(&mut response_line) {
            Ok(0) => {
                anyhow::bail!("Daemon closed connection without sending response");
            }
            Ok(_) => {
                let response: DaemonResponse = serde_json::from_str(&response_line).context(
                    format!("Failed to parse daemon response: {}", response_line),
                )?;
                Ok(response)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn is_daemon_running() -> bool {
        Daemon::is_running()
    }
}

#[cfg(test)]
#[path = "daemon_test.rs"]
mod daemon_test;

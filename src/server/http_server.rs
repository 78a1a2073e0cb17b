//! HTTP server implementation.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tokio::signal;
use log::{debug, error, info, warn};

use crate::parser::{parse_request, HttpVersion};
use crate::server::compression::gzip_response;
use crate::server::config::ServerConfig;
use crate::server::error::Error;
use crate::server::handler::RequestHandler;
use crate::server::response::{HttpResponse, StatusCode};

/// Set by hosting platforms; suppresses the startup banner.
pub const HOSTED_ENV_VAR: &str = "NOW";

/// A static file server bound to one root directory.
pub struct HttpServer {
    /// The server configuration.
    pub config: Arc<ServerConfig>,
    /// The request handler shared by all connections.
    pub handler: Arc<RequestHandler>,
}

impl HttpServer {
    /// Create a new server. Fails only if the listing template is broken.
    pub fn new(config: ServerConfig) -> Result<Self, Error> {
        let config = Arc::new(config);
        let handler = Arc::new(RequestHandler::new(config.clone())?);
        Ok(Self { config, handler })
    }

    /// Display the server banner.
    fn display_server_info(&self, addr: SocketAddr) {
        debug!("Assets mounted under /{}", self.config.asset_namespace);
        if std::env::var_os(HOSTED_ENV_VAR).is_some() {
            return;
        }

        let banner = include_str!("../banner.txt");
        info!("\n{banner}");
        info!("Serving {root}", root = self.config.root_directory.display());
        info!("Listening on http://localhost:{port} ({addr})", port = addr.port());
        if self.config.single_page {
            info!("Single-page mode: unresolved paths serve /index.html");
        }
        if self.config.gzip_disabled {
            info!("Compression disabled");
        }
    }

    /// Set up the TCP listener.
    async fn setup_listener(&self) -> Result<TcpListener, Error> {
        let listener = TcpListener::bind(self.config.addr()).await?;
        Ok(listener)
    }

    /// Set up a Ctrl+C handler for graceful shutdown.
    fn setup_ctrl_c_handler(shutdown_tx: mpsc::Sender<()>) -> JoinHandle<()> {
        tokio::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C, initiating graceful shutdown");
                    let _ = shutdown_tx.send(()).await;
                }
                Err(e) => {
                    error!("Error setting up Ctrl+C handler: {e}");
                }
            }
        })
    }

    /// Handle a new connection.
    async fn handle_new_connection(
        mut socket: tokio::net::TcpStream,
        addr: SocketAddr,
        semaphore: Arc<Semaphore>,
        handler: Arc<RequestHandler>,
        tasks: &mut JoinSet<()>,
    ) {
        let permit = match semaphore.try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!("Connection limit reached, rejecting connection from {addr}");
                let response = HttpResponse::text(
                    StatusCode::ServiceUnavailable,
                    "Server is at capacity, please try again later",
                );
                let _ = socket.write_all(&response.to_bytes(HttpVersion::Http11, true)).await;
                return;
            }
        };

        tasks.spawn(async move {
            // The permit is dropped when the task completes, releasing the semaphore slot
            let _permit = permit;

            if let Err(e) = Self::handle_connection(&mut socket, &handler).await {
                error!("Error handling connection from {addr}: {e}");
            }
        });
    }

    /// Handle connection errors.
    async fn handle_connection_error(e: std::io::Error) -> bool {
        error!("Error accepting connection: {e}");

        if e.kind() == std::io::ErrorKind::BrokenPipe {
            error!("Critical error accepting connection, shutting down");
            return true;
        }

        // Usually descriptor exhaustion; back off before accepting again
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        false
    }

    /// Perform graceful shutdown.
    async fn perform_shutdown(tasks: &mut JoinSet<()>) {
        info!("Waiting for {len} active connections to complete...", len = tasks.len());
        let shutdown_timeout = tokio::time::Duration::from_secs(30);
        let _ = tokio::time::timeout(shutdown_timeout, async {
            while let Some(res) = tasks.join_next().await {
                if let Err(e) = res {
                    error!("Task failed during shutdown: {e}");
                }
            }
        }).await;

        info!("Server shutdown complete");
    }

    /// Start the server and listen for incoming connections.
    pub async fn start(&self) -> Result<(), Error> {
        let listener = self.setup_listener().await?;
        self.display_server_info(listener.local_addr()?);

        let semaphore = Arc::new(Semaphore::new(self.config.max_connections));

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let mut tasks = JoinSet::new();

        let ctrl_c = Self::setup_ctrl_c_handler(shutdown_tx);

        loop {
            tokio::select! {
                Some(()) = shutdown_rx.recv() => {
                    info!("Shutting down server...");
                    break;
                }

                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((socket, addr)) => {
                            Self::handle_new_connection(
                                socket,
                                addr,
                                semaphore.clone(),
                                self.handler.clone(),
                                &mut tasks,
                            ).await;
                        },
                        Err(e) => {
                            if Self::handle_connection_error(e).await {
                                break;
                            }
                        }
                    }
                }
            }

            // Reap finished connection tasks so the set does not grow unbounded
            while tasks.try_join_next().is_some() {}
        }

        ctrl_c.abort();
        drop(listener);
        Self::perform_shutdown(&mut tasks).await;

        Ok(())
    }

    /// Read a request head from `socket`, answer it and close.
    pub async fn handle_connection(
        socket: &mut (impl AsyncRead + AsyncWrite + Unpin),
        handler: &RequestHandler,
    ) -> Result<(), Error> {
        let head = match Self::read_head(socket, handler.config().read_buffer_size).await? {
            Some(head) => head,
            None => return Ok(()), // Connection closed
        };

        let request = match parse_request(&head) {
            Ok(req) => req,
            Err(e) => {
                let response = HttpResponse::text(StatusCode::BadRequest, format!("Error parsing request: {e}"));
                socket.write_all(&response.to_bytes(HttpVersion::Http11, true)).await?;
                return Err(Error::ParseError(e));
            }
        };

        let mut response = match handler.handle(&request).await {
            Ok(response) => response,
            Err(e) => {
                error!("{method} {path} failed: {e}", method = request.method, path = request.path);
                HttpResponse::text(StatusCode::InternalServerError, "Internal Server Error")
            }
        };

        if !handler.config().gzip_disabled {
            gzip_response(&request, &mut response)?;
        }

        info!(
            "{method} {path} {status}",
            method = request.method,
            path = request.path,
            status = response.status.as_u16()
        );

        let bytes = response.to_bytes(request.version, request.method.expects_body());
        socket.write_all(&bytes).await?;
        socket.flush().await?;
        socket.shutdown().await?;

        Ok(())
    }

    /// Read until the end of the header block, EOF, or a full buffer. The
    /// buffer may also hold the start of a body, which the parser skips.
    async fn read_head(
        socket: &mut (impl AsyncRead + Unpin),
        read_buffer_size: usize,
    ) -> Result<Option<Vec<u8>>, Error> {
        let mut buf = vec![0; read_buffer_size];
        let mut filled = 0;

        while filled < buf.len() {
            let n = socket.read(&mut buf[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
            let head = &buf[..filled];
            if head.windows(4).any(|w| w == b"\r\n\r\n") || head.windows(2).any(|w| w == b"\n\n") {
                break;
            }
        }

        if filled == 0 {
            return Ok(None);
        }
        buf.truncate(filled);
        Ok(Some(buf))
    }
}

//! TCP listener and per-connection request handling.

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};
use crate::http::{read_request, HttpRequest, HttpResponse};
use crate::translate::{into_response, translate};
use std::net::SocketAddr;
use std::sync::Arc;
use synthcast_core::RenderHost;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

/// Accepts connections and serves one render request on each.
///
/// Connections are handled on their own tasks; renders run on the blocking
/// thread pool, so a slow render never stalls the accept loop.
pub struct RenderServer {
    listener: TcpListener,
    host: Arc<RenderHost>,
    max_body_bytes: usize,
}

impl RenderServer {
    pub async fn bind(config: &ServerConfig, host: Arc<RenderHost>) -> Result<Self> {
        let listener = TcpListener::bind(config.bind_address()).await?;
        tracing::info!(address = %listener.local_addr()?, "Listening");

        Ok(Self {
            listener,
            host,
            max_body_bytes: config.max_body_bytes,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves until the task is dropped.
    pub async fn run(self) -> Result<()> {
        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::warn!(error = %e, "Accept failed");
                    continue;
                }
            };

            let host = self.host.clone();
            let max_body = self.max_body_bytes;
            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, host, max_body).await {
                    tracing::debug!(%peer, error = %e, "Connection ended with error");
                }
            });
        }
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    host: Arc<RenderHost>,
    max_body: usize,
) -> Result<()> {
    let (read_half, mut write_half) = stream.split();
    let mut reader = BufReader::new(read_half);

    let response = match read_request(&mut reader, max_body).await {
        Ok(request) => respond(host, request).await,
        Err(ServerError::BodyTooLarge { size, limit }) => {
            tracing::debug!(size, limit, "Request body too large");
            HttpResponse::empty(413)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Unreadable request");
            HttpResponse::empty(400)
        }
    };

    response.write_to(&mut write_half).await?;
    write_half.shutdown().await?;
    Ok(())
}

/// Runs one request against the host on the blocking pool.
pub async fn respond(host: Arc<RenderHost>, request: HttpRequest) -> HttpResponse {
    let render = translate(&request);
    tracing::debug!(method = %request.method, path = %request.path, "Render request");

    match tokio::task::spawn_blocking(move || host.render(&render)).await {
        Ok(result) => into_response(result),
        Err(e) => {
            tracing::error!(error = %e, "Render task panicked");
            HttpResponse::empty(500)
        }
    }
}

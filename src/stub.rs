//! Local stand-in for the remote API.
//!
//! Every request, whatever its method or path, is answered with `200 OK` and
//! the same canned body. One server is started per test case.

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

const STUB_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

struct StubState {
    body: Bytes,
    hits: AtomicUsize,
}

async fn echo_body(State(state): State<Arc<StubState>>) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    (
        [(header::CONTENT_TYPE, "application/json")],
        state.body.clone(),
    )
}

pub struct StubServer {
    addr: SocketAddr,
    url: String,
    state: Arc<StubState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl StubServer {
    /// Bind an ephemeral port on the loopback interface and start serving `body`.
    pub async fn start(body: impl Into<Bytes>) -> io::Result<Self> {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await?;
        let addr = listener.local_addr()?;
        let url = format!("http://{addr}");

        let state = Arc::new(StubState {
            body: body.into(),
            hits: AtomicUsize::new(0),
        });
        let app = Router::new()
            .fallback(echo_body)
            .with_state(Arc::clone(&state));

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });
        let task = tokio::spawn(async move {
            if let Err(err) = server.await {
                error!(error = %err, "stub server failed");
            }
        });
        debug!(url = %url, "stub server listening");

        Ok(Self {
            addr,
            url,
            state,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL to hand to the binary under test.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Number of requests served so far.
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    /// Stop accepting connections and wait for the server task to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(mut task) = self.task.take() {
            match tokio::time::timeout(STUB_SHUTDOWN_TIMEOUT, &mut task).await {
                Ok(Err(err)) if !err.is_cancelled() => {
                    error!(error = %err, "stub server task failed");
                }
                Ok(_) => debug!(url = %self.url, hits = self.hits(), "stub server stopped"),
                Err(_) => {
                    warn!(
                        timeout_ms = STUB_SHUTDOWN_TIMEOUT.as_millis(),
                        "stub server shutdown timed out; aborting"
                    );
                    task.abort();
                }
            }
        }
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

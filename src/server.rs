//! Standalone hosting for an [`App`].
//!
//! waypost does not need a socket; a platform can call [`App::handle`]
//! directly. [`Server`] exists for local runs and plain deployments. It
//! speaks HTTP/1.1 and HTTP/2 and drains open connections on SIGTERM or
//! Ctrl-C before [`Server::serve`] returns.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use http::Extensions;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::app::App;
use crate::error::Error;

/// Binds an [`App`] to a TCP address.
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// # Panics
    ///
    /// Panics if `addr` is not a `host:port` socket address.
    pub fn bind(addr: &str) -> Self {
        let addr = addr.parse().expect("invalid socket address");
        Self { addr }
    }

    /// Serves `app` until a shutdown signal arrives. Every request gets its
    /// own clone of `env`, and the peer [`SocketAddr`] is available in the
    /// request extensions.
    pub async fn serve<E>(self, app: App<E>, env: E) -> Result<(), Error>
    where
        E: Clone + Send + Sync + 'static,
    {
        let listener = TcpListener::bind(self.addr).await?;
        let app = Arc::new(app);
        info!(addr = %self.addr, routes = app.routes(), "waypost listening");

        let mut connections = JoinSet::new();
        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                () = &mut shutdown => break,

                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        connections.spawn(connection(Arc::clone(&app), env.clone(), stream, peer));
                    }
                    Err(e) => error!(error = %e, "accept failed"),
                },

                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        }

        info!(open = connections.len(), "shutting down");
        while connections.join_next().await.is_some() {}
        info!("waypost stopped");
        Ok(())
    }
}

async fn connection<E>(app: Arc<App<E>>, env: E, stream: TcpStream, peer: SocketAddr)
where
    E: Clone + Send + Sync + 'static,
{
    debug!(%peer, "connection opened");
    let svc = service_fn(move |req: http::Request<Incoming>| {
        let app = Arc::clone(&app);
        let env = env.clone();
        async move {
            let mut extend = Extensions::new();
            extend.insert(peer);
            Ok::<_, Infallible>(app.handle(env, req, extend).await)
        }
    });

    if let Err(e) = ConnBuilder::new(TokioExecutor::new()).serve_connection(TokioIo::new(stream), svc).await {
        error!(%peer, error = %e, "connection failed");
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        tokio::select! {
            res = tokio::signal::ctrl_c() => res.expect("failed to install Ctrl-C handler"),
            _ = term.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl-C handler");
    }
}

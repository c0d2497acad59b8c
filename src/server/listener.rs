//! Listening socket, TLS and shutdown

use axum::Router;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use hyper_util::service::TowerToHyperService;
use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;

use super::router::{build_router, ProxyState};
use super::ServerError;
use crate::config::ServerConfig;

/// Run the proxy server until Ctrl+C or SIGTERM
pub async fn run_server(state: ProxyState) -> Result<(), ServerError> {
    run_server_with_shutdown(state, shutdown_signal()).await
}

/// Run the proxy server until `shutdown` resolves
pub async fn run_server_with_shutdown<F>(state: ProxyState, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listen_addr(&state.config.server)?;
    let tls_acceptor = match state.config.server.tls_paths() {
        Some((cert, key)) => Some(load_tls_acceptor(Path::new(cert), Path::new(key))?),
        None => None,
    };

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;

    let app = build_router(state);

    match tls_acceptor {
        Some(acceptor) => {
            tracing::info!("local-ai-tool-proxy listening on https://{}", addr);
            serve_tls(listener, acceptor, app, shutdown).await
        }
        None => {
            tracing::info!("local-ai-tool-proxy listening on http://{}", addr);
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await?;
            Ok(())
        }
    }
}

fn listen_addr(server: &ServerConfig) -> Result<SocketAddr, ServerError> {
    let addr = format!("{}:{}", server.host, server.port);
    addr.parse()
        .map_err(|source| ServerError::Address { addr, source })
}

/// Build a TLS acceptor from a PEM certificate chain and private key
pub fn load_tls_acceptor(cert_path: &Path, key_path: &Path) -> Result<TlsAcceptor, ServerError> {
    let tls_error = ServerError::Tls;

    let cert_file = std::fs::File::open(cert_path)
        .map_err(|e| tls_error(format!("open cert {}: {}", cert_path.display(), e)))?;
    let key_file = std::fs::File::open(key_path)
        .map_err(|e| tls_error(format!("open key {}: {}", key_path.display(), e)))?;

    let mut cert_reader = std::io::BufReader::new(cert_file);
    let mut key_reader = std::io::BufReader::new(key_file);

    let certs = rustls_pemfile::certs(&mut cert_reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| tls_error(format!("read certs: {}", e)))?;
    if certs.is_empty() {
        return Err(tls_error(format!("no certificate found in {}", cert_path.display())));
    }
    let key = rustls_pemfile::private_key(&mut key_reader)
        .map_err(|e| tls_error(format!("read private key: {}", e)))?
        .ok_or_else(|| tls_error(format!("no private key found in {}", key_path.display())))?;

    let config = rustls::ServerConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
        .with_safe_default_protocol_versions()
        .map_err(|e| tls_error(e.to_string()))?
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| tls_error(format!("invalid cert or key: {}", e)))?;

    Ok(TlsAcceptor::from(Arc::new(config)))
}

/// Accept loop for HTTPS. Each connection gets its own task; the loop stops
/// accepting once `shutdown` resolves.
async fn serve_tls<F>(listener: TcpListener, acceptor: TlsAcceptor, app: Router, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            accepted = listener.accept() => {
                let (stream, peer_addr) = match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::warn!(error = %e, "Accept failed");
                        continue;
                    }
                };
                let acceptor = acceptor.clone();
                let service = TowerToHyperService::new(app.clone());
                tokio::spawn(async move {
                    let stream = match acceptor.accept(stream).await {
                        Ok(stream) => stream,
                        Err(e) => {
                            tracing::debug!(%peer_addr, error = %e, "TLS handshake failed");
                            return;
                        }
                    };
                    if let Err(e) = auto::Builder::new(TokioExecutor::new())
                        .serve_connection(TokioIo::new(stream), service)
                        .await
                    {
                        tracing::debug!(%peer_addr, error = %e, "Connection closed with error");
                    }
                });
            }
        }
    }

    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutting down");
}

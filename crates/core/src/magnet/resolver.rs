//! HTTP side of magnet resolution.

use async_trait::async_trait;
use reqwest::{header::LOCATION, redirect, Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

use crate::metrics::MAGNET_RESOLUTIONS;

use super::{magnet_from_torrent, LinkResolver, ResolveError, ResolvedMagnet};

/// Downloads `.torrent` files and derives their magnet links.
pub struct MagnetResolver {
    client: Client,
}

impl MagnetResolver {
    /// Create a resolver whose client never follows redirects on its own.
    pub fn new(timeout: Duration) -> Result<Self, ResolveError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| ResolveError::Download(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn fetch(&self, url: &str) -> Result<Response, ResolveError> {
        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| ResolveError::Download(e.to_string()))
    }

    async fn resolve_inner(&self, url: &str) -> Result<ResolvedMagnet, ResolveError> {
        if url.is_empty() {
            MAGNET_RESOLUTIONS.with_label_values(&["empty"]).inc();
            return Ok(ResolvedMagnet::empty());
        }

        let mut response = self.fetch(url).await?;

        if response.status().is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
                .ok_or_else(|| {
                    ResolveError::Download("redirect without a Location header".to_string())
                })?;

            if location.starts_with("magnet:") {
                debug!(url = %url, "Torrent URL redirects to a magnet link");
                MAGNET_RESOLUTIONS.with_label_values(&["redirect"]).inc();
                return Ok(ResolvedMagnet::direct(location));
            }

            let target = response
                .url()
                .join(&location)
                .map_err(|e| ResolveError::Download(format!("bad redirect target: {}", e)))?;
            debug!(url = %url, target = %target, "Following torrent URL redirect");
            response = self.fetch(target.as_str()).await?;
        }

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ResolveError::Download(format!("HTTP {}", status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ResolveError::Download(e.to_string()))?
            .to_vec();

        let magnet = magnet_from_torrent(&bytes)?;
        MAGNET_RESOLUTIONS.with_label_values(&["derived"]).inc();

        Ok(ResolvedMagnet {
            magnet,
            from_file: true,
            torrent_bytes: bytes,
        })
    }
}

#[async_trait]
impl LinkResolver for MagnetResolver {
    async fn resolve(&self, torrent_file_url: &str) -> Result<ResolvedMagnet, ResolveError> {
        let result = self.resolve_inner(torrent_file_url).await;
        if let Err(e) = &result {
            let outcome = match e {
                ResolveError::Download(_) => "download_error",
                ResolveError::Decode(_) => "decode_error",
            };
            MAGNET_RESOLUTIONS.with_label_values(&[outcome]).inc();
            warn!(url = %torrent_file_url, error = %e, "Magnet resolution failed");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{header, StatusCode},
        response::IntoResponse,
        routing::get,
        Router,
    };

    const TORRENT: &[u8] = b"d8:announce20:http://tracker/annce4:infod6:lengthi1024e4:name8:test.iso12:piece lengthi16384e6:pieces20:AAAAAAAAAAAAAAAAAAAAee";

    async fn serve() -> String {
        let app = Router::new()
            .route(
                "/to-magnet",
                get(|| async {
                    (
                        StatusCode::FOUND,
                        [(header::LOCATION, "magnet:?xt=urn:btih:ABCDEF0123456789")],
                    )
                }),
            )
            .route(
                "/to-file",
                get(|| async { (StatusCode::FOUND, [(header::LOCATION, "/file")]) }),
            )
            .route(
                "/double-redirect",
                get(|| async { (StatusCode::FOUND, [(header::LOCATION, "/to-file")]) }),
            )
            .route("/file", get(|| async { TORRENT.to_vec().into_response() }))
            .route(
                "/garbage",
                get(|| async { b"<html>not a torrent</html>".to_vec().into_response() }),
            )
            .route("/missing", get(|| async { StatusCode::NOT_FOUND }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{}", addr)
    }

    fn resolver() -> MagnetResolver {
        MagnetResolver::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_empty_url() {
        let resolved = resolver().resolve("").await.unwrap();
        assert_eq!(resolved, ResolvedMagnet::empty());
    }

    #[tokio::test]
    async fn test_redirect_to_magnet_is_returned_unchanged() {
        let base = serve().await;
        let resolved = resolver()
            .resolve(&format!("{}/to-magnet", base))
            .await
            .unwrap();

        assert_eq!(resolved.magnet, "magnet:?xt=urn:btih:ABCDEF0123456789");
        assert!(!resolved.from_file);
        assert!(resolved.torrent_bytes.is_empty());
    }

    #[tokio::test]
    async fn test_direct_file_is_hashed() {
        let base = serve().await;
        let resolved = resolver().resolve(&format!("{}/file", base)).await.unwrap();

        assert_eq!(
            resolved.magnet,
            "magnet:?xt=urn:btih:b461ed21b91703276413098c31d39fc47c7701c7&dn=test.iso"
        );
        assert!(resolved.from_file);
        assert_eq!(resolved.torrent_bytes, TORRENT);
    }

    #[tokio::test]
    async fn test_redirect_to_file_is_followed_once() {
        let base = serve().await;
        let resolved = resolver()
            .resolve(&format!("{}/to-file", base))
            .await
            .unwrap();
        assert!(resolved.from_file);

        // A second hop is not followed, the 302 is a non-200 terminal status
        let err = resolver()
            .resolve(&format!("{}/double-redirect", base))
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::Download(_)));
    }

    #[tokio::test]
    async fn test_not_found_is_download_error() {
        let base = serve().await;
        let err = resolver()
            .resolve(&format!("{}/missing", base))
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::Download(msg) if msg.contains("404")));
    }

    #[tokio::test]
    async fn test_garbage_body_is_decode_error() {
        let base = serve().await;
        let err = resolver()
            .resolve(&format!("{}/garbage", base))
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::Decode(_)));
    }
}

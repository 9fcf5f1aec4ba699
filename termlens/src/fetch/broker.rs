//! Privileged fetch broker reached over typed message channels.
//!
//! The scanning side never touches the network directly. It holds a
//! [`FetchClient`] and sends [`FetchContentRequest`] messages to a broker
//! task that owns the [`ContentFetcher`]. Each request is served on its own
//! task so slow hosts do not hold up the rest of a batch.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::messages::{FetchContentRequest, FetchContentResponse, FETCH_CONTENT_ACTION};
use super::protocols::ContentFetcher;

/// Default request queue size.
pub const DEFAULT_BROKER_CAPACITY: usize = 64;

type Envelope = (FetchContentRequest, oneshot::Sender<FetchContentResponse>);

/// Owns the fetcher and serves requests until every client is dropped.
pub struct FetchBroker {
    fetcher: Arc<dyn ContentFetcher>,
    rx: mpsc::Receiver<Envelope>,
}

impl FetchBroker {
    /// Spawns the broker loop and returns a client connected to it.
    ///
    /// The loop ends once every clone of the client has been dropped.
    pub fn spawn(
        fetcher: Arc<dyn ContentFetcher>,
        capacity: usize,
    ) -> (FetchClient, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let broker = Self { fetcher, rx };
        let handle = tokio::spawn(broker.run());
        (FetchClient { tx }, handle)
    }

    async fn run(mut self) {
        debug!("Fetch broker started");
        while let Some((request, reply)) = self.rx.recv().await {
            if request.action != FETCH_CONTENT_ACTION {
                warn!(action = %request.action, "Rejecting unknown broker action");
                let response = FetchContentResponse::channel_failure(
                    request.url,
                    format!("Unknown action: {}", request.action),
                );
                let _ = reply.send(response);
                continue;
            }

            let fetcher = Arc::clone(&self.fetcher);
            tokio::spawn(async move {
                debug!(request_id = %request.request_id, url = %request.url, "Serving fetch request");
                let result = fetcher.fetch(&request.url).await;
                let response = FetchContentResponse::from_fetch_result(result);
                if reply.send(response).is_err() {
                    debug!(request_id = %request.request_id, "Requester went away before the reply");
                }
            });
        }
        debug!("Fetch broker stopped");
    }
}

/// Cloneable handle used to send requests to a [`FetchBroker`].
#[derive(Debug, Clone)]
pub struct FetchClient {
    tx: mpsc::Sender<Envelope>,
}

impl FetchClient {
    /// Sends a request and waits for the reply.
    ///
    /// A stopped broker or a dropped reply becomes a failed response, never
    /// an error.
    pub async fn request(&self, request: FetchContentRequest) -> FetchContentResponse {
        let url = request.url.clone();
        let (reply_tx, reply_rx) = oneshot::channel();

        if self.tx.send((request, reply_tx)).await.is_err() {
            warn!(url = %url, "Fetch broker is not running");
            return FetchContentResponse::channel_failure(url, "fetch broker is not running");
        }

        match reply_rx.await {
            Ok(response) => response,
            Err(_) => {
                warn!(url = %url, "Fetch broker dropped the request");
                FetchContentResponse::channel_failure(url, "fetch broker dropped the request")
            }
        }
    }

    /// Fetches a URL through the broker.
    pub async fn fetch_content(&self, url: &str) -> FetchContentResponse {
        self.request(FetchContentRequest::new(url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::fetch::FetchResult;
    use async_trait::async_trait;

    struct EchoFetcher;

    #[async_trait]
    impl ContentFetcher for EchoFetcher {
        async fn fetch(&self, url: &str) -> FetchResult {
            if url.ends_with("/gone") {
                FetchResult::http_error(url, 404, "Not Found")
            } else {
                FetchResult::success(url, 200, format!("<html><body>{url}</body></html>"))
            }
        }
    }

    #[tokio::test]
    async fn test_broker_serves_requests() {
        let (client, _handle) = FetchBroker::spawn(Arc::new(EchoFetcher), 4);

        let ok = client.fetch_content("https://example.com/terms").await;
        assert!(ok.success);
        assert!(ok.html.unwrap().contains("example.com/terms"));

        let missing = client.fetch_content("https://example.com/gone").await;
        assert!(!missing.success);
        assert_eq!(missing.status, Some(404));
        assert_eq!(missing.error_kind, Some(ErrorKind::HttpError));
        assert!(missing.error.unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn test_broker_rejects_unknown_action() {
        let (client, _handle) = FetchBroker::spawn(Arc::new(EchoFetcher), 4);
        let mut request = FetchContentRequest::new("https://example.com/terms");
        request.action = "openTab".to_string();

        let response = client.request(request).await;
        assert!(!response.success);
        assert!(response.technical_error.unwrap().contains("openTab"));
    }

    #[tokio::test]
    async fn test_stopped_broker_yields_channel_failure() {
        let (client, handle) = FetchBroker::spawn(Arc::new(EchoFetcher), 4);
        handle.abort();
        let _ = handle.await;

        let response = client.fetch_content("https://example.com/terms").await;
        assert!(!response.success);
        assert_eq!(response.error_kind, Some(ErrorKind::NetworkError));
        assert!(response
            .error
            .unwrap()
            .starts_with("Failed to communicate with the fetch service"));
    }

    #[tokio::test]
    async fn test_broker_stops_when_clients_drop() {
        let (client, handle) = FetchBroker::spawn(Arc::new(EchoFetcher), 4);
        drop(client);
        handle.await.unwrap();
    }
}

use crate::state::messages::{NetworkRequest, NetworkResponse};
use log::{debug, error};
use squares_api::client::{ApiError, EspnClient};
use tokio::sync::mpsc;

/// Serves score-feed requests one at a time on its own task.
pub struct NetworkWorker {
    client: EspnClient,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
}

impl NetworkWorker {
    pub fn new(
        client: EspnClient,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self { client, requests, responses }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            let result = match request {
                NetworkRequest::LoadGameState { event_id } => {
                    self.handle_load_game_state(event_id).await
                }
            };

            debug!("network request complete");
            let response = result.unwrap_or_else(|err| NetworkResponse::Error {
                message: err.to_string(),
            });

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    async fn handle_load_game_state(&self, event_id: String) -> Result<NetworkResponse, ApiError> {
        debug!("loading game state for event {event_id}");
        let game = self.client.fetch_game_state(&event_id).await?;
        Ok(NetworkResponse::GameStateLoaded { event_id, game })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_feed_reports_an_error_response() {
        let client = EspnClient::new()
            .with_base_url("http://127.0.0.1:9")
            .with_timeout(std::time::Duration::from_millis(500));
        let (req_tx, req_rx) = mpsc::channel(1);
        let (resp_tx, mut resp_rx) = mpsc::channel(1);
        let task = tokio::spawn(NetworkWorker::new(client, req_rx, resp_tx).run());

        req_tx
            .send(NetworkRequest::LoadGameState { event_id: "1".into() })
            .await
            .unwrap();
        let response = resp_rx.recv().await.expect("worker should answer");
        assert!(matches!(response, NetworkResponse::Error { .. }), "got {response:?}");

        drop(req_tx);
        task.await.unwrap();
    }
}

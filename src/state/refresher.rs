use crate::state::messages::NetworkRequest;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

/// Re-requests one game's state on a fixed interval while a pool is watched.
pub struct PeriodicRefresher {
    network_requests: mpsc::Sender<NetworkRequest>,
    event_id: String,
    every: Duration,
}

impl PeriodicRefresher {
    pub fn new(
        network_requests: mpsc::Sender<NetworkRequest>,
        event_id: String,
        every: Duration,
    ) -> Self {
        Self { network_requests, event_id, every }
    }

    pub async fn run(self) {
        let mut refresh_interval = interval(self.every);
        // Skip the immediate first tick so startup loading isn't double-triggered.
        refresh_interval.tick().await;

        loop {
            refresh_interval.tick().await;
            let request = NetworkRequest::LoadGameState { event_id: self.event_id.clone() };
            if self.network_requests.send(request).await.is_err() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn sends_after_each_interval_and_stops_when_receiver_drops() {
        let (tx, mut rx) = mpsc::channel(4);
        let refresher = PeriodicRefresher::new(tx, "401".into(), Duration::from_secs(30));
        let task = tokio::spawn(refresher.run());

        let Some(NetworkRequest::LoadGameState { event_id }) = rx.recv().await else {
            panic!("refresher stopped early");
        };
        assert_eq!(event_id, "401");

        drop(rx);
        tokio::time::timeout(Duration::from_secs(120), task)
            .await
            .expect("refresher should exit once nobody listens")
            .unwrap();
    }
}

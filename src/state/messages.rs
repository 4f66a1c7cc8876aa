use squares_api::feed::GameState;

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    LoadGameState { event_id: String },
}

#[derive(Debug)]
pub enum NetworkResponse {
    GameStateLoaded { event_id: String, game: GameState },
    Error { message: String },
}

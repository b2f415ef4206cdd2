use learner_core::GameResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameMetadata {
    pub white: String,
    pub black: String,
    pub result: String, // "1-0", "0-1", "1/2-1/2", "*"
    pub date: Option<String>,
    pub event: Option<String>,
    pub link: Option<String>,
}

impl GameMetadata {
    /// Learner result for the PGN result tag; `None` for unfinished games.
    pub fn game_result(&self) -> Option<GameResult> {
        match self.result.as_str() {
            "1-0" => Some(GameResult::White),
            "0-1" => Some(GameResult::Black),
            "1/2-1/2" => Some(GameResult::Draw),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameData {
    pub metadata: GameMetadata,
    pub moves: Vec<String>, // SAN notation
}

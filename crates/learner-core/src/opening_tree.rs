//! Opening tree builder over completed games.

use serde_json::Value as JsonValue;
use std::collections::HashMap;

use crate::store::{GameRecord, GameResult};

struct TreeNode {
    mv: String,
    games: u64,
    wins: u64,
    losses: u64,
    draws: u64,
    children: HashMap<String, TreeNode>,
}

impl TreeNode {
    fn new(mv: &str) -> Self {
        Self {
            mv: mv.to_string(),
            games: 0,
            wins: 0,
            losses: 0,
            draws: 0,
            children: HashMap::new(),
        }
    }

    fn record(&mut self, result: GameResult) {
        self.games += 1;
        match result {
            GameResult::White => self.wins += 1,
            GameResult::Black => self.losses += 1,
            GameResult::Draw => self.draws += 1,
        }
    }
}

/// Build a nested tree from the first `max_depth` moves of each completed game.
///
/// Wins and losses are from white's side. Unfinished games are skipped.
pub fn build_opening_tree(games: &[GameRecord], max_depth: usize) -> JsonValue {
    let mut root = TreeNode::new("start");

    for game in games {
        let Some(result) = game.result else {
            continue;
        };
        root.record(result);

        let moves = &game.moves[..game.moves.len().min(max_depth)];
        let mut current = &mut root;
        for mv in moves {
            let child = current
                .children
                .entry(mv.clone())
                .or_insert_with(|| TreeNode::new(mv));
            child.record(result);
            current = child;
        }
    }

    node_to_json(&root)
}

fn node_to_json(node: &TreeNode) -> JsonValue {
    let mut children: Vec<JsonValue> = node.children.values().map(node_to_json).collect();

    // Most played first, then by move text for a stable order
    children.sort_by(|a, b| {
        b["games"]
            .as_u64()
            .unwrap_or(0)
            .cmp(&a["games"].as_u64().unwrap_or(0))
            .then_with(|| a["move"].as_str().cmp(&b["move"].as_str()))
    });

    let win_rate = if node.games > 0 {
        ((node.wins as f64 / node.games as f64) * 1000.0).round() / 10.0
    } else {
        0.0
    };

    serde_json::json!({
        "move": node.mv,
        "games": node.games,
        "wins": node.wins,
        "losses": node.losses,
        "draws": node.draws,
        "winRate": win_rate,
        "children": children,
    })
}

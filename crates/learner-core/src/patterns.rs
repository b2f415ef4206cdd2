//! Structural heuristics attached to a position the first time it is seen.
//!
//! Each rule is evaluated once per side; a rule that holds for a side yields
//! the label `<side>_<rule name>`, e.g. `white_bishop_pair`.

use std::collections::BTreeSet;

use crate::board::{Board, Color, PieceKind, BOARD_SIZE};

/// Context available to rules for one evaluation.
pub struct PatternContext<'a> {
    pub board: &'a Board,
    pub side_to_move: Color,
    /// The side the rule is being evaluated for.
    pub side: Color,
}

/// Trait that all pattern rules implement.
pub trait PatternRule: Send + Sync {
    /// Label suffix reported when the rule holds.
    fn name(&self) -> &'static str;

    fn holds(&self, ctx: &PatternContext) -> bool;
}

/// Placeholder king-safety rule: reports safe whenever the side's king is on
/// the board. Attack exposure is not evaluated.
pub struct KingPresence;

impl PatternRule for KingPresence {
    fn name(&self) -> &'static str {
        "king_safety"
    }

    fn holds(&self, ctx: &PatternContext) -> bool {
        ctx.board.king_square(ctx.side).is_some()
    }
}

/// Center control as occupancy: the side has a piece on d4, e4, d5 or e5.
pub struct CenterOccupancy;

const CENTER_SQUARES: [(usize, usize); 4] = [(3, 3), (3, 4), (4, 3), (4, 4)];

impl PatternRule for CenterOccupancy {
    fn name(&self) -> &'static str {
        "center_control"
    }

    fn holds(&self, ctx: &PatternContext) -> bool {
        CENTER_SQUARES.iter().any(|&(rank, file)| {
            ctx.board
                .get(rank, file)
                .is_some_and(|piece| piece.color == ctx.side)
        })
    }
}

/// Two or more bishops, regardless of square color.
pub struct BishopPair;

impl PatternRule for BishopPair {
    fn name(&self) -> &'static str {
        "bishop_pair"
    }

    fn holds(&self, ctx: &PatternContext) -> bool {
        ctx.board.count(ctx.side, PieceKind::Bishop) >= 2
    }
}

/// Any file holding two or more of the side's pawns.
pub struct DoubledPawns;

impl PatternRule for DoubledPawns {
    fn name(&self) -> &'static str {
        "doubled_pawns"
    }

    fn holds(&self, ctx: &PatternContext) -> bool {
        let mut per_file = [0u8; BOARD_SIZE];
        for (_, file, piece) in ctx.board.pieces() {
            if piece.color == ctx.side && piece.kind == PieceKind::Pawn {
                per_file[file] += 1;
            }
        }
        per_file.iter().any(|&n| n >= 2)
    }
}

fn create_all_rules() -> Vec<Box<dyn PatternRule>> {
    vec![
        Box::new(KingPresence),
        Box::new(CenterOccupancy),
        Box::new(BishopPair),
        Box::new(DoubledPawns),
    ]
}

pub struct PatternTagger {
    rules: Vec<Box<dyn PatternRule>>,
}

impl Default for PatternTagger {
    fn default() -> Self {
        Self {
            rules: create_all_rules(),
        }
    }
}

impl std::fmt::Debug for PatternTagger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.rules.iter().map(|r| r.name()).collect();
        f.debug_struct("PatternTagger").field("rules", &names).finish()
    }
}

impl PatternTagger {
    pub fn with_rules(rules: Vec<Box<dyn PatternRule>>) -> Self {
        Self { rules }
    }

    /// Evaluate every rule for both sides.
    pub fn tag(&self, board: &Board, side_to_move: Color) -> BTreeSet<String> {
        let mut tags = BTreeSet::new();
        for side in [Color::White, Color::Black] {
            let ctx = PatternContext {
                board,
                side_to_move,
                side,
            };
            for rule in &self.rules {
                if rule.holds(&ctx) {
                    tags.insert(format!("{}_{}", side.as_str(), rule.name()));
                }
            }
        }
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Piece;

    fn piece(color: Color, kind: PieceKind) -> Option<Piece> {
        Some(Piece::new(color, kind))
    }

    #[test]
    fn test_starting_position_tags() {
        let tags = PatternTagger::default().tag(&Board::starting_position(), Color::White);
        assert!(tags.contains("white_king_safety"));
        assert!(tags.contains("black_king_safety"));
        assert!(tags.contains("white_bishop_pair"));
        assert!(tags.contains("black_bishop_pair"));
        assert!(!tags.contains("white_center_control"));
        assert!(!tags.contains("white_doubled_pawns"));
    }

    #[test]
    fn test_doubled_pawns_and_center() {
        let mut board = Board::empty();
        board.set(4, 4, piece(Color::White, PieceKind::Pawn));
        board.set(5, 4, piece(Color::White, PieceKind::Pawn));
        board.set(1, 0, piece(Color::Black, PieceKind::Pawn));
        board.set(1, 1, piece(Color::Black, PieceKind::Pawn));

        let tags = PatternTagger::default().tag(&board, Color::Black);
        assert!(tags.contains("white_doubled_pawns"));
        assert!(tags.contains("white_center_control"));
        assert!(!tags.contains("black_doubled_pawns"));
        assert!(!tags.contains("black_center_control"));
        assert!(!tags.contains("white_king_safety"));
    }

    #[test]
    fn test_single_bishop_is_not_a_pair() {
        let mut board = Board::empty();
        board.set(7, 2, piece(Color::White, PieceKind::Bishop));
        board.set(0, 2, piece(Color::Black, PieceKind::Bishop));
        board.set(0, 5, piece(Color::Black, PieceKind::Bishop));
        let tags = PatternTagger::default().tag(&board, Color::White);
        assert!(!tags.contains("white_bishop_pair"));
        assert!(tags.contains("black_bishop_pair"));
    }

    struct SideToMove;

    impl PatternRule for SideToMove {
        fn name(&self) -> &'static str {
            "to_move"
        }

        fn holds(&self, ctx: &PatternContext) -> bool {
            ctx.side == ctx.side_to_move
        }
    }

    #[test]
    fn test_custom_rules_replace_defaults() {
        let tagger = PatternTagger::with_rules(vec![Box::new(SideToMove)]);
        let tags = tagger.tag(&Board::starting_position(), Color::Black);
        assert_eq!(tags.into_iter().collect::<Vec<_>>(), vec!["black_to_move"]);
    }
}

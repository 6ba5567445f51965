use crate::board::{Board, Color, PieceKind, Square};
use crate::error::{ChessError, Result};
use crate::movegen::{self, Move};
use crate::zobrist;

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Castling availability, four bits: KQkq.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    fn bit(color: Color, kingside: bool) -> u8 {
        match (color, kingside) {
            (Color::White, true) => 0b0001,
            (Color::White, false) => 0b0010,
            (Color::Black, true) => 0b0100,
            (Color::Black, false) => 0b1000,
        }
    }

    pub fn has(&self, color: Color, kingside: bool) -> bool {
        self.0 & Self::bit(color, kingside) != 0
    }

    pub fn grant(&mut self, color: Color, kingside: bool) {
        self.0 |= Self::bit(color, kingside);
    }

    pub fn revoke(&mut self, color: Color, kingside: bool) {
        self.0 &= !Self::bit(color, kingside);
    }

    pub fn revoke_all(&mut self, color: Color) {
        self.revoke(color, true);
        self.revoke(color, false);
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    fn from_fen(field: &str) -> Result<Self> {
        let mut rights = Self::NONE;
        if field == "-" {
            return Ok(rights);
        }
        for c in field.chars() {
            match c {
                'K' => rights.grant(Color::White, true),
                'Q' => rights.grant(Color::White, false),
                'k' => rights.grant(Color::Black, true),
                'q' => rights.grant(Color::Black, false),
                _ => return Err(ChessError::InvalidFen(format!("bad castling field `{}`", field))),
            }
        }
        Ok(rights)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawReason {
    Agreement,
    ThreefoldRepetition,
    FiftyMoveRule,
    InsufficientMaterial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ongoing,
    Checkmate(Color), // Color is the winner
    Stalemate,
    Resigned(Color), // Color is the winner
    Drawn(DrawReason),
}

impl Status {
    pub fn is_over(&self) -> bool {
        *self != Status::Ongoing
    }
}

/// Everything needed to decide legality: placement, side to move, castling
/// and en passant state, clocks, and the moves played so far.
#[derive(Debug, Clone)]
pub struct GameState {
    pub(crate) board: Board,
    pub(crate) side_to_move: Color,
    pub(crate) history: Vec<Move>,
    pub(crate) status: Status,
    pub(crate) en_passant: Option<Square>,
    pub(crate) castling: CastlingRights,
    pub(crate) halfmove_clock: u32,
    pub(crate) fullmove_number: u32,
    pub(crate) position_keys: Vec<u64>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        let mut state = Self {
            board: Board::new(),
            side_to_move: Color::White,
            history: Vec::new(),
            status: Status::Ongoing,
            en_passant: None,
            castling: CastlingRights::ALL,
            halfmove_clock: 0,
            fullmove_number: 1,
            position_keys: Vec::new(),
        };
        state.position_keys.push(state.position_key());
        state
    }

    /// Sets up a position from a FEN record. The halfmove and fullmove fields
    /// may be omitted.
    pub fn from_fen(fen: &str) -> Result<Self> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 || fields.len() > 6 {
            return Err(ChessError::InvalidFen(format!("expected 4 to 6 fields, found {}", fields.len())));
        }

        let board = Board::from_placement(fields[0])?;
        for color in [Color::White, Color::Black] {
            if board.count(color, PieceKind::King) != 1 {
                return Err(ChessError::InvalidFen(format!("{:?} must have exactly one king", color)));
            }
        }

        let side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(ChessError::InvalidFen(format!("bad side to move `{}`", other))),
        };

        let mut castling = CastlingRights::from_fen(fields[2])?;
        // Drop rights whose king or rook is not on its home square
        for color in [Color::White, Color::Black] {
            let rank = color.back_rank();
            let home = |file: u8, kind: PieceKind| {
                Square::new(file, rank)
                    .ok()
                    .and_then(|square| board.piece_at(square))
                    .map_or(false, |p| p.kind == kind && p.color == color)
            };
            if !home(4, PieceKind::King) {
                castling.revoke_all(color);
            }
            if !home(7, PieceKind::Rook) {
                castling.revoke(color, true);
            }
            if !home(0, PieceKind::Rook) {
                castling.revoke(color, false);
            }
        }

        let en_passant = match fields[3] {
            "-" => None,
            square => Some(
                square
                    .parse::<Square>()
                    .map_err(|_| ChessError::InvalidFen(format!("bad en passant square `{}`", square)))?,
            ),
        };
        if let Some(target) = en_passant {
            // The target sits behind a pawn of the side that just moved
            let target_rank = match side_to_move {
                Color::White => 5,
                Color::Black => 2,
            };
            let victim = target
                .offset(0, -side_to_move.forward())
                .and_then(|square| board.piece_at(square));
            let pawn_behind =
                matches!(victim, Some(p) if p.kind == PieceKind::Pawn && p.color == side_to_move.opposite());
            if target.rank() != target_rank || !board.is_empty(target) || !pawn_behind {
                return Err(ChessError::InvalidFen(format!("impossible en passant square `{}`", target)));
            }
        }

        let halfmove_clock = match fields.get(4) {
            Some(field) => field
                .parse()
                .map_err(|_| ChessError::InvalidFen(format!("bad halfmove clock `{}`", field)))?,
            None => 0,
        };
        let fullmove_number = match fields.get(5) {
            Some(field) => field
                .parse()
                .map_err(|_| ChessError::InvalidFen(format!("bad fullmove number `{}`", field)))?,
            None => 1,
        };

        if movegen::is_king_in_check(&board, side_to_move.opposite()) {
            return Err(ChessError::InvalidFen("the side not to move is in check".to_string()));
        }

        let mut state = Self {
            board,
            side_to_move,
            history: Vec::new(),
            status: Status::Ongoing,
            en_passant,
            castling,
            halfmove_clock,
            fullmove_number,
            position_keys: Vec::new(),
        };
        state.position_keys.push(state.position_key());
        state.status = state.evaluate_status();
        Ok(state)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn castling_rights(&self) -> CastlingRights {
        self.castling
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    pub fn position_key(&self) -> u64 {
        zobrist::position_key(&self.board, self.side_to_move, self.castling, self.capturable_en_passant())
    }

    /// The en passant target, but only when a pawn of the side to move stands
    /// ready to take on it. Positions differing only in a dead target repeat.
    fn capturable_en_passant(&self) -> Option<Square> {
        let target = self.en_passant?;
        let side = self.side_to_move;
        let ready = [-1, 1].iter().any(|&df| {
            matches!(
                target.offset(df, -side.forward()).and_then(|square| self.board.piece_at(square)),
                Some(p) if p.kind == PieceKind::Pawn && p.color == side
            )
        });
        if ready {
            Some(target)
        } else {
            None
        }
    }

    /// Ends the game for reasons outside the board (resignation, agreement).
    pub(crate) fn conclude(&mut self, status: Status) {
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fen_start_matches_new() {
        let state = GameState::from_fen(STARTING_FEN).unwrap();
        let fresh = GameState::new();
        assert_eq!(state.board(), fresh.board());
        assert_eq!(state.castling_rights(), CastlingRights::ALL);
        assert_eq!(state.position_key(), fresh.position_key());
        assert_eq!(state.status(), Status::Ongoing);
    }

    #[test]
    fn test_fen_rejects_bad_records() {
        assert!(GameState::from_fen("8/8/8/8/8/8/8/8 w - -").is_err());
        assert!(GameState::from_fen("4k3/8/8/8/8/8/8/4K3 x - -").is_err());
        assert!(GameState::from_fen("4k3/8/8/8/8/8/8/4K3 w X -").is_err());
        assert!(GameState::from_fen("4k3/8/8/8/8/8/8/4K3 w - z9").is_err());
        // Black is in check with White to move
        assert!(GameState::from_fen("4k3/8/8/8/8/8/8/4RK2 w - -").is_err());
    }

    #[test]
    fn test_fen_validates_en_passant_square() {
        // Wrong rank for White to move; the pawn on e3 would vanish from behind d3
        assert!(matches!(
            GameState::from_fen("4k3/8/8/8/8/3Pp3/8/4K3 w - e4 0 1"),
            Err(ChessError::InvalidFen(_))
        ));
        // Right rank but no pawn that just stepped past it
        assert!(GameState::from_fen("4k3/8/8/3P4/8/8/8/4K3 w - e6 0 1").is_err());
        // Black to move needs a target on the third rank
        assert!(GameState::from_fen("4k3/8/8/8/3Pp3/8/8/4K3 b - d6 0 1").is_err());

        let state = GameState::from_fen("4k3/8/8/8/3Pp3/8/8/4K3 b - d3 0 1").unwrap();
        assert_eq!(state.en_passant(), "d3".parse().ok());
        assert!(state.legal_moves().iter().any(|mv| mv.special == Some(movegen::SpecialMove::EnPassant)));
    }

    #[test]
    fn test_fen_drops_impossible_castling_rights() {
        let state = GameState::from_fen("r3k3/8/8/8/8/8/8/4K2R w KQkq - 0 1").unwrap();
        let rights = state.castling_rights();
        assert!(rights.has(Color::White, true));
        assert!(!rights.has(Color::White, false));
        assert!(!rights.has(Color::Black, true));
        assert!(rights.has(Color::Black, false));
    }
}

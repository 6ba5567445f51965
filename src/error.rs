use crate::board::Square;
use crate::movegen::Move;
use thiserror::Error;

/// Why a well-formed move was refused by the rules engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IllegalReason {
    #[error("it is not that side's turn")]
    NotYourTurn,

    #[error("no piece on {0}")]
    NoPiece(Square),

    #[error("the move leaves the king in check")]
    LeavesKingInCheck,

    #[error("a promotion piece must be chosen (Q, R, B or N)")]
    PromotionRequired,

    #[error("pawns can only promote to Q, R, B or N")]
    InvalidPromotion,

    #[error("the piece cannot move there")]
    NotLegal,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChessError {
    #[error("invalid square `{0}`")]
    InvalidSquare(String),

    #[error("unrecognized move `{0}`")]
    UnrecognizedInput(String),

    #[error("ambiguous move `{input}`, candidates: {}", list_moves(.candidates))]
    AmbiguousMove { input: String, candidates: Vec<Move> },

    #[error("illegal move: {0}")]
    IllegalMove(IllegalReason),

    #[error("no game in progress")]
    NotActive,

    #[error("a game is already in progress")]
    GameInProgress,

    #[error("no draw offer is pending")]
    NoDrawOffer,

    #[error("invalid FEN: {0}")]
    InvalidFen(String),
}

fn list_moves(moves: &[Move]) -> String {
    moves.iter().map(|mv| mv.to_string()).collect::<Vec<_>>().join(", ")
}

pub type Result<T> = std::result::Result<T, ChessError>;

pub mod board;
pub mod console;
pub mod error;
pub mod game;
pub mod legality;
pub mod movegen;
pub mod notation;
pub mod state;
pub mod theme;
pub mod zobrist;

pub use board::{Board, Color, Piece, PieceKind, Square};
pub use console::Console;
pub use error::{ChessError, IllegalReason};
pub use game::{Game, Phase};
pub use movegen::{Move, SpecialMove};
pub use state::{CastlingRights, DrawReason, GameState, Status};
pub use theme::Theme;

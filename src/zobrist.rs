//! Position keys for repetition detection.
//!
//! Keys come from a fixed-seed generator, so a given position hashes to the
//! same value on every run.

use crate::board::{Board, Color, Square};
use crate::state::CastlingRights;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::OnceLock;

const SEED: u64 = 0x5CAC_C41A_7E2B_0D15;

struct ZobristKeys {
    pieces: [[[u64; 64]; 6]; 2],
    black_to_move: u64,
    castling: [u64; 16],
    en_passant_file: [u64; 8],
}

static KEYS: OnceLock<ZobristKeys> = OnceLock::new();

fn keys() -> &'static ZobristKeys {
    KEYS.get_or_init(|| {
        let mut rng = StdRng::seed_from_u64(SEED);

        let mut pieces = [[[0u64; 64]; 6]; 2];
        for color in pieces.iter_mut() {
            for kind in color.iter_mut() {
                for key in kind.iter_mut() {
                    *key = rng.gen();
                }
            }
        }

        let black_to_move = rng.gen();

        let mut castling = [0u64; 16];
        for key in castling.iter_mut() {
            *key = rng.gen();
        }

        let mut en_passant_file = [0u64; 8];
        for key in en_passant_file.iter_mut() {
            *key = rng.gen();
        }

        ZobristKeys {
            pieces,
            black_to_move,
            castling,
            en_passant_file,
        }
    })
}

pub fn position_key(
    board: &Board,
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
) -> u64 {
    let keys = keys();
    let mut hash = 0u64;

    for color in [Color::White, Color::Black] {
        for (square, piece) in board.pieces_of(color) {
            hash ^= keys.pieces[color.index()][piece.kind.index()][square.index()];
        }
    }

    if side_to_move == Color::Black {
        hash ^= keys.black_to_move;
    }

    hash ^= keys.castling[(castling.bits() & 0x0F) as usize];

    if let Some(square) = en_passant {
        hash ^= keys.en_passant_file[square.file() as usize];
    }

    hash
}

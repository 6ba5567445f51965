//! Algebraic notation: turning user input into legal moves and legal moves
//! back into standard algebraic strings.
//!
//! Accepted input forms:
//! - a bare destination for a pawn advance (`e4`)
//! - origin and destination squares (`e2e4`, `e2-e4`, `e7e8q`)
//! - full SAN (`Nf3`, `exd5`, `Rae1`, `e8=Q#`, `O-O`)
//!
//! Every form is resolved against `GameState::legal_moves`, so a parsed move
//! is always playable.

use crate::board::{PieceKind, Square};
use crate::error::{ChessError, IllegalReason, Result};
use crate::movegen::{Move, SpecialMove};
use crate::state::{GameState, Status};

#[derive(Debug, Clone, PartialEq, Eq)]
struct SanMove {
    piece: PieceKind,
    from_file: Option<u8>,
    from_rank: Option<u8>,
    to: Square,
    promotion: Option<PieceKind>,
}

pub fn parse(input: &str, state: &GameState) -> Result<Move> {
    let text = input.trim();
    let unrecognized = || ChessError::UnrecognizedInput(text.to_string());

    // Check, mate and annotation marks carry no meaning here
    let body = text.trim_end_matches(|c| matches!(c, '+' | '#' | '!' | '?'));
    if body.is_empty() || !body.is_ascii() {
        return Err(unrecognized());
    }

    if let Some(kingside) = castling_token(body) {
        let wanted = if kingside {
            SpecialMove::CastleKingside
        } else {
            SpecialMove::CastleQueenside
        };
        return state
            .legal_moves()
            .into_iter()
            .find(|mv| mv.special == Some(wanted))
            .ok_or(ChessError::IllegalMove(IllegalReason::NotLegal));
    }

    if let Some((from, to, promotion)) = coordinates(body)? {
        return state.find_move(from, to, promotion);
    }

    let san = parse_san(body).ok_or_else(unrecognized)?;
    resolve(san, text, state)
}

fn castling_token(body: &str) -> Option<bool> {
    match body {
        "O-O" | "0-0" => Some(true),
        "O-O-O" | "0-0-0" => Some(false),
        _ => None,
    }
}

/// `e2e4`, `e2-e4` or `e7e8q`.
fn coordinates(body: &str) -> Result<Option<(Square, Square, Option<PieceKind>)>> {
    let compact: String = body.chars().filter(|&c| c != '-').collect();
    if compact.len() != 4 && compact.len() != 5 {
        return Ok(None);
    }
    let (from, to) = match (compact[0..2].parse::<Square>(), compact[2..4].parse::<Square>()) {
        (Ok(from), Ok(to)) => (from, to),
        _ => return Ok(None),
    };
    let promotion = match compact[4..].chars().next() {
        None => None,
        Some(c) => match PieceKind::from_letter(c) {
            Some(kind) if kind.is_promotion_target() => Some(kind),
            Some(_) => return Err(ChessError::IllegalMove(IllegalReason::InvalidPromotion)),
            None => return Err(ChessError::UnrecognizedInput(body.to_string())),
        },
    };
    Ok(Some((from, to, promotion)))
}

fn parse_san(body: &str) -> Option<SanMove> {
    let mut chars: Vec<char> = body.chars().collect();

    let piece = match chars.first() {
        Some(&c) if "KQRBN".contains(c) => {
            chars.remove(0);
            PieceKind::from_letter(c)?
        }
        _ => PieceKind::Pawn,
    };

    // Promotion suffix: `=Q`, `=q` or a bare upper-case letter
    let mut promotion = None;
    let len = chars.len();
    if len >= 2 && chars[len - 2] == '=' {
        promotion = Some(PieceKind::from_letter(chars[len - 1])?);
        chars.truncate(len - 2);
    } else if let Some(&last) = chars.last() {
        if last.is_ascii_uppercase() {
            promotion = Some(PieceKind::from_letter(last)?);
            chars.pop();
        }
    }

    if chars.len() < 2 {
        return None;
    }
    let split = chars.len() - 2;
    let to: Square = chars[split..].iter().collect::<String>().parse().ok()?;

    let mut middle = &chars[..split];
    if middle.last() == Some(&'x') {
        middle = &middle[..middle.len() - 1];
    }

    let mut from_file = None;
    let mut from_rank = None;
    for &c in middle {
        match c {
            'a'..='h' if from_file.is_none() && from_rank.is_none() => from_file = Some(c as u8 - b'a'),
            '1'..='8' if from_rank.is_none() => from_rank = Some(c as u8 - b'1'),
            _ => return None,
        }
    }

    Some(SanMove {
        piece,
        from_file,
        from_rank,
        to,
        promotion,
    })
}

fn resolve(san: SanMove, input: &str, state: &GameState) -> Result<Move> {
    if let Some(kind) = san.promotion {
        if !kind.is_promotion_target() {
            return Err(ChessError::IllegalMove(IllegalReason::InvalidPromotion));
        }
    }

    let mut candidates: Vec<Move> = state
        .legal_moves()
        .into_iter()
        .filter(|mv| !mv.is_castling())
        .filter(|mv| mv.piece == san.piece && mv.to == san.to)
        .filter(|mv| san.from_file.map_or(true, |file| mv.from.file() == file))
        .filter(|mv| san.from_rank.map_or(true, |rank| mv.from.rank() == rank))
        .collect();

    if candidates.iter().any(|mv| mv.promotion().is_some()) {
        if san.promotion.is_none() {
            return Err(ChessError::IllegalMove(IllegalReason::PromotionRequired));
        }
        candidates.retain(|mv| mv.promotion() == san.promotion);
    } else if san.promotion.is_some() {
        candidates.clear();
    }

    match candidates.len() {
        0 => Err(ChessError::UnrecognizedInput(input.to_string())),
        1 => Ok(candidates[0]),
        _ => Err(ChessError::AmbiguousMove {
            input: input.to_string(),
            candidates,
        }),
    }
}

/// Standard algebraic form of `mv`, which must be legal in `before`. The
/// check or mate suffix comes from playing the move on a copy.
pub fn render(mv: &Move, before: &GameState) -> String {
    let mut san = String::new();
    match mv.special {
        Some(SpecialMove::CastleKingside) => san.push_str("O-O"),
        Some(SpecialMove::CastleQueenside) => san.push_str("O-O-O"),
        _ => {
            if mv.piece == PieceKind::Pawn {
                if mv.is_capture() {
                    san.push(mv.from.file_char());
                    san.push('x');
                }
            } else {
                san.push(mv.piece.letter());
                san.push_str(&disambiguator(mv, before));
                if mv.is_capture() {
                    san.push('x');
                }
            }
            san.push_str(&mv.to.to_string());
            if let Some(kind) = mv.promotion() {
                san.push('=');
                san.push(kind.letter());
            }
        }
    }

    let mut after = before.clone();
    if after.apply(*mv).is_ok() {
        if matches!(after.status(), Status::Checkmate(_)) {
            san.push('#');
        } else if after.is_in_check() {
            san.push('+');
        }
    }
    san
}

/// Shortest origin hint separating `mv` from same-kind moves to the same square.
fn disambiguator(mv: &Move, before: &GameState) -> String {
    let rivals: Vec<Move> = before
        .legal_moves()
        .into_iter()
        .filter(|other| other.piece == mv.piece && other.to == mv.to && other.from != mv.from)
        .collect();

    if rivals.is_empty() {
        String::new()
    } else if rivals.iter().all(|other| other.from.file() != mv.from.file()) {
        mv.from.file_char().to_string()
    } else if rivals.iter().all(|other| other.from.rank() != mv.from.rank()) {
        mv.from.rank_char().to_string()
    } else {
        mv.from.to_string()
    }
}

/// Numbered move pairs, one line per full move: `1. e4      e5`.
pub fn move_list(sans: &[String], first_number: u32, black_first: bool) -> String {
    let mut lines = Vec::new();
    let mut number = first_number;
    let mut rest = sans;

    if black_first {
        if let Some((first, tail)) = rest.split_first() {
            lines.push(format!("{}. {:<7} {}", number, "...", first));
            number += 1;
            rest = tail;
        }
    }
    for pair in rest.chunks(2) {
        let line = match pair {
            [white, black] => format!("{}. {:<7} {}", number, white, black),
            [white] => format!("{}. {}", number, white),
            _ => continue,
        };
        lines.push(line);
        number += 1;
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    fn play(state: &mut GameState, inputs: &[&str]) {
        for input in inputs {
            let mv = parse(input, state).unwrap();
            state.apply(mv).unwrap();
        }
    }

    #[test]
    fn test_legacy_pawn_shorthand() {
        let state = GameState::new();
        let mv = parse("e4", &state).unwrap();
        assert_eq!(mv, Move::new(sq("e2"), sq("e4"), PieceKind::Pawn));
        assert_eq!(parse("e3", &state).unwrap().from, sq("e2"));
        assert!(matches!(parse("e5", &state), Err(ChessError::UnrecognizedInput(_))));
    }

    #[test]
    fn test_coordinate_forms() {
        let state = GameState::new();
        let expected = Move::new(sq("g1"), sq("f3"), PieceKind::Knight);
        assert_eq!(parse("g1f3", &state).unwrap(), expected);
        assert_eq!(parse("g1-f3", &state).unwrap(), expected);
        assert_eq!(
            parse("e7e5", &state),
            Err(ChessError::IllegalMove(IllegalReason::NotYourTurn))
        );
        assert_eq!(
            parse("e3e4", &state),
            Err(ChessError::IllegalMove(IllegalReason::NoPiece(sq("e3"))))
        );
        assert_eq!(
            parse("e2e5", &state),
            Err(ChessError::IllegalMove(IllegalReason::NotLegal))
        );
    }

    #[test]
    fn test_san_pieces_and_captures() {
        let mut state = GameState::new();
        play(&mut state, &["e4", "d5"]);
        let capture = parse("exd5", &state).unwrap();
        assert_eq!(capture.captured, Some((PieceKind::Pawn, sq("d5"))));
        assert_eq!(parse("Nf3", &state).unwrap().from, sq("g1"));
        assert_eq!(parse("Bb5+", &state).unwrap().to, sq("b5"));
        assert!(matches!(parse("Nf4", &state), Err(ChessError::UnrecognizedInput(_))));
        assert!(matches!(parse("hello", &state), Err(ChessError::UnrecognizedInput(_))));
        assert!(matches!(parse("", &state), Err(ChessError::UnrecognizedInput(_))));
        assert!(matches!(parse("♘f3", &state), Err(ChessError::UnrecognizedInput(_))));
    }

    #[test]
    fn test_ambiguous_knights_need_a_file() {
        let state = GameState::from_fen("4k3/8/8/8/8/8/8/1N2KN2 w - - 0 1").unwrap();
        match parse("Nd2", &state) {
            Err(ChessError::AmbiguousMove { candidates, .. }) => assert_eq!(candidates.len(), 2),
            other => panic!("expected ambiguity, got {:?}", other),
        }
        let mv = parse("Nbd2", &state).unwrap();
        assert_eq!(mv.from, sq("b1"));
        assert_eq!(render(&mv, &state), "Nbd2");
        assert_eq!(parse("b1d2", &state).unwrap(), mv);
    }

    #[test]
    fn test_rank_disambiguation() {
        let state = GameState::from_fen("4k3/8/8/R7/8/8/8/R3K3 w - - 0 1").unwrap();
        let mv = parse("R1a3", &state).unwrap();
        assert_eq!(mv.from, sq("a1"));
        assert_eq!(render(&mv, &state), "R1a3");
    }

    #[test]
    fn test_castling_tokens() {
        let state = GameState::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let short = parse("O-O", &state).unwrap();
        assert_eq!(short.special, Some(SpecialMove::CastleKingside));
        assert_eq!(parse("0-0-0", &state).unwrap().special, Some(SpecialMove::CastleQueenside));
        assert_eq!(parse("e1g1", &state).unwrap(), short);
        assert_eq!(render(&short, &state), "O-O");

        let state = GameState::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w - - 0 1").unwrap();
        assert_eq!(
            parse("O-O", &state),
            Err(ChessError::IllegalMove(IllegalReason::NotLegal))
        );
    }

    #[test]
    fn test_promotion_input() {
        let state = GameState::from_fen("1r2k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(
            parse("a8", &state),
            Err(ChessError::IllegalMove(IllegalReason::PromotionRequired))
        );
        assert_eq!(
            parse("a7a8", &state),
            Err(ChessError::IllegalMove(IllegalReason::PromotionRequired))
        );
        assert_eq!(
            parse("a8=K", &state),
            Err(ChessError::IllegalMove(IllegalReason::InvalidPromotion))
        );
        let push = parse("a8=Q", &state).unwrap();
        assert_eq!(push.promotion(), Some(PieceKind::Queen));
        assert_eq!(parse("a7a8q", &state).unwrap(), push);
        assert_eq!(parse("a8Q", &state).unwrap(), push);

        let capture = parse("axb8=N", &state).unwrap();
        assert_eq!(capture.captured, Some((PieceKind::Rook, sq("b8"))));
        assert_eq!(render(&capture, &state), "axb8=N");
        assert_eq!(render(&push, &state), "a8=Q");
    }

    #[test]
    fn test_render_mate_suffix() {
        let mut state = GameState::new();
        play(&mut state, &["f3", "e5", "g4"]);
        let mate = parse("Qh4", &state).unwrap();
        assert_eq!(render(&mate, &state), "Qh4#");
    }

    #[test]
    fn test_move_list_layout() {
        let sans: Vec<String> = ["e4", "e5", "Nf3"].iter().map(|s| s.to_string()).collect();
        assert_eq!(move_list(&sans, 1, false), "1. e4      e5\n2. Nf3");
        assert_eq!(move_list(&sans[1..], 1, true), "1. ...     e5\n2. Nf3");
        assert_eq!(move_list(&[], 1, false), "");
    }
}

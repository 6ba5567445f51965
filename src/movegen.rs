use crate::board::{Board, Color, Piece, PieceKind, Square};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialMove {
    CastleKingside,
    CastleQueenside,
    EnPassant,
    Promotion(PieceKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub piece: PieceKind,
    /// Kind and square of the captured piece; the square differs from `to`
    /// only for en passant.
    pub captured: Option<(PieceKind, Square)>,
    pub special: Option<SpecialMove>,
}

impl Move {
    pub fn new(from: Square, to: Square, piece: PieceKind) -> Self {
        Self {
            from,
            to,
            piece,
            captured: None,
            special: None,
        }
    }

    pub fn new_capture(from: Square, to: Square, piece: PieceKind, captured: PieceKind) -> Self {
        Self {
            captured: Some((captured, to)),
            ..Self::new(from, to, piece)
        }
    }

    pub fn new_en_passant(from: Square, to: Square, captured_square: Square) -> Self {
        Self {
            from,
            to,
            piece: PieceKind::Pawn,
            captured: Some((PieceKind::Pawn, captured_square)),
            special: Some(SpecialMove::EnPassant),
        }
    }

    pub fn new_castling(from: Square, to: Square, kingside: bool) -> Self {
        Self {
            from,
            to,
            piece: PieceKind::King,
            captured: None,
            special: Some(if kingside {
                SpecialMove::CastleKingside
            } else {
                SpecialMove::CastleQueenside
            }),
        }
    }

    pub fn new_promotion(from: Square, to: Square, captured: Option<PieceKind>, promotion: PieceKind) -> Self {
        Self {
            from,
            to,
            piece: PieceKind::Pawn,
            captured: captured.map(|kind| (kind, to)),
            special: Some(SpecialMove::Promotion(promotion)),
        }
    }

    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    pub fn promotion(&self) -> Option<PieceKind> {
        match self.special {
            Some(SpecialMove::Promotion(kind)) => Some(kind),
            _ => None,
        }
    }

    pub fn is_castling(&self) -> bool {
        matches!(
            self.special,
            Some(SpecialMove::CastleKingside) | Some(SpecialMove::CastleQueenside)
        )
    }

    /// Origin and destination of the rook for a castling move.
    pub fn castling_rook(&self) -> Option<(Square, Square)> {
        let rank = self.from.rank();
        let (rook_from, rook_to) = match self.special {
            Some(SpecialMove::CastleKingside) => (7, 5),
            Some(SpecialMove::CastleQueenside) => (0, 3),
            _ => return None,
        };
        Some((Square::new(rook_from, rank).ok()?, Square::new(rook_to, rank).ok()?))
    }

    pub fn is_double_pawn_step(&self) -> bool {
        self.piece == PieceKind::Pawn && (self.to.rank() as i8 - self.from.rank() as i8).abs() == 2
    }
}

/// Coordinate form, e.g. `e2e4` or `e7e8q`.
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion() {
            write!(f, "{}", kind.letter().to_ascii_lowercase())?;
        }
        Ok(())
    }
}

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2), (-1, 2), (1, -2), (-1, -2),
    (2, 1), (2, -1), (-2, 1), (-2, -1),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1), (1, 1), (1, 0), (1, -1),
    (0, -1), (-1, -1), (-1, 0), (-1, 1),
];

const DIAGONALS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ORTHOGONALS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

fn step_destinations(board: &Board, from: Square, color: Color, offsets: &[(i8, i8)]) -> Vec<Square> {
    offsets
        .iter()
        .filter_map(|&(df, dr)| from.offset(df, dr))
        .filter(|&to| match board.piece_at(to) {
            Some(piece) => piece.color != color,
            None => true,
        })
        .collect()
}

fn ray_destinations(board: &Board, from: Square, color: Color, directions: &[(i8, i8)]) -> Vec<Square> {
    let mut destinations = Vec::new();
    for &(df, dr) in directions {
        let mut current = from;
        while let Some(to) = current.offset(df, dr) {
            match board.piece_at(to) {
                None => destinations.push(to),
                Some(piece) => {
                    // Stop at the first occupied square; it is a capture if hostile.
                    if piece.color != color {
                        destinations.push(to);
                    }
                    break;
                }
            }
            current = to;
        }
    }
    destinations
}

fn pawn_destinations(board: &Board, from: Square, pawn: Piece, en_passant: Option<Square>) -> Vec<Square> {
    let mut destinations = Vec::new();
    let forward = pawn.color.forward();

    // Single push, then double push from the starting rank
    if let Some(one) = from.offset(0, forward) {
        if board.is_empty(one) {
            destinations.push(one);
            if from.rank() == pawn.color.pawn_rank() && !pawn.has_moved {
                if let Some(two) = one.offset(0, forward) {
                    if board.is_empty(two) {
                        destinations.push(two);
                    }
                }
            }
        }
    }

    // Diagonal captures, including onto the en passant target
    for df in [-1, 1] {
        if let Some(to) = from.offset(df, forward) {
            let hostile = matches!(board.piece_at(to), Some(piece) if piece.color != pawn.color);
            let en_passant_victim = en_passant == Some(to)
                && board.is_empty(to)
                && matches!(
                    to.offset(0, -forward).and_then(|square| board.piece_at(square)),
                    Some(piece) if piece.kind == PieceKind::Pawn && piece.color != pawn.color
                );
            if hostile || en_passant_victim {
                destinations.push(to);
            }
        }
    }

    destinations
}

/// Pseudo-legal destinations of the piece standing on `from`. Ignores whether
/// the mover's own king is left in check. Castling is not included.
pub fn pseudo_destinations(board: &Board, from: Square, en_passant: Option<Square>) -> Vec<Square> {
    let piece = match board.piece_at(from) {
        Some(piece) => piece,
        None => return Vec::new(),
    };
    match piece.kind {
        PieceKind::Pawn => pawn_destinations(board, from, piece, en_passant),
        PieceKind::Knight => step_destinations(board, from, piece.color, &KNIGHT_OFFSETS),
        PieceKind::Bishop => ray_destinations(board, from, piece.color, &DIAGONALS),
        PieceKind::Rook => ray_destinations(board, from, piece.color, &ORTHOGONALS),
        PieceKind::Queen => {
            let mut destinations = ray_destinations(board, from, piece.color, &DIAGONALS);
            destinations.extend(ray_destinations(board, from, piece.color, &ORTHOGONALS));
            destinations
        }
        PieceKind::King => step_destinations(board, from, piece.color, &KING_OFFSETS),
    }
}

/// All pseudo-legal moves of `color`, with capture details and one move per
/// promotion choice.
pub fn pseudo_legal_moves(board: &Board, color: Color, en_passant: Option<Square>) -> Vec<Move> {
    let mut moves = Vec::new();
    for (from, piece) in board.pieces_of(color) {
        for to in pseudo_destinations(board, from, en_passant) {
            let target = board.piece_at(to).map(|p| p.kind);
            if piece.kind == PieceKind::Pawn {
                if target.is_none() && from.file() != to.file() {
                    // Diagonal onto an empty square: only the en passant target gets here
                    if let Some(captured_square) = to.offset(0, -color.forward()) {
                        moves.push(Move::new_en_passant(from, to, captured_square));
                    }
                } else if to.rank() == color.promotion_rank() {
                    for promotion in PieceKind::PROMOTIONS {
                        moves.push(Move::new_promotion(from, to, target, promotion));
                    }
                } else {
                    moves.push(match target {
                        Some(captured) => Move::new_capture(from, to, piece.kind, captured),
                        None => Move::new(from, to, piece.kind),
                    });
                }
            } else {
                moves.push(match target {
                    Some(captured) => Move::new_capture(from, to, piece.kind, captured),
                    None => Move::new(from, to, piece.kind),
                });
            }
        }
    }
    moves
}

/// True when a piece of `attacker` could capture on `square`.
pub fn is_square_under_attack(board: &Board, square: Square, attacker: Color) -> bool {
    let holds = |sq: Option<Square>, kinds: &[PieceKind]| match sq.and_then(|s| board.piece_at(s)) {
        Some(piece) => piece.color == attacker && kinds.contains(&piece.kind),
        None => false,
    };

    // Pawns attack diagonally forward, so look one rank behind from their side
    for df in [-1, 1] {
        if holds(square.offset(df, -attacker.forward()), &[PieceKind::Pawn]) {
            return true;
        }
    }

    if KNIGHT_OFFSETS
        .iter()
        .any(|&(df, dr)| holds(square.offset(df, dr), &[PieceKind::Knight]))
    {
        return true;
    }

    if KING_OFFSETS
        .iter()
        .any(|&(df, dr)| holds(square.offset(df, dr), &[PieceKind::King]))
    {
        return true;
    }

    let sliders = [
        (&DIAGONALS, [PieceKind::Bishop, PieceKind::Queen]),
        (&ORTHOGONALS, [PieceKind::Rook, PieceKind::Queen]),
    ];
    for (directions, kinds) in sliders.iter() {
        for &(df, dr) in directions.iter() {
            let mut current = square;
            while let Some(next) = current.offset(df, dr) {
                if let Some(piece) = board.piece_at(next) {
                    if piece.color == attacker && kinds.contains(&piece.kind) {
                        return true;
                    }
                    break;
                }
                current = next;
            }
        }
    }

    false
}

pub fn is_king_in_check(board: &Board, color: Color) -> bool {
    match board.king_square(color) {
        Some(king) => is_square_under_attack(board, king, color.opposite()),
        None => {
            debug_assert!(false, "no {:?} king on the board", color);
            false
        }
    }
}

/// Plays `mv` on the board without any legality checks: moves the piece,
/// removes an en passant victim, swaps in the promotion piece and moves the
/// castling rook.
pub fn make_move(board: &mut Board, mv: &Move) {
    let color = board.piece_at(mv.from).map(|p| p.color);
    board.relocate(mv.from, mv.to);

    match mv.special {
        Some(SpecialMove::EnPassant) => {
            if let Some((_, square)) = mv.captured {
                board.remove(square);
            }
        }
        Some(SpecialMove::Promotion(kind)) => {
            if let Some(color) = color {
                board.place(
                    mv.to,
                    Piece {
                        kind,
                        color,
                        has_moved: true,
                    },
                );
            }
        }
        Some(SpecialMove::CastleKingside) | Some(SpecialMove::CastleQueenside) => {
            if let Some((rook_from, rook_to)) = mv.castling_rook() {
                board.relocate(rook_from, rook_to);
            }
        }
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    fn sorted(mut squares: Vec<Square>) -> Vec<Square> {
        squares.sort();
        squares
    }

    #[test]
    fn test_knight_in_corner() {
        let board = Board::from_placement("8/8/8/8/8/8/8/N7").unwrap();
        let destinations = sorted(pseudo_destinations(&board, sq("a1"), None));
        assert_eq!(destinations, sorted(vec![sq("b3"), sq("c2")]));
    }

    #[test]
    fn test_rook_rays_stop_at_pieces() {
        // Own pawn on a3 blocks, enemy pawn on c1 can be taken
        let board = Board::from_placement("8/8/8/8/8/P7/8/R1p5").unwrap();
        let destinations = sorted(pseudo_destinations(&board, sq("a1"), None));
        assert_eq!(destinations, sorted(vec![sq("a2"), sq("b1"), sq("c1")]));
    }

    #[test]
    fn test_blocked_pawn_has_no_double_step() {
        let board = Board::from_placement("8/8/8/8/8/4n3/4P3/8").unwrap();
        assert!(pseudo_destinations(&board, sq("e2"), None).is_empty());

        let board = Board::from_placement("8/8/8/8/4n3/8/4P3/8").unwrap();
        assert_eq!(pseudo_destinations(&board, sq("e2"), None), vec![sq("e3")]);
    }

    #[test]
    fn test_pawn_captures_and_en_passant_target() {
        let board = Board::from_placement("8/8/8/3pP3/8/8/8/8").unwrap();
        let destinations = sorted(pseudo_destinations(&board, sq("e5"), Some(sq("d6"))));
        assert_eq!(destinations, sorted(vec![sq("e6"), sq("d6")]));

        let moves = pseudo_legal_moves(&board, Color::White, Some(sq("d6")));
        let en_passant = moves.iter().find(|mv| mv.special == Some(SpecialMove::EnPassant)).unwrap();
        assert_eq!(en_passant.captured, Some((PieceKind::Pawn, sq("d5"))));
    }

    #[test]
    fn test_pawn_attack_direction() {
        let board = Board::from_placement("8/8/8/8/3p4/8/8/8").unwrap();
        assert!(is_square_under_attack(&board, sq("e3"), Color::Black));
        assert!(is_square_under_attack(&board, sq("c3"), Color::Black));
        assert!(!is_square_under_attack(&board, sq("e5"), Color::Black));
        assert!(!is_square_under_attack(&board, sq("d3"), Color::Black));
    }

    #[test]
    fn test_make_move_castling_moves_rook() {
        let mut board = Board::from_placement("8/8/8/8/8/8/8/R3K2R").unwrap();
        make_move(&mut board, &Move::new_castling(sq("e1"), sq("c1"), false));
        assert_eq!(board.piece_at(sq("c1")).map(|p| p.kind), Some(PieceKind::King));
        assert_eq!(board.piece_at(sq("d1")).map(|p| p.kind), Some(PieceKind::Rook));
        assert!(board.is_empty(sq("a1")));
        assert!(board.is_empty(sq("e1")));
    }
}

use std::fmt;
use std::str::FromStr;
use crate::error::ChessError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    pub const PROMOTIONS: [PieceKind; 4] = [
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
    ];

    pub fn index(&self) -> usize {
        match self {
            PieceKind::Pawn => 0,
            PieceKind::Knight => 1,
            PieceKind::Bishop => 2,
            PieceKind::Rook => 3,
            PieceKind::Queen => 4,
            PieceKind::King => 5,
        }
    }

    /// Upper-case letter used in algebraic notation; pawns use `P` here but
    /// notation omits it.
    pub fn letter(&self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        }
    }

    pub fn from_letter(c: char) -> Option<PieceKind> {
        match c.to_ascii_uppercase() {
            'P' => Some(PieceKind::Pawn),
            'N' => Some(PieceKind::Knight),
            'B' => Some(PieceKind::Bishop),
            'R' => Some(PieceKind::Rook),
            'Q' => Some(PieceKind::Queen),
            'K' => Some(PieceKind::King),
            _ => None,
        }
    }

    pub fn is_promotion_target(&self) -> bool {
        Self::PROMOTIONS.contains(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    /// Rank delta of a forward pawn step.
    pub fn forward(&self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    pub fn back_rank(&self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    pub fn pawn_rank(&self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    pub fn promotion_rank(&self) -> u8 {
        self.opposite().back_rank()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Color::White => "Bianco",
            Color::Black => "Nero",
        }
    }
}

/// A board coordinate. Only on-board values can be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    pub fn new(file: u8, rank: u8) -> Result<Square, ChessError> {
        if file < 8 && rank < 8 {
            Ok(Square(rank * 8 + file))
        } else {
            Err(ChessError::InvalidSquare(format!("({}, {})", file, rank)))
        }
    }

    pub fn all() -> impl Iterator<Item = Square> {
        (0..64u8).map(Square)
    }

    pub fn file(&self) -> u8 {
        self.0 % 8
    }

    pub fn rank(&self) -> u8 {
        self.0 / 8
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }

    pub fn offset(&self, file_delta: i8, rank_delta: i8) -> Option<Square> {
        let file = self.file() as i8 + file_delta;
        let rank = self.rank() as i8 + rank_delta;
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Some(Square((rank * 8 + file) as u8))
        } else {
            None
        }
    }

    pub fn is_light(&self) -> bool {
        (self.file() + self.rank()) % 2 == 1
    }

    pub fn file_char(&self) -> char {
        (b'a' + self.file()) as char
    }

    pub fn rank_char(&self) -> char {
        (b'1' + self.rank()) as char
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

impl FromStr for Square {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(ChessError::InvalidSquare(s.to_string()));
        }
        let file = match bytes[0] {
            f @ b'a'..=b'h' => f - b'a',
            _ => return Err(ChessError::InvalidSquare(s.to_string())),
        };
        let rank = match bytes[1] {
            r @ b'1'..=b'8' => r - b'1',
            _ => return Err(ChessError::InvalidSquare(s.to_string())),
        };
        Square::new(file, rank)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
    pub has_moved: bool,
}

impl Piece {
    pub fn new(kind: PieceKind, color: Color) -> Self {
        Self { kind, color, has_moved: false }
    }

    pub fn symbol(&self) -> char {
        match (self.color, self.kind) {
            (Color::White, PieceKind::Pawn) => '♙',
            (Color::White, PieceKind::Knight) => '♘',
            (Color::White, PieceKind::Bishop) => '♗',
            (Color::White, PieceKind::Rook) => '♖',
            (Color::White, PieceKind::Queen) => '♕',
            (Color::White, PieceKind::King) => '♔',
            (Color::Black, PieceKind::Pawn) => '♟',
            (Color::Black, PieceKind::Knight) => '♞',
            (Color::Black, PieceKind::Bishop) => '♝',
            (Color::Black, PieceKind::Rook) => '♜',
            (Color::Black, PieceKind::Queen) => '♛',
            (Color::Black, PieceKind::King) => '♚',
        }
    }
}

/// Piece placement only. Side to move and the other rule state live in
/// `GameState`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Option<Piece>; 64],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn empty() -> Self {
        Self { cells: [None; 64] }
    }

    pub fn new() -> Self {
        let mut board = Self::empty();
        let back = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for color in [Color::White, Color::Black] {
            for (file, kind) in back.iter().enumerate() {
                board.cells[(color.back_rank() * 8) as usize + file] = Some(Piece::new(*kind, color));
                board.cells[(color.pawn_rank() * 8) as usize + file] = Some(Piece::new(PieceKind::Pawn, color));
            }
        }
        board
    }

    /// Parses the placement field of a FEN record (`rnbqkbnr/pppppppp/...`).
    pub fn from_placement(placement: &str) -> Result<Self, ChessError> {
        let mut board = Self::empty();
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(ChessError::InvalidFen(format!("expected 8 ranks, found {}", ranks.len())));
        }
        for (i, row) in ranks.iter().enumerate() {
            let rank = 7 - i as u8;
            let mut file = 0u8;
            for c in row.chars() {
                if let Some(skip) = c.to_digit(10) {
                    if skip == 0 || file as u32 + skip > 8 {
                        return Err(ChessError::InvalidFen(format!("bad empty-square count in rank {}", rank + 1)));
                    }
                    file += skip as u8;
                    continue;
                }
                let kind = PieceKind::from_letter(c)
                    .ok_or_else(|| ChessError::InvalidFen(format!("unknown piece `{}`", c)))?;
                let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
                let square = Square::new(file, rank)
                    .map_err(|_| ChessError::InvalidFen(format!("rank {} is too long", rank + 1)))?;
                let mut piece = Piece::new(kind, color);
                piece.has_moved = kind == PieceKind::Pawn && rank != color.pawn_rank();
                board.place(square, piece);
                file += 1;
            }
            if file != 8 {
                return Err(ChessError::InvalidFen(format!("rank {} does not cover 8 files", rank + 1)));
            }
        }
        Ok(board)
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.cells[square.index()]
    }

    pub fn is_empty(&self, square: Square) -> bool {
        self.cells[square.index()].is_none()
    }

    pub fn place(&mut self, square: Square, piece: Piece) {
        self.cells[square.index()] = Some(piece);
    }

    pub fn remove(&mut self, square: Square) -> Option<Piece> {
        self.cells[square.index()].take()
    }

    /// Moves whatever stands on `from` to `to`, marking it as moved, and
    /// returns the previous occupant of `to`. Performs no rule checks.
    pub fn relocate(&mut self, from: Square, to: Square) -> Option<Piece> {
        let moving = self.cells[from.index()].take();
        debug_assert!(moving.is_some(), "relocate from empty square {}", from);
        let previous = self.cells[to.index()].take();
        self.cells[to.index()] = moving.map(|piece| Piece { has_moved: true, ..piece });
        previous
    }

    pub fn pieces_of(&self, color: Color) -> Vec<(Square, Piece)> {
        Square::all()
            .filter_map(|square| self.piece_at(square).map(|piece| (square, piece)))
            .filter(|(_, piece)| piece.color == color)
            .collect()
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        Square::all().find(|&square| {
            matches!(self.piece_at(square), Some(p) if p.kind == PieceKind::King && p.color == color)
        })
    }

    pub fn count(&self, color: Color, kind: PieceKind) -> usize {
        self.pieces_of(color).iter().filter(|(_, p)| p.kind == kind).count()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut result = String::new();
        for rank in (0..8u8).rev() {
            result.push((b'1' + rank) as char);
            result.push(' ');
            for file in 0..8u8 {
                let square = Square(rank * 8 + file);
                match self.piece_at(square) {
                    Some(piece) => result.push(piece.symbol()),
                    None if square.is_light() => result.push('·'),
                    None => result.push(' '),
                }
                if file < 7 {
                    result.push(' ');
                }
            }
            result.push('\n');
        }
        result.push_str("  a b c d e f g h");
        write!(f, "{}", result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    #[test]
    fn test_square_parsing() {
        assert_eq!(sq("a1").index(), 0);
        assert_eq!(sq("h8").index(), 63);
        assert_eq!(sq("e4").file(), 4);
        assert_eq!(sq("e4").rank(), 3);
        assert!("i1".parse::<Square>().is_err());
        assert!("a9".parse::<Square>().is_err());
        assert!("E4".parse::<Square>().is_err());
        assert!(Square::new(8, 0).is_err());
        assert_eq!(sq("e4").offset(1, 1), Some(sq("f5")));
        assert_eq!(sq("h4").offset(1, 0), None);
    }

    #[test]
    fn test_initial_placement() {
        let board = Board::new();
        assert_eq!(board.pieces_of(Color::White).len(), 16);
        assert_eq!(board.pieces_of(Color::Black).len(), 16);
        assert_eq!(board.king_square(Color::White), Some(sq("e1")));
        assert_eq!(board.king_square(Color::Black), Some(sq("e8")));
        assert_eq!(board.piece_at(sq("d8")).map(|p| p.kind), Some(PieceKind::Queen));
        assert!(board.is_empty(sq("e4")));
    }

    #[test]
    fn test_relocate_returns_previous_occupant() {
        let mut board = Board::new();
        let captured = board.relocate(sq("a1"), sq("a7"));
        assert_eq!(captured, Some(Piece::new(PieceKind::Pawn, Color::Black)));
        let rook = board.piece_at(sq("a7")).unwrap();
        assert_eq!(rook.kind, PieceKind::Rook);
        assert!(rook.has_moved);
        assert!(board.is_empty(sq("a1")));
    }

    #[test]
    fn test_placement_parsing() {
        let board = Board::from_placement("4k3/8/8/3P4/8/8/P7/4K3").unwrap();
        assert_eq!(board.pieces_of(Color::White).len(), 3);
        assert!(board.piece_at(sq("d5")).unwrap().has_moved);
        assert!(!board.piece_at(sq("a2")).unwrap().has_moved);
        assert!(Board::from_placement("8/8/8").is_err());
        assert!(Board::from_placement("9/8/8/8/8/8/8/8").is_err());
        assert!(Board::from_placement("x7/8/8/8/8/8/8/8").is_err());
    }

    #[test]
    fn test_placement_rejects_bad_counts() {
        let long_rank = format!("{}/8/8/8/8/8/8/4K3", "9".repeat(29));
        assert!(matches!(Board::from_placement(&long_rank), Err(ChessError::InvalidFen(_))));
        assert!(Board::from_placement("44444444/8/8/8/8/8/8/8").is_err());
        assert!(Board::from_placement("08/8/8/8/8/8/8/8").is_err());
        assert!(Board::from_placement("k07/8/8/8/8/8/8/7K").is_err());
    }
}

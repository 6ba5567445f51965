use crate::board::{Board, Color, PieceKind, Square};
use crate::error::{ChessError, IllegalReason, Result};
use crate::movegen::{self, Move};
use crate::state::{DrawReason, GameState, Status};

const FIFTY_MOVE_PLIES: u32 = 100;

impl GameState {
    /// Every legal move of the side to move: pseudo-legal moves that keep the
    /// mover's king safe, plus the castling moves currently available.
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves: Vec<Move> = movegen::pseudo_legal_moves(&self.board, self.side_to_move, self.en_passant)
            .into_iter()
            .filter(|mv| self.keeps_king_safe(mv))
            .collect();
        moves.extend(self.castling_moves());
        moves
    }

    pub fn is_in_check(&self) -> bool {
        movegen::is_king_in_check(&self.board, self.side_to_move)
    }

    /// Plays a legal move: updates the placement, castling rights, en passant
    /// target and clocks, records the move, passes the turn and re-evaluates
    /// the game status for the new side to move.
    pub fn apply(&mut self, mv: Move) -> Result<()> {
        if self.status.is_over() {
            return Err(ChessError::NotActive);
        }
        if !self.legal_moves().contains(&mv) {
            return Err(ChessError::IllegalMove(self.diagnose(&mv)));
        }

        let mover = self.side_to_move;
        movegen::make_move(&mut self.board, &mv);

        // Castling rights go with the king, and with a rook leaving or being
        // taken on its corner.
        if mv.piece == PieceKind::King {
            self.castling.revoke_all(mover);
        }
        for color in [Color::White, Color::Black] {
            for kingside in [true, false] {
                if let Ok(corner) = Square::new(if kingside { 7 } else { 0 }, color.back_rank()) {
                    if mv.from == corner || mv.to == corner {
                        self.castling.revoke(color, kingside);
                    }
                }
            }
        }

        self.en_passant = if mv.is_double_pawn_step() {
            mv.from.offset(0, mover.forward())
        } else {
            None
        };

        if mv.piece == PieceKind::Pawn || mv.is_capture() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if mover == Color::Black {
            self.fullmove_number += 1;
        }

        self.history.push(mv);
        self.side_to_move = mover.opposite();
        self.position_keys.push(self.position_key());
        self.status = self.evaluate_status();

        debug_assert!(
            self.board.count(Color::White, PieceKind::King) == 1
                && self.board.count(Color::Black, PieceKind::King) == 1,
            "a legal move removed a king"
        );
        Ok(())
    }

    /// Finds the legal move from `from` to `to`, with the promotion choice when
    /// the move reaches the last rank.
    pub fn find_move(&self, from: Square, to: Square, promotion: Option<PieceKind>) -> Result<Move> {
        if let Some(kind) = promotion {
            if !kind.is_promotion_target() {
                return Err(ChessError::IllegalMove(IllegalReason::InvalidPromotion));
            }
        }
        let candidates: Vec<Move> = self
            .legal_moves()
            .into_iter()
            .filter(|mv| mv.from == from && mv.to == to)
            .collect();

        if candidates.iter().any(|mv| mv.promotion().is_some()) && promotion.is_none() {
            return Err(ChessError::IllegalMove(IllegalReason::PromotionRequired));
        }
        match candidates.into_iter().find(|mv| mv.promotion() == promotion) {
            Some(mv) => Ok(mv),
            None => {
                let mut probe = Move::new(from, to, PieceKind::Pawn);
                if let Some(piece) = self.board.piece_at(from) {
                    probe.piece = piece.kind;
                }
                Err(ChessError::IllegalMove(self.diagnose(&probe)))
            }
        }
    }

    /// Explains why `mv` is not among the legal moves.
    pub(crate) fn diagnose(&self, mv: &Move) -> IllegalReason {
        let piece = match self.board.piece_at(mv.from) {
            Some(piece) => piece,
            None => return IllegalReason::NoPiece(mv.from),
        };
        if piece.color != self.side_to_move {
            return IllegalReason::NotYourTurn;
        }
        if let Some(kind) = mv.promotion() {
            if !kind.is_promotion_target() {
                return IllegalReason::InvalidPromotion;
            }
        }

        let shaped: Vec<Move> = movegen::pseudo_legal_moves(&self.board, self.side_to_move, self.en_passant)
            .into_iter()
            .filter(|candidate| candidate.from == mv.from && candidate.to == mv.to)
            .collect();
        if shaped.is_empty() {
            return IllegalReason::NotLegal;
        }
        if shaped.iter().all(|candidate| candidate.promotion().is_some()) && mv.promotion().is_none() {
            return IllegalReason::PromotionRequired;
        }
        if shaped.iter().all(|candidate| !self.keeps_king_safe(candidate)) {
            return IllegalReason::LeavesKingInCheck;
        }
        IllegalReason::NotLegal
    }

    pub(crate) fn evaluate_status(&self) -> Status {
        if self.legal_moves().is_empty() {
            return if self.is_in_check() {
                Status::Checkmate(self.side_to_move.opposite())
            } else {
                Status::Stalemate
            };
        }
        if is_insufficient_material(&self.board) {
            return Status::Drawn(DrawReason::InsufficientMaterial);
        }
        if self.halfmove_clock >= FIFTY_MOVE_PLIES {
            return Status::Drawn(DrawReason::FiftyMoveRule);
        }
        let current = self.position_keys.last().copied().unwrap_or_else(|| self.position_key());
        if self.position_keys.iter().filter(|&&key| key == current).count() >= 3 {
            return Status::Drawn(DrawReason::ThreefoldRepetition);
        }
        Status::Ongoing
    }

    fn keeps_king_safe(&self, mv: &Move) -> bool {
        let mut scratch = self.board.clone();
        movegen::make_move(&mut scratch, mv);
        !movegen::is_king_in_check(&scratch, self.side_to_move)
    }

    fn castling_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        let color = self.side_to_move;
        let rank = color.back_rank();
        let enemy = color.opposite();

        let Ok(king_from) = Square::new(4, rank) else {
            return moves;
        };
        match self.board.piece_at(king_from) {
            Some(king) if king.kind == PieceKind::King && king.color == color && !king.has_moved => {}
            _ => return moves,
        }
        if self.is_in_check() {
            return moves;
        }

        for kingside in [true, false] {
            if !self.castling.has(color, kingside) {
                continue;
            }
            let (rook_file, between, path, king_to): (u8, &[u8], &[u8], u8) = if kingside {
                (7, &[5, 6][..], &[5, 6][..], 6)
            } else {
                (0, &[1, 2, 3][..], &[3, 2][..], 2)
            };

            let rook_ready = Square::new(rook_file, rank)
                .ok()
                .and_then(|square| self.board.piece_at(square))
                .map_or(false, |rook| rook.kind == PieceKind::Rook && rook.color == color && !rook.has_moved);
            if !rook_ready {
                continue;
            }

            let squares = |files: &[u8]| -> Vec<Square> {
                files.iter().filter_map(|&file| Square::new(file, rank).ok()).collect()
            };
            if !squares(between).iter().all(|&square| self.board.is_empty(square)) {
                continue;
            }
            if squares(path)
                .iter()
                .any(|&square| movegen::is_square_under_attack(&self.board, square, enemy))
            {
                continue;
            }

            if let Ok(king_to) = Square::new(king_to, rank) {
                moves.push(Move::new_castling(king_from, king_to, kingside));
            }
        }
        moves
    }
}

/// Neither side can possibly deliver mate: bare kings, a single minor piece,
/// or only bishops all standing on squares of one colour.
fn is_insufficient_material(board: &Board) -> bool {
    let mut minors = Vec::new();
    for color in [Color::White, Color::Black] {
        for (square, piece) in board.pieces_of(color) {
            match piece.kind {
                PieceKind::King => {}
                PieceKind::Knight | PieceKind::Bishop => minors.push((square, piece.kind)),
                _ => return false,
            }
        }
    }

    if minors.len() <= 1 {
        return true;
    }
    let all_bishops = minors.iter().all(|(_, kind)| *kind == PieceKind::Bishop);
    let first_shade = minors[0].0.is_light();
    all_bishops && minors.iter().all(|(square, _)| square.is_light() == first_shade)
}

use crate::board::Color;
use crate::error::{ChessError, Result};
use crate::movegen::Move;
use crate::notation;
use crate::state::{DrawReason, GameState, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    InProgress,
    Finished(Status),
}

/// One game between two players sharing a terminal: turn order, move
/// history, and the ways a game can end.
#[derive(Debug, Clone)]
pub struct Game {
    initial: GameState,
    state: GameState,
    started: bool,
    san_history: Vec<String>,
    draw_offer: Option<Color>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    pub fn new() -> Self {
        Self::with_position(GameState::new())
    }

    /// A game whose `start` sets up `initial` instead of the standard array.
    pub fn with_position(initial: GameState) -> Self {
        Self {
            state: initial.clone(),
            initial,
            started: false,
            san_history: Vec::new(),
            draw_offer: None,
        }
    }

    pub fn phase(&self) -> Phase {
        if !self.started {
            Phase::NotStarted
        } else if self.state.status().is_over() {
            Phase::Finished(self.state.status())
        } else {
            Phase::InProgress
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.phase() == Phase::InProgress
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn san_history(&self) -> &[String] {
        &self.san_history
    }

    pub fn pending_draw_offer(&self) -> Option<Color> {
        self.draw_offer
    }

    pub fn start(&mut self) -> Result<()> {
        if self.is_in_progress() {
            return Err(ChessError::GameInProgress);
        }
        self.state = self.initial.clone();
        self.san_history.clear();
        self.draw_offer = None;
        self.started = true;
        Ok(())
    }

    /// Parses `input` against the current position and plays it. Returns the
    /// move in standard algebraic notation.
    pub fn submit_move(&mut self, input: &str) -> Result<String> {
        self.ensure_active()?;
        let mv = notation::parse(input, &self.state)?;
        self.play(mv)
    }

    pub fn play(&mut self, mv: Move) -> Result<String> {
        self.ensure_active()?;
        let san = notation::render(&mv, &self.state);
        self.state.apply(mv)?;
        self.san_history.push(san.clone());
        // Playing on implicitly declines an open offer
        self.draw_offer = None;
        Ok(san)
    }

    /// The side to move resigns; the opponent wins.
    pub fn resign(&mut self) -> Result<Status> {
        self.ensure_active()?;
        let status = Status::Resigned(self.state.side_to_move().opposite());
        self.state.conclude(status);
        self.draw_offer = None;
        Ok(status)
    }

    /// The side to move offers a draw. Returns the side that must answer.
    pub fn offer_draw(&mut self) -> Result<Color> {
        self.ensure_active()?;
        let offering = self.state.side_to_move();
        self.draw_offer = Some(offering);
        Ok(offering.opposite())
    }

    pub fn accept_draw(&mut self) -> Result<Status> {
        self.ensure_active()?;
        self.draw_offer.take().ok_or(ChessError::NoDrawOffer)?;
        let status = Status::Drawn(DrawReason::Agreement);
        self.state.conclude(status);
        Ok(status)
    }

    pub fn decline_draw(&mut self) -> Result<()> {
        self.ensure_active()?;
        self.draw_offer.take().ok_or(ChessError::NoDrawOffer)?;
        Ok(())
    }

    pub fn move_list(&self) -> String {
        notation::move_list(
            &self.san_history,
            self.initial.fullmove_number(),
            self.initial.side_to_move() == Color::Black,
        )
    }

    fn ensure_active(&self) -> Result<()> {
        if self.is_in_progress() {
            Ok(())
        } else {
            Err(ChessError::NotActive)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moves_rejected_before_start() {
        let mut game = Game::new();
        assert_eq!(game.phase(), Phase::NotStarted);
        assert_eq!(game.submit_move("e4"), Err(ChessError::NotActive));
        assert_eq!(game.resign(), Err(ChessError::NotActive));
        assert_eq!(game.offer_draw(), Err(ChessError::NotActive));
    }

    #[test]
    fn test_start_resets_history() {
        let mut game = Game::new();
        game.start().unwrap();
        assert_eq!(game.start(), Err(ChessError::GameInProgress));
        assert_eq!(game.submit_move("e4").unwrap(), "e4");
        assert_eq!(game.submit_move("e5").unwrap(), "e5");
        assert_eq!(game.state().history().len(), 2);

        game.resign().unwrap();
        game.start().unwrap();
        assert_eq!(game.phase(), Phase::InProgress);
        assert!(game.san_history().is_empty());
        assert!(game.state().history().is_empty());
        assert_eq!(game.state().side_to_move(), Color::White);
    }

    #[test]
    fn test_resignation_awards_opponent() {
        let mut game = Game::new();
        game.start().unwrap();
        game.submit_move("e4").unwrap();
        // Black to move resigns
        assert_eq!(game.resign(), Ok(Status::Resigned(Color::White)));
        assert_eq!(game.phase(), Phase::Finished(Status::Resigned(Color::White)));
        assert_eq!(game.submit_move("e5"), Err(ChessError::NotActive));
    }

    #[test]
    fn test_draw_offer_flow() {
        let mut game = Game::new();
        game.start().unwrap();
        assert_eq!(game.accept_draw(), Err(ChessError::NoDrawOffer));

        assert_eq!(game.offer_draw(), Ok(Color::Black));
        game.decline_draw().unwrap();
        assert_eq!(game.phase(), Phase::InProgress);

        game.offer_draw().unwrap();
        game.submit_move("d4").unwrap();
        assert_eq!(game.pending_draw_offer(), None);

        game.offer_draw().unwrap();
        assert_eq!(game.accept_draw(), Ok(Status::Drawn(DrawReason::Agreement)));
        assert_eq!(game.phase(), Phase::Finished(Status::Drawn(DrawReason::Agreement)));
    }

    #[test]
    fn test_move_list_from_custom_position() {
        let initial = GameState::from_fen("4k3/8/8/8/8/8/4P3/4K3 b - - 0 12").unwrap();
        let mut game = Game::with_position(initial);
        game.start().unwrap();
        game.submit_move("Kd7").unwrap();
        game.submit_move("e4").unwrap();
        assert_eq!(game.move_list(), "12. ...     Kd7\n13. e4");
    }

    #[test]
    fn test_checkmate_ends_the_game() {
        let mut game = Game::new();
        game.start().unwrap();
        for input in ["f3", "e5", "g4"] {
            game.submit_move(input).unwrap();
        }
        assert_eq!(game.submit_move("Qh4").unwrap(), "Qh4#");
        assert_eq!(game.phase(), Phase::Finished(Status::Checkmate(Color::Black)));
        assert_eq!(game.resign(), Err(ChessError::NotActive));
    }
}

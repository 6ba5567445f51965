use crate::board::Color;
use crate::error::{ChessError, IllegalReason};
use crate::game::{Game, Phase};
use crate::notation;
use crate::state::{DrawReason, Status};
use crate::theme::{Level, Theme};
use anyhow::Result;
use std::io::{self, BufRead, Write};

pub const COMMANDS: [(&str, &str); 7] = [
    ("/help", "Mostra questo messaggio di aiuto."),
    ("/gioca", "Inizia una nuova partita."),
    ("/scacchiera", "Mostra la scacchiera attuale."),
    ("/abbandona", "Abbandona la partita corrente."),
    ("/patta", "Proponi una patta all'avversario."),
    ("/mosse", "Mostra l'elenco delle mosse giocate."),
    ("/esci", "Esci dal gioco."),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub level: Level,
    pub text: String,
}

impl Message {
    fn new(level: Level, text: impl Into<String>) -> Self {
        Self { level, text: text.into() }
    }
}

/// The in-game commands and how to enter moves, as shown by `/help` and `--help`.
pub fn command_summary() -> String {
    let mut text = String::from("Comandi disponibili:\n");
    for (command, description) in COMMANDS {
        text.push_str(&format!("\n- {}: {}", command, description));
    }
    text.push_str("\n\nUsa la notazione algebrica (es. 'e4', 'Nf3' o 'e2e4') per le mosse.");
    text
}

/// A yes/no question waiting for the next line of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Confirmation {
    Resign,
    DrawOffer(Color),
    Exit,
}

/// The interactive command loop. Every line is either a `/command`, an answer
/// to a pending question, or a move.
pub struct Console {
    game: Game,
    theme: Theme,
    pending: Option<Confirmation>,
    exit: bool,
}

impl Console {
    pub fn new(game: Game, theme: Theme) -> Self {
        Console {
            game,
            theme,
            pending: None,
            exit: false,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn should_exit(&self) -> bool {
        self.exit
    }

    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut reader = stdin.lock();
        let mut line = String::new();

        for message in self.welcome() {
            writeln!(stdout, "{}", self.theme.paint(message.level, &message.text))?;
        }

        while !self.exit {
            write!(stdout, "{}", self.theme.emphasis(&self.prompt()))?;
            stdout.flush()?;

            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            for message in self.handle_line(&line) {
                writeln!(stdout, "{}", self.theme.paint(message.level, &message.text))?;
            }
            stdout.flush()?;
        }
        Ok(())
    }

    pub fn welcome(&self) -> Vec<Message> {
        vec![
            Message::new(Level::Info, "Benvenuto in Scacchi!"),
            Message::new(Level::Plain, "Digita /help per vedere i comandi disponibili."),
        ]
    }

    pub fn prompt(&self) -> String {
        if self.pending.is_some() {
            return "(s/n) > ".to_string();
        }
        match self.game.phase() {
            Phase::InProgress => format!("{} > ", self.game.state().side_to_move().name()),
            _ => "> ".to_string(),
        }
    }

    pub fn handle_line(&mut self, line: &str) -> Vec<Message> {
        let input = line.trim();
        if input.is_empty() {
            return Vec::new();
        }
        if let Some(question) = self.pending.take() {
            return self.handle_answer(question, input);
        }
        if input.starts_with('/') {
            let command = input.split_whitespace().next().unwrap_or(input);
            return self.handle_command(command);
        }
        self.handle_move(input)
    }

    fn handle_command(&mut self, command: &str) -> Vec<Message> {
        match command {
            "/help" => self.help(),
            "/gioca" => self.handle_start(),
            "/scacchiera" => {
                if self.game.phase() == Phase::NotStarted {
                    vec![Message::new(Level::Info, "Nessuna partita in corso. Usa /gioca per iniziare.")]
                } else {
                    self.board()
                }
            }
            "/abbandona" => {
                if !self.game.is_in_progress() {
                    return vec![Message::new(Level::Warning, "Nessuna partita attiva da abbandonare.")];
                }
                self.ask(Confirmation::Resign)
            }
            "/patta" => self.handle_draw_offer(),
            "/mosse" => self.moves(),
            "/esci" => self.ask(Confirmation::Exit),
            other => vec![Message::new(
                Level::Error,
                format!("Comando '{}' sconosciuto. Usa /help per la lista.", other),
            )],
        }
    }

    fn help(&self) -> Vec<Message> {
        vec![Message::new(Level::Plain, command_summary())]
    }

    fn handle_start(&mut self) -> Vec<Message> {
        match self.game.start() {
            Ok(()) => {
                let mut messages = vec![Message::new(
                    Level::Success,
                    format!("Nuova partita iniziata. Tocca al {}.", self.game.state().side_to_move().name()),
                )];
                messages.extend(self.board());
                messages
            }
            Err(err) => vec![self.describe_error(&err, "")],
        }
    }

    fn handle_draw_offer(&mut self) -> Vec<Message> {
        match self.game.offer_draw() {
            Ok(responder) => {
                let mut messages = vec![Message::new(
                    Level::Info,
                    format!("Il giocatore {} propone la patta.", responder.opposite().name()),
                )];
                messages.extend(self.ask(Confirmation::DrawOffer(responder)));
                messages
            }
            Err(_) => vec![Message::new(Level::Warning, "Nessuna partita attiva per proporre la patta.")],
        }
    }

    fn ask(&mut self, question: Confirmation) -> Vec<Message> {
        self.pending = Some(question);
        let text = match question {
            Confirmation::Resign => "Sei sicuro di voler abbandonare la partita? (s/n)".to_string(),
            Confirmation::DrawOffer(responder) => format!("Giocatore {}, accetti la patta? (s/n)", responder.name()),
            Confirmation::Exit => "Sei sicuro di voler uscire dal gioco? (s/n)".to_string(),
        };
        vec![Message::new(Level::Info, text)]
    }

    fn handle_answer(&mut self, question: Confirmation, answer: &str) -> Vec<Message> {
        let accepted = match answer.to_lowercase().as_str() {
            "s" | "si" | "sì" => true,
            "n" | "no" => false,
            _ => {
                let mut messages = vec![Message::new(
                    Level::Warning,
                    "Risposta non valida. Per favore inserisci 's' o 'n'.",
                )];
                messages.extend(self.ask(question));
                return messages;
            }
        };

        match (question, accepted) {
            (Confirmation::Resign, true) => match self.game.resign() {
                Ok(status) => vec![self.ending(status)],
                Err(err) => vec![self.describe_error(&err, "")],
            },
            (Confirmation::Resign, false) => vec![Message::new(Level::Info, "Abbandono annullato.")],
            (Confirmation::DrawOffer(_), true) => match self.game.accept_draw() {
                Ok(status) => vec![self.ending(status)],
                Err(err) => vec![self.describe_error(&err, "")],
            },
            (Confirmation::DrawOffer(_), false) => match self.game.decline_draw() {
                Ok(()) => vec![Message::new(Level::Info, "Proposta di patta rifiutata. Il gioco continua.")],
                Err(err) => vec![self.describe_error(&err, "")],
            },
            (Confirmation::Exit, true) => {
                self.exit = true;
                vec![Message::new(Level::Info, "Grazie per aver giocato a Scacchi! Arrivederci.")]
            }
            (Confirmation::Exit, false) => vec![Message::new(Level::Info, "Uscita annullata.")],
        }
    }

    fn handle_move(&mut self, input: &str) -> Vec<Message> {
        match self.game.phase() {
            Phase::NotStarted => {
                return vec![Message::new(
                    Level::Info,
                    "Nessuna partita in corso. Usa /gioca per iniziare o /help per i comandi.",
                )]
            }
            Phase::Finished(_) => {
                return vec![Message::new(
                    Level::Info,
                    "La partita è terminata. Usa /gioca per una nuova partita o /esci.",
                )]
            }
            Phase::InProgress => {}
        }

        let mover = self.game.state().side_to_move();
        let san = match self.game.submit_move(input) {
            Ok(san) => san,
            Err(err) => return vec![self.describe_error(&err, input)],
        };

        let mut messages = vec![Message::new(Level::Info, format!("{} gioca {}.", mover.name(), san))];
        messages.extend(self.board());
        match self.game.phase() {
            Phase::Finished(status) => messages.push(self.ending(status)),
            _ if self.game.state().is_in_check() => messages.push(Message::new(Level::Warning, "Scacco!")),
            _ => {}
        }
        messages
    }

    fn board(&self) -> Vec<Message> {
        let state = self.game.state();
        let mut title = String::from("Scacchiera");
        if self.game.is_in_progress() {
            title.push_str(&format!(" - Tocca a: {}", state.side_to_move().name()));
        }
        vec![
            Message::new(Level::Info, title),
            Message::new(Level::Plain, state.board().to_string()),
        ]
    }

    fn moves(&self) -> Vec<Message> {
        if self.game.san_history().is_empty() {
            return vec![Message::new(Level::Info, "Nessuna mossa è stata ancora giocata.")];
        }
        vec![
            Message::new(Level::Info, "Cronologia Mosse:"),
            Message::new(Level::Plain, self.game.move_list()),
        ]
    }

    fn ending(&self, status: Status) -> Message {
        let text = match status {
            Status::Checkmate(winner) => format!("Scacco matto! {} vince.", winner.name()),
            Status::Stalemate => "Stallo! La partita termina in pareggio.".to_string(),
            Status::Resigned(winner) => format!("Partita terminata. {} vince per abbandono!", winner.name()),
            Status::Drawn(DrawReason::Agreement) => "Patta accettata! La partita termina in pareggio.".to_string(),
            Status::Drawn(DrawReason::ThreefoldRepetition) => "Patta per triplice ripetizione.".to_string(),
            Status::Drawn(DrawReason::FiftyMoveRule) => "Patta per la regola delle cinquanta mosse.".to_string(),
            Status::Drawn(DrawReason::InsufficientMaterial) => "Patta per materiale insufficiente.".to_string(),
            Status::Ongoing => "La partita continua.".to_string(),
        };
        Message::new(Level::Success, text)
    }

    fn describe_error(&self, err: &ChessError, input: &str) -> Message {
        let text = match err {
            ChessError::InvalidSquare(square) => format!("Casa '{}' non valida.", square),
            ChessError::UnrecognizedInput(_) => format!("Mossa '{}' non valida o non riconosciuta.", input),
            ChessError::AmbiguousMove { candidates, .. } => {
                let options: Vec<String> = candidates
                    .iter()
                    .map(|mv| notation::render(mv, self.game.state()))
                    .collect();
                format!("Mossa '{}' ambigua. Specifica quale pezzo muovere: {}.", input, options.join(", "))
            }
            ChessError::IllegalMove(reason) => match reason {
                IllegalReason::NotYourTurn => "Non è il tuo turno di muovere quel pezzo.".to_string(),
                IllegalReason::NoPiece(square) => format!("Nessun pezzo trovato in {}.", square),
                IllegalReason::LeavesKingInCheck => "Mossa illegale: il re resterebbe sotto scacco.".to_string(),
                IllegalReason::PromotionRequired => {
                    "Indica il pezzo di promozione (es. e8=Q oppure e7e8q).".to_string()
                }
                IllegalReason::InvalidPromotion => "Il pedone può essere promosso solo a Q, R, B o N.".to_string(),
                IllegalReason::NotLegal => format!("Mossa '{}' non consentita.", input),
            },
            ChessError::NotActive => "La partita non è attiva. Usa /gioca per iniziare.".to_string(),
            ChessError::GameInProgress => "Una partita è già in corso. Usa /abbandona per terminarla prima.".to_string(),
            ChessError::NoDrawOffer => "Nessuna proposta di patta in sospeso.".to_string(),
            ChessError::InvalidFen(detail) => format!("Posizione FEN non valida: {}", detail),
        };
        let level = match err {
            ChessError::GameInProgress | ChessError::NotActive => Level::Warning,
            _ => Level::Error,
        };
        Message::new(level, text)
    }
}

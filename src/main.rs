use anyhow::{anyhow, Result};
use clap::Parser;
use scacchi::console;
use scacchi::theme::Level;
use scacchi::{Console, Game, GameState, Theme};

#[derive(Parser)]
#[command(
    name = "scacchi",
    about = "Scacchi per due giocatori nel terminale",
    after_help = console::command_summary()
)]
struct Args {
    /// Accent colour (black, red, green, yellow, blue, magenta, cyan, white, or a bright_ variant)
    #[arg(long, default_value = scacchi::theme::DEFAULT_ACCENT)]
    accent: String,

    /// Start every game from this FEN position instead of the standard one
    #[arg(long)]
    fen: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut theme = Theme::new();
    if let Err(err) = theme.set_accent(&args.accent) {
        eprintln!("{}", theme.paint(Level::Error, &err.to_string()));
    }
    let game = match &args.fen {
        Some(fen) => Game::with_position(GameState::from_fen(fen).map_err(|err| anyhow!("--fen: {}", err))?),
        None => Game::new(),
    };

    let mut console = Console::new(game, theme);
    console.run()
}

/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    io,
    ops::ControlFlow,
    sync::mpsc::{channel, Receiver, Sender},
    thread,
    time::Instant,
};

use anyhow::{bail, Context, Result};
use chessie::{Color, Square};
use clap::Parser;
use log::{debug, info};
use uci_parser::{UciCommand, UciInfo, UciParseError, UciResponse};

use crate::{
    EngineCommand, Evaluator, Position, SearchConfig, SearchResult, Searcher, BENCHMARK_FENS,
    BENCH_DEPTH,
};

/// The Tadpole chess engine.
///
/// Speaks enough UCI to be driven by a GUI, and also accepts a handful of
/// text commands for playing against it directly from a terminal.
#[derive(Debug)]
pub struct Engine {
    /// The current state of the game, as known to the engine.
    ///
    /// This is modified whenever moves are played or new positions are given,
    /// and is reset whenever the engine is told to start a new game.
    position: Position,

    /// Searcher used to pick the engine's moves.
    searcher: Searcher,

    /// The side played by the human in text-mode play.
    player: Color,

    /// One half of a channel, responsible for sending commands to the engine to execute.
    sender: Sender<EngineCommand>,

    /// One half of a channel, responsible for receiving commands for the engine to execute.
    receiver: Receiver<EngineCommand>,
}

impl Engine {
    /// Constructs a new [`Engine`] that plays with `searcher`, against a human playing `player`.
    pub fn new(searcher: Searcher, player: Color) -> Self {
        let (sender, receiver) = channel();

        Self {
            position: Position::default(),
            searcher,
            player,
            sender,
            receiver,
        }
    }

    /// Replaces the current position, clearing its move history.
    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// The current position, as known to the engine.
    #[inline(always)]
    pub const fn position(&self) -> &Position {
        &self.position
    }

    /// The side played by the human.
    #[inline(always)]
    pub const fn player(&self) -> Color {
        self.player
    }

    /// Returns a string of the engine's name and current version.
    pub fn name(&self) -> String {
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }

    /// Returns a string of all authors of this engine.
    pub fn authors(&self) -> String {
        // Split multiple authors by comma-space
        env!("CARGO_PKG_AUTHORS").replace(':', ", ")
    }

    /// Execute the main event loop for the engine.
    ///
    /// This function spawns a thread to handle input from `stdin` and waits on received commands.
    pub fn run(&mut self) -> Result<()> {
        // Spawn a separate thread for handling user input
        let sender = self.sender.clone();
        thread::spawn(|| {
            if let Err(err) = input_handler(sender) {
                debug!("Input handler thread stopping: {err}");
            }
        });

        // Let the engine move first if it is its turn
        if let Err(e) = self.reply_if_engine_to_move() {
            eprintln!("Error: {e:#}");
        }

        // Loop on user input
        while let Ok(cmd) = self.receiver.recv() {
            // Keep running, even on error
            match self.handle_command(cmd) {
                Ok(ControlFlow::Continue(())) => {}
                Ok(ControlFlow::Break(())) => break,
                Err(e) => eprintln!("Error: {e:#}"),
            }
        }

        Ok(())
    }

    /// Execute a single [`EngineCommand`], returning [`ControlFlow::Break`] if the engine should quit.
    fn handle_command(&mut self, cmd: EngineCommand) -> Result<ControlFlow<()>> {
        match cmd {
            EngineCommand::Bench { depth, pretty } => self.bench(depth, pretty)?,

            EngineCommand::Display => self.display(),

            EngineCommand::Eval { pretty } => self.eval(pretty),

            EngineCommand::Quit => return Ok(ControlFlow::Break(())),

            EngineCommand::Fen => println!("{}", self.position.to_fen()),

            EngineCommand::Flip => self.position.toggle_side_to_move(),

            EngineCommand::Moves { square } => self.moves(square.as_deref())?,

            EngineCommand::Play { mv } => self.play(&mv)?,

            EngineCommand::Undo => self.undo()?,

            EngineCommand::New => {
                self.player = Color::White;
                self.new_game();
            }

            EngineCommand::Switch => self.switch()?,

            EngineCommand::Status => println!("{}", self.status()),

            EngineCommand::Uci { cmd } => return self.handle_uci_command(cmd),
        }

        Ok(ControlFlow::Continue(()))
    }

    /// Handle the execution of a single [`UciCommand`].
    fn handle_uci_command(&mut self, uci: UciCommand) -> Result<ControlFlow<()>> {
        match uci {
            UciCommand::Uci => self.uci(),

            UciCommand::IsReady => println!("{}", UciResponse::<&str>::ReadyOk),

            UciCommand::UciNewGame => self.new_game(),

            UciCommand::Position { fen, moves } => self.set_position_from_uci(fen, moves)?,

            UciCommand::Go(options) => {
                let depth = options
                    .depth
                    .map_or(self.searcher.config().depth, |depth| depth as usize);
                self.go(depth)?;
            }

            // Searches are synchronous, so there is never anything to stop.
            UciCommand::Stop => {}

            UciCommand::Quit => return Ok(ControlFlow::Break(())),

            _ => bail!(
                "{} does not support UCI command {uci:?}",
                env!("CARGO_PKG_NAME")
            ),
        }

        Ok(ControlFlow::Continue(()))
    }

    /// Execute the `bench` command, running a fixed-depth search on a series of positions and displaying the results.
    fn bench(&self, depth: Option<usize>, pretty: bool) -> Result<()> {
        let config = SearchConfig::new(depth.unwrap_or(BENCH_DEPTH));
        let searcher = Searcher::with_weights(config, self.searcher.weights().clone());

        let num_tests = BENCHMARK_FENS.len();
        let mut nodes = 0;
        let starttime = Instant::now();

        // Run a fixed search on each position
        for (i, fen) in BENCHMARK_FENS.into_iter().enumerate() {
            println!("Benchmark position {}/{}: {fen}", i + 1, num_tests);

            let mut position = Position::from_fen(fen)?;
            let res = searcher.search(&mut position)?;
            nodes += res.nodes;
        }

        // Compute results
        let elapsed = starttime.elapsed();
        let nps = (nodes as f32 / elapsed.as_secs_f32()) as u64;
        let ms = elapsed.as_millis();

        if pretty {
            // Display the results in a nice table
            println!();
            println!("+--- Benchmark Complete ---+");
            println!("| depth      : {:<12}|", config.depth);
            println!("| time (ms)  : {ms:<12}|");
            println!("| nodes      : {nodes:<12}|");
            println!("| nps        : {nps:<12}|");
            println!("+--------------------------+");
        } else {
            println!("{nodes} nodes {nps} nps");
        }

        Ok(())
    }

    /// Executes the `display` command, printing the current position.
    fn display(&self) {
        println!("{}", self.position);
        println!("FEN: {}", self.position.to_fen());

        let history = self.position.history();
        if !history.is_empty() {
            let recent = history
                .iter()
                .rev()
                .take(6)
                .rev()
                .map(|mv| mv.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            println!("Last moves: {recent}");
        }

        println!("{}", self.status());
    }

    /// Executes the `eval` command, printing an evaluation of the current position.
    fn eval(&self, pretty: bool) {
        let evaluator = Evaluator::new(&self.position, self.searcher.weights());
        if pretty {
            print!("{evaluator}\n\nScore: ");
        }

        println!("{}", evaluator.eval());
    }

    /// Executes the `moves` command, printing all legal moves, or only those starting on `square`.
    fn moves(&self, square: Option<&str>) -> Result<()> {
        let moves = if let Some(square) = square {
            let square: Square = square
                .parse()
                .map_err(|_| anyhow::anyhow!("{square:?} is not a valid square"))?;
            self.position.legal_moves_from(square)
        } else {
            self.position.legal_moves()
        };

        // If there are none, print "(none)"
        let moves_string = if moves.is_empty() {
            String::from("(none)")
        } else {
            // Otherwise, join them by comma-space
            moves
                .into_iter()
                .map(|mv| mv.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        println!("{moves_string}");

        Ok(())
    }

    /// Executes the `play` command: applies the human's move and lets the engine reply if it is then its turn.
    fn play(&mut self, mv: &str) -> Result<()> {
        if let Some(outcome) = self.position.outcome() {
            bail!("Game over - {outcome}");
        }

        if self.position.side_to_move() != self.player {
            bail!("It is the engine's turn to move");
        }

        let mv = self.position.find_move(mv)?;
        self.position.push(mv);
        self.reply_if_engine_to_move()?;

        println!("{}", self.status());
        Ok(())
    }

    /// Plays the engine's move if the game is still running and it is not the human's turn.
    fn reply_if_engine_to_move(&mut self) -> Result<Option<SearchResult>> {
        if self.position.is_game_over() || self.position.side_to_move() == self.player {
            return Ok(None);
        }

        self.engine_move().map(Some)
    }

    /// Searches the current position and plays the engine's chosen move on it.
    fn engine_move(&mut self) -> Result<SearchResult> {
        let starttime = Instant::now();
        let res = self.searcher.search(&mut self.position)?;
        self.position.push(res.bestmove);

        let elapsed = starttime.elapsed();
        info!(
            "Searched {} nodes in {}ms",
            res.nodes,
            elapsed.as_millis()
        );
        println!(
            "{} played {} (thought for {:.2}s)",
            env!("CARGO_PKG_NAME"),
            res.bestmove,
            elapsed.as_secs_f32()
        );

        Ok(res)
    }

    /// Executes the `undo` command.
    ///
    /// Takes back one move, plus one more if that would leave the engine to move.
    fn undo(&mut self) -> Result<()> {
        if self.position.pop().is_none() {
            bail!("No moves to undo");
        }

        if self.position.side_to_move() != self.player && !self.position.history().is_empty() {
            self.position.pop();
        }

        Ok(())
    }

    /// Executes the `switch` command: the human takes the other side, and the engine moves if it is now its turn.
    fn switch(&mut self) -> Result<()> {
        self.player = self.player.opponent();
        println!("You are now playing {:?}", self.player);

        self.reply_if_engine_to_move()?;
        Ok(())
    }

    /// Describes the state of the game from the human's point of view.
    fn status(&self) -> String {
        if let Some(outcome) = self.position.outcome() {
            format!("Game over - {outcome}")
        } else if self.position.side_to_move() == self.player {
            String::from("Your turn")
        } else {
            String::from("Engine to move")
        }
    }

    /// Set the position to the supplied FEN string (defaults to the standard startpos if not supplied),
    /// and then apply `moves` one-by-one to the position.
    fn set_position_from_uci<T: AsRef<str>>(
        &mut self,
        fen: Option<T>,
        moves: impl IntoIterator<Item = T>,
    ) -> Result<()> {
        // Parse into a fresh position, so a bad move leaves the current one untouched
        let mut position = if let Some(fen) = fen {
            Position::from_fen(fen.as_ref())?
        } else {
            Position::default()
        };

        // Apply the provided moves
        for mv_str in moves {
            let mv = position.find_move(mv_str.as_ref())?;
            position.push(mv);
        }

        self.position = position;
        Ok(())
    }

    /// Resets the engine's internal game state.
    fn new_game(&mut self) {
        self.position = Position::default();
    }

    /// Called when the engine receives `go`: searches `depth` plies and reports the result in UCI format.
    fn go(&mut self, depth: usize) -> Result<SearchResult> {
        let config = SearchConfig::new(depth);
        let searcher = Searcher::with_weights(config, self.searcher.weights().clone());

        let starttime = Instant::now();
        let res = searcher.search(&mut self.position)?;
        let elapsed = starttime.elapsed();

        let mut info = UciInfo::new()
            .depth(config.depth)
            .nodes(res.nodes)
            .nps((res.nodes as f32 / elapsed.as_secs_f32()).trunc())
            .time(elapsed.as_millis());

        // Checkmate sentinels are not real centipawn values
        if let Some(score) = res.score.into_uci() {
            info = info.score(score);
        }

        println!("{}", UciResponse::<String>::Info(Box::new(info)));
        println!(
            "{}",
            UciResponse::BestMove {
                bestmove: Some(res.bestmove),
                ponder: None,
            }
        );

        Ok(res)
    }

    /// Called when the engine receives the `uci` command.
    ///
    /// Prints engine's ID, version, and authors.
    fn uci(&self) {
        println!("id name {}\nid author {}\n", self.name(), self.authors());

        // We're ready to go!
        println!("{}", UciResponse::<&str>::UciOk)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Searcher::default(), Color::White)
    }
}

/// Loops endlessly to await input via `stdin`, sending all successfully-parsed commands through the supplied `sender`.
fn input_handler(sender: Sender<EngineCommand>) -> Result<()> {
    let mut buffer = String::with_capacity(2048);

    loop {
        // Clear the buffer, read input, and trim the trailing newline
        buffer.clear();
        let bytes = io::stdin()
            .read_line(&mut buffer)
            .context("Failed to read line when parsing commands")?;

        // For ctrl + d
        if 0 == bytes {
            // Send the Quit command and exit this function
            sender
                .send(EngineCommand::Quit)
                .context("Failed to send 'quit' command after receiving empty input")?;

            bail!("Engine received input of 0 bytes and is quitting");
        }

        // Trim any leading/trailing whitespace
        let buf = buffer.trim();

        // Ignore empty lines
        if buf.is_empty() {
            continue;
        }

        // Attempt to parse the input as a UCI command first, since GUIs expect prompt replies
        match UciCommand::new(buf) {
            Ok(cmd) => sender
                .send(EngineCommand::Uci { cmd })
                .context("Failed to send UCI command to engine")?,

            // If it's not a UCI command, check if it's an engine-specific command
            Err(UciParseError::UnrecognizedCommand { cmd: _ }) => {
                match EngineCommand::try_parse_from(buf.split_ascii_whitespace()) {
                    Ok(cmd) => sender
                        .send(cmd)
                        .context("Failed to send command to engine")?,

                    // If it wasn't a custom command, either, print an error.
                    Err(err) => eprintln!("{err}"),
                }
            }

            // If it was a UCI command, print a usage message.
            Err(uci_err) => eprintln!("{uci_err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(depth: usize) -> Engine {
        Engine::new(Searcher::new(depth), Color::White)
    }

    #[test]
    fn test_play_gets_a_reply() {
        let mut engine = engine(1);
        engine
            .handle_command(EngineCommand::Play { mv: "e2e4".into() })
            .unwrap();

        assert_eq!(engine.position().history().len(), 2);
        assert_eq!(engine.position().side_to_move(), Color::White);
        assert_eq!(engine.status(), "Your turn");
    }

    #[test]
    fn test_illegal_play_is_rejected() {
        let mut engine = engine(1);
        assert!(engine
            .handle_command(EngineCommand::Play { mv: "e2e5".into() })
            .is_err());
        assert!(engine.position().history().is_empty());
    }

    #[test]
    fn test_play_rejected_on_engine_turn() {
        let mut engine = Engine::new(Searcher::new(1), Color::Black);
        assert!(engine
            .handle_command(EngineCommand::Play { mv: "e2e4".into() })
            .is_err());
        assert!(engine.position().history().is_empty());
        assert_eq!(engine.status(), "Engine to move");
    }

    #[test]
    fn test_engine_opens_when_human_plays_black() {
        let mut engine = Engine::new(Searcher::new(1), Color::Black);
        assert!(engine.reply_if_engine_to_move().unwrap().is_some());
        assert_eq!(engine.position().history().len(), 1);
        assert_eq!(engine.status(), "Your turn");

        // Nothing more to do until the human moves
        assert!(engine.reply_if_engine_to_move().unwrap().is_none());
        assert_eq!(engine.position().history().len(), 1);

        engine
            .handle_command(EngineCommand::Play { mv: "e7e5".into() })
            .unwrap();
        assert_eq!(engine.position().history().len(), 3);
    }

    #[test]
    fn test_undo_takes_back_reply() {
        let mut engine = engine(1);
        engine
            .handle_command(EngineCommand::Play { mv: "d2d4".into() })
            .unwrap();
        engine.handle_command(EngineCommand::Undo).unwrap();

        assert!(engine.position().history().is_empty());
        assert!(engine.handle_command(EngineCommand::Undo).is_err());
    }

    #[test]
    fn test_switch_makes_engine_move() {
        let mut engine = engine(1);
        engine.handle_command(EngineCommand::Switch).unwrap();

        assert_eq!(engine.player(), Color::Black);
        assert_eq!(engine.position().history().len(), 1);
        assert_eq!(engine.position().side_to_move(), Color::Black);
    }

    #[test]
    fn test_uci_position_and_go() {
        let mut engine = engine(1);
        let cmd = UciCommand::new("position startpos moves e2e4 e7e5 f1c4 b8c6 d1h5 g8f6").unwrap();
        engine.handle_uci_command(cmd).unwrap();
        assert_eq!(engine.position().history().len(), 6);

        let res = engine.go(1).unwrap();
        assert_eq!(res.bestmove.to_string(), "h5f7");

        // `go` only reports a move; it does not play it
        assert_eq!(engine.position().history().len(), 6);
    }

    #[test]
    fn test_bad_uci_position_keeps_current() {
        let mut engine = engine(1);
        engine
            .handle_command(EngineCommand::Play { mv: "e2e4".into() })
            .unwrap();

        let cmd = UciCommand::new("position startpos moves e2e4 e2e4").unwrap();
        assert!(engine.handle_uci_command(cmd).is_err());
        assert_eq!(engine.position().history().len(), 2);
    }

    #[test]
    fn test_quit_breaks() {
        let mut engine = engine(1);
        assert!(engine.handle_command(EngineCommand::Quit).unwrap().is_break());

        let cmd = UciCommand::new("quit").unwrap();
        assert!(engine.handle_uci_command(cmd).unwrap().is_break());
    }

    #[test]
    fn test_status_reports_game_over() {
        let mut engine = engine(1);
        engine.set_position(
            Position::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
                .unwrap(),
        );

        assert_eq!(engine.status(), "Game over - 0-1 (Black wins by checkmate)");
        assert!(engine
            .handle_command(EngineCommand::Play { mv: "a2a3".into() })
            .is_err());
    }
}

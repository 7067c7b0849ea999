/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use tadpole::{Cli, Engine, Position, Searcher};

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("{} encountered an error: {e:#}", env!("CARGO_PKG_NAME"));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut engine = Engine::new(Searcher::new(cli.depth), cli.player.into());

    if let Some(fen) = cli.fen.as_deref() {
        let position = Position::from_fen(fen).with_context(|| format!("Invalid FEN {fen:?}"))?;
        engine.set_position(position);
    }

    engine.run()
}

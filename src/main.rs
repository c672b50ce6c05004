//! `ins`: a terminal front end for the vehicle insurance records API.

use clap::Parser;

mod cli;
use cli::Cli;

fn main() -> anyhow::Result<()> {
    Cli::parse().run()
}

mod args;
mod commands;

use crate::args::{Args, Command};
use clap::Parser;
use sql_convertor::config;

fn main() {
    let args = Args::parse();

    let config = match config::read(args.config.as_deref()) {
        Ok(config) => config,
        Err(error) => commands::fail(error),
    };

    let result = match args.command {
        Command::Translate(params) => {
            env_logger::init();

            commands::translate(params, &config)
        }
        Command::Server { port } => commands::server::run(config, port),
    };

    if let Err(error) = result {
        commands::fail(error);
    }
}

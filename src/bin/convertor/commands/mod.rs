use crate::args::TranslateParams;
use colored::Colorize;
use sql_convertor::sql::Statements;
use sql_convertor::{Config, Converter, Error};
use std::io;
use std::process::exit;

pub mod server;

pub fn translate(params: TranslateParams, config: &Config) -> Result<(), Error> {
    let strategy = params.strategy.map(Into::into).unwrap_or(config.strategy);
    let literals = params.literals.map(Into::into).unwrap_or(config.literals);
    let converter = Converter::new(strategy, literals);

    let statements = match &params.input {
        Some(path) => converter.convert_file(path)?,
        None => {
            let input = io::read_to_string(io::stdin())?;

            converter.convert(&input)?
        }
    };

    if params.json {
        println!("{}", serde_json::to_string_pretty(&statements)?);
    } else {
        println!("{}", render(&statements));
    }

    Ok(())
}

fn render(statements: &Statements) -> String {
    statements
        .iter()
        .map(|(name, sql)| format!("-- {name}\n{sql};"))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn fail(error: Error) -> ! {
    eprintln!("{intro}: {error}", intro = "error".bold().red());
    exit(1);
}

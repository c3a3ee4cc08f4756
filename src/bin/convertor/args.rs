use clap::{Parser, Subcommand, ValueEnum};
use sql_convertor::sql::{LiteralStyle, Strategy};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// JSON config file. Environment variables still take precedence over it.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Translates a query document to SQL.
    Translate(TranslateParams),
    /// Runs the HTTP API.
    Server {
        /// Overrides the configured port.
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(clap::Args, Debug)]
pub struct TranslateParams {
    /// File containing the query document. Reads stdin when missing.
    pub input: Option<PathBuf>,
    /// Overrides the configured strategy.
    #[arg(value_enum, long)]
    pub strategy: Option<StrategyArg>,
    /// Overrides the configured literal style.
    #[arg(value_enum, long)]
    pub literals: Option<LiteralsArg>,
    /// Print the statements as a JSON object instead of SQL.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, ValueEnum, Clone, Copy)]
pub enum StrategyArg {
    /// One statement per table query, joined to its direct parent.
    PerRelation,
    /// One statement per root table, with every relation joined in.
    Combined,
}

#[derive(Debug, ValueEnum, Clone, Copy)]
pub enum LiteralsArg {
    Inline,
    /// Doubles single quotes inside strings.
    Escaped,
}

impl From<StrategyArg> for Strategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::PerRelation => Self::PerRelation,
            StrategyArg::Combined => Self::Combined,
        }
    }
}

impl From<LiteralsArg> for LiteralStyle {
    fn from(value: LiteralsArg) -> Self {
        match value {
            LiteralsArg::Inline => Self::Inline,
            LiteralsArg::Escaped => Self::Escaped,
        }
    }
}

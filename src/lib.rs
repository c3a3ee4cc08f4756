// I don't really care, and it's not important for this project
#![allow(clippy::result_large_err)]

pub mod config;
mod engine;
mod error;
pub mod server;

pub use engine::Converter;

/// The parsed form of a query document.
pub mod query {
    pub use crate::engine::parsing::{parse, parse_document, ParseError};
    pub use crate::engine::query::*;
}

pub mod sql {
    pub use crate::engine::compiler::{join_condition, Compiler, Statements, Strategy};
    pub use crate::engine::formatting::{
        EscapedLiterals, InlineLiterals, LiteralStyle, ValueFormatter,
    };
    pub use crate::engine::statement::*;
}

pub use config::Config;
pub use error::{Error, ErrorKind};

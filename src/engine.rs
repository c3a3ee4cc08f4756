pub mod compiler;
pub mod formatting;
pub mod parsing;
pub mod query;
mod rendering;
pub mod statement;


use crate::config::Config;
use crate::engine::compiler::{Compiler, Statements, Strategy};
use crate::engine::formatting::LiteralStyle;
use log::info;
use std::fs;
use std::path::Path;

const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_SEGMENT: usize = 1024 * 1024;

/// Runs `f` on a fresh stack segment when the current one is close to running out.
///
/// Relations nest without limit, so everything that recurses over a [query::TableQuery] goes
/// through here.
pub(crate) fn grow_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, f)
}

/// Parses query documents and compiles them into SQL, in one call.
#[derive(Debug)]
pub struct Converter {
    compiler: Compiler,
}

impl Converter {
    pub fn new(strategy: Strategy, literals: LiteralStyle) -> Self {
        Converter {
            compiler: Compiler::with_formatter(strategy, literals.formatter()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.strategy, config.literals)
    }

    pub fn strategy(&self) -> Strategy {
        self.compiler.strategy()
    }

    pub fn convert(&self, input: &str) -> Result<Statements, crate::Error> {
        let query = parsing::parse(input)?;

        if query.is_empty() {
            info!("Query document has no tables, nothing to compile");
        }

        Ok(self.compiler.compile(&query))
    }

    pub fn convert_file(&self, path: &Path) -> Result<Statements, crate::Error> {
        info!("Converting {}", path.display());

        let input = fs::read_to_string(path)?;

        self.convert(&input)
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(Strategy::default(), LiteralStyle::default())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn an_empty_document_has_no_statements() {
        let statements = Converter::default().convert("{}").unwrap();

        assert!(statements.is_empty());
    }

    #[test]
    fn malformed_documents_are_parse_errors() {
        let error = Converter::default().convert("{ nope").unwrap_err();

        assert!(error.is_parse_error());
    }

    #[test]
    fn missing_files_propagate_the_io_error() {
        let error = Converter::default()
            .convert_file(Path::new("no/such/query.json"))
            .unwrap_err();

        match error.into_inner() {
            ErrorKind::IoError(error) => assert_eq!(error.kind(), std::io::ErrorKind::NotFound),
            other => panic!("Expected an IO error, got {other:?}"),
        }
    }

    #[test]
    fn the_configured_strategy_and_literals_are_used() {
        let config = Config {
            strategy: Strategy::Combined,
            literals: LiteralStyle::Escaped,
            ..Config::default()
        };
        let converter = Converter::from_config(&config);

        let statements = converter
            .convert(r#"{"users": {"where": {"name": "D'Arcy"}, "posts": {}}}"#)
            .unwrap();

        assert_eq!(converter.strategy(), Strategy::Combined);
        assert_eq!(
            statements["users"],
            "SELECT users.*, posts.*\n\
             FROM users\n\
             INNER JOIN posts ON posts.users_id = users.id\n\
             WHERE users.name = 'D''Arcy'"
        );
    }
}

use colored::{ColoredString, Colorize};
use std::error::Error as StdError;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use crate::document::NodeId;

/// User facing error, a list of (possibly colored) pieces of text
#[derive(Debug)]
pub struct Error {
    pub message: Vec<ColoredString>,
}

impl Error {
    pub fn new(message: &str) -> Self {
        Error {
            message: vec![message.normal()],
        }
    }
}

impl StdError for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", ColoredStrings(&self.message))
    }
}

// https://medium.com/apolitical-engineering/how-do-you-impl-display-for-vec-b8dbb21d814f
struct ColoredStrings<'a>(pub &'a Vec<ColoredString>);

impl<'a> fmt::Display for ColoredStrings<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.iter().fold(Ok(()), |result, partial| {
            result.and_then(|_| write!(f, "{}", partial))
        })
    }
}

#[derive(Debug)]
pub enum MissingFileError {
    ConfigFileDoesNotExistError(PathBuf),
    InputFileDoesNotExistError(PathBuf),
    RatesFileDoesNotExistError(PathBuf),
}
impl StdError for MissingFileError {}
impl Display for MissingFileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let (title, file) = match self {
            MissingFileError::ConfigFileDoesNotExistError(x) => ("Configuration", x),
            MissingFileError::InputFileDoesNotExistError(x) => ("Input", x),
            MissingFileError::RatesFileDoesNotExistError(x) => ("Rates", x),
        };
        write!(
            f,
            "{} file does not exist: {}",
            title,
            format!("{}", file.display()).red().bold()
        )
    }
}

/// Errors coming out of the pest grammars
#[derive(Debug, Clone, PartialEq)]
pub enum ParserError {
    Markup(String),
    Rates(String),
    Format(String),
}
impl StdError for ParserError {}
impl Display for ParserError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ParserError::Markup(x) => write!(f, "Could not parse markup\n{}", x),
            ParserError::Rates(x) => write!(f, "Could not parse rates\n{}", x),
            ParserError::Format(x) => write!(f, "Could not parse currency format\n{}", x),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentError {
    NoSuchNode(NodeId),
    Detached(NodeId),
    NotAChild { parent: NodeId, child: NodeId },
    WouldCreateCycle(NodeId),
    NotAnElement(NodeId),
}
impl StdError for DocumentError {}
impl Display for DocumentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::NoSuchNode(x) => write!(f, "node {} does not exist", x),
            DocumentError::Detached(x) => write!(f, "node {} is not attached", x),
            DocumentError::NotAChild { parent, child } => {
                write!(f, "node {} is not a child of {}", child, parent)
            }
            DocumentError::WouldCreateCycle(x) => write!(f, "moving node {} creates a cycle", x),
            DocumentError::NotAnElement(x) => write!(f, "node {} is not an element", x),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NormalizeError {
    Empty,
    NotANumber(String),
    NotFinite(String),
}
impl StdError for NormalizeError {}
impl Display for NormalizeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeError::Empty => write!(f, "empty number"),
            NormalizeError::NotANumber(x) => write!(f, "{:?} is not a number", x),
            NormalizeError::NotFinite(x) => write!(f, "{:?} is not a finite number", x),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListError {
    AliasNotInList(String),
    RepeatedAlias {
        alias: String,
        existing: String,
        requested: String,
    },
    Empty,
    Pattern(String),
}
impl StdError for ListError {}
impl Display for ListError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ListError::AliasNotInList(x) => write!(f, "{}", x),
            ListError::RepeatedAlias {
                alias,
                existing,
                requested,
            } => write!(
                f,
                "Repeated alias {} for {} and {}",
                alias, requested, existing
            ),
            ListError::Empty => write!(f, "No currencies to look for"),
            ListError::Pattern(x) => write!(f, "Could not build the price pattern: {}", x),
        }
    }
}

impl From<ParserError> for Error {
    fn from(error: ParserError) -> Self {
        Error {
            message: vec![format!("{}", error).red().bold()],
        }
    }
}

impl From<DocumentError> for Error {
    fn from(error: DocumentError) -> Self {
        Error {
            message: vec!["Document error: ".normal(), format!("{}", error).red()],
        }
    }
}

impl From<ListError> for Error {
    fn from(error: ListError) -> Self {
        Error {
            message: vec![format!("{}", error).red().bold()],
        }
    }
}

impl From<MissingFileError> for Error {
    fn from(error: MissingFileError) -> Self {
        Error {
            message: vec![format!("{}", error).normal()],
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error {
            message: vec![format!("{}", error).red()],
        }
    }
}

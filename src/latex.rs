//! Main module for LaTeX parsing and formatting

pub mod ast;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod position;
pub mod printer;
pub mod signatures;
pub mod token;
pub mod visit;

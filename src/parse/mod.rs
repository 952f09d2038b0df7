pub mod lex;
pub mod tokenize;
pub mod transform;
pub mod types;

pub use lex::{Classifier, Lexer, MatchRule};
pub use tokenize::{tokenize, tokenize_file};
pub use types::{RawToken, SourcePosition, Token, TokenType};

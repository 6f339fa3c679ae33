//! # Tokenizer
//!
//! Lexical analysis of formulas and conditions: raw text in, a stream of
//! [`TokenSpan`](token::TokenSpan)s out. Each token remembers its line,
//! column and byte range so syntax errors can point at the offending spot.
//!
//! * [`token`]: token types and the [`Tokenizer`](token::Tokenizer)
//! * [`keyword`]: `and`, `or`, `not` and the boolean words
//! * [`symbol`]: operators and delimiters
//! * [`literal`]: numbers and strings
//! * [`whitespace`]: spaces, tabs and newlines
//!
//! ```rust
//! use miasi_core::tokenizer::token::Tokenizer;
//!
//! let tokens = Tokenizer::new().tokenize("weight / (height ** 2)").unwrap();
//! assert_eq!(tokens.len(), 11);
//! ```

pub mod keyword;
pub mod literal;
pub mod symbol;
pub mod token;
pub mod whitespace;

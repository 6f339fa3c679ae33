//! # MIASI: expert-system advisor core
//!
//! MIASI lets administrators describe small expert systems ("BMI Calculator",
//! "BMR Calculator", ...) as data: the form fields a user fills in, the
//! equations computed from those fields, and the knowledge rules that turn
//! computed values into advice. This crate holds everything needed to answer
//! a form submission for such a system.
//!
//! ## Building Blocks
//!
//! - Catalog model and stores ([`catalog`]): systems, form fields, equations
//!   and knowledge entries, read through the [`catalog::CatalogStore`] trait.
//! - Expression language: [`tokenizer`] → [`preprocessor`] → [`analyzer`]
//!   (parser combinators producing an [`ast`]) → [`eval`].
//! - Submission pipeline ([`pipeline`]): field coercion, equation selection,
//!   knowledge resolution.
//! - Catalog linting ([`lint`]) for authoring defects.
//!
//! ## Expression Pipeline
//!
//! Formulas and conditions are never handed to a general purpose evaluator.
//! They go through a dedicated, restricted language:
//!
//! ```text
//! Source Text → Tokenizer → Preprocessor → Parser → AST → Evaluator
//! ```
//!
//! The evaluator only sees the variable mapping it is given and a fixed set of
//! built-in functions ([`eval::functions::BuiltinFunction`]).
//!
//! ## Submission Pipeline
//!
//! ```text
//! Catalog reads → Field Coercion → Equation Selector → Formula Evaluator
//!               → Condition Evaluator → SubmissionOutcome
//! ```
//!
//! The catalog reads are the only suspension points; everything after them
//! is a pure, synchronous computation over a [`pipeline::SystemDefinition`].

pub mod analyzer;
pub mod ast;
pub mod catalog;
pub mod config;
pub mod error;
pub mod eval;
pub mod lint;
pub mod pipeline;
pub mod preprocessor;
pub mod tokenizer;

// Re-exports
pub use error::*;
pub use eval::{CompiledExpression, Value, Variables};
pub use pipeline::{SubmissionOutcome, SubmissionService, SystemDefinition};

#[cfg(test)]
mod tests {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    #[ctor::ctor]
    fn init_tests() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .finish();
        // other test binaries in the same process may have set one already
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

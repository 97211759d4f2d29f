//! # Paramflow
//!
//! Declarative parameter contracts and the pipelines that run behind them.
//!
//! A [`contract::Contract`] declares the fields an operation accepts: their
//! types, bounds, formats, nested structure, defaults, aliases and
//! coercions. A [`pipeline::Pipeline`] normalizes raw input against its
//! contract, validates it and runs business logic, turning every outcome
//! into a [`pipeline::PipelineResult`]:
//!
//! - **Validation**: errors are collected per field, in declaration order
//! - **Authorization**: named policies consulted from business logic
//! - **Interrupts**: early, non-error exits carrying a reason
//! - **Fallbacks and callbacks**: side channels on failure and success
//! - **Chains**: pipelines run in sequence, each feeding the next
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use paramflow::prelude::*;
//!
//! let pipeline = Pipeline::builder("Sum")
//!     .contract(
//!         Contract::builder()
//!             .field(FieldBuilder::new("a").required().type_of("integer"))
//!             .field(FieldBuilder::new("b").required().type_of("integer"))
//!             .build()?,
//!     )
//!     .process(|_, params| Ok(Reply::ok(params.len())))
//!     .build()?;
//!
//! let result = pipeline.run(params! { "a" => 1, "b" => 2 });
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod chain;
pub mod checks;
pub mod contract;
pub mod errors;
pub mod events;
pub mod observability;
pub mod pipeline;
pub mod policy;
pub mod testing;
pub mod utils;
pub mod validation;
pub mod value;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::chain::{Chain, ChainBuilder, ChainConfig, ChainOutcome, ChainStep};
    pub use crate::checks::{Check, CustomCheck, LengthConstraint, NumericConstraint, Verdict};
    pub use crate::contract::{Contract, ContractBuilder, FieldBuilder, ShapeRegistry};
    pub use crate::errors::{DefinitionError, ParamflowError, StrictError};
    pub use crate::events::{EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::params;
    pub use crate::pipeline::{
        Authorization, Callback, CallbackConfig, Fallback, FallbackConfig, Halt, Operation,
        Pipeline, PipelineBuilder, PipelineError, PipelineResult, ProcessContext, Reply,
        ResultStatus,
    };
    pub use crate::policy::{Policy, PolicyRegistry};
    pub use crate::validation::{validate, FieldErrors, ValidationOutcome};
    pub use crate::value::{FieldName, IntoParams, ParamsMap, Record, Value};
}

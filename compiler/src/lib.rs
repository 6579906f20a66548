//! stubgen-compiler
//!
//! This crate implements:
//!  1) A tokenizer + parser for `.idl` interface files,
//!  2) An interface verifier (duplicate names and method ids, reserved names, ranges),
//!  3) Type resolution and page/inline payload classification,
//!  4) Header-word encoding and fixed frame layouts,
//!  5) Server dispatch and client call descriptions (`Artifact`),
//!  6) Code generation (`compile_artifact_to_rust` → `String`),
//!  7) Error types (`IdlError`).

pub mod error;
pub mod types;
pub mod utils;
pub mod tokenizer;
pub mod parser;
pub mod verifier;
pub mod resolver;
pub mod classifier;
pub mod header;
pub mod layout;
pub mod stubs;
pub mod artifact;
pub mod compiler;
pub mod gen_rust;

pub use artifact::Artifact;
pub use compiler::{compile_idl, compile_interface, compile_json};
pub use error::IdlError;
pub use gen_rust::compile_artifact_to_rust;
pub use types::Options;

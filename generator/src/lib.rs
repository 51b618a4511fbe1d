//! Code emitters for the Toolman schema compiler. The binary in `main.rs`
//! wires these to the CLI.

pub mod generators;
pub mod naming;

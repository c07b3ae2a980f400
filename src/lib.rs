pub mod compile;
pub mod config;
pub mod edit;
pub mod error;
pub mod parse;
pub mod template;
pub mod validate;
pub mod wasm;

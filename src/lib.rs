pub mod codegen;
pub mod compile;
pub mod config;
pub mod error;
pub mod options;
pub mod pipeline;
pub mod template;
pub mod validate;
pub mod wasm;

//! Main module for rib library functionality

pub mod context;
pub mod error;
pub mod formatting;
pub mod lexing;
pub mod pipeline;
pub mod presets;
pub mod request;
pub mod values;

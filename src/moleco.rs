//! Main module for moleco library functionality

pub mod ast;
pub mod building;
pub mod color;
pub mod composing;
pub mod error;
pub mod formats;
pub mod lexing;
pub mod normalization;
pub mod parsing;
pub mod pipeline;
pub mod splitting;
pub mod testing;
pub mod weight;

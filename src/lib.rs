//! Terminal forms for app package options.

pub mod config;
pub mod errors;
pub mod form;
pub mod layout;
pub mod models;
pub mod tui;

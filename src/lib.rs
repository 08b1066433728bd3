#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::unnecessary_literal_bound,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

#[macro_use]
extern crate rust_i18n;

i18n!("locales", fallback = "es");

pub mod calendar;
pub mod commands;
pub mod config;
#[doc(hidden)]
pub mod diagnostics;
pub mod dialogue;
pub mod error;
pub mod reminders;
pub mod speech;
pub mod store;

pub use commands::{ChatCommand, parse_command};
pub use config::Config;
pub use error::{Result, VoxError};

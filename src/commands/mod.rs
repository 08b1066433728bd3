//! Slash commands understood by the chat REPL.

pub mod parser;

pub use parser::parse_command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatCommand {
    /// Discard the draft in progress and greet again.
    Reset,
    /// Print the stored entries.
    Entries,
    Help,
    Quit,
}

pub mod commands;
pub mod save;

pub mod cmd {
    pub use super::commands::Cli;
}

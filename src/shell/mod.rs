pub mod runner;
pub mod tasks;

pub use runner::{CommandRunner, CommandSpec, SystemRunner};

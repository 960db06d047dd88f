pub mod services;

pub use services::{create_backup, now};

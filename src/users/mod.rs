pub mod repo;
pub mod repo_types;

pub use repo::{find_user, rename_user};

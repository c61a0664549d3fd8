pub mod repo;
pub mod repo_types;

pub use repo::{PgUserRepo, RepoError, UserRepo};
pub use repo_types::{NewUser, User, UserPatch};

pub mod commands;
pub mod error;
pub mod password;
pub mod queries;
pub mod routes;

pub use commands::{LoginCommand, RegisterCommand, SessionResponse};
pub use error::UserError;
pub use queries::{GetUserQuery, ListUsersQuery};
pub use routes::users_routes;

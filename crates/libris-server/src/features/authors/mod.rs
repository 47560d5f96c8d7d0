pub mod commands;
pub mod error;
pub mod queries;
pub mod routes;

pub use commands::{CreateAuthorCommand, DeleteAuthorCommand, UpdateAuthorCommand};
pub use error::AuthorError;
pub use queries::{GetAuthorQuery, ListAuthorsQuery};
pub use routes::authors_routes;

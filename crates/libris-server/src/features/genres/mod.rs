pub mod commands;
pub mod error;
pub mod queries;
pub mod routes;

pub use commands::{CreateGenreCommand, DeleteGenreCommand, UpdateGenreCommand};
pub use error::GenreError;
pub use queries::{GetGenreQuery, ListGenresQuery};
pub use routes::genres_routes;

pub mod commands;
pub mod error;
pub mod queries;
pub mod routes;

pub use commands::{
    CreateBookCommand, DeleteBookCommand, LendBookCommand, UpdateBookCommand,
};
pub use error::BookError;
pub use queries::{GetBookQuery, ListBooksQuery};
pub use routes::books_routes;

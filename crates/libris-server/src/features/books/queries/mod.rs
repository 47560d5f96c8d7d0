pub mod get;
pub mod list;

pub use get::GetBookQuery;
pub use list::ListBooksQuery;

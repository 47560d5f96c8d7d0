pub mod get;
pub mod list;

pub use get::GetGenreQuery;
pub use list::ListGenresQuery;

pub mod get;
pub mod list;

pub use get::GetAuthorQuery;
pub use list::ListAuthorsQuery;

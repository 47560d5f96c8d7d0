pub mod create;
pub mod delete;
pub mod lend;
pub mod update;

pub use create::CreateBookCommand;
pub use delete::DeleteBookCommand;
pub use lend::LendBookCommand;
pub use update::UpdateBookCommand;

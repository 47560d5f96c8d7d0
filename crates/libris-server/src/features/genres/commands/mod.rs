pub mod create;
pub mod delete;
pub mod update;

pub use create::CreateGenreCommand;
pub use delete::DeleteGenreCommand;
pub use update::UpdateGenreCommand;

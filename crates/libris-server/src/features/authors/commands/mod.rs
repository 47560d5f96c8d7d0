pub mod create;
pub mod delete;
pub mod update;

pub use create::CreateAuthorCommand;
pub use delete::DeleteAuthorCommand;
pub use update::UpdateAuthorCommand;

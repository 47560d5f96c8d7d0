pub mod update;

pub use update::UpdateProfileCommand;

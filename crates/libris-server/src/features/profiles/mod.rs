pub mod commands;
pub mod error;
pub mod queries;
pub mod routes;

pub use commands::UpdateProfileCommand;
pub use error::ProfileError;
pub use queries::{GetProfileQuery, ListProfilesQuery};
pub use routes::profiles_routes;

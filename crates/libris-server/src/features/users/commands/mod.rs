pub mod login;
pub mod logout;
pub mod register;

pub use login::LoginCommand;
pub use logout::LogoutCommand;
pub use register::{RegisterCommand, RegisterProfile};

use serde::Serialize;
use uuid::Uuid;

use crate::models::{Profile, User};

/// Answer to a successful register or login
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: User,
    pub profile: Option<Profile>,
}

/// Fresh opaque API token
pub fn generate_token() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens() {
        let token = generate_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_token());
    }
}

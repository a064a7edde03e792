pub mod health;
pub mod threads;
pub mod messages;
pub mod memory;

use serde::Deserialize;
use themis_persist::UserIdentity;
use utoipa::IntoParams;

/// Caller identity carried in the query string
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IdentityQuery {
    /// Caller user id
    pub user_id: String,
    /// Caller email, compared case-insensitively
    pub user_email: String,
}

impl IdentityQuery {
    pub fn identity(&self) -> UserIdentity {
        UserIdentity::new(self.user_id.clone(), self.user_email.clone())
    }
}

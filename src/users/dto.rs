use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::repo::Role;

/// Request body for profile updates (PUT and PATCH share it).
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRolesRequest {
    pub roles: Vec<Role>,
}

#[derive(Debug, Serialize)]
pub struct RolesResponse {
    pub id: Uuid,
    pub roles: Vec<Role>,
}

//! User profile model for storage and API.

use serde::{Deserialize, Serialize};

/// Public profile embedded into leaderboard entries at write time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User ID (also used as document ID)
    pub user_id: String,
    pub display_name: String,
    /// Profile photo URL
    pub photo_url: Option<String>,
}

use serde::{Deserialize, Serialize};

use crate::{Report, StoreResult, User};

/// Seed data for the in-memory backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreFixture {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub reports: Vec<Report>,
}

impl StoreFixture {
    pub fn from_json_str(raw: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

use serde::Serialize;

use super::entities::SuspectEntry;

#[derive(Debug, Serialize)]
pub struct SuspectListResponse {
    pub cutoff: i32,
    pub items: Vec<SuspectEntry>,
}

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SuspectQuery {
    pub cutoff: Option<i32>,
}

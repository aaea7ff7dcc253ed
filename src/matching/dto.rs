use serde::{Deserialize, Serialize};

use crate::store::{MatchRequest, MatchStatus};

/// Body for POST /match-requests.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchRequest {
    pub mentor_id: i64,
    pub mentee_id: i64,
    pub message: String,
}

/// Outgoing listing projection: the message is omitted.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingRequest {
    pub id: i64,
    pub mentor_id: i64,
    pub mentee_id: i64,
    pub status: MatchStatus,
}

impl From<MatchRequest> for OutgoingRequest {
    fn from(request: MatchRequest) -> Self {
        Self {
            id: request.id,
            mentor_id: request.mentor_id,
            mentee_id: request.mentee_id,
            status: request.status,
        }
    }
}

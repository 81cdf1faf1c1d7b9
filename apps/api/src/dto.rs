use chrono::SecondsFormat;
use picsearch_core::UserIdentity;
use picsearch_domain::{HistoryRecord, TermFrequency};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ready: bool,
    pub postgres: HealthDependencyStatus,
}

/// Status of one backing dependency.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-dependency-status.ts"
)]
pub struct HealthDependencyStatus {
    pub status: &'static str,
    pub detail: Option<String>,
}

/// Generic message response.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/generic-message-response.ts"
)]
pub struct GenericMessageResponse {
    pub message: String,
}

impl GenericMessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// API representation of the authenticated user.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-identity-response.ts"
)]
pub struct UserIdentityResponse {
    pub subject: String,
    pub display_name: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub provider: String,
}

impl From<UserIdentity> for UserIdentityResponse {
    fn from(identity: UserIdentity) -> Self {
        Self {
            subject: identity.subject().to_owned(),
            display_name: identity.display_name().to_owned(),
            email: identity.email().map(ToOwned::to_owned),
            avatar_url: identity.avatar_url().map(ToOwned::to_owned),
            provider: identity.provider().to_owned(),
        }
    }
}

/// A user's search history as two index-aligned lists.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/history-response.ts"
)]
pub struct HistoryResponse {
    pub terms: Vec<String>,
    /// RFC 3339 timestamps, one per term.
    pub time_stamp: Vec<String>,
}

impl From<HistoryRecord> for HistoryResponse {
    fn from(record: HistoryRecord) -> Self {
        let (_, terms, observed_at) = record.into_columns();
        Self {
            terms,
            time_stamp: observed_at
                .into_iter()
                .map(|observed_at| observed_at.to_rfc3339_opts(SecondsFormat::Millis, true))
                .collect(),
        }
    }
}

/// One trending term with its occurrence count.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/trending-term-response.ts"
)]
pub struct TrendingTermResponse {
    pub term: String,
    pub count: u64,
}

impl From<&TermFrequency> for TrendingTermResponse {
    fn from(frequency: &TermFrequency) -> Self {
        Self {
            term: frequency.term.clone(),
            count: frequency.count,
        }
    }
}

/// Query string of `/api/search`.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/search-query.ts"
)]
pub struct SearchQuery {
    #[serde(default)]
    pub term: String,
    #[serde(default = "default_page")]
    pub page: u32,
}

/// Query string of `/api/search-guest`.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/guest-search-query.ts"
)]
pub struct GuestSearchQuery {
    #[serde(default = "default_page")]
    pub page: u32,
}

/// Query string of `/api/top-searches` and `/api/trending`.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/top-searches-query.ts"
)]
pub struct TopSearchesQuery {
    pub limit: Option<usize>,
}

fn default_page() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use picsearch_domain::{HistoryEntry, HistoryRecord};

    use super::HistoryResponse;

    #[test]
    fn history_response_keeps_terms_and_timestamps_aligned() {
        let mut record = HistoryRecord::empty("github:1");
        let observed_at = Utc
            .with_ymd_and_hms(2024, 5, 1, 12, 30, 0)
            .single()
            .unwrap_or_else(|| unreachable!());
        record.append(HistoryEntry::new("Dog ", observed_at));

        let response = HistoryResponse::from(record);
        assert_eq!(response.terms, vec!["Dog "]);
        assert_eq!(response.time_stamp, vec!["2024-05-01T12:30:00.000Z"]);
    }

    #[test]
    fn empty_record_serializes_as_empty_arrays() {
        let response = HistoryResponse::from(HistoryRecord::empty("github:1"));
        let body = serde_json::to_value(&response).unwrap_or_default();
        assert_eq!(body, serde_json::json!({ "terms": [], "time_stamp": [] }));
    }
}

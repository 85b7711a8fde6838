//! The `{ success, data, message }` wrapper every backend response uses.

use serde::Deserialize;

use crate::api::ApiError;

/// Uniform response envelope.
///
/// `success: true` carries `data`; `success: false` carries a
/// human-readable `message`.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Unwrap into the payload or the backend's rejection.
    pub fn into_result(self) -> Result<T, ApiError> {
        if !self.success {
            return Err(ApiError::Rejected(
                self.message
                    .unwrap_or_else(|| "Request was rejected".to_string()),
            ));
        }
        self.data.ok_or(ApiError::MissingData)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adgen_core::job::JobTicket;
    use assert_matches::assert_matches;

    #[test]
    fn success_yields_data() {
        let env: ApiEnvelope<JobTicket> =
            serde_json::from_str(r#"{"success":true,"data":{"job_id":"j-1"}}"#).unwrap();
        assert_eq!(env.into_result().unwrap().job_id, "j-1");
    }

    #[test]
    fn failure_yields_message() {
        let env: ApiEnvelope<JobTicket> =
            serde_json::from_str(r#"{"success":false,"message":"Not enough credits"}"#).unwrap();
        assert_matches!(env.into_result(), Err(ApiError::Rejected(m)) if m == "Not enough credits");
    }

    #[test]
    fn failure_without_message_gets_default() {
        let env: ApiEnvelope<JobTicket> = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert_matches!(env.into_result(), Err(ApiError::Rejected(m)) if !m.is_empty());
    }

    #[test]
    fn success_without_data_is_an_error() {
        let env: ApiEnvelope<JobTicket> = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert_matches!(env.into_result(), Err(ApiError::MissingData));
    }
}

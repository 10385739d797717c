//! Blocking HTTP client for the Google Docs REST API.
//!
//! Credentials are not acquired here: the caller hands over a bearer token that is already valid.

use crate::document::Document;
use crate::edit_plan::{BatchReply, EditPlan};
use crate::error::{Error, Result};
use crate::service::DocumentService;

/// Talks to `{api_base}/documents/...` with a bearer token.
pub struct GoogleDocs {
    api_base: String,
    token: String,
}

impl GoogleDocs {
    #[must_use]
    /// Client for the API rooted at `api_base`, authorized with `token`.
    pub fn new(api_base: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn url(&self, document_id: &str, suffix: &str) -> String {
        format!("{}/documents/{document_id}{suffix}", self.api_base)
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

fn service_error(error: ureq::Error) -> Error {
    match error {
        ureq::Error::Status(status, response) => Error::Service {
            status,
            message: response
                .into_string()
                .unwrap_or_else(|_| "<unreadable body>".to_string()),
        },
        ureq::Error::Transport(transport) => Error::Transport(transport.to_string()),
    }
}

impl DocumentService for GoogleDocs {
    fn fetch(&self, document_id: &str) -> Result<Document> {
        tracing::debug!(document_id, "fetching document");
        let response = ureq::get(&self.url(document_id, ""))
            .set("Authorization", &self.bearer())
            .call()
            .map_err(service_error)?;
        Ok(response.into_json::<Document>()?)
    }

    fn apply(&mut self, document_id: &str, plan: EditPlan) -> Result<BatchReply> {
        tracing::debug!(
            document_id,
            requests = plan.len(),
            revision = plan.required_revision(),
            "applying batch"
        );
        let response = ureq::post(&self.url(document_id, ":batchUpdate"))
            .set("Authorization", &self.bearer())
            .send_json(&plan)
            .map_err(service_error)?;
        Ok(response.into_json::<BatchReply>()?)
    }
}

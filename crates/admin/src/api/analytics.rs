//! Dashboard analytics.

use tracing::instrument;

use super::{AdminApiClient, ApiError};
use crate::models::AnalyticsSummary;

impl AdminApiClient {
    /// `GET /admin/analytics`
    #[instrument(skip(self))]
    pub async fn analytics(&self) -> Result<AnalyticsSummary, ApiError> {
        self.get_json("/admin/analytics").await
    }
}

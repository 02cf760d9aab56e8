//! `Database` trait — single async interface for all persistence.

use async_trait::async_trait;

use crate::dashboard::model::{Campaign, PerformanceMetric};
use crate::error::DatabaseError;
use crate::profile::BusinessProfile;

/// Backend-agnostic database trait covering profiles, campaigns and
/// performance metrics.
#[async_trait]
pub trait Database: Send + Sync {
    /// Run all pending schema migrations.
    async fn run_migrations(&self) -> Result<(), DatabaseError>;

    // ── Profiles ────────────────────────────────────────────────────

    /// Get the profile owned by a user.
    async fn get_profile(&self, user_id: &str) -> Result<Option<BusinessProfile>, DatabaseError>;

    /// Insert a profile, or replace the editable columns of the row with
    /// the same `user_id`.
    async fn upsert_profile(&self, profile: &BusinessProfile) -> Result<(), DatabaseError>;

    // ── Campaigns ───────────────────────────────────────────────────

    async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), DatabaseError>;

    /// Campaigns owned by a user, oldest first.
    async fn list_campaigns(&self, user_id: &str) -> Result<Vec<Campaign>, DatabaseError>;

    // ── Performance metrics ─────────────────────────────────────────

    async fn insert_metric(&self, metric: &PerformanceMetric) -> Result<(), DatabaseError>;

    /// Metrics across every campaign a user owns.
    async fn list_metrics_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<PerformanceMetric>, DatabaseError>;
}

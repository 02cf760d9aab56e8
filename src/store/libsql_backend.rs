//! `Database` over libSQL: a local file in production, `:memory:` in tests.
//!
//! Timestamps are RFC 3339 text, money is decimal text, and list columns
//! hold JSON arrays.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use crate::dashboard::model::{Campaign, CampaignStatus, PerformanceMetric};
use crate::error::DatabaseError;
use crate::profile::BusinessProfile;
use crate::store::migrations;
use crate::store::traits::Database;

/// Store backed by one shared libSQL connection.
pub struct LibSqlBackend {
    // Owns the handle the connection was opened from.
    _db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open the file at `path`, creating parent directories as needed, and
    /// bring its schema up to date.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("create_dir_all {}: {e}", parent.display()))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("open {}: {e}", path.display())))?;

        let backend = Self::from_database(db)?;
        backend.run_migrations().await?;
        info!(path = %path.display(), "Store ready");
        Ok(backend)
    }

    /// Fresh in-memory store with the full schema.
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("open :memory: {e}")))?;

        let backend = Self::from_database(db)?;
        backend.run_migrations().await?;
        Ok(backend)
    }

    fn from_database(db: LibSqlDatabase) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("connect: {e}")))?;
        Ok(Self {
            _db: Arc::new(db),
            conn,
        })
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Column decoding ─────────────────────────────────────────────────

/// RFC 3339 as written by this store, or SQLite's `datetime('now')` form.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn parse_decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap_or(Decimal::ZERO)
}

fn to_json_list(items: &[String]) -> Result<String, DatabaseError> {
    serde_json::to_string(items).map_err(|e| DatabaseError::Serialization(e.to_string()))
}

fn from_json_list(s: Option<String>) -> Vec<String> {
    s.and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

fn parse_uuid(row: &libsql::Row, idx: i32, what: &str) -> Result<Uuid, DatabaseError> {
    let s: String = row
        .get(idx)
        .map_err(|e| DatabaseError::Query(format!("{what}: {e}")))?;
    Uuid::parse_str(&s).map_err(|e| DatabaseError::Query(format!("{what} parse: {e}")))
}

// ── Row mapping ─────────────────────────────────────────────────────

/// Column list for profile SELECT queries (14 columns).
const PROFILE_COLUMNS: &str = "id, user_id, business_name, owner_name, industry, phone, address, business_goals, target_radius, target_age_min, target_age_max, target_audience, created_at, updated_at";

fn row_to_profile(row: &libsql::Row) -> Result<BusinessProfile, DatabaseError> {
    let id = parse_uuid(row, 0, "profile.id")?;
    let user_id: String = row
        .get(1)
        .map_err(|e| DatabaseError::Query(format!("profile.user_id: {e}")))?;
    let business_name: String = row.get(2).unwrap_or_default();
    let owner_name: String = row.get(3).unwrap_or_default();
    let industry: String = row.get(4).unwrap_or_default();
    let phone: Option<String> = row.get(5).ok();
    let address: Option<String> = row.get(6).ok();
    let business_goals = from_json_list(row.get(7).ok());
    let target_radius = row.get::<i64>(8).ok().map(|v| v as u32);
    let target_age_min = row.get::<i64>(9).ok().map(|v| v as u32);
    let target_age_max = row.get::<i64>(10).ok().map(|v| v as u32);
    let target_audience = from_json_list(row.get(11).ok());
    let created_str: String = row.get(12).unwrap_or_default();
    let updated_str: String = row.get(13).unwrap_or_default();

    Ok(BusinessProfile {
        id,
        user_id,
        business_name,
        owner_name,
        industry,
        phone,
        address,
        business_goals,
        target_radius,
        target_age_min,
        target_age_max,
        target_audience,
        created_at: parse_datetime(&created_str),
        updated_at: parse_datetime(&updated_str),
    })
}

/// Column list for campaign SELECT queries (10 columns).
const CAMPAIGN_COLUMNS: &str = "id, user_id, name, status, budget_amount, phone_number, website_url, start_date, created_at, updated_at";

fn row_to_campaign(row: &libsql::Row) -> Result<Campaign, DatabaseError> {
    let id = parse_uuid(row, 0, "campaign.id")?;
    let user_id: String = row
        .get(1)
        .map_err(|e| DatabaseError::Query(format!("campaign.user_id: {e}")))?;
    let name: String = row.get(2).unwrap_or_default();
    let status_str: String = row.get(3).unwrap_or_else(|_| "draft".to_string());
    let status = CampaignStatus::from_str(&status_str).unwrap_or_default();
    let budget_amount = row
        .get::<String>(4)
        .ok()
        .and_then(|s| Decimal::from_str(&s).ok());
    let phone_number: Option<String> = row.get(5).ok();
    let website_url: Option<String> = row.get(6).ok();
    let start_date = row.get::<String>(7).ok().and_then(|s| parse_date(&s));
    let created_str: String = row.get(8).unwrap_or_default();
    let updated_str: String = row.get(9).unwrap_or_default();

    Ok(Campaign {
        id,
        user_id,
        name,
        status,
        budget_amount,
        phone_number,
        website_url,
        start_date,
        created_at: parse_datetime(&created_str),
        updated_at: parse_datetime(&updated_str),
    })
}

/// Column list for metric SELECT queries (9 columns).
const METRIC_COLUMNS: &str =
    "id, campaign_id, date, impressions, clicks, calls, conversions, cost, created_at";

fn row_to_metric(row: &libsql::Row) -> Result<PerformanceMetric, DatabaseError> {
    let id = parse_uuid(row, 0, "metric.id")?;
    let campaign_id = parse_uuid(row, 1, "metric.campaign_id")?;
    let date_str: String = row
        .get(2)
        .map_err(|e| DatabaseError::Query(format!("metric.date: {e}")))?;
    let date = parse_date(&date_str)
        .ok_or_else(|| DatabaseError::Query(format!("metric.date parse: {date_str}")))?;
    let cost_str: String = row.get(7).unwrap_or_else(|_| "0".to_string());
    let created_str: String = row.get(8).unwrap_or_default();

    Ok(PerformanceMetric {
        id,
        campaign_id,
        date,
        impressions: row.get(3).unwrap_or(0),
        clicks: row.get(4).unwrap_or(0),
        calls: row.get(5).unwrap_or(0),
        conversions: row.get(6).unwrap_or(0),
        cost: parse_decimal(&cost_str),
        created_at: parse_datetime(&created_str),
    })
}

#[async_trait]
impl Database for LibSqlBackend {
    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        migrations::run_migrations(self.conn()).await
    }

    // ── Profiles ────────────────────────────────────────────────────

    async fn get_profile(&self, user_id: &str) -> Result<Option<BusinessProfile>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = ?1"),
                params![user_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_profile: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_profile(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_profile row: {e}"))),
        }
    }

    async fn upsert_profile(&self, profile: &BusinessProfile) -> Result<(), DatabaseError> {
        let goals = to_json_list(&profile.business_goals)?;
        let audience = to_json_list(&profile.target_audience)?;

        self.conn()
            .execute(
                "INSERT INTO profiles (id, user_id, business_name, owner_name, industry, phone, address, business_goals, target_radius, target_age_min, target_age_max, target_audience, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                 ON CONFLICT(user_id) DO UPDATE SET
                    business_name = excluded.business_name,
                    owner_name = excluded.owner_name,
                    industry = excluded.industry,
                    phone = excluded.phone,
                    address = excluded.address,
                    business_goals = excluded.business_goals,
                    target_radius = excluded.target_radius,
                    target_age_min = excluded.target_age_min,
                    target_age_max = excluded.target_age_max,
                    target_audience = excluded.target_audience,
                    updated_at = excluded.updated_at",
                params![
                    profile.id.to_string(),
                    profile.user_id.as_str(),
                    profile.business_name.as_str(),
                    profile.owner_name.as_str(),
                    profile.industry.as_str(),
                    profile.phone.as_deref(),
                    profile.address.as_deref(),
                    goals,
                    profile.target_radius.map(i64::from),
                    profile.target_age_min.map(i64::from),
                    profile.target_age_max.map(i64::from),
                    audience,
                    profile.created_at.to_rfc3339(),
                    profile.updated_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("upsert_profile: {e}")))?;
        debug!(user_id = %profile.user_id, "Profile upserted");
        Ok(())
    }

    // ── Campaigns ───────────────────────────────────────────────────

    async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO campaigns (id, user_id, name, status, budget_amount, phone_number, website_url, start_date, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    campaign.id.to_string(),
                    campaign.user_id.as_str(),
                    campaign.name.as_str(),
                    campaign.status.as_str(),
                    campaign.budget_amount.map(|b| b.to_string()),
                    campaign.phone_number.as_deref(),
                    campaign.website_url.as_deref(),
                    campaign.start_date.map(|d| d.format("%Y-%m-%d").to_string()),
                    campaign.created_at.to_rfc3339(),
                    campaign.updated_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("insert_campaign: {e}")))?;
        debug!(id = %campaign.id, "Campaign inserted");
        Ok(())
    }

    async fn list_campaigns(&self, user_id: &str) -> Result<Vec<Campaign>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE user_id = ?1 ORDER BY created_at ASC"
                ),
                params![user_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_campaigns: {e}")))?;

        let mut campaigns = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("list_campaigns row: {e}")))?
        {
            campaigns.push(row_to_campaign(&row)?);
        }
        Ok(campaigns)
    }

    // ── Performance metrics ─────────────────────────────────────────

    async fn insert_metric(&self, metric: &PerformanceMetric) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO performance_metrics (id, campaign_id, date, impressions, clicks, calls, conversions, cost, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    metric.id.to_string(),
                    metric.campaign_id.to_string(),
                    metric.date.format("%Y-%m-%d").to_string(),
                    metric.impressions,
                    metric.clicks,
                    metric.calls,
                    metric.conversions,
                    metric.cost.to_string(),
                    metric.created_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("insert_metric: {e}")))?;
        Ok(())
    }

    async fn list_metrics_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<PerformanceMetric>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT m.id, m.campaign_id, m.date, m.impressions, m.clicks, m.calls, m.conversions, m.cost, m.created_at
                 FROM performance_metrics m
                 JOIN campaigns c ON c.id = m.campaign_id
                 WHERE c.user_id = ?1
                 ORDER BY m.date ASC",
                params![user_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_metrics_for_user: {e}")))?;

        let mut metrics = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("list_metrics_for_user row: {e}")))?
        {
            metrics.push(row_to_metric(&row)?);
        }
        Ok(metrics)
    }
}

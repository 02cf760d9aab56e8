//! Campaign and performance data model.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    #[default]
    Draft,
    Active,
    Paused,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Paused => "paused",
        }
    }
}

impl std::str::FromStr for CampaignStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            "paused" => Ok(Self::Paused),
            other => Err(format!("Unknown campaign status: {other}")),
        }
    }
}

/// An advertising campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub status: CampaignStatus,
    /// Monthly budget; unset until the owner picks one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    /// New draft campaign.
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            name: name.into(),
            status: CampaignStatus::Draft,
            budget_amount: None,
            phone_number: None,
            website_url: None,
            start_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder: set status.
    pub fn with_status(mut self, status: CampaignStatus) -> Self {
        self.status = status;
        self
    }

    /// Builder: set budget.
    pub fn with_budget(mut self, amount: Decimal) -> Self {
        self.budget_amount = Some(amount);
        self
    }

    pub fn with_phone_number(mut self, phone: impl Into<String>) -> Self {
        self.phone_number = Some(phone.into());
        self
    }

    pub fn with_website_url(mut self, url: impl Into<String>) -> Self {
        self.website_url = Some(url.into());
        self
    }

    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    /// A destination for leads has been set.
    pub fn is_configured(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.website_url) || present(&self.phone_number)
    }

    pub fn has_budget(&self) -> bool {
        self.budget_amount.is_some_and(|b| b > Decimal::ZERO)
    }
}

/// One day of results for one campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetric {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub date: NaiveDate,
    pub impressions: i64,
    pub clicks: i64,
    pub calls: i64,
    pub conversions: i64,
    pub cost: Decimal,
    pub created_at: DateTime<Utc>,
}

impl PerformanceMetric {
    /// Empty metric row for a campaign and day.
    pub fn new(campaign_id: Uuid, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            campaign_id,
            date,
            impressions: 0,
            clicks: 0,
            calls: 0,
            conversions: 0,
            cost: Decimal::ZERO,
            created_at: Utc::now(),
        }
    }

    /// Builder: set the counters.
    pub fn with_counts(mut self, impressions: i64, clicks: i64, calls: i64, conversions: i64) -> Self {
        self.impressions = impressions;
        self.clicks = clicks;
        self.calls = calls;
        self.conversions = conversions;
        self
    }

    pub fn with_cost(mut self, cost: Decimal) -> Self {
        self.cost = cost;
        self
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn new_campaign_is_draft() {
        let c = Campaign::new("u1", "Local Dining");
        assert_eq!(c.status, CampaignStatus::Draft);
        assert!(!c.is_configured());
        assert!(!c.has_budget());
    }

    #[test]
    fn configured_needs_non_blank_destination() {
        assert!(!Campaign::new("u1", "c").with_website_url("  ").is_configured());
        assert!(Campaign::new("u1", "c").with_phone_number("555-0100").is_configured());
    }

    #[test]
    fn zero_budget_is_not_set() {
        assert!(!Campaign::new("u1", "c").with_budget(dec!(0)).has_budget());
        assert!(Campaign::new("u1", "c").with_budget(dec!(300)).has_budget());
    }

    #[test]
    fn status_roundtrips_through_str() {
        for status in [CampaignStatus::Draft, CampaignStatus::Active, CampaignStatus::Paused] {
            assert_eq!(status.as_str().parse::<CampaignStatus>().unwrap(), status);
        }
        assert!("archived".parse::<CampaignStatus>().is_err());
    }
}

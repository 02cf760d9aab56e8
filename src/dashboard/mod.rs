//! Dashboard summary for a signed-in business owner.

pub mod model;

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::error::DatabaseError;
use crate::profile::BusinessProfile;
use crate::store::Database;

pub use model::{Campaign, CampaignStatus, PerformanceMetric};

/// Aggregated results across every campaign.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricTotals {
    pub impressions: i64,
    pub clicks: i64,
    pub calls: i64,
    pub conversions: i64,
    pub cost: Decimal,
    /// Cost divided by calls plus conversions, to the cent. None without leads.
    pub cost_per_lead: Option<Decimal>,
    /// Sum of campaign budgets.
    pub budget_total: Decimal,
    /// Whole percent of the budget spent. None without a budget.
    pub budget_used_percent: Option<u32>,
}

impl MetricTotals {
    pub fn from_metrics(metrics: &[PerformanceMetric], campaigns: &[Campaign]) -> Self {
        let mut totals = metrics.iter().fold(Self::default(), |mut acc, m| {
            acc.impressions = acc.impressions.saturating_add(m.impressions);
            acc.clicks = acc.clicks.saturating_add(m.clicks);
            acc.calls = acc.calls.saturating_add(m.calls);
            acc.conversions = acc.conversions.saturating_add(m.conversions);
            acc.cost = acc.cost.saturating_add(m.cost);
            acc
        });

        let leads = totals.calls.saturating_add(totals.conversions);
        if leads > 0 {
            totals.cost_per_lead = Some((totals.cost / Decimal::from(leads)).round_dp(2));
        }

        totals.budget_total = campaigns
            .iter()
            .filter_map(|c| c.budget_amount)
            .fold(Decimal::ZERO, Decimal::saturating_add);
        if totals.budget_total > Decimal::ZERO {
            let percent = (totals.cost / totals.budget_total * Decimal::ONE_HUNDRED).round();
            totals.budget_used_percent = percent.to_u32();
        }
        totals
    }
}

/// One entry of the launch checklist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextStep {
    pub title: &'static str,
    pub description: &'static str,
    pub completed: bool,
}

/// Launch checklist, derived from campaign state.
pub fn next_steps(campaigns: &[Campaign]) -> Vec<NextStep> {
    vec![
        NextStep {
            title: "Complete campaign setup",
            description: "Finish configuring your first campaign",
            completed: campaigns.iter().any(Campaign::is_configured),
        },
        NextStep {
            title: "Set advertising budget",
            description: "Choose your monthly advertising spend",
            completed: campaigns.iter().any(Campaign::has_budget),
        },
        NextStep {
            title: "Launch campaigns",
            description: "Go live with your Google Ads",
            completed: campaigns
                .iter()
                .any(|c| c.status == CampaignStatus::Active),
        },
    ]
}

/// Everything the dashboard page shows.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub owner_name: String,
    pub business_name: String,
    pub metrics: MetricTotals,
    pub campaigns: Vec<Campaign>,
    pub next_steps: Vec<NextStep>,
}

impl DashboardSummary {
    pub fn build(
        profile: Option<&BusinessProfile>,
        campaigns: Vec<Campaign>,
        metrics: &[PerformanceMetric],
    ) -> Self {
        Self {
            owner_name: profile.map(|p| p.owner_name.clone()).unwrap_or_default(),
            business_name: profile.map(|p| p.business_name.clone()).unwrap_or_default(),
            metrics: MetricTotals::from_metrics(metrics, &campaigns),
            next_steps: next_steps(&campaigns),
            campaigns,
        }
    }
}

/// Loads dashboard data for a user.
pub struct DashboardService {
    db: Arc<dyn Database>,
}

impl DashboardService {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    pub async fn summary(&self, user_id: &str) -> Result<DashboardSummary, DatabaseError> {
        let profile = self.db.get_profile(user_id).await?;
        let campaigns = self.db.list_campaigns(user_id).await?;
        let metrics = self.db.list_metrics_for_user(user_id).await?;
        Ok(DashboardSummary::build(profile.as_ref(), campaigns, &metrics))
    }
}

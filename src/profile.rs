//! Business profile: the persisted record, the edit form, and the service
//! that loads and saves it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::SignUpMetadata;
use crate::error::DatabaseError;
use crate::store::Database;

pub const PROFILE_SAVED_MESSAGE: &str = "Profile updated successfully!";
pub const PROFILE_SAVE_FAILED_MESSAGE: &str = "Failed to update profile. Please try again.";

/// A business's profile row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessProfile {
    pub id: Uuid,
    /// Owning auth user; one profile per user.
    pub user_id: String,
    pub business_name: String,
    pub owner_name: String,
    /// Free text; the signup catalog value when seeded from signup.
    pub industry: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default)]
    pub business_goals: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_radius: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_age_min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_age_max: Option<u32>,
    #[serde(default)]
    pub target_audience: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BusinessProfile {
    pub fn new(user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            business_name: String::new(),
            owner_name: String::new(),
            industry: String::new(),
            phone: None,
            address: None,
            business_goals: Vec::new(),
            target_radius: None,
            target_age_min: None,
            target_age_max: None,
            target_audience: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Initial row for a freshly created account.
    pub fn from_signup(user_id: impl Into<String>, metadata: &SignUpMetadata) -> Self {
        let mut profile = Self::new(user_id);
        profile.business_name = metadata.business_name.clone();
        profile.owner_name = metadata.owner_name.clone();
        profile.industry = metadata.industry.clone();
        profile.phone = non_empty(&metadata.phone);
        profile
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Profile page form. Goals are edited as comma-separated text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    /// Display only; never written back.
    pub email: String,
    pub owner_name: String,
    pub business_name: String,
    pub industry: String,
    pub phone: String,
    pub address: String,
    pub business_goals: String,
}

impl ProfileForm {
    pub fn from_profile(profile: &BusinessProfile, email: &str) -> Self {
        Self {
            email: email.to_string(),
            owner_name: profile.owner_name.clone(),
            business_name: profile.business_name.clone(),
            industry: profile.industry.clone(),
            phone: profile.phone.clone().unwrap_or_default(),
            address: profile.address.clone().unwrap_or_default(),
            business_goals: profile.business_goals.join(", "),
        }
    }

    /// Split the goals text on commas, trimming and dropping empties.
    pub fn parse_goals(&self) -> Vec<String> {
        self.business_goals
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(String::from)
            .collect()
    }

    /// Copy the editable fields onto a profile.
    pub fn apply_to(&self, profile: &mut BusinessProfile) {
        profile.owner_name = self.owner_name.trim().to_string();
        profile.business_name = self.business_name.trim().to_string();
        profile.industry = self.industry.trim().to_string();
        profile.phone = non_empty(&self.phone);
        profile.address = non_empty(&self.address);
        profile.business_goals = self.parse_goals();
        profile.updated_at = Utc::now();
    }
}

/// Loads and saves profiles.
pub struct ProfileService {
    db: Arc<dyn Database>,
}

impl ProfileService {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    /// Edit form for a user. A missing row yields an empty form carrying
    /// only the email.
    pub async fn load_form(&self, user_id: &str, email: &str) -> Result<ProfileForm, DatabaseError> {
        match self.db.get_profile(user_id).await? {
            Some(profile) => Ok(ProfileForm::from_profile(&profile, email)),
            None => {
                debug!(user_id = user_id, "No profile yet");
                Ok(ProfileForm {
                    email: email.to_string(),
                    ..Default::default()
                })
            }
        }
    }

    /// Apply a submitted form and upsert the row.
    pub async fn save_form(
        &self,
        user_id: &str,
        form: &ProfileForm,
    ) -> Result<BusinessProfile, DatabaseError> {
        let mut profile = self
            .db
            .get_profile(user_id)
            .await?
            .unwrap_or_else(|| BusinessProfile::new(user_id));
        form.apply_to(&mut profile);
        self.db.upsert_profile(&profile).await?;
        info!(user_id = user_id, "Profile saved");
        Ok(profile)
    }

    /// Create the initial row for a new account. An existing row is left
    /// untouched; returns whether a row was written.
    pub async fn seed_from_signup(
        &self,
        user_id: &str,
        metadata: &SignUpMetadata,
    ) -> Result<bool, DatabaseError> {
        if self.db.get_profile(user_id).await?.is_some() {
            return Ok(false);
        }
        self.db
            .upsert_profile(&BusinessProfile::from_signup(user_id, metadata))
            .await?;
        info!(user_id = user_id, "Profile seeded from signup");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LibSqlBackend;

    async fn service() -> ProfileService {
        ProfileService::new(Arc::new(LibSqlBackend::new_memory().await.unwrap()))
    }

    fn metadata() -> SignUpMetadata {
        SignUpMetadata {
            business_name: "Joe's Pizza".into(),
            owner_name: "Joe".into(),
            industry: "restaurant".into(),
            phone: String::new(),
            promo_code: String::new(),
        }
    }

    #[test]
    fn goals_split_trim_and_drop_empties() {
        let form = ProfileForm {
            business_goals: " Increase phone calls, ,Drive website traffic ,".into(),
            ..Default::default()
        };
        assert_eq!(
            form.parse_goals(),
            vec!["Increase phone calls", "Drive website traffic"]
        );
        assert!(ProfileForm::default().parse_goals().is_empty());
    }

    #[test]
    fn form_joins_goals() {
        let mut profile = BusinessProfile::new("u1");
        profile.business_goals = vec!["A".into(), "B".into()];
        let form = ProfileForm::from_profile(&profile, "joe@x.com");
        assert_eq!(form.business_goals, "A, B");
        assert_eq!(form.email, "joe@x.com");
    }

    #[test]
    fn seeded_profile_drops_blank_phone() {
        let profile = BusinessProfile::from_signup("u1", &metadata());
        assert_eq!(profile.business_name, "Joe's Pizza");
        assert_eq!(profile.industry, "restaurant");
        assert!(profile.phone.is_none());
    }

    #[tokio::test]
    async fn missing_profile_gives_email_only_form() {
        let svc = service().await;
        let form = svc.load_form("nobody", "joe@x.com").await.unwrap();
        assert_eq!(
            form,
            ProfileForm {
                email: "joe@x.com".into(),
                ..Default::default()
            }
        );
    }

    #[tokio::test]
    async fn save_then_load() {
        let svc = service().await;
        let form = ProfileForm {
            email: "ignored@x.com".into(),
            owner_name: "Joe".into(),
            business_name: "Joe's Pizza".into(),
            industry: "Restaurant".into(),
            phone: "555-0100".into(),
            address: "1 Main St".into(),
            business_goals: "Increase phone calls, Build brand awareness".into(),
        };
        let saved = svc.save_form("u1", &form).await.unwrap();
        assert_eq!(saved.business_goals.len(), 2);

        let loaded = svc.load_form("u1", "joe@x.com").await.unwrap();
        assert_eq!(loaded.email, "joe@x.com");
        assert_eq!(loaded.address, "1 Main St");
        assert_eq!(
            loaded.business_goals,
            "Increase phone calls, Build brand awareness"
        );
    }

    #[tokio::test]
    async fn seed_does_not_overwrite() {
        let svc = service().await;
        assert!(svc.seed_from_signup("u1", &metadata()).await.unwrap());

        let form = ProfileForm {
            owner_name: "Joseph".into(),
            business_name: "Joe's Pizza".into(),
            ..Default::default()
        };
        svc.save_form("u1", &form).await.unwrap();

        assert!(!svc.seed_from_signup("u1", &metadata()).await.unwrap());
        let loaded = svc.load_form("u1", "").await.unwrap();
        assert_eq!(loaded.owner_name, "Joseph");
    }
}

//! SignupWizard — owns the form state of one signup attempt, validates
//! transitions, and creates the account at the Account → Subscription
//! boundary.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::model::{
    AccountFields, AccountView, AgeRange, BusinessGoal, FieldUpdate, PlatformPlan, ProfileFields,
    TargetAudience, TargetRadius, WELCOME_CHECKLIST, platform_plan, toggle,
};
use super::state::{StepMarker, SignupStep, TOTAL_STEPS, step_indicator};
use crate::auth::{AuthContext, Session, SignUpMetadata};
use crate::error::{AuthError, SignupError};

pub const MISSING_CREDENTIALS_MESSAGE: &str = "Email and password are required";
pub const MISSING_NAMES_MESSAGE: &str = "Business name and owner name are required";

/// Everything the wizard has collected so far.
#[derive(Debug, Default)]
pub struct WizardState {
    pub current_step: SignupStep,
    pub account: AccountFields,
    pub profile: ProfileFields,
    /// Banner text from the last failed transition.
    pub error: Option<String>,
    /// True only while account creation is in flight.
    pub submitting: bool,
    /// User ID of the account created by this wizard. Once set, account
    /// fields are read-only and Step 1 no longer calls the auth service.
    pub account_user_id: Option<String>,
}

/// Arguments for one account-creation call.
pub struct SignupSubmission {
    pub email: String,
    pub password: SecretString,
    pub metadata: SignUpMetadata,
}

/// First half of a forward transition.
pub enum AdvancePlan {
    /// Account creation must run before the wizard can move on.
    Submit(SignupSubmission),
    /// The transition finished without a remote call; carries the
    /// resulting step.
    Moved(SignupStep),
}

/// Result of a forward transition on a shared wizard.
#[derive(Debug, PartialEq)]
pub struct Advanced {
    pub step: SignupStep,
    /// Set when this transition created the account; carries exactly what
    /// was sent to the auth service.
    pub created: Option<CreatedAccount>,
}

#[derive(Debug, PartialEq)]
pub struct CreatedAccount {
    pub user_id: String,
    pub metadata: SignUpMetadata,
}

/// Signup wizard controller.
pub struct SignupWizard {
    state: WizardState,
    auth: Arc<AuthContext>,
}

impl SignupWizard {
    pub fn new(auth: Arc<AuthContext>) -> Self {
        Self {
            state: WizardState::default(),
            auth,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn current_step(&self) -> SignupStep {
        self.state.current_step
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.state.submitting
    }

    pub fn account_created(&self) -> bool {
        self.state.account_user_id.is_some()
    }

    /// Replace one field. Returns false when the update was ignored: on the
    /// terminal step, or for account fields once account creation has
    /// started.
    pub fn update_field(&mut self, update: FieldUpdate) -> bool {
        if self.state.current_step.is_terminal() {
            debug!("Ignoring field update on terminal step");
            return false;
        }
        if update.is_account_field() && (self.state.submitting || self.account_created()) {
            debug!("Ignoring account field update after account creation started");
            return false;
        }

        let account = &mut self.state.account;
        let profile = &mut self.state.profile;
        match update {
            FieldUpdate::BusinessName(v) => account.business_name = v,
            FieldUpdate::OwnerName(v) => account.owner_name = v,
            FieldUpdate::Email(v) => account.email = v,
            FieldUpdate::Password(v) => account.password = v,
            FieldUpdate::Industry(v) => account.industry = v,
            FieldUpdate::Phone(v) => account.phone = v,
            FieldUpdate::PromoCode(v) => account.promo_code = v.filter(|s| !s.is_empty()),
            FieldUpdate::Address(v) => profile.address = v,
            FieldUpdate::TargetRadius(miles) => profile.target_radius = TargetRadius::new(miles),
            FieldUpdate::TargetAge([a, b]) => profile.target_age = AgeRange::new(a, b),
        }
        true
    }

    /// Flip a business goal. Returns whether it is selected afterwards.
    pub fn toggle_business_goal(&mut self, goal: BusinessGoal) -> bool {
        let goals = &mut self.state.profile.business_goals;
        if self.state.current_step.is_terminal() {
            return goals.contains(&goal);
        }
        toggle(goals, goal)
    }

    /// Flip a target audience. Returns whether it is selected afterwards.
    pub fn toggle_target_audience(&mut self, audience: TargetAudience) -> bool {
        let audiences = &mut self.state.profile.target_audience;
        if self.state.current_step.is_terminal() {
            return audiences.contains(&audience);
        }
        toggle(audiences, audience)
    }

    /// Start a forward transition.
    ///
    /// From Account this validates the required fields and, if the account
    /// does not exist yet, marks the wizard as submitting and hands back the
    /// account-creation arguments. Every other step moves immediately.
    pub fn begin_advance(&mut self) -> Result<AdvancePlan, SignupError> {
        if self.state.submitting {
            return Err(SignupError::InProgress);
        }
        self.state.error = None;

        match self.state.current_step {
            SignupStep::Account => {
                if self.account_created() {
                    return Ok(AdvancePlan::Moved(self.move_forward()));
                }
                let submission = self.validate_account()?;
                self.state.submitting = true;
                Ok(AdvancePlan::Submit(submission))
            }
            SignupStep::Subscription | SignupStep::Profile => {
                Ok(AdvancePlan::Moved(self.move_forward()))
            }
            SignupStep::Welcome => Ok(AdvancePlan::Moved(SignupStep::Welcome)),
        }
    }

    /// Finish a transition started by `begin_advance` with the result of
    /// account creation.
    pub fn complete_submission(
        &mut self,
        outcome: Result<Arc<Session>, AuthError>,
    ) -> Result<SignupStep, SignupError> {
        self.state.submitting = false;
        match outcome {
            Ok(session) => {
                self.state.error = None;
                self.state.account_user_id = Some(session.user.id.clone());
                if self.state.current_step == SignupStep::Account {
                    self.move_forward();
                }
                Ok(self.state.current_step)
            }
            Err(e) => {
                let message = e.user_message();
                warn!(error = %e, "Account creation failed");
                self.state.error = Some(message.clone());
                Err(SignupError::Remote(message))
            }
        }
    }

    /// Move one step forward, creating the account when leaving Step 1.
    pub async fn advance(&mut self) -> Result<SignupStep, SignupError> {
        match self.begin_advance()? {
            AdvancePlan::Moved(step) => Ok(step),
            AdvancePlan::Submit(submission) => {
                let outcome = self
                    .auth
                    .sign_up(&submission.email, &submission.password, &submission.metadata)
                    .await;
                self.complete_submission(outcome)
            }
        }
    }

    /// `advance` for a wizard shared behind a lock.
    ///
    /// The lock is released while account creation is in flight; a second
    /// forward action during that window gets `InProgress`.
    pub async fn advance_shared(wizard: &Mutex<SignupWizard>) -> Result<Advanced, SignupError> {
        let (submission, auth) = {
            let mut guard = wizard.lock().await;
            match guard.begin_advance()? {
                AdvancePlan::Moved(step) => return Ok(Advanced { step, created: None }),
                AdvancePlan::Submit(submission) => (submission, Arc::clone(&guard.auth)),
            }
        };

        let outcome = auth
            .sign_up(&submission.email, &submission.password, &submission.metadata)
            .await;
        let user_id = outcome.as_ref().ok().map(|session| session.user.id.clone());

        let step = wizard.lock().await.complete_submission(outcome)?;
        Ok(Advanced {
            step,
            created: user_id.map(|user_id| CreatedAccount {
                user_id,
                metadata: submission.metadata,
            }),
        })
    }

    /// Move one step back. No-op on the first step.
    pub fn retreat(&mut self) -> SignupStep {
        self.state.error = None;
        if let Some(prev) = self.state.current_step.previous() {
            self.move_to(prev);
        }
        self.state.current_step
    }

    fn move_forward(&mut self) -> SignupStep {
        if let Some(next) = self.state.current_step.next() {
            self.move_to(next);
        }
        self.state.current_step
    }

    fn move_to(&mut self, target: SignupStep) {
        debug_assert!(self.state.current_step.can_transition_to(target));
        info!(from = %self.state.current_step, to = %target, "Signup step changed");
        self.state.current_step = target;
    }

    fn validate_account(&mut self) -> Result<SignupSubmission, SignupError> {
        let account = &self.state.account;
        let message = if account.email.trim().is_empty() || account.password_is_empty() {
            Some(MISSING_CREDENTIALS_MESSAGE)
        } else if account.business_name.trim().is_empty() || account.owner_name.trim().is_empty() {
            Some(MISSING_NAMES_MESSAGE)
        } else {
            None
        };

        if let Some(message) = message {
            debug!(reason = message, "Signup validation failed");
            self.state.error = Some(message.to_string());
            return Err(SignupError::Validation(message.to_string()));
        }

        Ok(SignupSubmission {
            email: account.email.trim().to_string(),
            password: SecretString::from(account.password.expose_secret().to_string()),
            metadata: account.metadata(),
        })
    }

    /// Snapshot for rendering.
    pub fn view(&self) -> WizardView {
        let step = self.state.current_step;
        WizardView {
            step,
            step_number: step.number(),
            total_steps: TOTAL_STEPS,
            title: step.title(),
            description: step.description(),
            indicator: step_indicator(step),
            account: self.state.account.view(),
            profile: self.state.profile.clone(),
            error: self.state.error.clone(),
            submitting: self.state.submitting,
            account_created: self.account_created(),
            can_advance: !self.state.submitting && !step.is_terminal(),
            can_retreat: step.previous().is_some(),
            advance_label: match step {
                SignupStep::Account if self.state.submitting => Some("Creating Account..."),
                SignupStep::Account | SignupStep::Profile => Some("Continue"),
                SignupStep::Subscription => Some("Subscribe & Continue"),
                SignupStep::Welcome => None,
            },
            plan: (step == SignupStep::Subscription).then(platform_plan),
            checklist: (step == SignupStep::Welcome).then(|| {
                WELCOME_CHECKLIST
                    .iter()
                    .map(|&(title, description)| ChecklistItem { title, description })
                    .collect()
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChecklistItem {
    pub title: &'static str,
    pub description: &'static str,
}

/// Serializable view of the wizard.
#[derive(Debug, Clone, Serialize)]
pub struct WizardView {
    pub step: SignupStep,
    pub step_number: u8,
    pub total_steps: u8,
    pub title: &'static str,
    pub description: &'static str,
    pub indicator: Vec<StepMarker>,
    pub account: AccountView,
    pub profile: ProfileFields,
    pub error: Option<String>,
    pub submitting: bool,
    pub account_created: bool,
    pub can_advance: bool,
    pub can_retreat: bool,
    pub advance_label: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<PlatformPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checklist: Option<Vec<ChecklistItem>>,
}

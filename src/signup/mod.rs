//! Signup wizard — four-step onboarding for a new business.
//!
//! Step 1 collects account details and creates the account through the
//! auth service. Step 2 presents the platform subscription, Step 3 collects
//! campaign targeting, and Step 4 is a terminal welcome screen. Only the
//! Step 1 → 2 transition can fail.

pub mod model;
pub mod routes;
pub mod state;
pub mod wizard;

pub use model::{
    AccountFields, AgeRange, BusinessGoal, FieldUpdate, Industry, ProfileFields, SignupCatalog,
    TargetAudience, TargetRadius, catalog,
};
pub use routes::{SignupRouteState, signup_routes};
pub use state::{SignupStep, StepMarker, TOTAL_STEPS, step_indicator};
pub use wizard::{Advanced, CreatedAccount, SignupWizard, WizardState, WizardView};

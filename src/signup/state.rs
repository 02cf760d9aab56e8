//! Signup step machine — tracks which page of the wizard is showing.

use serde::{Deserialize, Serialize};

/// Number of steps in the signup wizard.
pub const TOTAL_STEPS: u8 = 4;

/// The steps of the signup wizard.
///
/// Progresses linearly: Account → Subscription → Profile → Welcome.
/// Backward moves go one step at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignupStep {
    /// Business identity and credentials; creates the account.
    Account,
    /// Platform subscription details.
    Subscription,
    /// Targeting profile.
    Profile,
    /// Confirmation. Terminal.
    Welcome,
}

impl SignupStep {
    /// All steps in display order.
    pub const ALL: [SignupStep; TOTAL_STEPS as usize] = [
        SignupStep::Account,
        SignupStep::Subscription,
        SignupStep::Profile,
        SignupStep::Welcome,
    ];

    /// 1-based position of the step.
    pub fn number(&self) -> u8 {
        match self {
            Self::Account => 1,
            Self::Subscription => 2,
            Self::Profile => 3,
            Self::Welcome => 4,
        }
    }

    /// Step at a 1-based position.
    pub fn from_number(n: u8) -> Option<SignupStep> {
        match n {
            1 => Some(Self::Account),
            2 => Some(Self::Subscription),
            3 => Some(Self::Profile),
            4 => Some(Self::Welcome),
            _ => None,
        }
    }

    /// Check if a transition from `self` to `target` is valid.
    ///
    /// Only moves of exactly one step in either direction are allowed.
    pub fn can_transition_to(&self, target: SignupStep) -> bool {
        self.next() == Some(target) || self.previous() == Some(target)
    }

    /// Whether this step is terminal (signup is done).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Welcome)
    }

    /// Next step in the linear progression, if any.
    pub fn next(&self) -> Option<SignupStep> {
        Self::from_number(self.number() + 1)
    }

    /// Previous step, if any.
    pub fn previous(&self) -> Option<SignupStep> {
        self.number().checked_sub(1).and_then(Self::from_number)
    }

    /// Card title shown for the step.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Account => "Business Information",
            Self::Subscription => "Platform Subscription",
            Self::Profile => "Business Profile",
            Self::Welcome => "Welcome to AdsCampaign!",
        }
    }

    /// Card subtitle shown for the step.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Account => "Tell us about your business to get started",
            Self::Subscription => "Secure your platform access - no advertising budget required",
            Self::Profile => "Help us understand your customers and goals",
            Self::Welcome => "Your account is ready. Here's what happens next:",
        }
    }
}

impl Default for SignupStep {
    fn default() -> Self {
        Self::Account
    }
}

impl std::fmt::Display for SignupStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Account => "account",
            Self::Subscription => "subscription",
            Self::Profile => "profile",
            Self::Welcome => "welcome",
        };
        write!(f, "{s}")
    }
}

/// How a single marker of the step indicator is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepMarker {
    pub number: u8,
    /// Filled circle: the step is current or already passed.
    pub reached: bool,
    /// Filled connector to the next marker. Always false on the last one.
    pub connector_filled: bool,
}

/// Derive the step indicator from the current step.
pub fn step_indicator(current: SignupStep) -> Vec<StepMarker> {
    SignupStep::ALL
        .iter()
        .map(|step| StepMarker {
            number: step.number(),
            reached: step.number() <= current.number(),
            connector_filled: step.number() < TOTAL_STEPS && step.number() < current.number(),
        })
        .collect()
}

//! Signup form data: account fields, targeting profile, and the fixed
//! catalogs the wizard offers.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::auth::{SignUpMetadata, deserialize_secret};

/// Industry the business operates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Industry {
    Restaurant,
    Legal,
    Construction,
    Healthcare,
    Retail,
    Automotive,
    Education,
    Services,
}

impl Industry {
    pub const ALL: [Industry; 8] = [
        Industry::Restaurant,
        Industry::Legal,
        Industry::Construction,
        Industry::Healthcare,
        Industry::Retail,
        Industry::Automotive,
        Industry::Education,
        Industry::Services,
    ];

    /// Stored value, also the metadata value sent on account creation.
    pub fn value(&self) -> &'static str {
        match self {
            Self::Restaurant => "restaurant",
            Self::Legal => "legal",
            Self::Construction => "construction",
            Self::Healthcare => "healthcare",
            Self::Retail => "retail",
            Self::Automotive => "automotive",
            Self::Education => "education",
            Self::Services => "services",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Restaurant => "Restaurant",
            Self::Legal => "Legal Services",
            Self::Construction => "Construction",
            Self::Healthcare => "Healthcare",
            Self::Retail => "Retail",
            Self::Automotive => "Automotive",
            Self::Education => "Education",
            Self::Services => "Professional Services",
        }
    }
}

impl std::fmt::Display for Industry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// What the business wants its campaigns to achieve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BusinessGoal {
    #[serde(rename = "Increase phone calls")]
    PhoneCalls,
    #[serde(rename = "Drive website traffic")]
    WebsiteTraffic,
    #[serde(rename = "Get more appointments")]
    Appointments,
    #[serde(rename = "Boost online sales")]
    OnlineSales,
    #[serde(rename = "Increase foot traffic")]
    FootTraffic,
    #[serde(rename = "Build brand awareness")]
    BrandAwareness,
}

impl BusinessGoal {
    pub const ALL: [BusinessGoal; 6] = [
        BusinessGoal::PhoneCalls,
        BusinessGoal::WebsiteTraffic,
        BusinessGoal::Appointments,
        BusinessGoal::OnlineSales,
        BusinessGoal::FootTraffic,
        BusinessGoal::BrandAwareness,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::PhoneCalls => "Increase phone calls",
            Self::WebsiteTraffic => "Drive website traffic",
            Self::Appointments => "Get more appointments",
            Self::OnlineSales => "Boost online sales",
            Self::FootTraffic => "Increase foot traffic",
            Self::BrandAwareness => "Build brand awareness",
        }
    }
}

impl std::str::FromStr for BusinessGoal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.label() == s)
            .ok_or_else(|| format!("Unknown business goal: {s}"))
    }
}

/// Audience segments the business wants to reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetAudience {
    #[serde(rename = "Local customers")]
    LocalCustomers,
    #[serde(rename = "Business professionals")]
    BusinessProfessionals,
    #[serde(rename = "Families with children")]
    Families,
    #[serde(rename = "Young adults (18-35)")]
    YoungAdults,
    #[serde(rename = "Seniors (55+)")]
    Seniors,
    #[serde(rename = "High-income households")]
    HighIncome,
}

impl TargetAudience {
    pub const ALL: [TargetAudience; 6] = [
        TargetAudience::LocalCustomers,
        TargetAudience::BusinessProfessionals,
        TargetAudience::Families,
        TargetAudience::YoungAdults,
        TargetAudience::Seniors,
        TargetAudience::HighIncome,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::LocalCustomers => "Local customers",
            Self::BusinessProfessionals => "Business professionals",
            Self::Families => "Families with children",
            Self::YoungAdults => "Young adults (18-35)",
            Self::Seniors => "Seniors (55+)",
            Self::HighIncome => "High-income households",
        }
    }
}

impl std::str::FromStr for TargetAudience {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.label() == s)
            .ok_or_else(|| format!("Unknown target audience: {s}"))
    }
}

/// Targeting radius in miles. Always in [5, 50] on a multiple of 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct TargetRadius(u32);

impl TargetRadius {
    pub const MIN: u32 = 5;
    pub const MAX: u32 = 50;
    pub const STEP: u32 = 5;
    pub const DEFAULT: u32 = 25;

    /// Clamp into range and snap to the nearest step.
    pub fn new(miles: u32) -> Self {
        let clamped = miles.clamp(Self::MIN, Self::MAX);
        let snapped = (clamped + Self::STEP / 2) / Self::STEP * Self::STEP;
        Self(snapped.clamp(Self::MIN, Self::MAX))
    }

    pub fn miles(&self) -> u32 {
        self.0
    }
}

impl Default for TargetRadius {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl From<u32> for TargetRadius {
    fn from(miles: u32) -> Self {
        Self::new(miles)
    }
}

impl From<TargetRadius> for u32 {
    fn from(r: TargetRadius) -> Self {
        r.0
    }
}

/// Targeted age range. Both ends within [18, 70] and `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct AgeRange {
    min: u32,
    max: u32,
}

impl AgeRange {
    pub const FLOOR: u32 = 18;
    pub const CEILING: u32 = 70;

    /// Clamp both ends and swap them when given out of order.
    pub fn new(a: u32, b: u32) -> Self {
        let a = a.clamp(Self::FLOOR, Self::CEILING);
        let b = b.clamp(Self::FLOOR, Self::CEILING);
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }
}

impl Default for AgeRange {
    fn default() -> Self {
        Self { min: 25, max: 55 }
    }
}

impl From<[u32; 2]> for AgeRange {
    fn from([a, b]: [u32; 2]) -> Self {
        Self::new(a, b)
    }
}

impl From<AgeRange> for [u32; 2] {
    fn from(r: AgeRange) -> Self {
        [r.min, r.max]
    }
}

/// Step 1 fields: who the business is and how to sign in.
#[derive(Debug)]
pub struct AccountFields {
    pub business_name: String,
    pub owner_name: String,
    pub email: String,
    pub password: SecretString,
    pub industry: Option<Industry>,
    pub phone: String,
    pub promo_code: Option<String>,
}

impl Default for AccountFields {
    fn default() -> Self {
        Self {
            business_name: String::new(),
            owner_name: String::new(),
            email: String::new(),
            password: SecretString::from(String::new()),
            industry: None,
            phone: String::new(),
            promo_code: None,
        }
    }
}

impl AccountFields {
    pub fn password_is_empty(&self) -> bool {
        self.password.expose_secret().is_empty()
    }

    /// Metadata attached to the new account.
    pub fn metadata(&self) -> SignUpMetadata {
        SignUpMetadata {
            business_name: self.business_name.clone(),
            owner_name: self.owner_name.clone(),
            industry: self
                .industry
                .map(|i| i.value().to_string())
                .unwrap_or_default(),
            phone: self.phone.clone(),
            promo_code: self.promo_code.clone().unwrap_or_default(),
        }
    }

    /// Serializable copy with the password replaced by a presence flag.
    pub fn view(&self) -> AccountView {
        AccountView {
            business_name: self.business_name.clone(),
            owner_name: self.owner_name.clone(),
            email: self.email.clone(),
            password_set: !self.password_is_empty(),
            industry: self.industry,
            phone: self.phone.clone(),
            promo_code: self.promo_code.clone(),
        }
    }
}

/// Account fields as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct AccountView {
    pub business_name: String,
    pub owner_name: String,
    pub email: String,
    pub password_set: bool,
    pub industry: Option<Industry>,
    pub phone: String,
    pub promo_code: Option<String>,
}

/// Step 3 fields: who the campaigns should reach.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileFields {
    pub address: String,
    pub target_radius: TargetRadius,
    /// Insertion-ordered set.
    pub business_goals: Vec<BusinessGoal>,
    pub target_age: AgeRange,
    /// Insertion-ordered set.
    pub target_audience: Vec<TargetAudience>,
}

/// Flip membership of `item` in an insertion-ordered set.
/// Returns whether the item is present afterwards.
pub(crate) fn toggle<T: PartialEq>(set: &mut Vec<T>, item: T) -> bool {
    match set.iter().position(|x| *x == item) {
        Some(pos) => {
            set.remove(pos);
            false
        }
        None => {
            set.push(item);
            true
        }
    }
}

/// A single field replacement.
#[derive(Debug, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum FieldUpdate {
    BusinessName(String),
    OwnerName(String),
    Email(String),
    Password(#[serde(deserialize_with = "deserialize_secret")] SecretString),
    Industry(Option<Industry>),
    Phone(String),
    PromoCode(Option<String>),
    Address(String),
    TargetRadius(u32),
    TargetAge([u32; 2]),
}

impl FieldUpdate {
    /// Whether the update targets a Step 1 field.
    pub fn is_account_field(&self) -> bool {
        matches!(
            self,
            Self::BusinessName(_)
                | Self::OwnerName(_)
                | Self::Email(_)
                | Self::Password(_)
                | Self::Industry(_)
                | Self::Phone(_)
                | Self::PromoCode(_)
        )
    }
}

/// What Step 2 offers.
#[derive(Debug, Clone, Serialize)]
pub struct PlatformPlan {
    pub name: &'static str,
    pub monthly_price: Decimal,
    pub features: &'static [&'static str],
}

pub fn platform_plan() -> PlatformPlan {
    PlatformPlan {
        name: "Platform Access",
        monthly_price: dec!(150),
        features: &[
            "AI-powered campaign builder",
            "Keyword research & optimization",
            "Performance tracking & reports",
            "Mobile campaign management",
            "Expert support when needed",
            "No long-term contracts",
        ],
    }
}

/// Checklist shown on the Welcome step.
pub const WELCOME_CHECKLIST: &[(&str, &str)] = &[
    ("Account Created", "Your business profile is set up and ready"),
    ("Platform Access", "You now have full access to the campaign builder"),
    ("Build Your First Campaign", "Create your Google Ads campaign in 15 minutes"),
    ("Set Budget & Launch", "Choose your advertising budget when ready"),
];

#[derive(Debug, Clone, Serialize)]
pub struct IndustryOption {
    pub value: Industry,
    pub label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RangeBounds {
    pub min: u32,
    pub max: u32,
    pub step: u32,
}

/// Everything a client needs to render the wizard's choice controls.
#[derive(Debug, Clone, Serialize)]
pub struct SignupCatalog {
    pub industries: Vec<IndustryOption>,
    pub business_goals: Vec<&'static str>,
    pub target_audiences: Vec<&'static str>,
    pub target_radius: RangeBounds,
    pub target_age: RangeBounds,
    pub plan: PlatformPlan,
}

pub fn catalog() -> SignupCatalog {
    SignupCatalog {
        industries: Industry::ALL
            .into_iter()
            .map(|value| IndustryOption {
                value,
                label: value.label(),
            })
            .collect(),
        business_goals: BusinessGoal::ALL.iter().map(|g| g.label()).collect(),
        target_audiences: TargetAudience::ALL.iter().map(|a| a.label()).collect(),
        target_radius: RangeBounds {
            min: TargetRadius::MIN,
            max: TargetRadius::MAX,
            step: TargetRadius::STEP,
        },
        target_age: RangeBounds {
            min: AgeRange::FLOOR,
            max: AgeRange::CEILING,
            step: 1,
        },
        plan: platform_plan(),
    }
}

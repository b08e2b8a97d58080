use std::fmt;

use serde::{Serialize, Serializer};

pub const MONTHLY_PRICE_USD: f64 = 199.0;
pub const ANNUAL_UPFRONT_PRICE_USD: f64 = 1999.0;
pub const INSTALLMENT_PRICE_USD: f64 = 799.0;
pub const INSTALLMENT_COUNT: u32 = 3;

pub const DEFAULT_USD_TO_GBP: f64 = 0.8;
pub const TYPICAL_TARGET_GBP: f64 = 55_000.0;
pub const DEFAULT_MONTHS_TO_OUTCOME: i32 = 9;
pub const DEFAULT_MONTHS_IN_PROGRAM: i32 = 9;

/// Elapsed months from programme start at which net gain and ROI are reported.
pub const HORIZON_MONTHS: [i32; 3] = [12, 24, 36];

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutcomeMode {
    #[default]
    Typical,
    Custom,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlanType {
    #[default]
    Monthly,
    AnnualUpfront,
    AnnualInstallments,
}

/// Partially filled input as read from a form, a JSON payload or a shared link.
///
/// Numeric fields may carry non-finite values; [`InputState::normalize`] is the only
/// place they are defaulted.
#[derive(Debug, Clone, Default)]
pub struct RawInputState {
    pub current_salary_annual: Option<f64>,
    pub outcome_mode: Option<OutcomeMode>,
    pub custom_target_annual: Option<f64>,
    pub months_to_outcome: Option<i32>,
    pub plan_type: Option<PlanType>,
    pub months_in_program: Option<i32>,
    pub other_costs_annual: Option<f64>,
    pub usd_to_gbp_rate: Option<f64>,
}

/// Fully defaulted snapshot of the estimator inputs. Money is in GBP except where a
/// field name says otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputState {
    pub current_salary_annual: Option<f64>,
    pub outcome_mode: OutcomeMode,
    pub custom_target_annual: Option<f64>,
    pub months_to_outcome: i32,
    pub plan_type: PlanType,
    pub months_in_program: i32,
    pub other_costs_annual: f64,
    pub usd_to_gbp_rate: f64,
}

impl InputState {
    pub fn normalize(raw: RawInputState) -> Self {
        Self {
            current_salary_annual: finite(raw.current_salary_annual),
            outcome_mode: raw.outcome_mode.unwrap_or_default(),
            custom_target_annual: finite(raw.custom_target_annual),
            months_to_outcome: raw.months_to_outcome.unwrap_or(DEFAULT_MONTHS_TO_OUTCOME),
            plan_type: raw.plan_type.unwrap_or_default(),
            months_in_program: raw.months_in_program.unwrap_or(DEFAULT_MONTHS_IN_PROGRAM),
            other_costs_annual: finite(raw.other_costs_annual).unwrap_or(0.0),
            usd_to_gbp_rate: finite(raw.usd_to_gbp_rate).unwrap_or(DEFAULT_USD_TO_GBP),
        }
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::normalize(RawInputState::default())
    }
}

/// Validation and advisory messages, in the order they are generated.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Issue {
    MissingCurrentSalary,
    InvalidTargetSalary,
    TargetNotAboveCurrent,
    MonthlyPlanLimited,
}

impl Issue {
    pub fn message(self) -> &'static str {
        match self {
            Issue::MissingCurrentSalary => "Enter your current annual salary.",
            Issue::InvalidTargetSalary => "Enter a valid target salary.",
            Issue::TargetNotAboveCurrent => {
                "Your target salary is not higher than your current salary, so payback/ROI won’t be meaningful."
            }
            Issue::MonthlyPlanLimited => {
                "Monthly (Standard) is positioned for fundamentals + weekly mentoring. Full transformation requires Premium."
            }
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl Serialize for Issue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.message())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HorizonResult {
    pub horizon_months: i32,
    pub months_of_uplift: i32,
    pub net_at_horizon: f64,
    pub roi_at_horizon: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputationResult {
    pub issues: Vec<Issue>,
    pub annual_uplift: f64,
    pub monthly_uplift: f64,
    pub program_cost_usd: f64,
    pub program_cost_local: f64,
    pub total_cost_local: f64,
    pub payback_months_after_outcome: Option<f64>,
    pub break_even_months_from_today: Option<f64>,
    pub horizons: [HorizonResult; 3],
}

impl ComputationResult {
    pub fn horizon(&self, months: i32) -> Option<&HorizonResult> {
        self.horizons.iter().find(|h| h.horizon_months == months)
    }
}

pub(crate) fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Rounds halves toward positive infinity, matching how shared links have always
/// rounded money (`2.5 -> 3`, `-2.5 -> -2`).
pub(crate) fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    let rounded = if value - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    };
    // Avoid rendering "-0".
    if rounded == 0.0 { 0.0 } else { rounded }
}

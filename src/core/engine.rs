use super::types::{
    ANNUAL_UPFRONT_PRICE_USD, ComputationResult, HORIZON_MONTHS, HorizonResult,
    INSTALLMENT_COUNT, INSTALLMENT_PRICE_USD, InputState, Issue, MONTHLY_PRICE_USD,
    OutcomeMode, PlanType, TYPICAL_TARGET_GBP, finite,
};

/// Programme price in USD. A non-positive month count is not rejected here and
/// simply produces a non-positive cost.
pub fn resolve_program_cost_usd(plan_type: PlanType, months_in_program: i32) -> f64 {
    match plan_type {
        PlanType::Monthly => MONTHLY_PRICE_USD * f64::from(months_in_program),
        PlanType::AnnualUpfront => ANNUAL_UPFRONT_PRICE_USD,
        PlanType::AnnualInstallments => INSTALLMENT_PRICE_USD * f64::from(INSTALLMENT_COUNT),
    }
}

pub fn resolve_target_salary(state: &InputState) -> Option<f64> {
    match state.outcome_mode {
        OutcomeMode::Typical => Some(TYPICAL_TARGET_GBP),
        OutcomeMode::Custom => state.custom_target_annual,
    }
}

/// Computes the estimate against whichever target the outcome mode selects.
pub fn estimate(state: &InputState) -> ComputationResult {
    compute(state, resolve_target_salary(state))
}

pub fn compute(state: &InputState, target_salary_annual: Option<f64>) -> ComputationResult {
    let current = finite(state.current_salary_annual);
    let target = finite(target_salary_annual);

    let mut issues = Vec::new();
    if current.is_none() {
        issues.push(Issue::MissingCurrentSalary);
    }
    if target.is_none() {
        issues.push(Issue::InvalidTargetSalary);
    }

    let annual_uplift = target.unwrap_or(0.0) - current.unwrap_or(0.0);
    let monthly_uplift = annual_uplift / 12.0;

    let program_cost_usd = resolve_program_cost_usd(state.plan_type, state.months_in_program);
    let program_cost_local = program_cost_usd * state.usd_to_gbp_rate;
    let total_cost_local = program_cost_local + state.other_costs_annual;

    let payback_months_after_outcome =
        (monthly_uplift > 0.0).then(|| total_cost_local / monthly_uplift);
    let break_even_months_from_today =
        payback_months_after_outcome.map(|payback| f64::from(state.months_to_outcome) + payback);

    let horizons = HORIZON_MONTHS.map(|months| {
        horizon_result(
            months,
            state.months_to_outcome,
            monthly_uplift,
            total_cost_local,
        )
    });

    if current.is_some() && target.is_some() && annual_uplift <= 0.0 {
        issues.push(Issue::TargetNotAboveCurrent);
    }
    if state.plan_type == PlanType::Monthly {
        issues.push(Issue::MonthlyPlanLimited);
    }

    ComputationResult {
        issues,
        annual_uplift,
        monthly_uplift,
        program_cost_usd,
        program_cost_local,
        total_cost_local,
        payback_months_after_outcome,
        break_even_months_from_today,
        horizons,
    }
}

fn horizon_result(
    horizon_months: i32,
    months_to_outcome: i32,
    monthly_uplift: f64,
    total_cost_local: f64,
) -> HorizonResult {
    let months_of_uplift = horizon_months.saturating_sub(months_to_outcome).max(0);
    let net_at_horizon = f64::from(months_of_uplift) * monthly_uplift - total_cost_local;
    let roi_at_horizon = (total_cost_local > 0.0).then(|| net_at_horizon / total_cost_local);
    HorizonResult {
        horizon_months,
        months_of_uplift,
        net_at_horizon,
        roi_at_horizon,
    }
}

//! Human-readable rendering of an estimate: KPI strings, horizon lines, explanatory
//! notes and the plain-text summary that gets shared by copy and paste.

use std::fmt;

use serde::Serialize;

use super::engine::resolve_target_salary;
use super::types::{
    ComputationResult, InputState, MONTHLY_PRICE_USD, OutcomeMode, PlanType,
    TYPICAL_TARGET_GBP, round_half_up,
};

/// Placeholder for values that cannot be computed.
pub const DASH: &str = "—";

/// Sub-month durations are shown in days using this many days per month.
pub const DAYS_PER_MONTH: f64 = 30.0;

const SUMMARY_TITLE: &str = "CoderCo ROI estimate";
const DISCLAIMER: &str = "Note: Educational estimate only. No guaranteed outcomes.";

pub fn format_money(amount: f64) -> String {
    if !amount.is_finite() {
        return DASH.to_string();
    }
    let whole = amount.abs().round();
    let sign = if amount < 0.0 && whole > 0.0 { "-" } else { "" };
    format!("{sign}£{}", group_thousands(whole))
}

pub fn format_percent(ratio: f64) -> String {
    if !ratio.is_finite() {
        return DASH.to_string();
    }
    let percent = (ratio * 100.0).round();
    let percent = if percent == 0.0 { 0.0 } else { percent };
    format!("{percent:.0}%")
}

/// Months with a days fallback below one month, e.g. `0.688 -> "21 days"`.
pub fn format_months(months: f64) -> String {
    if !months.is_finite() {
        return DASH.to_string();
    }
    if months <= 0.0 {
        return "0 months".to_string();
    }
    if months < 1.0 {
        let days = (months * DAYS_PER_MONTH).ceil().max(1.0);
        return format!("{days:.0} days");
    }
    format!("{:.0} months", round_half_up(months))
}

fn optional_money(amount: Option<f64>) -> String {
    amount.map_or_else(|| DASH.to_string(), format_money)
}

fn optional_months(months: Option<f64>) -> String {
    months.map_or_else(|| DASH.to_string(), format_months)
}

fn optional_percent(ratio: Option<f64>) -> String {
    ratio.map_or_else(|| DASH.to_string(), format_percent)
}

fn group_thousands(whole: f64) -> String {
    let digits = format!("{whole:.0}");
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

pub fn plan_name(plan_type: PlanType) -> &'static str {
    match plan_type {
        PlanType::Monthly => "Standard (monthly)",
        PlanType::AnnualUpfront => "Premium (annual upfront)",
        PlanType::AnnualInstallments => "Premium (instalments)",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HorizonLine {
    pub months: i32,
    pub net: String,
    pub roi: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub uplift: String,
    pub monthly_uplift: String,
    pub total_cost: String,
    pub payback: String,
    pub break_even: String,
    pub horizons: Vec<HorizonLine>,
    pub issues: Vec<String>,
    pub notes: Vec<String>,
}

impl Report {
    pub fn build(state: &InputState, result: &ComputationResult) -> Self {
        let horizons = result
            .horizons
            .iter()
            .map(|h| HorizonLine {
                months: h.horizon_months,
                net: format_money(h.net_at_horizon),
                roi: optional_percent(h.roi_at_horizon),
            })
            .collect();

        Self {
            uplift: format_money(result.annual_uplift),
            monthly_uplift: format_money(result.monthly_uplift),
            total_cost: format!(
                "{} (priced in USD, estimated at $1 ≈ £{:.2})",
                format_money(result.total_cost_local),
                state.usd_to_gbp_rate
            ),
            payback: optional_months(result.payback_months_after_outcome),
            break_even: optional_months(result.break_even_months_from_today),
            horizons,
            issues: result.issues.iter().map(ToString::to_string).collect(),
            notes: notes(state, result),
        }
    }
}

fn notes(state: &InputState, result: &ComputationResult) -> Vec<String> {
    let mut notes = vec![format!(
        "Salary uplift: (target - current) = {} / year ({} / month).",
        format_money(result.annual_uplift),
        format_money(result.monthly_uplift)
    )];
    if state.outcome_mode == OutcomeMode::Typical {
        notes.push(format!(
            "Typical outcome model: the target salary is the programme average of {}.",
            format_money(TYPICAL_TARGET_GBP)
        ));
    }
    notes.push(format!(
        "Plan cost: priced in USD (e.g. ${MONTHLY_PRICE_USD:.0}/month) and converted at $1 ≈ £{:.2}. One-off costs are added in GBP.",
        state.usd_to_gbp_rate
    ));
    notes.push(format!(
        "Timing: the uplift starts after {} months. Net at 12/24/36 months = (months with uplift × monthly uplift) - total cost.",
        state.months_to_outcome
    ));
    notes.push(format!(
        "Payback under one month is shown in days, counting {DAYS_PER_MONTH:.0} days per month."
    ));
    notes
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Salary uplift:          {} / year ({} / month)",
            self.uplift, self.monthly_uplift
        )?;
        writeln!(f, "Total investment:       {}", self.total_cost)?;
        writeln!(f, "Payback after uplift:   {}", self.payback)?;
        writeln!(f, "Break-even from today:  {}", self.break_even)?;
        writeln!(f)?;
        for line in &self.horizons {
            writeln!(
                f,
                "Net at {:>2} months:      {} (ROI {})",
                line.months, line.net, line.roi
            )?;
        }
        if !self.issues.is_empty() {
            writeln!(f)?;
            writeln!(f, "Quick checks:")?;
            for issue in &self.issues {
                writeln!(f, "  - {issue}")?;
            }
        }
        writeln!(f)?;
        writeln!(f, "How this is calculated:")?;
        for note in &self.notes {
            writeln!(f, "  - {note}")?;
        }
        Ok(())
    }
}

/// Plain-text summary meant for pasting into a message.
pub fn summary_text(state: &InputState, result: &ComputationResult) -> String {
    let lines = [
        SUMMARY_TITLE.to_string(),
        format!(
            "Current salary: {}",
            optional_money(state.current_salary_annual)
        ),
        format!(
            "Modelled target salary: {} (after {} months)",
            optional_money(resolve_target_salary(state)),
            state.months_to_outcome
        ),
        format!("Plan: {}", plan_name(state.plan_type)),
        format!(
            "Estimated total investment: {}",
            format_money(result.total_cost_local)
        ),
        format!(
            "Payback time (after salary increase): {}",
            optional_months(result.payback_months_after_outcome)
        ),
        format!(
            "Break-even from today: {}",
            optional_months(result.break_even_months_from_today)
        ),
        String::new(),
        DISCLAIMER.to_string(),
    ];
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::estimate;
    use crate::core::types::RawInputState;
    use pretty_assertions::assert_eq;

    fn example_state() -> InputState {
        InputState::normalize(RawInputState {
            current_salary_annual: Some(30_000.0),
            ..RawInputState::default()
        })
    }

    #[test]
    fn money_is_whole_pounds_with_separators() {
        assert_eq!(format_money(1432.8), "£1,433");
        assert_eq!(format_money(-1432.8), "-£1,433");
        assert_eq!(format_money(1_234_567.0), "£1,234,567");
        assert_eq!(format_money(999.5), "£1,000");
        assert_eq!(format_money(-0.2), "£0");
        assert_eq!(format_money(f64::NAN), DASH);
    }

    #[test]
    fn percent_rounds_to_whole_number() {
        assert_eq!(format_percent(4817.2 / 1432.8), "336%");
        assert_eq!(format_percent(-1.0), "-100%");
        assert_eq!(format_percent(-0.001), "0%");
        assert_eq!(format_percent(f64::INFINITY), DASH);
    }

    #[test]
    fn months_switch_to_days_below_one_month() {
        assert_eq!(format_months(1432.8 / (25_000.0 / 12.0)), "21 days");
        assert_eq!(format_months(0.001), "1 days");
        assert_eq!(format_months(0.0), "0 months");
        assert_eq!(format_months(-3.0), "0 months");
        assert_eq!(format_months(9.69), "10 months");
        assert_eq!(format_months(12.5), "13 months");
        assert_eq!(format_months(f64::NAN), DASH);
    }

    #[test]
    fn report_renders_example_kpis() {
        let state = example_state();
        let report = Report::build(&state, &estimate(&state));

        assert_eq!(report.uplift, "£25,000");
        assert_eq!(report.monthly_uplift, "£2,083");
        assert_eq!(
            report.total_cost,
            "£1,433 (priced in USD, estimated at $1 ≈ £0.80)"
        );
        assert_eq!(report.payback, "21 days");
        assert_eq!(report.break_even, "10 months");
        assert_eq!(
            report.horizons[0],
            HorizonLine {
                months: 12,
                net: "£4,817".to_string(),
                roi: "336%".to_string(),
            }
        );
        assert_eq!(report.horizons[1].net, "£29,817");
        assert_eq!(report.horizons[1].roi, "2081%");
        assert_eq!(report.issues.len(), 1);
        assert!(report.notes.iter().any(|n| n.contains("£55,000")));
    }

    #[test]
    fn report_uses_dashes_when_nothing_pays_back() {
        let mut state = example_state();
        state.current_salary_annual = Some(60_000.0);
        state.months_in_program = 0;
        let report = Report::build(&state, &estimate(&state));

        assert_eq!(report.payback, DASH);
        assert_eq!(report.break_even, DASH);
        assert!(report.horizons.iter().all(|h| h.roi == DASH));
    }

    #[test]
    fn display_lists_checks_and_horizons() {
        let state = example_state();
        let text = Report::build(&state, &estimate(&state)).to_string();
        assert!(text.contains("Net at 12 months:      £4,817 (ROI 336%)"));
        assert!(text.contains("Quick checks:"));
        assert!(text.contains("How this is calculated:"));
    }

    #[test]
    fn summary_matches_example() {
        let state = example_state();
        let summary = summary_text(&state, &estimate(&state));
        assert_eq!(
            summary,
            "CoderCo ROI estimate\n\
             Current salary: £30,000\n\
             Modelled target salary: £55,000 (after 9 months)\n\
             Plan: Standard (monthly)\n\
             Estimated total investment: £1,433\n\
             Payback time (after salary increase): 21 days\n\
             Break-even from today: 10 months\n\
             \n\
             Note: Educational estimate only. No guaranteed outcomes."
        );
    }

    #[test]
    fn summary_marks_missing_values() {
        let mut state = InputState::default();
        state.outcome_mode = OutcomeMode::Custom;
        state.plan_type = PlanType::AnnualInstallments;
        let summary = summary_text(&state, &estimate(&state));
        assert!(summary.contains("Current salary: —"));
        assert!(summary.contains("Modelled target salary: — (after 9 months)"));
        assert!(summary.contains("Plan: Premium (instalments)"));
        assert!(summary.contains("Payback time (after salary increase): —"));
    }
}

use std::fmt;
use std::ops::RangeInclusive;

use tracing::debug;

use super::types::{
    DEFAULT_MONTHS_IN_PROGRAM, DEFAULT_MONTHS_TO_OUTCOME, DEFAULT_USD_TO_GBP, InputState,
    OutcomeMode, PlanType, RawInputState, finite, round_half_up,
};

pub const KEY_CURRENT_SALARY: &str = "s";
pub const KEY_OUTCOME_MODE: &str = "o";
pub const KEY_CUSTOM_TARGET: &str = "t";
pub const KEY_MONTHS_TO_OUTCOME: &str = "m";
pub const KEY_PLAN_TYPE: &str = "p";
pub const KEY_MONTHS_IN_PROGRAM: &str = "k";
pub const KEY_OTHER_COSTS: &str = "x";
pub const KEY_USD_TO_GBP: &str = "fx";

pub const MONTHS_TO_OUTCOME_RANGE: RangeInclusive<i32> = 6..=12;
pub const MONTHS_IN_PROGRAM_RANGE: RangeInclusive<i32> = 1..=12;

// Short link flags. The first entry of each table is the fallback for unknown flags.
const OUTCOME_FLAGS: [(OutcomeMode, &str); 2] =
    [(OutcomeMode::Typical, "t"), (OutcomeMode::Custom, "c")];
const PLAN_FLAGS: [(PlanType, &str); 3] = [
    (PlanType::Monthly, "m"),
    (PlanType::AnnualUpfront, "a"),
    (PlanType::AnnualInstallments, "i"),
];

fn flag_for<T: Copy + PartialEq>(table: &[(T, &'static str)], value: T) -> &'static str {
    table
        .iter()
        .find(|(candidate, _)| *candidate == value)
        .map_or(table[0].1, |(_, flag)| *flag)
}

fn value_for<T: Copy>(table: &[(T, &'static str)], flag: Option<&str>) -> T {
    flag.and_then(|flag| table.iter().find(|(_, candidate)| *candidate == flag))
        .map_or(table[0].0, |(value, _)| *value)
}

impl OutcomeMode {
    pub fn share_flag(self) -> &'static str {
        flag_for(&OUTCOME_FLAGS, self)
    }

    /// Unknown or missing flags decode as [`OutcomeMode::Typical`].
    pub fn from_share_flag(flag: Option<&str>) -> Self {
        value_for(&OUTCOME_FLAGS, flag)
    }
}

impl PlanType {
    pub fn share_flag(self) -> &'static str {
        flag_for(&PLAN_FLAGS, self)
    }

    /// Unknown or missing flags decode as [`PlanType::Monthly`].
    pub fn from_share_flag(flag: Option<&str>) -> Self {
        value_for(&PLAN_FLAGS, flag)
    }
}

/// Ordered short-key parameters of a shared link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShareParams(Vec<(&'static str, String)>);

impl ShareParams {
    fn push(&mut self, key: &'static str, value: String) {
        self.0.push((key, value));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Values are digits, signs, dots or flag letters, so no escaping is needed.
    pub fn to_query_string(&self) -> String {
        self.0
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl fmt::Display for ShareParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

pub fn encode(state: &InputState) -> ShareParams {
    let mut params = ShareParams::default();

    if let Some(salary) = finite(state.current_salary_annual) {
        params.push(KEY_CURRENT_SALARY, whole_number(salary));
    }
    params.push(KEY_OUTCOME_MODE, state.outcome_mode.share_flag().to_string());
    if state.outcome_mode == OutcomeMode::Custom {
        if let Some(target) = finite(state.custom_target_annual) {
            params.push(KEY_CUSTOM_TARGET, whole_number(target));
        }
    }
    params.push(KEY_MONTHS_TO_OUTCOME, state.months_to_outcome.to_string());
    params.push(KEY_PLAN_TYPE, state.plan_type.share_flag().to_string());
    if state.plan_type == PlanType::Monthly {
        params.push(KEY_MONTHS_IN_PROGRAM, state.months_in_program.to_string());
    }
    if state.other_costs_annual.is_finite() && state.other_costs_annual > 0.0 {
        params.push(KEY_OTHER_COSTS, whole_number(state.other_costs_annual));
    }
    if state.usd_to_gbp_rate.is_finite() && state.usd_to_gbp_rate != DEFAULT_USD_TO_GBP {
        params.push(KEY_USD_TO_GBP, format!("{:.4}", state.usd_to_gbp_rate));
    }

    params
}

/// Rebuilds the inputs carried by a shared link.
///
/// Returns `None` when the link carries no parameters at all, so callers can tell
/// "no shared state" apart from "shared state that happens to be all defaults".
/// When a key repeats, its first value wins.
pub fn decode<K, V>(pairs: &[(K, V)]) -> Option<InputState>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if pairs.is_empty() {
        return None;
    }

    let get = |key: &str| {
        pairs
            .iter()
            .find(|(candidate, _)| candidate.as_ref() == key)
            .map(|(_, value)| value.as_ref())
    };

    let raw = RawInputState {
        current_salary_annual: get(KEY_CURRENT_SALARY).and_then(parse_number),
        outcome_mode: Some(OutcomeMode::from_share_flag(get(KEY_OUTCOME_MODE))),
        custom_target_annual: get(KEY_CUSTOM_TARGET).and_then(parse_number),
        months_to_outcome: Some(clamp_int(
            get(KEY_MONTHS_TO_OUTCOME),
            MONTHS_TO_OUTCOME_RANGE,
            DEFAULT_MONTHS_TO_OUTCOME,
        )),
        plan_type: Some(PlanType::from_share_flag(get(KEY_PLAN_TYPE))),
        months_in_program: Some(clamp_int(
            get(KEY_MONTHS_IN_PROGRAM),
            MONTHS_IN_PROGRAM_RANGE,
            DEFAULT_MONTHS_IN_PROGRAM,
        )),
        other_costs_annual: get(KEY_OTHER_COSTS).and_then(parse_number),
        usd_to_gbp_rate: get(KEY_USD_TO_GBP).and_then(parse_number),
    };

    let mut state = InputState::normalize(raw);
    if state.outcome_mode == OutcomeMode::Custom && state.custom_target_annual.is_none() {
        debug!("custom outcome without a usable target, falling back to typical");
        state.outcome_mode = OutcomeMode::Typical;
    }
    Some(state)
}

fn whole_number(value: f64) -> String {
    format!("{:.0}", round_half_up(value))
}

/// Reads the longest leading decimal number, ignoring leading whitespace and any
/// trailing garbage (`"42k"` reads as 42). Non-finite results are rejected.
pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim_start();
    let len = numeric_prefix_len(trimmed.as_bytes());
    trimmed[..len].parse::<f64>().ok().filter(|v| v.is_finite())
}

fn numeric_prefix_len(bytes: &[u8]) -> usize {
    let digits_from = |start: usize| {
        start
            + bytes[start.min(bytes.len())..]
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .count()
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - (end + 1);
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return 0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exp_end = digits_from(end + 1 + sign);
        if exp_end > end + 1 + sign {
            end = exp_end;
        }
    }
    end
}

/// Reads a leading base-10 integer (`"9.7"` reads as 9).
fn parse_integer(raw: &str) -> Option<f64> {
    let trimmed = raw.trim_start();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1.0, &trimmed[1..]),
        Some(b'+') => (1.0, &trimmed[1..]),
        _ => (1.0, trimmed),
    };
    let len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }
    rest[..len].parse::<f64>().ok().map(|v| sign * v)
}

fn clamp_int(raw: Option<&str>, range: RangeInclusive<i32>, fallback: i32) -> i32 {
    match raw.and_then(parse_integer) {
        // Clamped into i32 range before the cast.
        Some(value) => value.clamp(f64::from(*range.start()), f64::from(*range.end())) as i32,
        None => fallback,
    }
}

mod codec;
mod engine;
mod report;
mod types;

pub use codec::{
    KEY_CURRENT_SALARY, KEY_CUSTOM_TARGET, KEY_MONTHS_IN_PROGRAM, KEY_MONTHS_TO_OUTCOME,
    KEY_OTHER_COSTS, KEY_OUTCOME_MODE, KEY_PLAN_TYPE, KEY_USD_TO_GBP, MONTHS_IN_PROGRAM_RANGE,
    MONTHS_TO_OUTCOME_RANGE, ShareParams, decode, encode,
};
pub use engine::{compute, estimate, resolve_program_cost_usd, resolve_target_salary};
pub use report::{
    DASH, HorizonLine, Report, format_money, format_months, format_percent, plan_name,
    summary_text,
};
pub use types::{
    ComputationResult, DEFAULT_MONTHS_IN_PROGRAM, DEFAULT_MONTHS_TO_OUTCOME, DEFAULT_USD_TO_GBP,
    HORIZON_MONTHS, HorizonResult, InputState, Issue, OutcomeMode, PlanType, RawInputState,
    TYPICAL_TARGET_GBP,
};

use std::net::IpAddr;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{debug, info};

use crate::api::{EstimateResponse, ServerConfig, run_http_server};
use crate::core::{
    InputState, OutcomeMode, PlanType, RawInputState, Report, decode, encode, estimate,
    summary_text,
};
use crate::error::RoiError;
use crate::share::{DEFAULT_BASE_URL, query_pairs, share_link};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliOutcomeMode {
    Typical,
    Custom,
}

impl From<CliOutcomeMode> for OutcomeMode {
    fn from(value: CliOutcomeMode) -> Self {
        match value {
            CliOutcomeMode::Typical => OutcomeMode::Typical,
            CliOutcomeMode::Custom => OutcomeMode::Custom,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliPlanType {
    Monthly,
    AnnualUpfront,
    #[value(alias = "annual-installments")]
    Installments,
}

impl From<CliPlanType> for PlanType {
    fn from(value: CliPlanType) -> Self {
        match value {
            CliPlanType::Monthly => PlanType::Monthly,
            CliPlanType::AnnualUpfront => PlanType::AnnualUpfront,
            CliPlanType::Installments => PlanType::AnnualInstallments,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "roi",
    version,
    about = "Career programme ROI estimator with shareable scenario links"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        help = "Log filter such as debug or roi=trace; overrides RUST_LOG"
    )]
    pub log_level: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print KPIs and 12/24/36 month net and ROI
    Estimate {
        #[command(flatten)]
        form: FormArgs,
        #[arg(long, help = "Print JSON instead of text")]
        json: bool,
    },
    /// Print a shareable link for the scenario
    Link {
        #[command(flatten)]
        form: FormArgs,
        #[arg(long, default_value = DEFAULT_BASE_URL)]
        base_url: String,
    },
    /// Print the plain-text summary for pasting elsewhere
    Summary {
        #[command(flatten)]
        form: FormArgs,
    },
    /// Load a scenario from a shared link or query string
    Decode {
        link: String,
        #[arg(long, help = "Print JSON instead of text")]
        json: bool,
    },
    /// Serve the JSON API
    Serve(ServeArgs),
}

/// Scenario inputs. Unset flags take their defaults in `InputState::normalize`;
/// values are not clamped.
#[derive(Args, Debug, Clone, Default)]
pub struct FormArgs {
    #[arg(long, help = "Current gross annual salary in GBP")]
    pub current_salary: Option<f64>,
    #[arg(long, value_enum, help = "Outcome model [default: typical]")]
    pub outcome: Option<CliOutcomeMode>,
    #[arg(long, help = "Target annual salary in GBP, used with --outcome custom")]
    pub target_salary: Option<f64>,
    #[arg(
        long,
        allow_negative_numbers = true,
        help = "Months until the salary uplift starts [default: 9]"
    )]
    pub months_to_outcome: Option<i32>,
    #[arg(long, value_enum, help = "Pricing plan [default: monthly]")]
    pub plan: Option<CliPlanType>,
    #[arg(
        long,
        allow_negative_numbers = true,
        help = "Months enrolled on the monthly plan [default: 9]"
    )]
    pub months_in_program: Option<i32>,
    #[arg(
        long,
        allow_negative_numbers = true,
        help = "Extra one-off costs in GBP [default: 0]"
    )]
    pub other_costs: Option<f64>,
    #[arg(long, help = "USD to GBP exchange rate [default: 0.8]")]
    pub usd_to_gbp: Option<f64>,
}

impl FormArgs {
    pub fn to_raw(&self) -> RawInputState {
        RawInputState {
            current_salary_annual: self.current_salary,
            outcome_mode: self.outcome.map(Into::into),
            custom_target_annual: self.target_salary,
            months_to_outcome: self.months_to_outcome,
            plan_type: self.plan.map(Into::into),
            months_in_program: self.months_in_program,
            other_costs_annual: self.other_costs,
            usd_to_gbp_rate: self.usd_to_gbp,
        }
    }

    pub fn read_state(&self) -> InputState {
        InputState::normalize(self.to_raw())
    }
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value_t = 8080)]
    pub port: u16,
    #[arg(long, default_value = "0.0.0.0")]
    pub bind: IpAddr,
    #[arg(long, help = "Base URL for share links; defaults to the bind address")]
    pub public_url: Option<String>,
}

impl From<ServeArgs> for ServerConfig {
    fn from(args: ServeArgs) -> Self {
        ServerConfig {
            bind: args.bind,
            port: args.port,
            public_url: args.public_url,
        }
    }
}

pub async fn run(command: Command) -> Result<(), RoiError> {
    let output = match command {
        Command::Serve(args) => return run_http_server(args.into()).await,
        Command::Estimate { form, json } => estimate_output(form.read_state(), false, json)?,
        Command::Link { form, base_url } => share_link(&base_url, &encode(&form.read_state()))?,
        Command::Summary { form } => {
            let state = form.read_state();
            summary_text(&state, &estimate(&state))
        }
        Command::Decode { link, json } => decode_output(&link, json)?,
    };
    println!("{}", output.trim_end());
    Ok(())
}

fn estimate_output(
    state: InputState,
    loaded_from_link: bool,
    json: bool,
) -> Result<String, RoiError> {
    debug!(?state, loaded_from_link, "estimating");
    if json {
        let response = EstimateResponse::new(state, loaded_from_link);
        return Ok(serde_json::to_string_pretty(&response)?);
    }
    Ok(Report::build(&state, &estimate(&state)).to_string())
}

fn decode_output(link: &str, json: bool) -> Result<String, RoiError> {
    let pairs = query_pairs(link)?;
    let decoded = decode(&pairs);
    let loaded_from_link = decoded.is_some();
    if loaded_from_link {
        info!(params = pairs.len(), "loaded scenario from shared link");
    }
    let body = estimate_output(decoded.unwrap_or_default(), loaded_from_link, json)?;
    if json {
        return Ok(body);
    }
    let notice = if loaded_from_link {
        "Loaded from shared link."
    } else {
        "No scenario in link; showing defaults."
    };
    Ok(format!("{notice}\n\n{body}"))
}

use anyhow::Result;
use colored::Colorize;
use medportal_auth::{AccessGate, GateDecision, RouteGuard, SessionState, UserIdentity};

use crate::cli::{AccessArgs, OutputFormat};
use crate::config::MedportalConfig;
use crate::output;

pub fn session_from_args(args: &AccessArgs) -> SessionState {
    SessionState {
        user: args
            .role
            .map(|role| UserIdentity::new(args.user_id.clone(), args.email.clone(), role)),
        loading: args.loading,
    }
}

pub fn evaluate(config: &MedportalConfig, args: &AccessArgs) -> Result<GateDecision> {
    let gate = AccessGate::from_config(&config.auth)?;
    let guard = RouteGuard::new(args.allow.iter().copied());
    Ok(gate.evaluate(&guard, &session_from_args(args), &args.path))
}

pub fn run(config: &MedportalConfig, args: &AccessArgs, format: OutputFormat) -> Result<()> {
    let decision = evaluate(config, args)?;

    match format {
        OutputFormat::Json => output::print_json(&decision)?,
        OutputFormat::Table => match &decision {
            GateDecision::Loading => {
                println!("{} session is still resolving; showing placeholder", "…".cyan());
            }
            GateDecision::Redirect(redirect) => {
                println!(
                    "{} not signed in; redirect to {} (replace: {})",
                    "→".cyan(),
                    redirect.to.as_str().bold(),
                    redirect.replace
                );
            }
            GateDecision::Unauthorized(view) => {
                output::print_denied(&format!(
                    "{} may not open {}; dashboard: {}, sign-out lands on {}",
                    view.role, args.path, view.dashboard_path, view.login_path
                ));
            }
            GateDecision::Render => {
                output::print_success(&format!("render {}", args.path));
            }
        },
    }

    Ok(())
}

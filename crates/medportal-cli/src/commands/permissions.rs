use anyhow::Result;
use medportal_auth::{PermissionTable, Role};
use serde_json::{Map, Value, json};

use crate::cli::{CheckArgs, OutputFormat};
use crate::output;

pub fn list(table: &PermissionTable, role: Option<Role>, format: OutputFormat) -> Result<()> {
    let roles: Vec<Role> = match role {
        Some(role) => vec![role],
        None => Role::ALL.to_vec(),
    };

    match format {
        OutputFormat::Json => {
            let map: Map<String, Value> = roles
                .iter()
                .map(|role| (role.to_string(), json!(table.permissions_for(*role))))
                .collect();
            output::print_json(&map)?;
        }
        OutputFormat::Table => {
            output::print_table(
                ["Role", "Permissions"],
                roles
                    .iter()
                    .map(|role| [role.to_string(), table.permissions_for(*role).join("\n")]),
            );
        }
    }
    Ok(())
}

/// Returns whether the check passed.
pub fn check(table: &PermissionTable, args: &CheckArgs, format: OutputFormat) -> Result<bool> {
    let tokens: Vec<&str> = args.tokens.iter().map(String::as_str).collect();
    let granted = if args.all {
        table.has_all_permissions(&args.role, &tokens)
    } else {
        table.has_any_permission(&args.role, &tokens)
    };
    tracing::debug!(role = %args.role, all = args.all, granted, "Permission check");

    let mode = if args.all { "all" } else { "any" };

    match format {
        OutputFormat::Json => output::print_json(&json!({
            "role": args.role,
            "tokens": tokens,
            "mode": mode,
            "granted": granted,
        }))?,
        OutputFormat::Table => {
            output::print_table(
                ["Token", "Granted"],
                tokens
                    .iter()
                    .map(|t| [t.to_string(), table.has_permission(&args.role, t).to_string()]),
            );
            let msg = format!(
                "{} {} {} of the tokens",
                args.role,
                if granted { "holds" } else { "does not hold" },
                mode
            );
            if granted {
                output::print_success(&msg);
            } else {
                output::print_denied(&msg);
            }
        }
    }
    Ok(granted)
}

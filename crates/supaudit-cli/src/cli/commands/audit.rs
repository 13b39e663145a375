//! `supaudit audit` - Run the security checks against a project.

use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use supaudit::{AuditOptions, AuditReport, CheckResult, ErrorBody, SecretKey};
use tabled::{settings::Style, Table, Tabled};

use super::Context;
use crate::cli::args::AuditArgs;
use crate::education::Explain;
use crate::output::{write_csv, OutputFormat};

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "User")]
    user_id: String,
    #[tabled(rename = "MFA")]
    status: &'static str,
}

#[derive(Tabled)]
struct TableRow {
    #[tabled(rename = "Table")]
    table: String,
    #[tabled(rename = "RLS")]
    status: &'static str,
    #[tabled(rename = "Command")]
    command: String,
}

/// One deficiency per line in CSV output.
#[derive(Serialize)]
struct FindingRow<'a> {
    check: &'static str,
    subject: &'a str,
    resolution: &'a str,
}

pub async fn execute(ctx: Context, args: AuditArgs) -> Result<()> {
    if ctx.explain {
        Explain::audit(&args.project_ref, args.remediate).print();
    }

    let access_key = args
        .access_key
        .clone()
        .or_else(|| ctx.config.access_key.clone())
        .map(SecretKey::new);

    let mut options = AuditOptions::default().mfa_concurrency(args.concurrency);
    if args.remediate {
        options = options.with_remediation();
    }

    let orchestrator = ctx.orchestrator().await?;
    if ctx.verbose {
        eprintln!("{} {}", "Store:".dimmed(), ctx.store_path()?.display());
    }

    let spinner = spinner(&ctx, &args.project_ref);
    let outcome = orchestrator.run(&args.project_ref, access_key, options).await;
    spinner.finish_and_clear();

    let report = match outcome {
        Ok(report) => report,
        Err(err) => {
            if ctx.output_format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&ErrorBody::from(&err))?);
            }
            return Err(anyhow::Error::new(err).context(format!("audit of {} failed", args.project_ref)));
        }
    };

    match ctx.output_format {
        OutputFormat::Csv => write_csv(std::io::stdout().lock(), &findings(&report))?,
        OutputFormat::Pretty => print_report_pretty(&report, &args),
        format => {
            format.print_structured(&report)?;
        }
    }

    if args.strict && !report.is_clean() {
        anyhow::bail!("{} deficiencies found", report.deficiency_count());
    }

    Ok(())
}

fn spinner(ctx: &Context, project_ref: &str) -> ProgressBar {
    if ctx.output_format != OutputFormat::Pretty {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new_spinner();
    bar.enable_steady_tick(Duration::from_millis(100));
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(format!("Auditing {project_ref}..."));
    bar
}

fn findings(report: &AuditReport) -> Vec<FindingRow<'_>> {
    let mut rows = Vec::new();

    let mfa_hint = report.mfa_data.resolution_hint.as_deref().unwrap_or_default();
    for user in &report.mfa_data.unprotected_users {
        rows.push(FindingRow {
            check: "mfa",
            subject: &user.user_id,
            resolution: mfa_hint,
        });
    }

    if !report.pitr_data.enabled {
        rows.push(FindingRow {
            check: "pitr",
            subject: "database",
            resolution: report.pitr_data.resolution_hint.as_deref().unwrap_or_default(),
        });
    }

    for violation in &report.rls_data.violations {
        rows.push(FindingRow {
            check: "rls",
            subject: &violation.table_name,
            resolution: &violation.resolution_hint,
        });
    }

    rows
}

fn print_report_pretty(report: &AuditReport, args: &AuditArgs) {
    println!("{} {}", "Project:".bold(), args.project_ref.cyan());
    println!();

    for check in report.checks() {
        let (name, summary) = match &check {
            CheckResult::Mfa(r) => (
                "MFA",
                format!("{} user(s) without MFA", r.unprotected_users.len()),
            ),
            CheckResult::Pitr(r) => (
                "PITR",
                if r.enabled { "enabled" } else { "disabled" }.to_string(),
            ),
            CheckResult::Rls(r) => (
                "RLS",
                format!("{} public table(s) without RLS", r.violations.len()),
            ),
        };
        let status = if check.is_deficient() {
            "FAIL".red().bold()
        } else {
            "PASS".green().bold()
        };
        println!("  {status}  {:<5} {}", name.bold(), summary);
    }

    let mfa = &report.mfa_data;
    if !mfa.is_clean() {
        println!();
        println!("{}", "Users without MFA:".bold().underline());
        let rows: Vec<UserRow> = mfa
            .unprotected_users
            .iter()
            .map(|u| UserRow {
                user_id: u.user_id.clone(),
                status: "missing",
            })
            .collect();
        println!("{}", Table::new(&rows).with(Style::rounded()));
        print_hint(mfa.resolution_hint.as_deref(), mfa.doc_link.as_deref());
    }

    let pitr = &report.pitr_data;
    if !pitr.is_clean() {
        println!();
        println!("{}", "Point in time recovery:".bold().underline());
        print_hint(pitr.resolution_hint.as_deref(), pitr.doc_link.as_deref());
    }

    let rls = &report.rls_data;
    if !rls.is_clean() {
        println!();
        println!("{}", "Tables without row level security:".bold().underline());
        let rows: Vec<TableRow> = rls
            .violations
            .iter()
            .map(|v| TableRow {
                table: v.table_name.clone(),
                status: if rls.remediated { "enabled now" } else { "disabled" },
                command: v.remediation_command.clone(),
            })
            .collect();
        println!("{}", Table::new(&rows).with(Style::rounded()));
        if let Some(first) = rls.violations.first() {
            print_hint(Some(&first.resolution_hint), None);
        }
        if !rls.remediated {
            println!("{}", "Tip: Re-run with --remediate to enable RLS on these tables".dimmed());
        }
    }

    println!();
    if report.is_clean() {
        println!("{}", "No deficiencies found.".green());
    } else {
        println!(
            "{}",
            format!("{} deficiencies found.", report.deficiency_count()).yellow()
        );
    }
}

fn print_hint(hint: Option<&str>, link: Option<&str>) {
    if let Some(hint) = hint {
        println!("  {} {}", "Fix:".bold(), hint);
    }
    if let Some(link) = link {
        println!("  {} {}", "See:".bold(), link.cyan().underline());
    }
}

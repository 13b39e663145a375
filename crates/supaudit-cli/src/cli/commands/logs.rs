//! `supaudit logs` - Show the audit trail of a project.

use anyhow::Result;
use colored::Colorize;
use supaudit::{validate_project_ref, AuditLogEntry, AuditLogger};
use tabled::{settings::Style, Table, Tabled};

use super::Context;
use crate::cli::args::LogsArgs;
use crate::education::Explain;
use crate::output::{write_csv, OutputFormat};

#[derive(Tabled)]
struct LogRow {
    #[tabled(rename = "When")]
    created_at: String,
    #[tabled(rename = "Event")]
    event: String,
    #[tabled(rename = "Pass")]
    success: u32,
    #[tabled(rename = "Fail")]
    failure: u32,
    #[tabled(rename = "Message")]
    message: String,
}

impl From<&AuditLogEntry> for LogRow {
    fn from(entry: &AuditLogEntry) -> Self {
        Self {
            created_at: entry.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            event: entry.event.clone(),
            success: entry.success_count,
            failure: entry.failure_count,
            message: entry.message.clone().unwrap_or_default(),
        }
    }
}

pub async fn execute(ctx: Context, args: LogsArgs) -> Result<()> {
    if ctx.explain {
        Explain::logs(&args.project_ref).print();
    }

    validate_project_ref(&args.project_ref)?;

    let repository = ctx.repository().await?;
    let entries = AuditLogger::new(repository)
        .for_project(&args.project_ref, args.limit)
        .await?;

    match ctx.output_format {
        OutputFormat::Csv => write_csv(std::io::stdout().lock(), &entries)?,
        OutputFormat::Pretty => print_logs_pretty(&entries, &args),
        format => {
            format.print_structured(&entries)?;
        }
    }

    Ok(())
}

fn print_logs_pretty(entries: &[AuditLogEntry], args: &LogsArgs) {
    if entries.is_empty() {
        println!(
            "{}",
            format!("No audit entries for {}.", args.project_ref).dimmed()
        );
        println!("{}", "Tip: Run 'supaudit audit <project-ref>' first".dimmed());
        return;
    }

    println!(
        "{} {} ({} entries)",
        "Audit trail:".bold(),
        args.project_ref.cyan(),
        entries.len()
    );

    let rows: Vec<LogRow> = entries.iter().map(LogRow::from).collect();
    println!("{}", Table::new(&rows).with(Style::rounded()));

    let failing = entries.iter().filter(|e| e.has_failures()).count();
    if failing > 0 {
        println!();
        println!(
            "{}",
            format!("{failing} check run(s) reported failures").yellow()
        );
    }
}

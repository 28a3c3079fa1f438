//! Stats command implementation

use anyhow::Result;
use colored::Colorize;
use iconsync_db::IconSyncDb;
use tabled::{
    settings::{object::Rows, Color, Modify, Style},
    Table,
};

use crate::output::RunRow;

/// Displays stored revisions and the most recent runs
pub fn cmd_stats(limit: usize, db: IconSyncDb) -> Result<()> {
    println!("{}", "Sync State:".bright_cyan().bold());
    let tracked = db.tracked_revisions()?;
    if tracked.is_empty() {
        println!("  {}", "No revision processed yet".dimmed());
    }
    for (target, revision) in &tracked {
        println!("  {}: {}", target.bright_yellow(), revision.to_string().bold());
    }

    println!();
    println!("{}", "Run History:".bright_cyan().bold());
    println!("  {}: {}", "Recorded runs".bright_yellow(), db.run_count().to_string().bold());

    let runs = db.recent_runs(limit)?;
    if runs.is_empty() {
        return Ok(());
    }

    let rows: Vec<RunRow> = runs.iter().map(RunRow::from).collect();
    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Color::FG_BRIGHT_CYAN));
    println!("{}", table);

    Ok(())
}

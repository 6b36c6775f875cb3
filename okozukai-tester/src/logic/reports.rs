use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use okozukai_game::CampaignEnding;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

use super::policy::GameplayStrategy;
use super::simulation::SimulationRun;

/// Outcome counts and averages for one strategy.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StrategyReport {
    pub strategy: String,
    pub runs: usize,
    pub successes: usize,
    pub overspent: usize,
    pub plan_expired: usize,
    pub success_rate: f64,
    pub mean_final_money: f64,
    pub mean_months: f64,
    pub mean_resisted: f64,
    pub mean_gave_in: f64,
    pub mean_temptation_spend: f64,
    pub mean_steps: f64,
    /// Seed of the run that finished with the least money.
    pub worst_seed: Option<u64>,
}

/// Everything one tester invocation reports.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub generated_at: DateTime<Utc>,
    pub goal_id: String,
    pub goal_price: i64,
    pub recurring: Vec<String>,
    pub planned_months: u32,
    pub seeds: Vec<u64>,
    pub strategies: Vec<StrategyReport>,
}

#[allow(clippy::cast_precision_loss)]
fn mean(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summarize(strategy: GameplayStrategy, runs: &[SimulationRun]) -> StrategyReport {
    let runs: Vec<&SimulationRun> = runs.iter().filter(|r| r.strategy == strategy).collect();
    let count = runs.len();
    let ending_count =
        |ending: CampaignEnding| runs.iter().filter(|r| r.result.ending == ending).count();
    let successes = ending_count(CampaignEnding::GoalReached);

    let total = |f: fn(&SimulationRun) -> f64| runs.iter().map(|r| f(r)).sum::<f64>();

    StrategyReport {
        strategy: strategy.key().to_string(),
        runs: count,
        successes,
        overspent: ending_count(CampaignEnding::Overspent),
        plan_expired: ending_count(CampaignEnding::PlanExpired),
        success_rate: mean(successes as f64 * 100.0, count),
        mean_final_money: mean(total(|r| r.result.final_money as f64), count),
        mean_months: mean(total(|r| f64::from(r.result.actual_months)), count),
        mean_resisted: mean(total(|r| f64::from(r.result.resisted_temptations)), count),
        mean_gave_in: mean(total(|r| f64::from(r.result.gave_in_temptations)), count),
        mean_temptation_spend: mean(total(|r| r.temptation_spend() as f64), count),
        mean_steps: mean(total(|r| f64::from(r.steps)), count),
        worst_seed: runs
            .iter()
            .min_by_key(|r| r.result.final_money)
            .map(|r| r.seed),
    }
}

pub fn generate_console_report(
    out: &mut dyn Write,
    report: &SimulationReport,
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Savings Simulation Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "==============================".cyan())?;
    writeln!(
        out,
        "Goal: {} ({}) over {} planned months",
        report.goal_id.bold(),
        report.goal_price,
        report.planned_months
    )?;
    if !report.recurring.is_empty() {
        writeln!(out, "Recurring: {}", report.recurring.join(", "))?;
    }
    writeln!(out, "Seeds per strategy: {}", report.seeds.len())?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for strategy in &report.strategies {
        let rate = format!("{:.1}%", strategy.success_rate);
        let rate = if strategy.successes == strategy.runs {
            rate.green()
        } else if strategy.successes == 0 {
            rate.red()
        } else {
            rate.yellow()
        };
        writeln!(out, "{} {}", "▶".cyan(), strategy.strategy.bold())?;
        writeln!(
            out,
            "   Success: {}/{} ({rate})",
            strategy.successes, strategy.runs
        )?;
        writeln!(
            out,
            "   Overspent: {}  Plan expired: {}",
            strategy.overspent.to_string().red(),
            strategy.plan_expired.to_string().yellow()
        )?;
        writeln!(
            out,
            "   Mean money: {:.1}  Mean months: {:.2}",
            strategy.mean_final_money, strategy.mean_months
        )?;
        writeln!(
            out,
            "   Temptations resisted/bought: {:.2}/{:.2} (spent {:.1})",
            strategy.mean_resisted, strategy.mean_gave_in, strategy.mean_temptation_spend
        )?;
        if let Some(seed) = strategy.worst_seed {
            writeln!(out, "   Worst seed: {seed}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, report: &SimulationReport) -> Result<()> {
    let json_output = serde_json::to_string_pretty(report)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, report: &SimulationReport) -> Result<()> {
    writeln!(out, "# Okozukai Savings Simulation\n")?;
    writeln!(
        out,
        "_Generated {}_\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(out, "## Plan\n")?;
    writeln!(out, "- **Goal**: {} ({})", report.goal_id, report.goal_price)?;
    writeln!(out, "- **Planned months**: {}", report.planned_months)?;
    if !report.recurring.is_empty() {
        writeln!(out, "- **Recurring**: {}", report.recurring.join(", "))?;
    }
    writeln!(out, "- **Seeds**: {}\n", report.seeds.len())?;

    writeln!(out, "## Strategies\n")?;
    writeln!(
        out,
        "| Strategy | Runs | Success | Overspent | Expired | Success % | Mean money | Mean months |"
    )?;
    writeln!(out, "|---|---:|---:|---:|---:|---:|---:|---:|")?;
    for s in &report.strategies {
        writeln!(
            out,
            "| {} | {} | {} | {} | {} | {:.1} | {:.1} | {:.2} |",
            s.strategy,
            s.runs,
            s.successes,
            s.overspent,
            s.plan_expired,
            s.success_rate,
            s.mean_final_money,
            s.mean_months
        )?;
    }
    Ok(())
}

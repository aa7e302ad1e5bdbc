// In app/src/analyzer.rs

use backtester::RunReport;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct RankedReport {
    pub rank: usize,
    pub report: RunReport,
}

/// Ranks the results of an optimization job by final portfolio value.
/// Ties go to the run with the smaller drawdown.
pub fn rank_reports(mut reports: Vec<RunReport>) -> Vec<RankedReport> {
    reports.sort_by(|a, b| {
        b.final_value.cmp(&a.final_value).then_with(|| {
            a.max_drawdown_pct
                .partial_cmp(&b.max_drawdown_pct)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    });
    reports
        .into_iter()
        .enumerate()
        .map(|(i, report)| RankedReport { rank: i + 1, report })
        .collect()
}

pub fn print_leaderboard(job_name: &str, ranked: &[RankedReport], top: usize) {
    println!("\n--- Optimization Results: {job_name} ---");
    println!(
        "{:>4}  {:>6} {:>6} {:>6}  {:>14} {:>9} {:>9} {:>7}",
        "Rank", "Short", "Median", "Long", "Final Value", "Return%", "MaxDD%", "Trades"
    );
    for entry in ranked.iter().take(top) {
        let r = &entry.report;
        println!(
            "{:>4}  {:>6} {:>6} {:>6}  {:>14.2} {:>9.2} {:>9.2} {:>7}",
            entry.rank,
            r.periods.short_period,
            r.periods.median_period,
            r.periods.long_period,
            r.final_value,
            r.return_pct,
            r.max_drawdown_pct,
            r.trades
        );
    }
    println!("-----------------------------------");
}

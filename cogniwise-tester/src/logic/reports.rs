use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

use super::ScenarioResult;

#[allow(clippy::cast_precision_loss)]
fn success_rate(results: &[ScenarioResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let passed = results.iter().filter(|r| r.passed).count();
    (passed as f64 / results.len() as f64) * 100.0
}

#[allow(clippy::cast_precision_loss)]
fn mean_risk(result: &ScenarioResult) -> Option<f64> {
    if result.runs.is_empty() {
        return None;
    }
    let total: f64 = result.runs.iter().map(|run| f64::from(run.risk_score)).sum();
    Some(total / result.runs.len() as f64)
}

fn high_risk_count(result: &ScenarioResult) -> usize {
    result.runs.iter().filter(|run| run.is_high_risk).count()
}

pub fn generate_console_report<W: Write + ?Sized>(
    writer: &mut W,
    results: &[ScenarioResult],
    total_duration: Duration,
) -> Result<()> {
    let total_tests = results.len();
    let passed_tests = results.iter().filter(|r| r.passed).count();
    let failed_tests = total_tests - passed_tests;

    writeln!(writer)?;
    writeln!(writer, "{}", "📊 Level-2 Test Results Summary".bright_cyan().bold())?;
    writeln!(writer, "{}", "================================".cyan())?;
    writeln!(writer, "Total runs: {total_tests}")?;
    writeln!(writer, "Passed: {}", passed_tests.to_string().green())?;
    writeln!(writer, "Failed: {}", failed_tests.to_string().red())?;
    writeln!(writer, "Success rate: {:.1}%", success_rate(results))?;
    writeln!(writer, "Total time: {total_duration:?}")?;
    writeln!(writer)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(
            writer,
            "{} {} [{} / {} / seed {}]",
            status,
            result.scenario_name.bold(),
            result.band,
            result.profile,
            result.seed
        )?;
        writeln!(
            writer,
            "   Iterations: {}/{} successful",
            result.successful_iterations, result.iterations_run
        )?;
        if let Some(mean) = mean_risk(result) {
            writeln!(
                writer,
                "   Mean risk: {mean:.1} ({} of {} flagged high risk)",
                high_risk_count(result),
                result.runs.len()
            )?;
        }
        writeln!(writer, "   Average time: {:?}", result.average_duration)?;

        if !result.failures.is_empty() {
            writeln!(writer, "   Failures:")?;
            for failure in &result.failures {
                writeln!(writer, "     • {}", failure.red())?;
            }
        }
        writeln!(writer)?;
    }

    let fastest = results.iter().min_by_key(|r| r.average_duration);
    let slowest = results.iter().max_by_key(|r| r.average_duration);
    if let (Some(fastest), Some(slowest)) = (fastest, slowest) {
        writeln!(writer, "{}", "⚡ Performance Summary".bright_yellow().bold())?;
        writeln!(writer, "{}", "=====================".yellow())?;
        writeln!(
            writer,
            "Fastest: {} {} ({:?})",
            fastest.scenario_name.green(),
            fastest.band,
            fastest.average_duration
        )?;
        writeln!(
            writer,
            "Slowest: {} {} ({:?})",
            slowest.scenario_name.yellow(),
            slowest.band,
            slowest.average_duration
        )?;
    }
    Ok(())
}

pub fn generate_json_report<W: Write + ?Sized>(
    writer: &mut W,
    results: &[ScenarioResult],
) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, results)?;
    writeln!(writer)?;
    Ok(())
}

pub fn generate_markdown_report<W: Write + ?Sized>(
    writer: &mut W,
    results: &[ScenarioResult],
    generated_at: DateTime<Utc>,
) -> Result<()> {
    let total_tests = results.len();
    let passed_tests = results.iter().filter(|r| r.passed).count();

    writeln!(writer, "# Cogniwise Level-2 Test Results\n")?;
    writeln!(writer, "_Generated {}_\n", generated_at.to_rfc3339())?;
    writeln!(writer, "## Summary\n")?;
    writeln!(writer, "- **Total runs**: {total_tests}")?;
    writeln!(writer, "- **Passed**: {passed_tests}")?;
    writeln!(writer, "- **Failed**: {}", total_tests - passed_tests)?;
    writeln!(writer, "- **Success rate**: {:.1}%\n", success_rate(results))?;

    writeln!(writer, "## Detailed Results\n")?;
    writeln!(
        writer,
        "| Status | Scenario | Band | Profile | Seed | Iterations | Mean risk | High risk |"
    )?;
    writeln!(writer, "|---|---|---|---|---|---|---|---|")?;
    for result in results {
        let status = if result.passed { "✅" } else { "❌" };
        let mean = mean_risk(result).map_or_else(|| "-".to_string(), |m| format!("{m:.1}"));
        writeln!(
            writer,
            "| {status} | {} | {} | {} | {} | {}/{} | {mean} | {} |",
            result.scenario_name,
            result.band,
            result.profile,
            result.seed,
            result.successful_iterations,
            result.iterations_run,
            high_risk_count(result)
        )?;
    }

    let failing: Vec<&ScenarioResult> = results.iter().filter(|r| !r.passed).collect();
    if !failing.is_empty() {
        writeln!(writer, "\n## Failures\n")?;
        for result in failing {
            for failure in &result.failures {
                writeln!(writer, "- `{}`: {failure}", result.scenario_name)?;
            }
        }
    }
    Ok(())
}

/// One row per completed iteration.
pub fn generate_csv_report<W: Write + ?Sized>(
    writer: &mut W,
    results: &[ScenarioResult],
) -> Result<()> {
    writeln!(
        writer,
        "scenario,band,profile,seed,iteration,risk_score,high_risk,raw_a,raw_b,raw_c,norm_a,norm_b,norm_c,actions,virtual_ms,level3_unlocked"
    )?;
    for result in results {
        for run in &result.runs {
            let unlocked = run
                .submission
                .as_ref()
                .map_or_else(String::new, |outcome| outcome.unlocked.to_string());
            writeln!(
                writer,
                "{},{},{},{},{},{},{},{:.2},{:.2},{:.2},{:.4},{:.4},{:.4},{},{},{}",
                result.scenario_name,
                result.band,
                result.profile,
                run.seed,
                run.iteration,
                run.risk_score,
                run.is_high_risk,
                run.raw.a.value(),
                run.raw.b.value(),
                run.raw.c.value(),
                run.normalized.a,
                run.normalized.b,
                run.normalized.c,
                run.actions,
                run.virtual_ms,
                unlocked
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{PlayerProfile, RunRecord};
    use cogniwise_game::{AgeBand, DomainScore, DomainScores, NormalizedScores};

    fn sample(passed: bool) -> ScenarioResult {
        ScenarioResult {
            scenario_name: "smoke".to_string(),
            band: AgeBand::Adult,
            profile: PlayerProfile::Typical,
            seed: 7,
            passed,
            iterations_run: 1,
            successful_iterations: usize::from(passed),
            failures: if passed {
                Vec::new()
            } else {
                vec!["stalled".to_string()]
            },
            runs: vec![RunRecord {
                iteration: 0,
                seed: 7,
                risk_score: 40,
                is_high_risk: false,
                raw: DomainScores {
                    a: DomainScore::new(50.0),
                    b: DomainScore::new(60.0),
                    c: DomainScore::new(80.0),
                },
                normalized: NormalizedScores::new(0.5, 0.6, 1.0),
                actions: 33,
                scored: 30,
                ignored: 1,
                virtual_ms: 90_000,
                submission: None,
            }],
            average_duration: Duration::from_millis(3),
        }
    }

    #[test]
    fn csv_has_one_row_per_run() {
        let mut out = Vec::new();
        generate_csv_report(&mut out, &[sample(true), sample(true)]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.starts_with("scenario,band,profile"));
        assert!(text.contains("smoke,adult,typical,7,0,40,false,50.00"));
    }

    #[test]
    fn markdown_lists_failures() {
        let mut out = Vec::new();
        generate_markdown_report(&mut out, &[sample(false)], Utc::now()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("# Cogniwise Level-2 Test Results"));
        assert!(text.contains("## Failures"));
        assert!(text.contains("stalled"));
    }

    #[test]
    fn console_reports_mean_risk() {
        let mut out = Vec::new();
        generate_console_report(&mut out, &[sample(true)], Duration::from_secs(1)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Mean risk: 40.0"));
    }

    #[test]
    fn json_is_an_array_of_results() {
        let mut out = Vec::new();
        generate_json_report(&mut out, &[sample(true)]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(1));
        assert_eq!(value[0]["scenario_name"], "smoke");
    }
}

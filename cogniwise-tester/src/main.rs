mod logic;
mod submit;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::Parser;
use cogniwise_game::{AgeBand, AssessmentConfig};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use logic::{
    LogicTester, PlayerProfile, ScenarioResult, SweepPlan, find_scenario, list_scenarios,
    resolve_seed_inputs,
};
use submit::SubmitTarget;

/// Divisor applied to every timing when `--fast` is set.
const FAST_DIVISOR: u64 = 10;

#[derive(Debug, Parser)]
#[command(name = "cogniwise-tester", version)]
#[command(about = "Automated QA for the Cogniwise Level-2 engine using scripted players")]
struct Args {
    /// Scenarios to run (comma-separated, or `all`)
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Age bands to play (comma-separated)
    #[arg(long, default_value = "child,adult,elderly")]
    bands: String,

    /// Player profiles for scenarios that do not fix one
    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        default_values_t = PlayerProfile::ALL.to_vec()
    )]
    profiles: Vec<PlayerProfile>,

    /// Seeds to run (comma-separated; hex and `a..=b` ranges accepted)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of iterations per scenario, band, profile and seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console", "csv"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Timing override JSON (same shape as the bundled assessment config)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Scale every timing down for quick sweeps
    #[arg(long)]
    fast: bool,

    /// Backend base URL; each completed session is submitted when set
    #[arg(long)]
    submit_url: Option<String>,

    /// User id sent with submissions
    #[arg(long, default_value = "cogniwise-qa")]
    user_id: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let sweep = SweepPlan {
        bands: parse_bands(&args.bands)?,
        profiles: args.profiles.clone(),
        seeds: resolve_seed_inputs(&split_csv(&args.seeds))?,
        iterations: args.iterations,
        config: load_config(&args)?,
    };
    let submit = args.submit_url.as_ref().map(|base_url| SubmitTarget {
        base_url: base_url.clone(),
        user_id: args.user_id.clone(),
    });

    let results = run_logic_scenarios(&args, &expand_scenarios(&args.scenarios), &sweep, submit);
    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:25} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🧠 Cogniwise Level-2 Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.iter().any(|s| s.eq_ignore_ascii_case("all")) {
        scenarios.retain(|s| !s.eq_ignore_ascii_case("all"));
        for (key, _) in list_scenarios() {
            if !scenarios.iter().any(|s| s == key) {
                scenarios.push(key.to_string());
            }
        }
    }
    scenarios
}

fn parse_bands(bands_arg: &str) -> Result<Vec<AgeBand>> {
    let mut bands = Vec::new();
    for token in split_csv(bands_arg) {
        let Some(band) = AgeBand::parse(&token) else {
            bail!("Unknown age band: {token} (expected child, adult or elderly)");
        };
        if !bands.contains(&band) {
            bands.push(band);
        }
    }
    if bands.is_empty() {
        bail!("No age bands selected");
    }
    Ok(bands)
}

fn load_config(args: &Args) -> Result<AssessmentConfig> {
    let config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            AssessmentConfig::from_json(&text)
                .with_context(|| format!("invalid assessment config {}", path.display()))?
        }
        None => AssessmentConfig::load_from_static(),
    };
    if args.fast {
        return config
            .compressed(FAST_DIVISOR)
            .context("--fast timings are inconsistent");
    }
    Ok(config)
}

fn run_logic_scenarios(
    args: &Args,
    scenarios: &[String],
    sweep: &SweepPlan,
    submit: Option<SubmitTarget>,
) -> Vec<ScenarioResult> {
    println!("{}", "🎯 Running Level-2 Scenarios".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let tester = LogicTester::new(args.verbose, submit);
    let mut results = Vec::new();

    for scenario_name in scenarios {
        if let Some(scenario) = find_scenario(scenario_name) {
            results.extend(tester.run_scenario(&scenario, sweep));
        } else {
            eprintln!("⚠️  Unknown scenario: {}", scenario_name.yellow());
        }
    }

    results
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, results)?,
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Cogniwise Level-2 Test Results\n\n_No scenarios executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results, Utc::now())?;
            }
        }
        "csv" => logic::reports::generate_csv_report(&mut output_target, results)?,
        _ => {
            if results.is_empty() {
                writeln!(&mut output_target, "No scenarios executed.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    results,
                    start_time.elapsed(),
                )?;
            }
            writeln!(&mut output_target)?;
            writeln!(
                &mut output_target,
                "🏁 Total time: {:?}",
                start_time.elapsed()
            )?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn base_args() -> Args {
        Args {
            scenarios: "smoke".to_string(),
            list_scenarios: false,
            bands: "child,adult,elderly".to_string(),
            profiles: PlayerProfile::ALL.to_vec(),
            seeds: "1337".to_string(),
            iterations: 1,
            report: "json".to_string(),
            verbose: false,
            output: None,
            config: None,
            fast: true,
            submit_url: None,
            user_id: "cogniwise-qa".to_string(),
        }
    }

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("cogniwise-{}-{name}", std::process::id()))
    }

    fn sample_result(passed: bool) -> ScenarioResult {
        ScenarioResult {
            scenario_name: "smoke".to_string(),
            band: AgeBand::Child,
            profile: PlayerProfile::Typical,
            seed: 1337,
            passed,
            iterations_run: 1,
            successful_iterations: usize::from(passed),
            failures: Vec::new(),
            runs: Vec::new(),
            average_duration: Duration::from_millis(10),
        }
    }

    #[test]
    fn expands_all_scenarios_keyword() {
        let expanded = expand_scenarios("smoke,all");
        assert_eq!(expanded.first().map(String::as_str), Some("smoke"));
        assert!(expanded.contains(&"inattentive-high-risk".to_string()));
        assert_eq!(
            expanded.iter().filter(|s| s.as_str() == "smoke").count(),
            1
        );
    }

    #[test]
    fn expand_scenarios_without_all_preserves_order() {
        let expanded = expand_scenarios("restart-recovers, smoke");
        assert_eq!(expanded, vec!["restart-recovers".to_string(), "smoke".to_string()]);
    }

    #[test]
    fn parse_bands_dedupes_and_rejects_unknown() {
        assert_eq!(
            parse_bands("adult, Adult,child").unwrap(),
            vec![AgeBand::Adult, AgeBand::Child]
        );
        assert!(parse_bands("teen").is_err());
        assert!(parse_bands(" , ").is_err());
    }

    #[test]
    fn fast_flag_compresses_timings() {
        let slow = load_config(&Args {
            fast: false,
            ..base_args()
        })
        .unwrap();
        let fast = load_config(&base_args()).unwrap();
        assert_eq!(
            fast.adult.signal_period_ms,
            (slow.adult.signal_period_ms / FAST_DIVISOR).max(1)
        );
    }

    #[test]
    fn fast_flag_keeps_recall_lit_inside_step() {
        let path = temp_file("tight-recall.json");
        std::fs::write(
            &path,
            r#"{"adult": {"recall_step_ms": 1009, "recall_lit_ms": 1001}}"#,
        )
        .unwrap();
        let fast = load_config(&Args {
            config: Some(path),
            ..base_args()
        })
        .unwrap();
        assert_eq!(fast.adult.recall_step_ms, 100);
        assert!(fast.adult.recall_lit_ms < fast.adult.recall_step_ms);
    }

    #[test]
    fn config_file_errors_are_reported() {
        let path = temp_file("bad-config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = load_config(&Args {
            config: Some(path),
            ..base_args()
        })
        .unwrap_err();
        assert!(format!("{err:#}").contains("invalid assessment config"));
    }

    #[test]
    fn maybe_list_scenarios_writes_output() {
        let temp = temp_file("scenarios.txt");
        let args = Args {
            list_scenarios: true,
            output: Some(temp.clone()),
            ..base_args()
        };
        assert!(maybe_list_scenarios(&args).unwrap());
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("Available scenarios"));
        assert!(content.contains("attentive-low-risk"));
    }

    #[test]
    fn maybe_list_scenarios_returns_false_when_disabled() {
        assert!(!maybe_list_scenarios(&base_args()).unwrap());
    }

    #[test]
    fn write_reports_emits_json_for_results() {
        let temp = temp_file("report.json");
        let args = Args {
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[sample_result(true)], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("scenario_name"));
    }

    #[test]
    fn write_reports_markdown_empty_results() {
        let temp = temp_file("report.md");
        let args = Args {
            report: "markdown".to_string(),
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("No scenarios executed"));
    }

    #[test]
    fn write_reports_console_includes_total_time() {
        let temp = temp_file("report.txt");
        let args = Args {
            report: "console".to_string(),
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[sample_result(false)], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("Total time"));
        assert!(content.contains("FAIL"));
    }

    #[test]
    fn run_logic_scenarios_skips_unknown_names() {
        let args = base_args();
        let sweep = SweepPlan {
            bands: vec![AgeBand::Elderly],
            profiles: vec![PlayerProfile::Attentive],
            seeds: vec![1],
            iterations: 1,
            config: load_config(&args).unwrap(),
        };
        let results =
            run_logic_scenarios(&args, &["nope".to_string(), "smoke".to_string()], &sweep, None);
        assert_eq!(results.len(), 1);
        assert!(results[0].passed);
    }

    #[test]
    fn output_target_stdout_writes() {
        let mut target = OutputTarget::new(None).unwrap();
        target.write_all(b"ok").unwrap();
        target.flush().unwrap();
    }
}

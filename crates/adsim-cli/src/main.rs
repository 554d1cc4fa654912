use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use clap::Parser;
use tabwriter::TabWriter;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

use adsim_algo::engine::simulate_run;
use adsim_core::entities::{Advertiser, AdvertiserId};
use adsim_cli::cli::{Cli, Commands, RunFormat, RunsCommands};
use adsim_cli::common::{parse_csv_string, parse_csv_u64, write_json};
use adsim_cli::manifest::{record_manifest, ManifestEntry};
use adsim_cli::runs::{discover_runs, resolve_manifest, summaries, RunRecord};
use adsim_scenarios::spec::{load_spec_from_path, resolve_scenarios, validate};

fn run_simulation(
    spec: &Path,
    scenario_id: &str,
    daily_budget: f64,
    seed: u64,
    days: u32,
    out: Option<&Path>,
) -> anyhow::Result<()> {
    let set = load_spec_from_path(spec)?;
    let resolved = resolve_scenarios(&set)?;
    let scenario = resolved
        .iter()
        .find(|r| r.scenario_id == scenario_id)
        .ok_or_else(|| anyhow::anyhow!("scenario_id '{}' not found in {}", scenario_id, spec.display()))?;

    let user = Advertiser::new_user(AdvertiserId::new(1), "user", daily_budget);
    let state = adsim_scenarios::apply::build_initial_state(user, scenario.scenario_id.clone(), &scenario.config);
    let result = simulate_run(state, &HashMap::new(), &scenario.config, seed, days);

    let last = result.daily_metrics.last();
    println!("Ran {} day(s) of scenario '{}' (seed {})", days, scenario_id, seed);
    if let Some(day) = last {
        println!(
            "Day {}: impressions={} clicks={} conversions={} cost={:.2} revenue={:.2}",
            day.day, day.impressions, day.clicks, day.conversions, day.cost, day.revenue
        );
    }
    let total_cost: f64 = result.daily_metrics.iter().map(|d| d.cost).sum();
    let total_revenue: f64 = result.daily_metrics.iter().map(|d| d.revenue).sum();
    println!("Totals over {} day(s): cost={:.2} revenue={:.2}", days, total_cost, total_revenue);

    if let Some(out_path) = out {
        let json = serde_json::to_string_pretty(&result)?;
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(out_path, json)?;
        println!("Wrote run result to {}", out_path.display());
        record_run(
            out_path,
            "run",
            &[
                ("spec", &spec.display().to_string()),
                ("scenario", scenario_id),
                ("seed", &seed.to_string()),
                ("days", &days.to_string()),
            ],
        );
    }
    Ok(())
}

fn run_validate(spec: &Path) -> anyhow::Result<()> {
    let set = load_spec_from_path(spec)?;
    let diagnostics = validate(&set);
    println!("{}", diagnostics.summary());
    for issue in diagnostics.errors() {
        println!("ERROR: {}", issue);
    }
    for issue in diagnostics.warnings() {
        println!("WARN: {}", issue);
    }
    if diagnostics.has_errors() {
        anyhow::bail!("scenario spec '{}' failed validation", spec.display());
    }
    Ok(())
}

fn run_batch_command(
    spec: &Path,
    scenarios: Option<&str>,
    seeds: &str,
    daily_budget: f64,
    days: u32,
    out: &Path,
    threads: usize,
) -> anyhow::Result<()> {
    let set = load_spec_from_path(spec)?;
    let resolved = resolve_scenarios(&set)?;

    let wanted = scenarios.map(parse_csv_string);
    let scenario_map: HashMap<String, adsim_core::ScenarioConfig> = resolved
        .iter()
        .filter(|r| wanted.as_ref().map_or(true, |ids| ids.contains(&r.scenario_id)))
        .map(|r| (r.scenario_id.clone(), r.config.clone()))
        .collect();
    if scenario_map.is_empty() {
        anyhow::bail!("no matching scenarios found in '{}'", spec.display());
    }

    let seed_list = parse_csv_u64(seeds);
    if seed_list.is_empty() {
        anyhow::bail!("no seeds provided");
    }

    let scenario_ids: Vec<String> = scenario_map.keys().cloned().collect();
    let jobs = adsim_batch::jobs_from_scenarios(&scenario_ids, &seed_list, days);

    let portfolio = Advertiser::new_user(AdvertiserId::new(1), "user", daily_budget);
    let config = adsim_batch::BatchRunnerConfig {
        jobs,
        scenarios: scenario_map,
        portfolio,
        output_root: out.to_path_buf(),
        threads,
    };
    let summary = adsim_batch::run_batch(&config)?;
    println!(
        "Batch complete: {} succeeded, {} failed. Manifest: {}",
        summary.success,
        summary.failure,
        summary.manifest_path.display()
    );

    record_run(
        &summary.manifest_path,
        "batch",
        &[
            ("spec", &spec.display().to_string()),
            ("seeds", seeds),
            ("days", &days.to_string()),
            ("threads", &threads.to_string()),
        ],
    );
    Ok(())
}

fn record_run(out: &Path, command: &str, params: &[(&str, &str)]) {
    if let Err(err) = record_manifest(out, command, params) {
        eprintln!("Failed to record run manifest: {err}");
    }
}

fn describe_manifest(manifest: &ManifestEntry) {
    println!("Manifest {} (cmd: `{}` @ v{} from {})", manifest.run_id, manifest.command, manifest.version, manifest.timestamp);
    if !manifest.params.is_empty() {
        println!("Parameters:");
        for param in &manifest.params {
            println!("  {} = {}", param.name, param.value);
        }
    }
    if !manifest.outputs.is_empty() {
        println!("Outputs:");
        for output in &manifest.outputs {
            println!("  {}", output);
        }
    }
}

fn print_run_table(records: &[RunRecord]) -> anyhow::Result<()> {
    let mut writer = TabWriter::new(io::stdout());
    use std::io::Write;
    writeln!(writer, "RUN ID\tCOMMAND\tTIMESTAMP\tVERSION\tMANIFEST")?;
    for record in records {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}",
            record.manifest.run_id, record.manifest.command, record.manifest.timestamp, record.manifest.version, record.path.display()
        )?;
    }
    writer.flush()?;
    Ok(())
}

fn print_run_json(records: &[RunRecord]) -> anyhow::Result<()> {
    let runs = summaries(records);
    write_json(&runs, &mut io::stdout())?;
    Ok(())
}

fn run_list(root: &Path, format: RunFormat) -> anyhow::Result<()> {
    let records = discover_runs(root)?;
    match format {
        RunFormat::Plain => print_run_table(&records),
        RunFormat::Json => print_run_json(&records),
    }
}

fn main() {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder().with_max_level(cli.log_level).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    match &cli.command {
        Some(Commands::Run { spec, scenario, daily_budget, seed, days, out }) => {
            info!("Running scenario {} from {}", scenario, spec.display());
            match run_simulation(spec, scenario, *daily_budget, *seed, *days, out.as_deref()) {
                Ok(()) => info!("Run complete"),
                Err(e) => {
                    error!("Run failed: {:?}", e);
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Validate { spec }) => {
            info!("Validating scenario spec {}", spec.display());
            match run_validate(spec) {
                Ok(()) => info!("Validation successful"),
                Err(e) => {
                    error!("Validation failed: {:?}", e);
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Batch { spec, scenarios, seeds, daily_budget, days, out, threads }) => {
            info!("Running batch from {}", spec.display());
            match run_batch_command(spec, scenarios.as_deref(), seeds, *daily_budget, *days, out, *threads) {
                Ok(()) => info!("Batch complete"),
                Err(e) => {
                    error!("Batch failed: {:?}", e);
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Runs { command }) => {
            let result = match command {
                RunsCommands::List { root, format } => run_list(root.as_path(), *format),
                RunsCommands::Show { target, root, format } => (|| -> anyhow::Result<()> {
                    let record = resolve_manifest(root.as_path(), target.as_str())?;
                    match format {
                        RunFormat::Plain => describe_manifest(&record.manifest),
                        RunFormat::Json => write_json(&record.manifest, &mut io::stdout())?,
                    }
                    Ok(())
                })(),
            };
            match result {
                Ok(()) => info!("Runs command successful"),
                Err(e) => {
                    error!("Runs command failed: {:?}", e);
                    std::process::exit(1);
                }
            }
        }
        None => {
            info!("No subcommand provided. Use `adsim --help` for more information.");
        }
    }
}

mod evaluate;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use engine::{EngineConfig, Recommendation, RecommendationEngine};
use profiles::{MockProfileGenerator, Profile, ProfileId, ProfileRecord};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::evaluate::evaluate;

/// Roomies - Roommate Recommendation Engine
#[derive(Parser)]
#[command(name = "roomies")]
#[command(about = "Roommate matching by profile similarity", long_about = None)]
struct Cli {
    /// JSON file with engine settings (missing keys keep their defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    corpus: CorpusArgs,

    #[command(subcommand)]
    command: Commands,
}

/// How the demo corpus is generated
#[derive(Args)]
struct CorpusArgs {
    /// Number of mock profiles, added as one batch
    #[arg(long, default_value = "100", global = true)]
    mock: usize,

    /// Number of real-style profiles, added one at a time
    #[arg(long, default_value = "10", global = true)]
    real: usize,

    /// Seed for the profile generator
    #[arg(long, default_value = "42", global = true)]
    seed: u64,

    /// JSON Lines file of extra real profile records, added after the generated ones
    #[arg(long, global = true)]
    records: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show recommendations for one of the real users
    Recommend {
        /// Which real user (0-based)
        #[arg(long, default_value = "0")]
        user: usize,

        /// Number of recommendations to return
        #[arg(long, default_value = "5")]
        limit: usize,

        /// Leave mock profiles out of the results
        #[arg(long)]
        real_only: bool,

        /// Show the attributes behind each match
        #[arg(long)]
        explain: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Evaluate recommendation quality over all real users
    Evaluate {
        /// Recommendations requested per user
        #[arg(long, default_value = "5")]
        limit: usize,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Run benchmark to test concurrent recommendation latency
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "1000")]
        requests: usize,

        /// Number of worker threads
        #[arg(long, default_value = "8")]
        threads: usize,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    // Build the corpus
    let start = Instant::now();
    let (engine, real_users) = build_engine(config, &cli.corpus)?;
    let (real, mock) = engine.counts();
    eprintln!(
        "{} Loaded {} profiles ({} real, {} mock) in {:?}",
        "✓".green(),
        real + mock,
        real,
        mock,
        start.elapsed()
    );

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Recommend {
            user,
            limit,
            real_only,
            explain,
            json,
        } => handle_recommend(&engine, &real_users, user, limit, !real_only, explain, json)?,
        Commands::Evaluate { limit, json } => handle_evaluate(&engine, &real_users, limit, json)?,
        Commands::Benchmark { requests, threads } => {
            handle_benchmark(&engine, &real_users, requests, threads)?
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// Read one profile record per non-empty line.
fn load_records(path: &Path) -> Result<Vec<ProfileRecord>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read records file {}", path.display()))?;
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            ProfileRecord::from_json(line)
                .with_context(|| format!("Invalid record at {}:{}", path.display(), i + 1))
        })
        .collect()
}

/// Add the mock batch, then the real users one at a time, then train.
fn build_engine(
    config: EngineConfig,
    args: &CorpusArgs,
) -> Result<(RecommendationEngine, Vec<ProfileId>)> {
    let engine = RecommendationEngine::new(config);
    let mut generator = MockProfileGenerator::new(args.seed);

    engine
        .add_profiles_batch(&generator.generate_mock(args.mock), true)
        .context("Failed to add mock profiles")?;

    let mut real_users = generator
        .generate_real(args.real)
        .iter()
        .map(|record| engine.add_profile(record, false))
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to add real profiles")?;

    if let Some(path) = &args.records {
        for record in load_records(path)? {
            real_users.push(
                engine
                    .add_profile(&record, false)
                    .with_context(|| format!("Failed to add profile from {}", path.display()))?,
            );
        }
    }

    if !engine.train() {
        bail!(
            "Not enough profiles to train: have {}, need {}",
            engine.len(),
            engine.config().min_training_size
        );
    }
    Ok((engine, real_users))
}

/// Handle the 'recommend' command
fn handle_recommend(
    engine: &RecommendationEngine,
    real_users: &[ProfileId],
    user: usize,
    limit: usize,
    include_mock: bool,
    explain: bool,
    json: bool,
) -> Result<()> {
    let id = real_users
        .get(user)
        .ok_or_else(|| anyhow!("Real user {} not found ({} available)", user, real_users.len()))?;
    let requester = engine
        .profile(id)
        .ok_or_else(|| anyhow!("Profile {} not found", id))?;

    let recommendations = engine
        .try_recommend(id, limit, include_mock)
        .context("Failed to compute recommendations")?;

    if json {
        let output = serde_json::json!({
            "requester": &*requester,
            "cluster": engine.cluster_of(id),
            "recommendations": recommendations
                .iter()
                .map(|r| serde_json::json!({
                    "profile": &*r.profile,
                    "compatibility_score": r.compatibility_score,
                    "cluster": r.cluster,
                }))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", "Requester:".bold().blue());
    println!("  {}", describe(&requester));
    if explain {
        println!("  {}", lifestyle(&requester).dimmed());
    }
    print_recommendations(&recommendations, explain);
    Ok(())
}

/// Handle the 'evaluate' command
fn handle_evaluate(
    engine: &RecommendationEngine,
    real_users: &[ProfileId],
    limit: usize,
    json: bool,
) -> Result<()> {
    let report = evaluate(engine, real_users, limit).ok_or_else(|| {
        anyhow!("Need at least 2 real users with recommendations for evaluation")
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "Evaluation Results:".bold().blue());
    println!(
        "{}Total recommendations generated: {}",
        "• ".green(),
        report.total_recommendations
    );
    println!(
        "{}Accuracy (meets basic criteria): {:.2}%",
        "• ".green(),
        report.criteria_accuracy * 100.0
    );
    println!(
        "{}Average compatibility score: {:.2}",
        "• ".green(),
        report.avg_compatibility
    );
    println!(
        "{}Cluster consistency: {:.2}%",
        "• ".green(),
        report.cluster_consistency * 100.0
    );
    println!(
        "{}Average recommendations per user: {:.1}",
        "• ".green(),
        report.avg_recommendations_per_user
    );
    Ok(())
}

/// Handle the 'benchmark' command
fn handle_benchmark(
    engine: &RecommendationEngine,
    real_users: &[ProfileId],
    requests: usize,
    threads: usize,
) -> Result<()> {
    if real_users.is_empty() || requests == 0 {
        bail!("Benchmark needs at least one real user and one request");
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("Failed to build thread pool")?;

    // Cycle through the real users
    let wall = Instant::now();
    let mut timings: Vec<Duration> = pool.install(|| {
        (0..requests)
            .into_par_iter()
            .map(|i| {
                let start = Instant::now();
                let _ = engine.recommend(&real_users[i % real_users.len()], 5, true);
                start.elapsed()
            })
            .collect()
    });
    let wall = wall.elapsed();

    // Calculate and display statistics
    let total_time: Duration = timings.iter().sum();
    let avg_latency = total_time / (timings.len() as u32);
    timings.sort();
    let percentile = |p: f64| timings[((timings.len() as f64 * p) as usize).min(timings.len() - 1)];
    let throughput = requests as f64 / wall.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} on {} threads", requests, threads);
    println!("Wall time: {:?}", wall);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Helper function to format and print recommendations
fn print_recommendations(recommendations: &[Recommendation], explain: bool) {
    println!("{}", "Roommate Recommendations:".bold().blue());
    if recommendations.is_empty() {
        println!("  (no candidates passed the filters)");
    }
    for (i, rec) in recommendations.iter().enumerate() {
        let cluster = rec
            .cluster
            .map_or_else(|| "-".to_string(), |c| c.to_string());
        println!(
            "{}. {} - Score: {:.2} (cluster {})",
            (i + 1).to_string().green(),
            describe(&rec.profile),
            rec.compatibility_score,
            cluster
        );
        if explain {
            println!("   {}", lifestyle(&rec.profile).dimmed());
        }
    }
}

fn describe(profile: &Profile) -> String {
    let kind = if profile.is_mock { "mock" } else { "real" };
    format!(
        "{}yo {} {} [{}, {}]",
        profile.age,
        profile.gender,
        profile.occupation.as_deref().unwrap_or("-"),
        kind,
        profile.profile_id
    )
}

fn lifestyle(profile: &Profile) -> String {
    format!(
        "{}, {}, {}, pets: {} (tolerates {}), {}",
        profile.personality_type,
        profile.sleep_pattern,
        profile.cleanliness_level,
        if profile.has_pets { "yes" } else { "no" },
        profile.pet_tolerance,
        profile.smoking
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("roomies-{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_records_skips_blank_lines() {
        let path = write_temp(
            "records.jsonl",
            "{\"profile_id\": \"a\", \"age\": 30}\n\n{\"profile_id\": \"b\"}\n",
        );
        let records = load_records(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(records.len(), 2);
        assert!(records[0].contains("age"));
        assert!(!records[1].contains("age"));
    }

    #[test]
    fn test_load_records_reports_bad_line() {
        let path = write_temp("bad.jsonl", "{\"age\": 30}\n[1, 2]\n");
        let err = load_records(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();

        assert!(format!("{err}").ends_with(":2"));
    }
}

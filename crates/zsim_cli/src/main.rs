use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::info;
use zsim_core::listener::ListenerSignal;
use zsim_core::{Battle, PreloadCounters, SessionContext};
use zsim_world::{build_battle, load_content, load_listeners, load_priority_list};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "zsim_cli", about = "Combat simulator preload runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the battle for a fixed number of ticks per segment.
    Run {
        #[arg(long)]
        ticks: u64,
        /// Segments to run; each starts from tick 0 with fresh history.
        #[arg(long, default_value_t = 1)]
        segments: u32,
        #[arg(long, default_value = "./content")]
        content_dir: String,
        /// Priority list file. Defaults to `<content-dir>/apl.json`.
        #[arg(long)]
        apl: Option<String>,
        /// Seed for the run id. Random when omitted.
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value_t = 100)]
        print_every: u64,
        /// Used when RUST_LOG is unset.
        #[arg(long, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
        log_level: String,
        /// Write a JSON run summary to this path.
        #[arg(long)]
        summary: Option<String>,
    },
}

struct RunArgs {
    ticks: u64,
    segments: u32,
    content_dir: String,
    apl: Option<String>,
    seed: Option<u64>,
    print_every: u64,
    summary: Option<String>,
}

#[derive(Serialize)]
struct RunSummary<'a> {
    session: &'a SessionContext,
    content_version: &'a str,
    ticks_per_segment: u64,
    counters: PreloadCounters,
    signals: Vec<(ListenerSignal, usize)>,
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

fn init_tracing(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: RunArgs) -> Result<()> {
    let content = load_content(&args.content_dir)?;
    let listeners = load_listeners(&args.content_dir, &content)?;
    let apl_path = args
        .apl
        .unwrap_or_else(|| format!("{}/apl.json", args.content_dir));
    let apl = load_priority_list(&apl_path, &content)?;

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut session = SessionContext::new(seed, &mut rng);
    let mut battle = build_battle(&content, &listeners, apl);

    println!(
        "Starting battle: run_id={} seed={seed} ticks={} segments={} content_version={}",
        session.run_id, args.ticks, args.segments, content.content_version,
    );
    println!("{}", "-".repeat(80));

    for _ in 0..args.segments {
        let segment = session.next_segment();
        info!(segment, "segment started");
        for _ in 0..args.ticks {
            let tick = battle.current_tick();
            let admitted = battle
                .tick()
                .with_context(|| format!("segment {segment} tick {tick}"))?;
            for node in admitted.iter().filter(|n| n.active_generation()) {
                info!(
                    tick,
                    char_id = %node.char_id(),
                    skill_tag = %node.skill_tag(),
                    "action started"
                );
            }
            if args.print_every > 0 && tick % args.print_every == 0 {
                print_status(&battle, segment, tick);
            }
        }
        battle.reset_segment();
    }

    println!("{}", "-".repeat(80));
    let counters = *battle.preload().data().counters();
    let signals = signal_counts(&battle);
    println!(
        "Done. ticks={} admitted={} waits={} displacements={} attacks_resolved={}",
        counters.ticks,
        counters.nodes_admitted,
        counters.waits,
        counters.displacements,
        counters.attacks_resolved,
    );
    for (signal, count) in &signals {
        println!("  {signal:?}: {count}");
    }

    if let Some(path) = args.summary {
        let summary = RunSummary {
            session: &session,
            content_version: &content.content_version,
            ticks_per_segment: args.ticks,
            counters,
            signals,
        };
        let file =
            std::fs::File::create(&path).with_context(|| format!("creating {path}"))?;
        serde_json::to_writer_pretty(file, &summary).with_context(|| format!("writing {path}"))?;
        println!("Summary written to {path}");
    }

    Ok(())
}

fn signal_counts(battle: &Battle) -> Vec<(ListenerSignal, usize)> {
    let Some(log) = battle.world().listeners.signal_log() else {
        return Vec::new();
    };
    [
        ListenerSignal::EnterBattle,
        ListenerSignal::Anomaly,
        ListenerSignal::StateUpdate,
    ]
    .into_iter()
    .map(|signal| (signal, log.count(signal)))
    .collect()
}

fn print_status(battle: &Battle, segment: u32, tick: u64) {
    let data = battle.preload().data();
    let operating = data
        .operating_now()
        .map_or_else(|| "-".to_string(), |id| id.to_string());
    let latest = data
        .latest_active()
        .map_or_else(|| "-".to_string(), |n| n.skill_tag().to_string());
    let counters = data.counters();

    println!(
        "[segment={segment} tick={tick:05}]  operating={operating:>5}  latest={latest:<24}  \
         admitted={admitted:5}  waits={waits:5}  missions={missions:2}  stunned={stunned}",
        admitted = counters.nodes_admitted,
        waits = counters.waits,
        missions = battle.world().missions.len(),
        stunned = battle.world().enemy.is_stunned(),
    );
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            ticks,
            segments,
            content_dir,
            apl,
            seed,
            print_every,
            log_level,
            summary,
        } => {
            init_tracing(&log_level);
            run(RunArgs {
                ticks,
                segments,
                content_dir,
                apl,
                seed,
                print_every,
                summary,
            })?;
        }
    }
    Ok(())
}

use std::{path::PathBuf, process::ExitCode};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::level_filters::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "signclip", version)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every dictionary key and its clip.
    Keys,
    /// Show how text is segmented into tokens (no clip is read).
    Segment(TextArgs),
    /// Resolve clips and print the render plan as JSON (requires `ffprobe` on PATH).
    Plan(TextArgs),
    /// Render text to an MP4 (requires `ffmpeg` and `ffprobe` on PATH).
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Pipeline configuration JSON.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Gesture clip directory (overrides the config).
    #[arg(long, global = true)]
    assets: Option<PathBuf>,

    /// Maximum input length in characters (overrides the config).
    #[arg(long, global = true)]
    max_chars: Option<usize>,

    /// Phrase selection strategy (overrides the config).
    #[arg(long, value_enum, global = true)]
    strategy: Option<StrategyChoice>,

    /// Keep spelled characters that have no clip so they show up as warnings.
    #[arg(long, global = true)]
    report_unknown: bool,

    /// Behaviour when a render is already running (overrides the config).
    #[arg(long, value_enum, global = true)]
    busy: Option<BusyChoice>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Args, Debug)]
struct TextArgs {
    /// Text to translate.
    text: String,

    /// Print JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Text to translate.
    text: String,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Playback speed multiplier (0.25..=2.0).
    #[arg(long)]
    rate: Option<f64>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyChoice {
    Longest,
    Shortest,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BusyChoice {
    Reject,
    Cancel,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.common.verbose);

    let mut config = load_config(&cli.common)?;
    if let Command::Render(args) = &cli.cmd
        && let Some(rate) = args.rate
    {
        config.encoder.playback_rate = rate;
    }
    config.validate()?;

    let result = match cli.cmd {
        Command::Keys => cmd_keys(&config),
        Command::Segment(args) => cmd_segment(config, args),
        Command::Plan(args) => cmd_plan(config, args),
        Command::Render(args) => cmd_render(config, args),
    };

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => match e.downcast_ref::<signclip::SignError>() {
            Some(err) if err.is_nothing_to_render() => {
                eprintln!("{err}");
                Ok(ExitCode::from(2))
            }
            _ => Err(e),
        },
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

fn load_config(common: &CommonArgs) -> anyhow::Result<signclip::PipelineConfig> {
    let mut config = match &common.config {
        Some(path) => signclip::PipelineConfig::load(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => signclip::PipelineConfig::default(),
    };
    if let Some(dir) = &common.assets {
        config.asset_dir = dir.clone();
    }
    if let Some(max) = common.max_chars {
        config.max_input_chars = max;
    }
    if let Some(strategy) = common.strategy {
        config.match_strategy = match strategy {
            StrategyChoice::Longest => signclip::MatchStrategy::MaximalMunch,
            StrategyChoice::Shortest => signclip::MatchStrategy::FirstFit,
        };
    }
    if common.report_unknown {
        config.unknown_letters = signclip::UnknownLetterPolicy::Report;
    }
    if let Some(busy) = common.busy {
        config.busy_policy = match busy {
            BusyChoice::Reject => signclip::BusyPolicy::Reject,
            BusyChoice::Cancel => signclip::BusyPolicy::CancelInFlight,
        };
    }
    Ok(config)
}

fn cmd_keys(config: &signclip::PipelineConfig) -> anyhow::Result<()> {
    let dict = signclip::Dictionary::load(&config.asset_dir)?;
    for entry in dict.entries() {
        println!("{}\t{}", entry.key, entry.asset_path.display());
    }
    for dup in dict.duplicates() {
        eprintln!("ignored duplicate clip {}", dup.display());
    }
    eprintln!(
        "{} keys in {} (fingerprint {:016x})",
        dict.len(),
        dict.root().display(),
        dict.fingerprint()
    );
    Ok(())
}

fn cmd_segment(config: signclip::PipelineConfig, args: TextArgs) -> anyhow::Result<()> {
    let pipeline = signclip::SignPipeline::from_config(config)?;
    let (normalized, segmentation) = pipeline.segment(&args.text)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&segmentation)?);
        return Ok(());
    }

    eprintln!(
        "clean: '{}' ({:?})",
        normalized.clean_text, normalized.sentence_type
    );
    for token in &segmentation.tokens {
        let key = token.resolved_key.as_deref().unwrap_or("-");
        println!("{:<15} {:<20} {key}", format!("{:?}", token.kind), token.span);
    }
    if segmentation.is_empty() {
        return Err(signclip::SignError::empty_segmentation("no tokens").into());
    }
    Ok(())
}

fn cmd_plan(config: signclip::PipelineConfig, args: TextArgs) -> anyhow::Result<()> {
    let pipeline = signclip::SignPipeline::from_config(config)?;
    let plan = pipeline.plan(&args.text)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    for entry in &plan.timeline.entries {
        match entry {
            signclip::TimelineEntry::Clip(clip) => println!(
                "clip   {:>7.3}s  {}  ({})",
                clip.duration_sec(),
                clip.token.span,
                clip.asset_path.display()
            ),
            signclip::TimelineEntry::Spacer(s) => println!("spacer {:>7.3}s", s.duration_sec),
        }
    }
    for w in &plan.warnings {
        eprintln!("warning: {w}");
    }
    eprintln!(
        "{} clips, {:.2}s total",
        plan.timeline.clip_count(),
        plan.timeline.total_duration_sec()
    );
    Ok(())
}

fn cmd_render(config: signclip::PipelineConfig, args: RenderArgs) -> anyhow::Result<()> {
    let pipeline = signclip::SignPipeline::from_config(config)?;
    let cancel = signclip::CancelToken::new();
    let translation = pipeline.translate(&args.text, &args.out, &cancel)?;

    for w in &translation.plan.warnings {
        eprintln!("warning: {w}");
    }
    eprintln!("wrote {}", translation.output_path.display());
    Ok(())
}

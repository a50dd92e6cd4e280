//! # LLM2048 Main Entry Point
//!
//! Parses arguments, wires the engine to a move source and observers, and
//! drives the session loop until the game is over or the player quits.

use clap::Parser;
use llm2048::{
    config, BestScoreStore, GameEngine, InputListener, KeyboardSource, LlmConfig, LlmPlayer,
    LlmSource, Llm2048Error, Llm2048Result, MoveSource, ScoreKeeper, TerminalRenderer,
    TerminalSession, UsageTracker,
};
use std::path::PathBuf;

/// Command line arguments for LLM2048.
#[derive(Parser, Debug)]
#[command(name = "llm2048")]
#[command(about = "Terminal 2048 with an LLM-driven automated player")]
#[command(version)]
struct Args {
    /// Random seed for reproducible games
    #[arg(short, long)]
    seed: Option<u64>,

    /// Square board dimension
    #[arg(long, default_value_t = config::DEFAULT_GRID_SIZE,
          value_parser = clap::value_parser!(i32).range(2..=16))]
    size: i32,

    /// Let the LLM play instead of the keyboard
    #[arg(long)]
    llm: bool,

    /// Chat-completion endpoint used with --llm
    #[arg(long, default_value = config::DEFAULT_LLM_ENDPOINT)]
    endpoint: String,

    /// Model used with --llm
    #[arg(long, default_value = config::DEFAULT_LLM_MODEL)]
    model: String,

    /// Persist the best score to this file
    #[arg(long)]
    best_score_file: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Llm2048Result<()> {
    let args = Args::parse();
    initialize_logging(&args.log_level);
    log::info!("starting llm2048 v{}", llm2048::VERSION);

    // Fail before touching the terminal if the LLM mode is unusable.
    let api_key = if args.llm {
        std::env::var("OPENAI_API_KEY")
            .map_err(|_| Llm2048Error::Llm("OPENAI_API_KEY is not set".to_string()))?
    } else {
        String::new()
    };

    let mut engine = GameEngine::new(args.size, args.seed);

    let store = args.best_score_file.clone().map(BestScoreStore::new);
    let best_score = store.as_ref().map(BestScoreStore::load).unwrap_or(0);

    let session = TerminalSession::enter()?;
    engine.add_observer(Box::new(TerminalRenderer::new(best_score)));
    if let Some(store) = store {
        engine.add_observer(Box::new(ScoreKeeper::new(store)));
    }
    engine.publish()?;

    let listener = InputListener::spawn();
    let usage = if args.llm {
        let llm_config = LlmConfig::new(args.endpoint.clone(), args.model.clone(), api_key);
        let mut source = LlmSource::new(LlmPlayer::new(llm_config), listener);
        let outcome = run_session(&mut engine, &mut source).await;
        let usage = *source.usage();
        outcome?;
        Some(usage)
    } else {
        let mut source = KeyboardSource::new(listener);
        run_session(&mut engine, &mut source).await?;
        if engine.over {
            // Leave the final board on screen until a mapped key is pressed.
            let _ = source.next_move(&engine.snapshot()).await?;
        }
        None
    };

    drop(session);
    print_summary(&engine, usage.as_ref());
    Ok(())
}

/// Feeds directions from the source into the engine until the game ends or
/// the source signals quit.
async fn run_session<S: MoveSource>(engine: &mut GameEngine, source: &mut S) -> Llm2048Result<()> {
    while !engine.over {
        let snapshot = engine.snapshot();
        match source.next_move(&snapshot).await? {
            Some(direction) => engine.apply_move(direction)?,
            None => {
                log::info!("quit requested");
                break;
            }
        }
    }
    Ok(())
}

/// Initializes the logging system based on the specified log level.
fn initialize_logging(log_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

fn print_summary(engine: &GameEngine, usage: Option<&UsageTracker>) {
    println!("Final score: {}", engine.score);
    if engine.won {
        println!("You reached 2048!");
    }
    if engine.over {
        println!("No moves remained.");
    }
    if let Some(usage) = usage {
        println!(
            "LLM usage: {} prompt tokens, {} completion tokens (est. ${:.4})",
            usage.input_tokens,
            usage.output_tokens,
            usage.cost_usd()
        );
    }
}

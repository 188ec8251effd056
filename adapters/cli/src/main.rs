#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless maze chase and reports the outcome.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use maze_chase_core::{AdversarySnapshot, Direction, Event, Level, PlayerSnapshot};
use maze_chase_system_session::{Config, Session};
use maze_chase_world::query;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the headless runner.
#[derive(Debug, Parser)]
#[command(name = "maze-chase", about = "Runs the maze chase simulation headlessly")]
struct Args {
    /// Level to start on.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    level: u32,
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 3_600)]
    ticks: u64,
    /// Seed for the adversaries' wandering choices.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Directions the player requests in turn, separated by commas.
    #[arg(long, value_enum, value_delimiter = ',', default_value = "west,north,east,south")]
    route: Vec<Heading>,
    /// Ticks between consecutive route requests.
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    turn_interval: u64,
    /// Number of times the player may be caught before the run stops.
    #[arg(long, default_value_t = 3)]
    lives: u32,
    /// Enables the shared dot counter after the player is caught.
    #[arg(long)]
    global_dot_counter: bool,
    /// Prints the summary as JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Heading {
    North,
    West,
    South,
    East,
}

impl From<Heading> for Direction {
    fn from(heading: Heading) -> Self {
        match heading {
            Heading::North => Direction::North,
            Heading::West => Direction::West,
            Heading::South => Direction::South,
            Heading::East => Direction::East,
        }
    }
}

/// Outcome of a headless run.
#[derive(Debug, Serialize)]
struct Summary {
    level: Level,
    ticks: u64,
    score: u64,
    remaining_items: u32,
    levels_cleared: u32,
    times_caught: u32,
    player: PlayerSnapshot,
    adversaries: Vec<AdversarySnapshot>,
}

/// Entry point for the maze chase command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let summary = run(&args)?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("failed to encode summary")?
        );
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn run(args: &Args) -> Result<Summary> {
    let config = Config::new(Level::new(args.level), args.seed)
        .with_global_dot_counter(args.global_dot_counter);
    let mut session = Session::new(config).context("failed to start session")?;
    info!(level = args.level, seed = args.seed, "session started");

    let mut levels_cleared = 0;
    let mut times_caught = 0;
    let mut ticks = 0;

    while ticks < args.ticks {
        if !args.route.is_empty() && ticks % args.turn_interval == 0 {
            let step = usize::try_from(ticks / args.turn_interval)?;
            let heading = args.route[step % args.route.len()];
            session
                .request_direction(heading.into())
                .context("failed to request direction")?;
        }

        let events = session
            .tick()
            .with_context(|| format!("simulation failed on tick {}", ticks + 1))?;
        ticks += 1;
        for event in &events {
            log_event(event);
        }

        let world = session.world();
        if !query::is_halted(world) {
            continue;
        }
        if query::remaining_items(world) == 0 {
            levels_cleared += 1;
            let next = query::level(world).next();
            info!(level = next.get(), "level cleared");
            let _ = session.start_level(next).context("failed to start level")?;
        } else {
            times_caught += 1;
            if times_caught > args.lives {
                info!(tick = ticks, "no lives left");
                break;
            }
            let _ = session.reset_actors().context("failed to reset actors")?;
        }
    }

    let world = session.world();
    Ok(Summary {
        level: query::level(world),
        ticks,
        score: session.score(),
        remaining_items: query::remaining_items(world),
        levels_cleared,
        times_caught,
        player: query::player(world),
        adversaries: query::adversary_view(world).into_vec(),
    })
}

fn log_event(event: &Event) {
    match event {
        Event::TimeAdvanced { .. } => {}
        Event::ItemConsumed { .. } => debug!(?event, "item consumed"),
        Event::AdversaryCaughtPlayer { adversary } => info!(?adversary, "player caught"),
        Event::PlayerCaughtAdversary { adversary, points } => {
            info!(?adversary, points, "adversary captured");
        }
        _ => info!(?event, "world event"),
    }
}

fn print_summary(summary: &Summary) {
    println!("level:          {}", summary.level.get());
    println!("ticks:          {}", summary.ticks);
    println!("score:          {}", summary.score);
    println!("items left:     {}", summary.remaining_items);
    println!("levels cleared: {}", summary.levels_cleared);
    println!("times caught:   {}", summary.times_caught);
    println!(
        "player:         tile ({}, {}) heading {:?}",
        summary.player.tile.column(),
        summary.player.tile.row(),
        summary.player.direction
    );
    for adversary in &summary.adversaries {
        println!(
            "{:<15} tile ({}, {}) {:?} {:?} {:?}",
            format!("{:?}:", adversary.id),
            adversary.tile.column(),
            adversary.tile.row(),
            adversary.status.locomotion,
            adversary.status.threat,
            adversary.status.vitality,
        );
    }
}

use maze_chase_core::{Command, Event, Level, PursuitMode};
use maze_chase_system_mode_scheduler::ModeScheduler;

fn start(level: Level) -> ModeScheduler {
    let mut scheduler = ModeScheduler::new();
    let mut commands = Vec::new();
    scheduler.handle(
        &[Event::LevelStarted {
            level,
            remaining: 244,
        }],
        &mut commands,
    );
    assert!(commands.is_empty(), "a fresh level starts in scatter silently");
    scheduler
}

fn run(scheduler: &mut ModeScheduler, ticks: u32) -> Vec<Command> {
    let mut commands = Vec::new();
    for tick in 0..ticks {
        scheduler.handle(
            &[Event::TimeAdvanced {
                tick: u64::from(tick),
            }],
            &mut commands,
        );
    }
    commands
}

#[test]
fn first_scatter_lasts_seven_seconds_on_level_one() {
    let mut scheduler = start(Level::FIRST);

    assert!(run(&mut scheduler, 419).is_empty());
    assert_eq!(scheduler.remaining(), Some(1));

    let commands = run(&mut scheduler, 1);
    assert_eq!(
        commands,
        vec![Command::SwitchThreatMode {
            mode: PursuitMode::Chase,
        }]
    );
    assert_eq!(scheduler.phase(), 1);
    assert_eq!(scheduler.remaining(), Some(1200));
}

#[test]
fn phases_alternate_then_chase_forever() {
    let mut scheduler = start(Level::FIRST);
    let total: u32 = [7, 20, 7, 20, 5, 20, 5].iter().sum::<u32>() * 60;

    let commands = run(&mut scheduler, total);
    let modes: Vec<PursuitMode> = commands
        .iter()
        .map(|command| match command {
            Command::SwitchThreatMode { mode } => *mode,
            other => panic!("unexpected command {other:?}"),
        })
        .collect();
    assert_eq!(
        modes,
        vec![
            PursuitMode::Chase,
            PursuitMode::Scatter,
            PursuitMode::Chase,
            PursuitMode::Scatter,
            PursuitMode::Chase,
            PursuitMode::Scatter,
            PursuitMode::Chase,
        ]
    );
    assert_eq!(scheduler.phase(), 7);
    assert_eq!(scheduler.remaining(), None);
    assert!(run(&mut scheduler, 10_000).is_empty());
    assert_eq!(scheduler.mode(), PursuitMode::Chase);
}

#[test]
fn vulnerability_pauses_the_countdown_without_losing_ticks() {
    let mut scheduler = start(Level::FIRST);
    let _ = run(&mut scheduler, 100);

    let mut commands = Vec::new();
    scheduler.handle(
        &[
            Event::TimeAdvanced { tick: 101 },
            Event::VulnerabilityTriggered { ticks: 360 },
        ],
        &mut commands,
    );
    assert!(scheduler.is_paused());
    assert_eq!(scheduler.remaining(), Some(319));

    assert!(run(&mut scheduler, 360).is_empty());
    assert_eq!(scheduler.remaining(), Some(319));

    scheduler.handle(&[Event::VulnerabilityEnded], &mut commands);
    assert!(!scheduler.is_paused());
    assert!(run(&mut scheduler, 318).is_empty());
    assert_eq!(
        run(&mut scheduler, 1),
        vec![Command::SwitchThreatMode {
            mode: PursuitMode::Chase,
        }]
    );
}

#[test]
fn later_levels_use_shorter_scatter_and_single_tick_final_phase() {
    let mut scheduler = start(Level::new(2));
    let before_last: u32 = (7 + 20 + 7 + 20 + 5 + 1033) * 60;

    let commands = run(&mut scheduler, before_last);
    assert_eq!(commands.len(), 6);
    assert_eq!(scheduler.remaining(), Some(1));
    assert_eq!(scheduler.mode(), PursuitMode::Scatter);

    assert_eq!(
        run(&mut scheduler, 1),
        vec![Command::SwitchThreatMode {
            mode: PursuitMode::Chase,
        }]
    );

    let mut fifth = start(Level::new(5));
    assert!(run(&mut fifth, 299).is_empty());
    assert_eq!(run(&mut fifth, 1).len(), 1);
}

#[test]
fn actors_reset_restarts_from_the_first_phase() {
    let mut scheduler = start(Level::FIRST);
    let _ = run(&mut scheduler, 500);
    assert_eq!(scheduler.mode(), PursuitMode::Chase);

    let mut commands = Vec::new();
    scheduler.handle(
        &[
            Event::VulnerabilityTriggered { ticks: 360 },
            Event::ActorsReset {
                level: Level::FIRST,
                remaining: 200,
            },
        ],
        &mut commands,
    );

    assert!(commands.is_empty());
    assert_eq!(scheduler.phase(), 0);
    assert_eq!(scheduler.mode(), PursuitMode::Scatter);
    assert!(!scheduler.is_paused());
    assert_eq!(scheduler.remaining(), Some(420));
}

use clap::Parser;
use creature_clash::battle::runner::NullPresenter;
use creature_clash::battle::state::HealthChange;
use creature_clash::{
    BattleRunner, BattleState, MatchConfig, MoveChoice, MoveRequester, PlayerConfig, Presenter,
    Registry,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "creature-clash")]
#[command(about = "Run a two-player creature battle")]
struct Options {
    /// Match setup in RON (players, rosters, AI levels, seed)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Load game data from a directory instead of the built-in set
    #[arg(long)]
    data: Option<PathBuf>,

    /// Seed the battle RNG
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many turns
    #[arg(long, default_value_t = 200)]
    turns: u32,

    /// Play the first side yourself
    #[arg(long, default_value_t = false)]
    human: bool,

    /// Print events and the summary as JSON instead of narration
    #[arg(long, default_value_t = false)]
    json: bool,
}

/// Two AI players with the full roster, unless a config file says otherwise.
fn demo_config() -> MatchConfig {
    MatchConfig::new(
        PlayerConfig::ai(3, &["FRAGONIRE", "SCHONIPS"]),
        PlayerConfig::ai(4, &["PSAWARCA", "SHIGOWI"]),
    )
}

/// Prints narration and health bars to stdout.
struct ConsolePresenter;

impl Presenter for ConsolePresenter {
    fn notify_text(&mut self, line: &str, detail: Option<&str>) {
        match detail {
            Some(detail) => println!("{} {}", line, detail),
            None => println!("{}", line),
        }
    }

    fn notify_health_changed(&mut self, change: &HealthChange) {
        println!(
            "    [{}: {} -> {}]",
            change.creature, change.previous_health, change.current_health
        );
    }
}

/// Asks on stdin which move to use.
struct ConsoleRequester;

impl MoveRequester for ConsoleRequester {
    fn request_move(&mut self, player_index: usize, battle_state: &BattleState) -> MoveChoice {
        let registry = &battle_state.registry;
        let creature = battle_state.players[player_index].active();
        println!(
            "{} ({}/{} HP, rage {}), choose a move:",
            creature.name,
            creature.health(),
            creature.max_health,
            creature.rage
        );
        for (slot, move_id) in creature.moves.iter().enumerate() {
            let template = registry.move_template(*move_id);
            let note = match creature.check_move_ready(registry, slot) {
                Ok(()) => String::new(),
                Err(err) => format!(" ({})", err),
            };
            println!("  {}. {}{}", slot + 1, template.name, note);
        }

        let stdin = io::stdin();
        loop {
            print!("> ");
            let _ = io::stdout().flush();
            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                // No more input: hand back something the runner will reject
                Ok(0) | Err(_) => return MoveChoice::Pass,
                Ok(_) => {}
            }
            match line.trim().parse::<usize>() {
                Ok(number) if number >= 1 => {
                    return MoveChoice::UseMove {
                        move_index: number - 1,
                    }
                }
                _ => println!("Enter a move number."),
            }
        }
    }
}

fn run(options: Options) -> Result<(), Box<dyn std::error::Error>> {
    let registry = match &options.data {
        Some(dir) => Arc::new(Registry::load_from_dir(dir)?),
        None => Registry::standard()?,
    };

    let mut config = match &options.config {
        Some(path) => MatchConfig::load(path)?,
        None => demo_config(),
    };
    if let Some(seed) = options.seed {
        config.seed = Some(seed);
    }
    if options.human {
        config.players[0].ai_level = None;
        config.players[0].name.get_or_insert_with(|| "YOU".to_string());
    }

    let mut rng = config.rng();
    let state = config.build(registry, &mut rng)?;
    let mut runner = BattleRunner::new(state, rng);
    let turn_limit = options.turns;

    if options.json {
        let summary =
            runner.run_to_completion(&mut NullPresenter, &mut ConsoleRequester, turn_limit)?;
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for event in runner.get_all_events() {
            writeln!(out, "{}", serde_json::to_string(event)?)?;
        }
        writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?;
    } else {
        let summary =
            runner.run_to_completion(&mut ConsolePresenter, &mut ConsoleRequester, turn_limit)?;
        println!();
        println!("After {} turn(s): {:?}", summary.turns, summary.outcome);
        for player in &summary.players {
            println!("{}", player.player_name);
            for creature in &player.creatures {
                println!(
                    "  {} {}/{} HP, healed {}",
                    creature.name, creature.health, creature.max_health, creature.total_healed
                );
                for used in creature.move_uses.iter().filter(|m| m.uses > 0) {
                    println!("    {} x{}", used.move_name, used.uses);
                }
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Options::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

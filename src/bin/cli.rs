//! Kelly CLI - Kelly criterion calculator and strategy simulator

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::{ColoredString, Colorize};
use dialoguer::{theme::ColorfulTheme, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use kelly_sim::core::kelly::{evaluate, KellyResult, RiskBand};
use kelly_sim::simulation::{
    run_batch_with_progress, BatchResult, DrawMode, SimulationConfig, SimulationResult,
    StrategyKind, StrategySimulator,
};

#[derive(Parser)]
#[command(name = "kelly")]
#[command(author, version, about = "Kelly criterion calculator and strategy simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Run in interactive mode
    #[arg(short, long)]
    interactive: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the Kelly criterion for a win rate and win/loss ratio
    Calc {
        /// Win rate in percent (clamped to 0-100)
        #[arg(short, long, default_value = "50")]
        win_rate: f64,

        /// Win/loss ratio (minimum 0.1)
        #[arg(short, long, default_value = "1.5")]
        ratio: f64,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Simulate Kelly, conservative and aggressive strategies
    Simulate {
        #[command(flatten)]
        sim: SimArgs,

        /// Print the time series every N rounds
        #[arg(long, default_value = "10")]
        every: usize,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Repeat the simulation over many seeds and aggregate the results
    Batch {
        #[command(flatten)]
        sim: SimArgs,

        /// Number of simulation runs
        #[arg(long, default_value = "100")]
        runs: usize,

        /// Print the aggregates as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Simulation parameters; flags override the config file, which overrides defaults
#[derive(Args, Clone, Default)]
struct SimArgs {
    /// JSON config file (any subset of simulation fields)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of bettors
    #[arg(long)]
    players: Option<usize>,

    /// Number of rounds
    #[arg(long)]
    rounds: Option<usize>,

    /// Win probability per bet (0-1)
    #[arg(long)]
    win_prob: Option<f64>,

    /// Payout ratio (1.0 = even money)
    #[arg(long)]
    payout: Option<f64>,

    /// Initial bankroll per bettor
    #[arg(long)]
    bankroll: Option<f64>,

    /// Force the Kelly fraction instead of deriving it
    #[arg(long)]
    kelly: Option<f64>,

    /// Conservative fraction
    #[arg(long)]
    conservative: Option<f64>,

    /// Aggressive fraction
    #[arg(long)]
    aggressive: Option<f64>,

    /// Use one outcome per bettor per round for all strategies
    #[arg(long)]
    shared_draws: bool,

    /// Random seed (generated when omitted)
    #[arg(long, env = "KELLY_SEED")]
    seed: Option<u64>,
}

impl SimArgs {
    fn to_config(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_json_file(path)?,
            None => SimulationConfig::default(),
        };

        if let Some(v) = self.players {
            config.population_size = v;
        }
        if let Some(v) = self.rounds {
            config.round_count = v;
        }
        if let Some(v) = self.win_prob {
            config.win_probability = v;
        }
        if let Some(v) = self.payout {
            config.payout_ratio = v;
        }
        if let Some(v) = self.bankroll {
            config.initial_bankroll = v;
        }
        if self.kelly.is_some() {
            config.kelly_fraction = self.kelly;
        }
        if let Some(v) = self.conservative {
            config.conservative_fraction = v;
        }
        if let Some(v) = self.aggressive {
            config.aggressive_fraction = v;
        }
        if self.shared_draws {
            config.draw_mode = DrawMode::Shared;
        }

        Ok(config)
    }

    fn seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    if cli.interactive {
        run_interactive()?;
    } else if let Some(command) = cli.command {
        match command {
            Commands::Calc {
                win_rate,
                ratio,
                json,
            } => {
                run_calc(win_rate, ratio, json)?;
            }
            Commands::Simulate { sim, every, json } => {
                let config = sim.to_config()?;
                run_simulate(config, sim.seed(), every, json)?;
            }
            Commands::Batch { sim, runs, json } => {
                let config = sim.to_config()?;
                run_batch_cmd(config, sim.seed(), runs, json)?;
            }
        }
    } else {
        println!("Use --help for usage information or --interactive for interactive mode.");
    }

    Ok(())
}

fn band_color(band: RiskBand, text: String) -> ColoredString {
    match band {
        RiskBand::Negative => text.red(),
        RiskBand::Safe => text.green(),
        RiskBand::Aggressive => text.yellow(),
    }
}

fn print_kelly(result: &KellyResult) {
    println!(
        "{}",
        "Kelly Criterion: f* = (b*p - q) / b".cyan().bold()
    );
    println!("{}", "-".repeat(50));
    println!("Win rate:        {:.1}%", result.input.win_rate);
    println!("Win/loss ratio:  {:.2}", result.input.win_loss_ratio);
    println!("Edge (b*p - q):  {:.4}", result.edge);
    println!("{}", "-".repeat(50));

    let value = if result.band == RiskBand::Negative {
        format!("{} ({:.2}%)", result.band.headline(), result.kelly_percentage)
    } else {
        format!("{}: {:.2}%", result.band.headline(), result.kelly_percentage)
    };
    println!("{}", band_color(result.band, value).bold());
    println!("{}", result.band.advice());

    let suggestions = result.band.suggestions();
    if !suggestions.is_empty() {
        println!();
        println!("{}", "Suggestions:".yellow());
        for s in suggestions {
            println!("  - {}", s);
        }
    }
}

fn run_calc(win_rate: f64, ratio: f64, json: bool) -> Result<()> {
    let result = evaluate(win_rate, ratio);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_kelly(&result);
    }

    Ok(())
}

fn fmt_money(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.0}", v))
        .unwrap_or_else(|| "-".to_string())
}

fn print_config(config: &SimulationConfig, kelly_fraction: f64, seed: u64) {
    println!("{}", "Simulation settings:".yellow().bold());
    println!("Players: {}", config.population_size);
    println!("Rounds: {}", config.round_count);
    println!(
        "Win probability: {:.1}%, payout {:.2}:1",
        config.win_probability * 100.0,
        config.payout_ratio
    );
    println!("Initial bankroll: {:.0}", config.initial_bankroll);
    println!("Kelly fraction: {:.1}%", kelly_fraction * 100.0);
    println!("Draw mode: {:?}", config.draw_mode);
    println!("Seed: {}", seed);
    println!();
}

fn print_simulation(result: &SimulationResult, every: usize) {
    let step = every.max(1);

    for (title, use_mean) in [("Mean bankroll", true), ("Median bankroll", false)] {
        println!("{}", format!("{} by round:", title).yellow().bold());
        println!(
            "{:>6} {:>14} {:>14} {:>14}",
            "Round", "Kelly", "Conservative", "Aggressive"
        );
        println!("{}", "-".repeat(52));

        let last = result.time_series.len().saturating_sub(1);
        for snapshot in &result.time_series {
            if snapshot.round % step != 0 && snapshot.round != last {
                continue;
            }
            let stat = |kind| {
                if use_mean {
                    snapshot.mean(kind)
                } else {
                    snapshot.median(kind)
                }
            };
            println!(
                "{:>6} {:>14} {:>14} {:>14}",
                snapshot.round,
                fmt_money(stat(StrategyKind::Kelly)),
                fmt_money(stat(StrategyKind::Conservative)),
                fmt_money(stat(StrategyKind::Aggressive))
            );
        }
        println!();
    }

    println!("{}", "Final results:".yellow().bold());
    println!(
        "{:<20} {:>10} {:>10} {:>10} {:>10} {:>6} {:>8}",
        "Strategy", "Mean", "Median", "Max", "Min", "Ruin", "Jackpot"
    );
    println!("{}", "-".repeat(80));
    for s in &result.summaries {
        println!(
            "{:<20} {:>10} {:>10} {:>10} {:>10} {:>6} {:>8}",
            s.strategy_name,
            fmt_money(s.mean),
            fmt_money(s.median),
            fmt_money(s.max).green(),
            fmt_money(s.min).red(),
            s.ruin_count.to_string().red(),
            s.jackpot_count.to_string().green()
        );
    }
    for s in result.summaries.iter().filter(|s| s.has_non_finite()) {
        println!(
            "{}",
            format!(
                "{}: {} balances overflowed; statistics may be NaN or infinite",
                s.strategy_name, s.non_finite_count
            )
            .yellow()
        );
    }
}

fn run_simulate(config: SimulationConfig, seed: u64, every: usize, json: bool) -> Result<()> {
    let simulator = StrategySimulator::new(config);

    if !json {
        print_config(&simulator.config, simulator.kelly_fraction(), seed);
    }

    let result = simulator.run_seeded(seed);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_simulation(&result, every);
        println!();
        println!(
            "{}",
            "This is a single simulated outcome; re-run with another seed to see a different one."
                .dimmed()
        );
    }

    Ok(())
}

fn print_batch(batch: &BatchResult) {
    println!(
        "{}",
        format!("Aggregates over {} runs:", batch.runs.len())
            .yellow()
            .bold()
    );
    println!(
        "{:<20} {:>12} {:>12} {:>10} {:>12} {:>8} {:>8}",
        "Strategy", "Avg mean", "Avg median", "Worst", "Best", "Ruin", "Jackpot"
    );
    println!("{}", "-".repeat(88));
    for a in &batch.aggregates {
        println!(
            "{:<20} {:>12} {:>12} {:>10} {:>12} {:>8} {:>8}",
            a.strategy_name,
            fmt_money(a.mean_of_means),
            fmt_money(a.mean_of_medians),
            fmt_money(a.worst).red(),
            fmt_money(a.best).green(),
            a.total_ruin,
            a.total_jackpot
        );
    }
}

fn run_batch_cmd(config: SimulationConfig, seed: u64, runs: usize, json: bool) -> Result<()> {
    let simulator = StrategySimulator::new(config.clone());
    if !json {
        print_config(&simulator.config, simulator.kelly_fraction(), seed);
    }

    let pb = ProgressBar::new(runs as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} runs ({eta})")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );

    let batch = run_batch_with_progress(&config, seed, runs, || pb.inc(1));
    pb.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&batch.aggregates)?);
    } else {
        print_batch(&batch);
    }

    Ok(())
}

fn run_interactive() -> Result<()> {
    println!("{}", "Interactive mode".green().bold());
    println!();

    let theme = ColorfulTheme::default();

    loop {
        let options = vec!["Kelly calculator", "Run simulation", "Batch simulation", "Quit"];

        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(&options)
            .default(0)
            .interact()?;

        match selection {
            0 => {
                let win_rate: f64 = Input::with_theme(&theme)
                    .with_prompt("Win rate (%)")
                    .default(50.0)
                    .interact_text()?;

                let ratio: f64 = Input::with_theme(&theme)
                    .with_prompt("Win/loss ratio")
                    .default(1.5)
                    .interact_text()?;

                println!();
                run_calc(win_rate, ratio, false)?;
                println!();
            }
            1 => {
                let win_prob: f64 = Input::with_theme(&theme)
                    .with_prompt("Win probability (0-1)")
                    .default(0.6)
                    .interact_text()?;

                let shared = Select::with_theme(&theme)
                    .with_prompt("Outcome draws")
                    .items(&["Independent per strategy", "Shared per bettor"])
                    .default(0)
                    .interact()?
                    == 1;

                let config = SimulationConfig {
                    win_probability: win_prob,
                    draw_mode: if shared {
                        DrawMode::Shared
                    } else {
                        DrawMode::Independent
                    },
                    ..Default::default()
                };

                println!();
                run_simulate(config, rand::random(), 10, false)?;
                println!();
            }
            2 => {
                let runs: usize = Input::with_theme(&theme)
                    .with_prompt("Number of runs")
                    .default(100)
                    .interact_text()?;

                println!();
                run_batch_cmd(SimulationConfig::default(), rand::random(), runs, false)?;
                println!();
            }
            3 => {
                println!("Goodbye!");
                break;
            }
            _ => {}
        }
    }

    Ok(())
}

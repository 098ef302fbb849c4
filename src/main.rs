use std::{error::Error, path::PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use glam::Vec2;
use goop_fluids::scenario::Scenario;

mod run;

#[derive(Parser)]
#[command(name = "goop", version, about = "Viscoelastic particle fluid simulator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Simulate a preset scene, optionally recording every frame.
    Run(RunArgs),
    /// Summarize a recording.
    Inspect {
        dir: PathBuf,
    },
}

#[derive(Args)]
struct RunArgs {
    #[arg(long, value_enum, default_value_t = ScenarioName::HighViscosity)]
    scenario: ScenarioName,
    /// Particle count. Defaults to the preset's own count (100 for the stack).
    #[arg(long)]
    count: Option<usize>,
    #[arg(long, default_value_t = 600)]
    frames: u64,
    #[arg(long, default_value_t = 60)]
    fps: u32,
    /// Simulation steps per recorded frame.
    #[arg(long, default_value_t = 2)]
    substeps: u32,
    #[arg(long, default_value_t = 0.0333333)]
    dt: f32,
    /// Directory to record frames into. Must not exist yet.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Radial impulse applied before every step, as `X,Y,FORCE,RADIUS`.
    #[arg(long, value_parser = parse_stir)]
    stir: Option<Stir>,
    /// Impulse along a segment applied before every step, as `X0,Y0,X1,Y1,FORCE`.
    #[arg(long, value_parser = parse_sweep)]
    sweep: Option<Sweep>,
    /// Point to probe once the run is over, as `X,Y`.
    #[arg(long, value_parser = parse_point)]
    probe: Option<Vec2>,
    /// Also count the velocity, spring and interaction radius overlays.
    #[arg(long)]
    stats: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ScenarioName {
    HighViscosity,
    LowViscosity,
    Stack,
    TwoParticles,
    Splash,
    End,
    SourceSink,
    Fountain,
}

impl ScenarioName {
    fn scenario(self, count: Option<usize>) -> Scenario {
        match self {
            ScenarioName::HighViscosity => Scenario::HighViscosity,
            ScenarioName::LowViscosity => Scenario::LowViscosity,
            ScenarioName::Stack => Scenario::Stack(count.unwrap_or(100)),
            ScenarioName::TwoParticles => Scenario::TwoParticles,
            ScenarioName::Splash => Scenario::Splash,
            ScenarioName::End => Scenario::End,
            ScenarioName::SourceSink => Scenario::SourceSink,
            ScenarioName::Fountain => Scenario::Fountain,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Stir {
    center: Vec2,
    force: f32,
    radius: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Sweep {
    from: Vec2,
    to: Vec2,
    force: f32,
}

fn parse_floats<const N: usize>(s: &str) -> Result<[f32; N], String> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f32>().map_err(|e| format!("`{v}`: {e}")))
        .collect::<Result<Vec<_>, _>>()?;

    <[f32; N]>::try_from(values)
        .map_err(|values| format!("expected {N} comma separated numbers, got {}", values.len()))
}

fn parse_stir(s: &str) -> Result<Stir, String> {
    let [x, y, force, radius] = parse_floats::<4>(s)?;
    Ok(Stir { center: Vec2::new(x, y), force, radius })
}

fn parse_sweep(s: &str) -> Result<Sweep, String> {
    let [x0, y0, x1, y1, force] = parse_floats::<5>(s)?;
    Ok(Sweep { from: Vec2::new(x0, y0), to: Vec2::new(x1, y1), force })
}

fn parse_point(s: &str) -> Result<Vec2, String> {
    let [x, y] = parse_floats::<2>(s)?;
    Ok(Vec2::new(x, y))
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => run::run(args),
        Command::Inspect { dir } => run::inspect(dir),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stir_parses_four_numbers() {
        assert_eq!(
            parse_stir("400, 300,1.5,50"),
            Ok(Stir { center: Vec2::new(400.0, 300.0), force: 1.5, radius: 50.0 }),
        );
        assert!(parse_stir("1,2,3").is_err());
        assert!(parse_stir("1,2,x,4").is_err());
    }

    #[test]
    fn stack_takes_count() {
        assert_eq!(ScenarioName::Stack.scenario(Some(20)), Scenario::Stack(20));
        assert_eq!(ScenarioName::Stack.scenario(None), Scenario::Stack(100));
    }

    #[test]
    fn cli_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}

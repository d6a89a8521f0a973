use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use solver::adjust::{Adjustment, UnknownAdjustment};
use solver::consts::{DEFAULT_DIFFERENCE, DEFAULT_SUM};
use solver::controller::{Command as PuzzleCommand, PuzzleController, PuzzleState, Silent, solution, solution_is_exact};
use solver::feedback::Feedback;
use solver::mapper::NumberLine;
use solver::puzzle::{GuessPair, Marker, PuzzleSpec};


#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    UnknownAdjustment(#[from] UnknownAdjustment),
    #[error("target sum must be non-negative, got {0}")]
    NegativeSum(i64),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "two-numbers", about = "Two numbers puzzle solver and reducer harness")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the rounded algebraic solution.
    Solve {
        #[command(flatten)]
        target: TargetArgs,
        #[arg(long)]
        json: bool,
    },
    /// Apply adjustments in order and report the resulting guesses.
    Play(PlayArgs),
    /// Print number-line tick values and their positions.
    Ticks {
        #[arg(long, env = "TWO_NUMBERS_SUM", default_value_t = DEFAULT_SUM)]
        sum: i64,
    },
}

#[derive(Args, Debug, Clone, Copy)]
struct TargetArgs {
    #[arg(long, env = "TWO_NUMBERS_SUM", default_value_t = DEFAULT_SUM)]
    sum: i64,
    #[arg(long, env = "TWO_NUMBERS_DIFFERENCE", default_value_t = DEFAULT_DIFFERENCE, allow_negative_numbers = true)]
    difference: i64,
}

impl TargetArgs {
    fn spec(self) -> Result<PuzzleSpec, CliError> {
        if self.sum < 0 {
            return Err(CliError::NegativeSum(self.sum));
        }
        Ok(PuzzleSpec::new(self.sum, self.difference))
    }
}

#[derive(Args, Debug)]
struct PlayArgs {
    #[command(flatten)]
    target: TargetArgs,
    /// Starting first guess, clamped into `[0, sum]` (default: 0).
    #[arg(long, allow_negative_numbers = true)]
    first: Option<i64>,
    /// Starting second guess, clamped into `[0, sum]` (default: the sum).
    #[arg(long, allow_negative_numbers = true)]
    second: Option<i64>,
    /// Adjustments to apply: increase-both, decrease-both, move-apart, move-together.
    actions: Vec<String>,
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct SolveReport {
    spec: PuzzleSpec,
    solution: GuessPair,
    exact: bool,
    /// Whether both halves lie in `[0, sum]`.
    in_range: bool,
    /// Where "Jump to solution" actually puts the markers.
    jump: GuessPair,
}

#[derive(Debug, Serialize)]
struct PlayStep {
    action: Adjustment,
    applied: bool,
    guess: GuessPair,
}

#[derive(Debug, Serialize)]
struct PlayReport {
    spec: PuzzleSpec,
    start: GuessPair,
    steps: Vec<PlayStep>,
    guess: GuessPair,
    feedback: Feedback,
    hints: Vec<String>,
}

#[derive(Debug, Serialize, PartialEq)]
struct TickRow {
    value: i64,
    x: f64,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Solve { target, json } => {
            let report = solve_report(target.spec()?);
            if json { print_json(&report) } else { print_text(&render_solve(&report)) }
        }
        Command::Play(args) => {
            let json = args.json;
            let report = play_report(&args)?;
            if json { print_json(&report) } else { print_text(&render_play(&report)) }
        }
        Command::Ticks { sum } => {
            if sum < 0 {
                return Err(CliError::NegativeSum(sum));
            }
            print_text(&render_ticks(&tick_rows(sum)))
        }
    }
}

fn solve_report(spec: PuzzleSpec) -> SolveReport {
    let pair = solution(spec);
    SolveReport {
        spec,
        solution: pair,
        exact: solution_is_exact(spec),
        in_range: pair.in_bounds(spec.sum),
        jump: pair.clamped(spec.sum),
    }
}

fn play_report(args: &PlayArgs) -> Result<PlayReport, CliError> {
    let spec = args.target.spec()?;
    let actions = args
        .actions
        .iter()
        .map(|name| name.parse::<Adjustment>())
        .collect::<Result<Vec<_>, _>>()?;

    let mut controller = PuzzleController::with_sound(PuzzleState::new(spec), Silent);
    if let Some(first) = args.first {
        controller.dispatch(PuzzleCommand::SetGuess(Marker::First, first));
    }
    if let Some(second) = args.second {
        controller.dispatch(PuzzleCommand::SetGuess(Marker::Second, second));
    }
    let start = controller.state().guess;

    let steps = actions
        .into_iter()
        .map(|action| {
            let applied = controller.apply_action(action);
            PlayStep { action, applied, guess: controller.state().guess }
        })
        .collect();

    let feedback = controller.state().feedback();
    Ok(PlayReport {
        spec,
        start,
        steps,
        guess: controller.state().guess,
        hints: feedback.hint_lines(),
        feedback,
    })
}

fn tick_rows(sum: i64) -> Vec<TickRow> {
    let line = NumberLine::new(sum);
    line.ticks().into_iter().map(|value| TickRow { value, x: line.guess_to_position(value) }).collect()
}

fn render_pair(pair: GuessPair) -> String {
    format!("first={} second={}", pair.first, pair.second)
}

fn render_solve(report: &SolveReport) -> String {
    let note = if report.exact {
        "exact".to_owned()
    } else if !report.in_range {
        format!("out of range, jump clamps to {}", render_pair(report.jump))
    } else {
        "rounded, misses by one".to_owned()
    };
    format!(
        "sum={} difference={}\n{} ({note})",
        report.spec.sum,
        report.spec.difference,
        render_pair(report.solution)
    )
}

fn render_play(report: &PlayReport) -> String {
    let mut lines = vec![format!("start  {}", render_pair(report.start))];
    for step in &report.steps {
        let skipped = if step.applied { "" } else { "  (no legal move)" };
        lines.push(format!("{}  {}{skipped}", step.action, render_pair(step.guess)));
    }
    let fb = &report.feedback;
    lines.push(format!("sum {} / {} {}", fb.guess_sum, fb.target_sum, fb.sum_verdict().badge()));
    lines.push(format!(
        "difference {} / {} {}",
        fb.guess_difference,
        fb.target_difference,
        fb.difference_verdict().badge()
    ));
    lines.extend(report.hints.iter().map(|hint| format!("- {hint}")));
    lines.join("\n")
}

fn render_ticks(rows: &[TickRow]) -> String {
    rows.iter().map(|row| format!("{:>6}  x={:.2}", row.value, row.x)).collect::<Vec<_>>().join("\n")
}

fn print_text(text: &str) -> Result<(), CliError> {
    println!("{text}");
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

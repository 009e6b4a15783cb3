use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use origami::cfg::{SolverCfg, DEFAULT_ANGLE_DEG, DEFAULT_PAPER_AREA};
use origami::generator::{Example, JitterCfg, ReplayToken};
use origami::geom::{GeomCfg, DEFAULT_EPS};
use origami::playback::{Direction, PlayState, Playback};
use origami::{LetterNames, OrigamiSolver, SolveOutput};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;

mod provenance;

#[derive(Parser)]
#[command(name = "cli")]
#[command(about = "Origami fold solver: solve instruction files, build sheets, replay folds")]
struct Cmd {
    /// Absolute tolerance for all geometric predicates
    #[arg(long, global = true, default_value_t = DEFAULT_EPS)]
    eps: f64,

    /// Sheet area when the dimensions line only fixes a ratio
    #[arg(long, global = true, default_value_t = DEFAULT_PAPER_AREA)]
    area: f64,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Solve an instruction file and write the JSON output plus a provenance sidecar
    Solve {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Keep per-step topology snapshots in the output
        #[arg(long)]
        history: bool,
    },
    /// Print an initial sheet topology as JSON
    Example {
        #[arg(long, value_enum)]
        kind: ExampleKind,
        #[arg(long, default_value_t = 1.0)]
        ratio: f64,
        #[arg(long, default_value_t = 3)]
        nx: usize,
        #[arg(long, default_value_t = 3)]
        ny: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value_t = 0)]
        index: u64,
    },
    /// Solve an instruction file and drive playback to the last fold
    Play {
        #[arg(long)]
        input: PathBuf,
        /// Seconds per playback tick
        #[arg(long, default_value_t = 1.0 / 30.0)]
        dt: f64,
    },
    /// Print a small provenance JSON block (or the sidecar of an artifact)
    Report {
        #[arg(long)]
        artifact: Option<PathBuf>,
    },
}

/// Parameters recorded in the `solve` sidecar.
#[derive(Serialize)]
struct SolveParams {
    eps: f64,
    paper_area: f64,
    history: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ExampleKind {
    Rectangle,
    TwoPanel,
    Grid,
    Jittered,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    let cfg = SolverCfg {
        geom: GeomCfg::with_eps(cmd.eps),
        paper_area: cmd.area,
        default_angle_deg: DEFAULT_ANGLE_DEG,
    };
    match cmd.action {
        Action::Solve {
            input,
            out,
            history,
        } => solve(&input, &out, history, cfg),
        Action::Example {
            kind,
            ratio,
            nx,
            ny,
            seed,
            index,
        } => example(kind, ratio, nx, ny, ReplayToken { seed, index }, cfg),
        Action::Play { input, dt } => play(&input, dt, cfg),
        Action::Report { artifact } => report(artifact.as_deref()),
    }
}

fn solve_text(input: &Path, cfg: SolverCfg) -> Result<SolveOutput> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("reading instructions {}", input.display()))?;
    let out = OrigamiSolver::new(cfg)
        .solve(&text)
        .with_context(|| format!("solving {}", input.display()))?;
    Ok(out)
}

fn solve(input: &Path, out: &Path, history: bool, cfg: SolverCfg) -> Result<()> {
    tracing::info!(input = %input.display(), out = %out.display(), history, "solve");
    let mut solved = solve_text(input, cfg)?;
    if !history {
        solved = solved.without_history();
    }
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output dir {}", parent.display()))?;
        }
    }
    fs::write(out, serde_json::to_vec_pretty(&solved)?)
        .with_context(|| format!("writing {}", out.display()))?;
    tracing::info!(
        folds = solved.instructions.len(),
        meshes = solved.meshes.len(),
        "solve_written"
    );

    let params = SolveParams {
        eps: cfg.eps(),
        paper_area: cfg.paper_area,
        history,
    };
    let payload = provenance::Payload::new(serde_json::to_value(params)?).with_input(input);
    let sidecar = provenance::write_sidecar(out, payload)?;
    tracing::info!(sidecar = %sidecar.display(), "provenance_written");
    Ok(())
}

fn example(
    kind: ExampleKind,
    ratio: f64,
    nx: usize,
    ny: usize,
    token: ReplayToken,
    cfg: SolverCfg,
) -> Result<()> {
    anyhow::ensure!(
        ratio.is_finite() && ratio > 0.0,
        "ratio must be positive, got {ratio}"
    );
    let example = match kind {
        ExampleKind::Rectangle => Example::Rectangle { ratio },
        ExampleKind::TwoPanel => Example::TwoPanel { ratio },
        ExampleKind::Grid => Example::Grid { ratio, nx, ny },
        ExampleKind::Jittered => Example::JitteredGrid {
            cfg: JitterCfg {
                nx,
                ny,
                ..JitterCfg::default()
            },
            token,
        },
    };
    tracing::info!(example = ?example, "example");
    let topo = example.build(&cfg, &mut LetterNames::new());
    println!("{}", serde_json::to_string_pretty(&topo)?);
    Ok(())
}

fn play(input: &Path, dt: f64, cfg: SolverCfg) -> Result<()> {
    anyhow::ensure!(dt.is_finite() && dt > 0.0, "dt must be positive, got {dt}");
    let solved = solve_text(input, cfg)?;
    let mut pb = Playback::from_output(&solved);
    let mut frames = 0usize;
    while pb.step() < pb.len() {
        pb.toggle_play(Direction::Forward);
        while pb.advance(dt).context("advancing playback")? != PlayState::Finished {
            frames += 1;
        }
        let ins = &solved.instructions[pb.step() - 1];
        tracing::info!(
            step = pb.step(),
            meshes = ?ins.mesh_ids,
            axis = ?ins.axis,
            angle_deg = ins.angle.to_degrees(),
            "step_played"
        );
    }
    tracing::info!(frames, steps = pb.len(), "playback_finished");
    Ok(())
}

fn report(artifact: Option<&Path>) -> Result<()> {
    let doc = match artifact {
        Some(path) => provenance::read_sidecar(path)?,
        None => provenance::base_document(),
    };
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

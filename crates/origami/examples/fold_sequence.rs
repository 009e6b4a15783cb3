//! Solve a short fold sequence and print what a renderer would receive.
//!
//! Purpose
//! - Show the end-to-end pipeline on a 2:1 sheet: two half folds, then a
//!   quarter turn of the folded stack.
//! - Print per-mesh polygons, the mesh instructions and the reveal lists.
//!
//! Run with `cargo run -p origami --example fold_sequence`.

use origami::playback::{Direction, PlayState, Playback};
use origami::solve_origami;

const TEXT: &str = "paper dimensions: [2]
fold a to top of b
fold c to top of b
fold a around [e, g] 90
";

fn main() {
    let out = solve_origami(TEXT).expect("sequence solves");

    println!("meshes={}", out.meshes.len());
    for (i, m) in out.meshes.iter().enumerate() {
        println!("  mesh {i}: {:?} ({} triangles)", m.names, m.triangles.len());
    }
    for (k, ins) in out.instructions.iter().enumerate() {
        println!(
            "fold {k}: meshes={:?} axis={}-{} angle={:.1}deg",
            ins.mesh_ids,
            ins.axis[0],
            ins.axis[1],
            ins.angle.to_degrees()
        );
    }
    for (k, r) in out.reveal.iter().enumerate() {
        println!("reveal {k}: points={} edges={}", r.points.len(), r.edges.len());
    }

    let mut pb = Playback::from_output(&out);
    let mut ticks = 0usize;
    while pb.step() < pb.len() {
        pb.toggle_play(Direction::Forward);
        while pb.advance(1.0 / 30.0).expect("playback") != PlayState::Finished {
            ticks += 1;
        }
    }
    println!("playback frames={ticks} at 30 fps");
}

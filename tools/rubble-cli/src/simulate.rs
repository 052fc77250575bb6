//! Simulate command - run a scenario headlessly
//!
//! Builds the scenario's mesh, drives the drill along its path for a fixed
//! number of ticks against [`SimHost`] and reports what happened.

use anyhow::{Context, Result};
use clap::Args;
use rubble_core::contact::ContactPoint;
use rubble_core::deferred::DeferredTask;
use rubble_core::drill::{BurrSpin, DrillProbe};
use rubble_core::mesh::write_obj;
use rubble_core::{DeformReport, Surface, SurfaceId, SurfaceMesh, SurfaceState};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use crate::scenario::{self, DrillMode, Scenario};
use crate::sim_host::SimHost;

/// Arguments for the simulate command
#[derive(Args)]
pub struct SimulateArgs {
    /// Path to the scenario file (defaults to ./rubble.toml, then the config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the number of ticks to run
    #[arg(short, long)]
    pub ticks: Option<u32>,

    /// Override the surface seed
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Write the eroded mesh as Wavefront OBJ
    #[arg(long)]
    pub obj: Option<PathBuf>,
}

/// Outcome of one simulation run
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub ticks: u32,
    pub totals: DeformReport,
    pub state: SurfaceState,
    pub vertices: usize,
    pub fractured: usize,
    pub triangles: usize,
    pub fragments_spawned: u64,
    pub fragments_alive: usize,
    pub fragments_colliding: usize,
    pub fragments_destroyed: u64,
    pub mesh_commits: u64,
    pub collider_rebuilds: u64,
    pub burr_speed: Option<f32>,
}

/// Execute the simulate command
pub fn execute(args: SimulateArgs) -> Result<()> {
    let working_dir = std::env::current_dir().context("Failed to read working directory")?;
    let mut scenario = match scenario::resolve(args.config.as_deref(), &working_dir) {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading scenario");
            Scenario::load(&path)?
        }
        None => {
            tracing::info!("no scenario file found, using defaults");
            Scenario::with_preset(Default::default())
        }
    };

    if let Some(ticks) = args.ticks {
        scenario.simulation.ticks = ticks;
    }
    if let Some(seed) = args.seed {
        scenario.surface.seed = seed;
    }

    let (summary, mesh) = run(&scenario)?;
    print_summary(&summary);

    if let Some(path) = &args.obj {
        let file = File::create(path)
            .with_context(|| format!("Failed to create OBJ file: {}", path.display()))?;
        write_obj(&mesh, "surface", BufWriter::new(file))
            .with_context(|| format!("Failed to write OBJ file: {}", path.display()))?;
        println!("  Mesh: {}", path.display());
    }

    Ok(())
}

/// Run a scenario to completion and return its summary and final mesh
pub fn run(scenario: &Scenario) -> Result<(Summary, SurfaceMesh)> {
    scenario.validate()?;

    let id = SurfaceId(1);
    let mut surface = Surface::new(id, scenario.mesh.build(), scenario.surface.clone())
        .context("Failed to build surface")?;
    let transform = scenario.transform.affine();
    surface.set_transform(transform);

    let drill = &scenario.drill;
    let ticks = scenario.simulation.ticks;
    let dt = scenario.simulation.dt();
    let mut burr = scenario.burr.clone().map(|config| {
        BurrSpin::new(
            config,
            drill.position(0, ticks),
            surface.original_positions(),
            transform,
        )
    });

    let mut probe = DrillProbe::default();
    let mut host = SimHost::new();
    let mut totals = DeformReport::default();
    let mut ran = 0;

    for tick in 0..ticks {
        let tip = drill.position(tick, ticks);

        if let Some(burr) = burr.as_mut() {
            burr.update(tip, transform, dt);
        }

        let report = match drill.mode {
            DrillMode::Contact => {
                surface.process_contacts(&[ContactPoint::new(tip, drill.normal)], dt, &mut host)
            }
            DrillMode::Probe => {
                probe.move_to(tip);
                surface.process_probe(probe.position(), dt, &mut host)
            }
        };
        if report.collapsed {
            tracing::info!(tick, "surface collapsing");
        }
        totals.absorb(report);

        for task in host.advance(dt) {
            if task == DeferredTask::DestroySurface(id) {
                surface.destroy();
            }
        }
        ran = tick + 1;

        if surface.state() == SurfaceState::Destroyed {
            tracing::info!(tick, "surface destroyed");
            break;
        }
    }

    tracing::debug!(
        ticks = ran,
        elapsed = host.now(),
        pending = host.pending_tasks(),
        "simulation finished"
    );

    let summary = Summary {
        ticks: ran,
        totals,
        state: surface.state(),
        vertices: surface.vertex_count(),
        fractured: surface.fractured_count(),
        triangles: surface.triangles().len(),
        fragments_spawned: host.fragments_spawned,
        fragments_alive: host.live_fragments(),
        fragments_colliding: host.colliding_fragments(),
        fragments_destroyed: host.fragments_destroyed,
        mesh_commits: host.vertex_commits + host.triangle_commits,
        collider_rebuilds: host.collider_rebuilds,
        burr_speed: burr.map(|b| b.speed()),
    };
    Ok((summary, surface.mesh_snapshot()))
}

fn print_summary(summary: &Summary) {
    println!("Simulated {} ticks", summary.ticks);
    println!("  State: {:?}", summary.state);
    println!(
        "  Fractured: {} / {} vertices ({:.1}%)",
        summary.fractured,
        summary.vertices,
        100.0 * summary.fractured as f32 / summary.vertices.max(1) as f32
    );
    println!(
        "  Displacement: {} vertex moves, {} emitter calls",
        summary.totals.displaced, summary.totals.emitter_calls
    );
    println!("  Triangles: {}", summary.triangles);
    println!(
        "  Fragments: {} spawned, {} alive ({} colliding), {} cleaned up",
        summary.fragments_spawned,
        summary.fragments_alive,
        summary.fragments_colliding,
        summary.fragments_destroyed
    );
    println!("  Mesh commits: {}", summary.mesh_commits);
    println!("  Collider rebuilds: {}", summary.collider_rebuilds);
    if let Some(speed) = summary.burr_speed {
        println!("  Burr speed: {:.2} rad/s", speed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use rubble_core::config::Preset;
    use rubble_core::drill::BurrSpinConfig;

    fn scenario(preset: Preset) -> Scenario {
        let mut scenario = Scenario::with_preset(preset);
        scenario.simulation.ticks = 60;
        scenario
    }

    #[test]
    fn test_run_erodes_surface() {
        let mut scenario = scenario(Preset::DestroyFixed);
        scenario.surface.fracture.destroy_percent = None;
        scenario.surface.debris.spawn_chance = 1.0;

        let (summary, mesh) = run(&scenario).unwrap();

        assert_eq!(summary.ticks, 60);
        assert!(summary.totals.displaced > 0);
        assert!(summary.fractured > 0);
        assert_eq!(summary.state, SurfaceState::Intact);
        assert_eq!(mesh.triangles.len(), summary.triangles);
        assert!(mesh.validate().is_ok());
        // One simulated second is shorter than the fragment collider lifetime
        assert!(summary.fragments_alive > 0);
        assert_eq!(summary.fragments_colliding, summary.fragments_alive);
    }

    #[test]
    fn test_run_is_deterministic() {
        let scenario = scenario(Preset::Fast);
        let (a, mesh_a) = run(&scenario).unwrap();
        let (b, mesh_b) = run(&scenario).unwrap();
        assert_eq!(a, b);
        assert_eq!(mesh_a, mesh_b);
    }

    #[test]
    fn test_run_far_drill_changes_nothing() {
        let mut scenario = scenario(Preset::Classic);
        scenario.drill.start = Vec3::new(0.0, 50.0, 0.0);
        scenario.drill.end = Vec3::new(0.0, 60.0, 0.0);

        let (summary, mesh) = run(&scenario).unwrap();

        assert!(summary.totals.is_empty());
        assert_eq!(mesh, scenario.mesh.build());
    }

    #[test]
    fn test_run_collapse_destroys_surface() {
        let mut scenario = scenario(Preset::DestroyFixed);
        scenario.surface.deform.strength = 1.0;
        scenario.surface.fracture.max_chunks_per_hit = 10_000;
        scenario.surface.fracture.destroy_percent = Some(0.01);
        scenario.surface.policy.remove_triangles = false;

        let (summary, _) = run(&scenario).unwrap();

        assert!(summary.totals.collapsed);
        assert_eq!(summary.state, SurfaceState::Destroyed);
        assert!(summary.ticks < 60);
    }

    #[test]
    fn test_run_reports_burr_speed() {
        let mut scenario = scenario(Preset::Classic);
        scenario.burr = Some(BurrSpinConfig::default());

        let (summary, _) = run(&scenario).unwrap();

        let speed = summary.burr_speed.unwrap();
        assert!((speed - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_run_probe_mode() {
        let mut scenario = scenario(Preset::Fast);
        scenario.drill.mode = DrillMode::Probe;

        let (summary, _) = run(&scenario).unwrap();

        assert!(summary.totals.displaced > 0);
    }

    #[test]
    fn test_obj_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("surface.obj");
        let (_, mesh) = run(&scenario(Preset::Fast)).unwrap();

        write_obj(&mesh, "surface", File::create(&path).unwrap()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("o surface"));
        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), mesh.positions.len());
        assert_eq!(text.lines().filter(|l| l.starts_with("f ")).count(), mesh.triangles.len());
    }
}

//! Basic demonstration of the habitat simulation.
//!
//! Run with: RUST_LOG=habitat_sim=info cargo run --example basic_demo

use habitat_sim::{DefaultScenario, NullCanvas, Position, SimConfig, Simulation};

fn main() -> habitat_sim::Result<()> {
    init_tracing();
    println!("=== Habitat - Simulation Demo ===\n");

    let config = SimConfig {
        meteor_spawn_one_in: Some(240),
        ..SimConfig::default()
    }
    .with_seed(7);
    let mut sim = Simulation::new(config, Box::new(DefaultScenario))?;
    sim.setup()?;

    println!("Initial state:");
    print_snapshot(&sim);

    // Place a few objects the way a user would with the palette
    println!("\n--- Placing hunters and prey ---\n");
    sim.spawn_registered("Hunter", Position::new(200.0, 150.0))?;
    sim.spawn_registered("Prey", Position::new(700.0, 300.0))?;
    sim.spawn_registered("Prey", Position::new(900.0, 600.0))?;
    let pos = sim.random_position();
    sim.spawn_registered("SimFeed™", pos)?;

    // Ten seconds of wall time at 60 Hz
    println!("Running simulation for 600 ticks...\n");
    let mut canvas = NullCanvas;
    for _ in 0..600 {
        let report = sim.step(&mut canvas)?;
        if report.tick % 100 == 0 {
            println!(
                "--- Tick {} (t={:.1}s) added={} removed={} ---",
                report.tick,
                sim.current_time(),
                report.added,
                report.removed
            );
            print_snapshot(&sim);
        }
    }

    println!("\n=== Final State (JSON) ===\n");
    println!("{}", sim.snapshot().to_json_pretty()?);
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn print_snapshot(sim: &Simulation) {
    let snapshot = sim.snapshot();
    for kind in ["Animal", "Hunter", "Prey", "Blob", "Meteor", "MeteorFragment", "Feed", "SilverStar"] {
        let count = snapshot.count_of(kind);
        if count > 0 {
            println!("  {:<15} {}", kind, count);
        }
    }
    for obj in snapshot.objects.iter().filter(|o| o.kind == "Hunter" || o.kind == "Prey") {
        println!(
            "    {} {}: pos=({:.1}, {:.1}) hp={:.2}",
            obj.kind, obj.id, obj.x, obj.y, obj.health
        );
    }
}

//! Presets command - list built-in surface presets

use rubble_core::config::Preset;

/// Execute the presets command
pub fn execute() {
    println!("{:<14} {:>6} {:>6} {:>8} {:>6}", "PRESET", "FREEZE", "PRUNE", "THROTTLE", "JITTER");
    for preset in Preset::ALL {
        let policy = preset.config().policy;
        println!(
            "{:<14} {:>6} {:>6} {:>8} {:>6}",
            preset.name(),
            flag(policy.freeze_on_fracture),
            flag(policy.remove_triangles),
            flag(policy.throttle_collider_sync),
            flag(policy.jitter_noise),
        );
    }
}

fn flag(enabled: bool) -> &'static str {
    if enabled { "yes" } else { "no" }
}

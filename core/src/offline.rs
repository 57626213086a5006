//! Offline catch-up: step-wise replay of the production engine across
//! the wall-clock gap since the last save.
//!
//! Each step re-evaluates production against the already-updated state,
//! so entropy and distance gained in one step shape the next step's
//! rates. Elapsed time is capped at 24 hours and the step size is chosen
//! so that cost stays bounded regardless of the gap.

use crate::{
    config::{OFFLINE_CAP_SECONDS, OFFLINE_MAX_STEP, OFFLINE_MIN_STEP, OFFLINE_TARGET_STEPS},
    production::compute_production,
    state::{PrestigeState, ResourceState, UnitCounts, UpgradeState},
    types::{ResourceKind, Seconds},
};

#[derive(Debug, Clone, PartialEq)]
pub struct OfflineProgress {
    pub resources:         ResourceState,
    pub log:               String,
    /// Seconds actually simulated after capping.
    pub simulated_seconds: Seconds,
    pub steps:             u32,
}

/// Default step: one 120th of the gap, clamped into [10, 60] seconds.
/// An explicit step is honoured but clamped into the same range.
pub fn choose_step(offline_seconds: Seconds, step_seconds: Option<Seconds>) -> Seconds {
    let requested = match step_seconds {
        Some(step) if step.is_finite() && step > 0.0 => step,
        _ => (offline_seconds / OFFLINE_TARGET_STEPS).ceil(),
    };
    requested.clamp(OFFLINE_MIN_STEP, OFFLINE_MAX_STEP)
}

pub fn simulate_offline_progress(
    resources: &ResourceState,
    units: &UnitCounts,
    upgrades: &UpgradeState,
    prestige: &PrestigeState,
    offline_seconds: Seconds,
    step_seconds: Option<Seconds>,
) -> OfflineProgress {
    if !offline_seconds.is_finite() || offline_seconds <= 0.0 {
        return OfflineProgress {
            resources:         *resources,
            log:               "No offline time elapsed; nothing to recover.".to_string(),
            simulated_seconds: 0.0,
            steps:             0,
        };
    }

    let capped = offline_seconds > OFFLINE_CAP_SECONDS;
    let total = offline_seconds.min(OFFLINE_CAP_SECONDS);
    let step = choose_step(total, step_seconds);

    let mut current = *resources;
    let mut remaining = total;
    let mut steps = 0u32;
    while remaining > 0.0 {
        let dt = step.min(remaining);
        let rates = compute_production(&current, units, upgrades, prestige);
        current.integrate(&rates, dt);
        remaining -= dt;
        steps += 1;
    }

    log::info!(
        "offline catch-up: {total:.0}s in {steps} steps of {step}s (capped={capped})"
    );

    OfflineProgress {
        log: offline_summary(resources, &current, total, capped),
        resources: current,
        simulated_seconds: total,
        steps,
    }
}

fn offline_summary(before: &ResourceState, after: &ResourceState, seconds: Seconds, capped: bool) -> String {
    let gains: Vec<String> = ResourceKind::ALL
        .iter()
        .map(|&kind| {
            let delta = after.get(kind) - before.get(kind);
            format!("+{} {}", format_number(delta), kind.key())
        })
        .collect();
    let cap_note = if capped { " (capped at 24h)" } else { "" };
    format!(
        "Swarm ran unattended for {}{cap_note}: {}.",
        format_duration(seconds),
        gains.join(", ")
    )
}

/// Abbreviate large magnitudes with k/m/b suffixes.
pub fn format_number(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e9 {
        format!("{:.1}b", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.1}m", value / 1e6)
    } else if abs >= 1e3 {
        format!("{:.1}k", value / 1e3)
    } else if abs >= 10.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

/// `HhMMmSSs`, e.g. `1h05m09s`.
pub fn format_duration(seconds: Seconds) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.round() as u64
    } else {
        0
    };
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    format!("{h}h{m:02}m{s:02}s")
}

//! Validate the mapping table and rig binding.

use std::collections::BTreeSet;
use std::path::PathBuf;

use facerig_common::config::AppConfig;
use facerig_rig::RigBinding;
use facerig_signal_mapper::SignalMapper;

use super::load_rig;

pub fn run(config: &AppConfig, landmarks: Option<usize>, rig: Option<PathBuf>) -> anyhow::Result<()> {
    println!("Validating configuration");

    let mut mapping_config = config.mapping.clone();
    if landmarks.is_some() {
        mapping_config.landmark_count = landmarks;
    }
    let mapper = SignalMapper::from_config(&mapping_config)
        .map_err(|e| anyhow::anyhow!("Invalid mapping: {e}"))?;

    println!("  Mapped features: {}", mapper.mapping().len());
    for (name, pair) in mapper.mapping().iter() {
        println!("    {name}: landmarks {} <-> {}", pair.first, pair.second);
    }
    match mapping_config.landmark_count {
        Some(count) => println!("  Landmark indices: within {count}"),
        None => println!(
            "  Landmark indices: unchecked (samples need at least {})",
            mapper.mapping().required_landmarks()
        ),
    }

    let host = load_rig(rig.as_deref())?;
    let binding = RigBinding::resolve(&host, &config.rig)
        .map_err(|e| anyhow::anyhow!("Rig cannot be bound: {e}"))?;
    println!("  Rig: {}", host.description().name);

    let bound: BTreeSet<&str> = binding.bound_features().collect();
    let mut issues = Vec::new();
    for (name, _) in mapper.mapping().iter() {
        if !bound.contains(name) {
            issues.push(format!("feature '{name}' has no shape key on the rig"));
        }
    }
    for feature in &bound {
        if mapper.mapping().get(feature).is_none() {
            issues.push(format!("shape target '{feature}' is never produced by the mapping"));
        }
    }
    if binding.bone(facerig_rig::binding::HEAD_CHANNEL).is_none() {
        issues.push("no head bone bound; head rotation will not be keyed".to_string());
    }

    if issues.is_empty() {
        println!("\nConfiguration is valid.");
    } else {
        println!("\nValidation issues:");
        for issue in &issues {
            println!("  - {issue}");
        }
        println!(
            "\n{} issue(s) found. Unbound features are skipped during animation.",
            issues.len()
        );
    }

    Ok(())
}

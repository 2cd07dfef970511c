/// Phrasebook Linter: checks slot coverage and vocabulary rules.
///
/// Usage: phrasebook_linter <phrasebook.ron | dir> [--config <path>] [--no-builtin]
///
/// Files are merged over the built-in phrasebook unless `--no-builtin` is
/// given, so a partial override is linted as the engine would see it.

use shift_report::core::config::EngineConfig;
use shift_report::core::phrasebook::{Field, Phrasebook};
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

const SLOTS: [&str; 9] = [
    "opening",
    "start",
    "customers",
    "peak",
    "crowd_summary",
    "best_seller",
    "feel_detail",
    "aside",
    "event",
];

/// Placeholders that render empty unless the variant requires their data.
const FIELD_TAGS: [(Field, &str); 5] = [
    (Field::Weather, "has:weather"),
    (Field::Customers, "has:customers"),
    (Field::BestSellers, "has:best_sellers"),
    (Field::Feel, "has:feel"),
    (Field::Event, "has:event"),
];

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: phrasebook_linter <phrasebook.ron | dir> [--config <path>] [--no-builtin]");
        process::exit(0);
    }

    let target = &args[1];
    let mut config_path = None;
    let mut builtin = true;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(args[i].clone());
            }
            "--no-builtin" => builtin = false,
            _ => eprintln!("Ignoring unknown argument: {}", args[i]),
        }
        i += 1;
    }

    let config = match config_path {
        Some(ref path) => match EngineConfig::load_from_ron(Path::new(path)) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("ERROR: Failed to load config: {}", e);
                process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };

    let mut phrasebook = if builtin {
        match Phrasebook::builtin() {
            Ok(p) => p,
            Err(e) => {
                eprintln!("ERROR: Built-in phrasebook is invalid: {}", e);
                process::exit(1);
            }
        }
    } else {
        Phrasebook::default()
    };

    let path = Path::new(target);
    if path.is_file() {
        match Phrasebook::load_from_ron(path) {
            Ok(p) => phrasebook.merge(p),
            Err(e) => {
                eprintln!("ERROR: Failed to load phrasebook: {}", e);
                process::exit(1);
            }
        }
    } else if path.is_dir() {
        load_phrasebooks_recursive(path, &mut phrasebook);
    } else {
        eprintln!("ERROR: Path '{}' does not exist", target);
        process::exit(1);
    }

    println!("Loaded {} phrase slots", phrasebook.slots.len());

    let (errors, warnings) = lint_phrasebook(&phrasebook, &config);

    println!("\n=== Phrasebook Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn load_phrasebooks_recursive(dir: &Path, phrasebook: &mut Phrasebook) {
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                load_phrasebooks_recursive(&path, phrasebook);
            } else if path.extension().and_then(|s| s.to_str()) == Some("ron") {
                match Phrasebook::load_from_ron(&path) {
                    Ok(p) => {
                        println!("  Loaded: {}", path.display());
                        phrasebook.merge(p);
                    }
                    Err(e) => {
                        eprintln!("  ERROR loading {}: {}", path.display(), e);
                    }
                }
            }
        }
    }
}

fn lint_phrasebook(phrasebook: &Phrasebook, config: &EngineConfig) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for slot in SLOTS {
        if !phrasebook.slots.contains_key(slot) {
            warnings.push(format!("No '{}' slot found (it will render empty)", slot));
        }
    }

    for (name, variants) in &phrasebook.slots {
        if !SLOTS.contains(&name.as_str()) {
            warnings.push(format!("Slot '{}' is never drawn by the engine", name));
        }

        for (index, variant) in variants.iter().enumerate() {
            let label = format!("'{}' variant #{}", name, index + 1);
            let may_reach_lunch = !variant.requires.iter().any(|t| t == "service:dinner");

            if variant.alternatives.len() < 2 {
                warnings.push(format!(
                    "{} has only {} alternatives (minimum 2 recommended)",
                    label,
                    variant.alternatives.len()
                ));
            }
            if variant.alternatives.iter().all(|a| a.weight == 0) {
                errors.push(format!("{} has no alternative with a non-zero weight", label));
            }
            if variant.requires.iter().any(|t| variant.excludes.contains(t)) {
                errors.push(format!("{} requires and excludes the same tag", label));
            }

            for alt in &variant.alternatives {
                let text = alt.template.literal_text();

                for word in &config.forbidden {
                    if text.contains(word.as_str()) {
                        errors.push(format!("{} uses forbidden phrase '{}'", label, word));
                    }
                }

                if may_reach_lunch {
                    for word in &config.closing_vocabulary {
                        if text.contains(word.as_str()) {
                            errors.push(format!(
                                "{} can appear at lunch but mentions '{}'",
                                label, word
                            ));
                        }
                    }
                }

                for field in alt.template.fields() {
                    if let Some((_, tag)) = FIELD_TAGS.iter().find(|(f, _)| *f == field) {
                        if !variant.requires.iter().any(|t| t == tag) {
                            warnings.push(format!(
                                "{} uses {{{}}} without requiring '{}'",
                                label,
                                field.name(),
                                tag
                            ));
                        }
                    }
                }
            }
        }
    }

    (errors, warnings)
}

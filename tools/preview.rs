/// Preview: render reports for a record file, or tweak it interactively.
///
/// Usage: preview --record <path> [--config <path>] [--phrasebook <path>]
///                [--seed <n>] [--count <n>]
///
/// With `--count`, prints that many reports and exits. Otherwise starts a
/// shell:
///   gen                 render one report
///   bulk <n>            render n reports with variety stats
///   seed <n>            reset the RNG
///   feel <text>         replace the crowd feel
///   notice <text>       replace the notice (empty clears it)
///   service lunch|dinner
///   show                print the current record
///   help                list commands
///   quit                exit
///
/// Set `RUST_LOG=shift_report=trace` to watch each slot draw.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rustc_hash::FxHashSet;
use shift_report::core::pipeline::ReportEngine;
use shift_report::core::sanitize::count_full_stops;
use shift_report::schema::record::{ObservationRecord, ServicePeriod};
use std::io::{self, BufRead, Write};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let mut record_path = None;
    let mut config_path = None;
    let mut phrasebook_path = None;
    let mut seed: u64 = 42;
    let mut count = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--record" if i + 1 < args.len() => {
                i += 1;
                record_path = Some(args[i].clone());
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(args[i].clone());
            }
            "--phrasebook" if i + 1 < args.len() => {
                i += 1;
                phrasebook_path = Some(args[i].clone());
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse().unwrap_or(42);
            }
            "--count" if i + 1 < args.len() => {
                i += 1;
                count = args[i].parse::<usize>().ok();
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let Some(record_path) = record_path else {
        eprintln!("ERROR: --record is required");
        print_usage();
        process::exit(1);
    };

    let mut record = match load_record(&record_path) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("ERROR loading record {}: {}", record_path, e);
            process::exit(1);
        }
    };

    let mut builder = ReportEngine::builder();
    if let Some(ref path) = config_path {
        builder = builder.config_path(path);
    }
    if let Some(ref path) = phrasebook_path {
        builder = builder.phrasebook_path(path);
    }
    let engine = match builder.build() {
        Ok(e) => e,
        Err(e) => {
            eprintln!("ERROR building engine: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = record.validate(&engine.config().requirements) {
        eprintln!("WARNING: {}", e);
    }

    let mut rng = StdRng::seed_from_u64(seed);

    if let Some(n) = count {
        for text in engine.generate_variants(&record, n, &mut rng) {
            println!("{}\n", text);
        }
        return;
    }

    println!("Loaded {} phrase slots", engine.phrasebook().slots.len());
    println!("Seed: {}", seed);
    println!("Type 'help' for commands.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("preview> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match cmd.to_lowercase().as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => print_help(),
            "gen" | "g" => match engine.generate_checked(&record, &mut rng) {
                Ok(text) => println!("\n{}\n", text),
                Err(e) => println!("Cannot generate: {}", e),
            },
            "bulk" => {
                let n: usize = rest.parse().unwrap_or(10);
                print_bulk(&engine, &record, n, &mut rng);
            }
            "seed" => match rest.parse::<u64>() {
                Ok(s) => {
                    rng = StdRng::seed_from_u64(s);
                    println!("Seed set to {}", s);
                }
                Err(_) => println!("Usage: seed <n>"),
            },
            "feel" => {
                record.crowd_feel = rest.to_string();
                println!("Crowd level: {:?}", engine.classify(rest));
            }
            "notice" => {
                record.notice = rest.to_string();
                println!("Notice {}", if rest.is_empty() { "cleared" } else { "set" });
            }
            "service" => match rest {
                "lunch" => record.service = ServicePeriod::Lunch,
                "dinner" => record.service = ServicePeriod::Dinner,
                _ => println!("Usage: service lunch|dinner"),
            },
            "show" => println!("{:#?}", record),
            _ => println!("Unknown command '{}'. Type 'help' for commands.", cmd),
        }
    }
}

fn load_record(path: &str) -> Result<ObservationRecord, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(ron::from_str(&contents)?)
}

fn print_bulk(engine: &ReportEngine, record: &ObservationRecord, n: usize, rng: &mut StdRng) {
    let reports = engine.generate_variants(record, n, rng);
    for (i, text) in reports.iter().enumerate() {
        println!("[{}] {}", i + 1, text);
    }

    let distinct: FxHashSet<&String> = reports.iter().collect();
    let sentences: usize = reports.iter().map(|t| count_full_stops(t)).sum();
    println!("\n--- Variety ---");
    println!("Distinct reports: {}/{}", distinct.len(), reports.len());
    if !reports.is_empty() {
        println!("Avg sentences: {:.2}", sentences as f64 / reports.len() as f64);
    }
}

fn print_usage() {
    println!("Usage: preview --record <path> [--config <path>] [--phrasebook <path>] [--seed <n>] [--count <n>]");
}

fn print_help() {
    println!("Commands:");
    println!("  gen                   render one report");
    println!("  bulk <n>              render n reports with variety stats");
    println!("  seed <n>              reset the RNG");
    println!("  feel <text>           replace the crowd feel");
    println!("  notice <text>         replace the notice");
    println!("  service lunch|dinner  switch service period");
    println!("  show                  print the current record");
    println!("  quit                  exit");
}

/// Lunch Report example: one day at a food-court stall, lunch then dinner.
///
/// Shows the same engine narrating both services, a notice, and how the
/// crowd feel steers the wording.
///
/// Run with: cargo run --example lunch_report

use rand::rngs::StdRng;
use rand::SeedableRng;
use shift_report::core::pipeline::ReportEngine;
use shift_report::schema::record::{ObservationRecord, ServicePeriod};

fn main() {
    let engine = ReportEngine::builtin().expect("Failed to build engine");
    let mut rng = StdRng::seed_from_u64(2026);

    let lunch = ObservationRecord::new(ServicePeriod::Lunch, "12:00-13:30")
        .with_weather("晴れ")
        .with_customers(&["家族連れ", "学生"], "近隣の会社員")
        .with_crowd_feel("8割くらい埋まっていた")
        .with_best_sellers(&["親子丼"], "から揚げ定食、うどん")
        .with_notice("明日は10時から棚卸しです");

    let dinner = ObservationRecord::new(ServicePeriod::Dinner, "18-19")
        .with_customers(&["会社員"], "")
        .with_crowd_feel("空席が多くゆったり")
        .with_best_sellers(&["ラーメン"], "")
        .with_event("夜市");

    println!("========================================");
    println!("   DAILY REPORT");
    println!("========================================");
    println!();

    print_report(&engine, "Lunch", &lunch, &mut rng);
    print_report(&engine, "Dinner", &dinner, &mut rng);

    println!("--- Three more lunch drafts ---");
    for text in engine.generate_variants(&lunch, 3, &mut rng) {
        println!("* {}", text);
    }
}

fn print_report(engine: &ReportEngine, title: &str, record: &ObservationRecord, rng: &mut StdRng) {
    println!("--- {} ---", title);
    println!("[crowd: {:?}]", engine.classify(&record.crowd_feel));
    println!();

    match engine.generate_checked(record, rng) {
        Ok(text) => println!("{}", text),
        Err(e) => println!("[Generation error: {}]", e),
    }

    println!();
}

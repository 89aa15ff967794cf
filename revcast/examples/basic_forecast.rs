use chrono::{Datelike, Months, NaiveDate, Utc};
use revcast::reconcile::rows_to_json;
use revcast::{telemetry, DataLoader, ForecastEngine, ForecastRequest, Observation, RecordSnapshot, RevcastConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init_with_default("warn");

    // Usage: basic_forecast [records.csv] [config.json]
    let mut args = std::env::args().skip(1);
    let records = args.next();
    let config = match args.next() {
        Some(path) => RevcastConfig::from_file(path)?,
        None => RevcastConfig::default(),
    };

    let today = Utc::now().date_naive();
    let snapshot = match records {
        Some(path) => DataLoader::from_csv(path, &config.ingest)?,
        None => RecordSnapshot::new(create_sample_data(today)),
    };
    println!("Loaded {} records", snapshot.len());

    let engine = ForecastEngine::new(config.engine)?;
    let request = ForecastRequest::default();
    let rows = engine.generate_for_snapshot(&snapshot, &request, today)?;

    for row in &rows {
        let fmt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v));
        println!(
            "{}  {:<12} actual {:>10}  forecast {:>10}{}",
            row.month,
            row.category,
            fmt(row.actual),
            fmt(row.forecast),
            if row.is_future { "  *" } else { "" }
        );
    }

    println!("\n{}", rows_to_json(&rows)?);
    Ok(())
}

/// Eighteen months of two product lines ending last month
fn create_sample_data(today: NaiveDate) -> Vec<Observation> {
    let mut observations = Vec::new();
    for back in 1..=18u32 {
        let Some(date) = today.with_day(1).and_then(|d| d.checked_sub_months(Months::new(back))) else {
            continue;
        };
        let t = f64::from(18 - back);
        observations.push(Observation::new(date, "Widgets", 1000.0 + 25.0 * t + 80.0 * (t / 2.0).sin()));
        observations.push(Observation::new(date, "Gadgets", 400.0 + 60.0 * (t / 3.0).cos()));
    }
    observations
}

use std::path::PathBuf;

use anyhow::{Context, Result};
use log::info;

use shiplens::data::store;
use shiplens::metrics::Metric;
use shiplens::DashboardState;

/// Text front end: load a dataset, apply the identity filter, and print
/// the KPI row and chart aggregates. Stands in for the rendering layer.
fn main() -> Result<()> {
    env_logger::init();

    let path: PathBuf = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("Train.csv"));

    let dataset = store::dataset(&path)
        .with_context(|| format!("loading shipment data from {}", path.display()))?;
    info!("dashboard ready with {} records", dataset.len());

    let state = DashboardState::new(dataset);
    let summary = state.summary();
    let aggregates = state.aggregates();

    println!("Logistics Performance Dashboard");
    println!("===============================");
    println!("Total orders:        {}", summary.total_orders);
    println!("On-time delivery:    {}", pct(summary.on_time_rate));
    println!("Late delivery:       {}", pct(summary.late_rate));
    println!("Avg calls (late):    {}", num(summary.avg_calls_late));
    println!("Avg discount (late): {}", num(summary.avg_discount_late));
    println!("High-value late:     {}", pct(summary.high_value_late_rate));

    println!("\nShipment mode vs delivery");
    for ((mode, on_time), count) in &aggregates.mode_delivery_counts {
        let outcome = if *on_time { "on time" } else { "late" };
        println!("  {mode:<8} {outcome:<8} {count}");
    }

    println!("\nWarehouse performance (mean on-time rate)");
    for (block, rate) in &aggregates.warehouse_on_time {
        println!("  block {block}: {:.2}", rate);
    }

    println!("\nProduct importance breakdown");
    for (category, count) in &aggregates.importance_counts {
        println!("  {category:<8} {count}");
    }

    println!("\nCorrelation matrix");
    let matrix = &aggregates.correlation;
    for (i, field) in matrix.fields().iter().enumerate() {
        print!("  {field:<20}");
        for j in 0..matrix.fields().len() {
            let value = matrix.get(i, j);
            if value.is_nan() {
                print!("   n/a");
            } else {
                print!(" {value:5.2}");
            }
        }
        println!();
    }

    println!("\nInsights");
    println!("  - Shipment mode significantly influences delivery time.");
    println!("  - Higher customer calls strongly correlate with late deliveries.");
    println!("  - High discounts often associate with delayed shipments.");
    println!("  - Warehouse performance varies across blocks.");

    Ok(())
}

fn pct(metric: Metric) -> String {
    match metric {
        Ok(value) => format!("{value:.2}%"),
        Err(_) => "N/A".to_string(),
    }
}

fn num(metric: Metric) -> String {
    match metric {
        Ok(value) => format!("{value:.2}"),
        Err(_) => "N/A".to_string(),
    }
}

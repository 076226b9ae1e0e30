//! Generate a deterministic synthetic shipment dataset for local runs:
//! `cargo run --bin generate_sample [out.csv] [rows]`

use std::path::PathBuf;

use anyhow::{Context, Result};

const MODES: [&str; 3] = ["Ship", "Flight", "Road"];
const BLOCKS: [&str; 5] = ["A", "B", "C", "D", "F"];
const IMPORTANCE: [&str; 3] = ["low", "medium", "high"];
const GENDERS: [&str; 2] = ["F", "M"];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a>(&mut self, options: &[&'a str]) -> &'a str {
        options[(self.next_u64() % options.len() as u64) as usize]
    }

    fn range(&mut self, lo: u64, hi: u64) -> u64 {
        lo + self.next_u64() % (hi - lo)
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let path: PathBuf = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("Train.csv"));
    let rows: usize = match args.next() {
        Some(raw) => raw.parse().context("row count must be an integer")?,
        None => 1000,
    };

    let mut rng = SimpleRng::new(42);
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("creating {}", path.display()))?;

    writer.write_record([
        "Mode_of_Shipment",
        "Warehouse_block",
        "Product_importance",
        "Gender",
        "Customer_care_calls",
        "Cost_of_the_Product",
        "Discount_offered",
        "Reached.on.Time_Y.N",
    ])?;

    for _ in 0..rows {
        let mode = rng.pick(&MODES);
        let block = rng.pick(&BLOCKS);
        let importance = rng.pick(&IMPORTANCE);
        let gender = rng.pick(&GENDERS);
        let cost = rng.range(96, 310);
        let discount = rng.range(1, 65);

        // Skew the outcome so the charts have visible structure: big
        // discounts and road freight run late more often.
        let mut late_odds = 0.25 + discount as f64 / 130.0;
        if mode == "Road" {
            late_odds += 0.15;
        }
        let on_time = rng.next_f64() >= late_odds;

        // Late shipments attract more customer-care calls.
        let calls = if on_time {
            rng.range(2, 5)
        } else {
            rng.range(3, 8)
        };

        let calls = calls.to_string();
        let cost = cost.to_string();
        let discount = discount.to_string();
        writer.write_record([
            mode,
            block,
            importance,
            gender,
            calls.as_str(),
            cost.as_str(),
            discount.as_str(),
            if on_time { "1" } else { "0" },
        ])?;
    }

    writer.flush()?;
    println!("wrote {rows} records to {}", path.display());
    Ok(())
}

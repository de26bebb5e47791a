//! Writes a synthetic `science_and_tech_sl.csv` for trying the dashboard
//! without the real extract. Values follow smooth trends with small noise;
//! a few cells are left empty to exercise missing-value handling.

use anyhow::{Context, Result};

const OUTPUT: &str = "science_and_tech_sl.csv";
const FIRST_YEAR: i32 = 2000;
const LAST_YEAR: i32 = 2021;

/// (indicator, code, value in FIRST_YEAR, yearly growth factor)
const INDICATORS: &[(&str, &str, f64, f64)] = &[
    ("Research and development expenditure (% of GDP)", "GB.XPD.RSDV.GD.ZS", 0.14, 0.995),
    ("Scientific and technical journal articles", "IP.JRN.ARTC.SC", 180.0, 1.07),
    ("Patent applications, nonresidents", "IP.PAT.NRES", 260.0, 1.02),
    ("Researchers in R&D (per million people)", "SP.POP.SCIE.RD.P6", 190.0, 1.03),
    ("Technicians in R&D (per million people)", "SP.POP.TECH.RD.P6", 60.0, 1.01),
    ("High-technology exports (% of manufactured exports)", "TX.VAL.TECH.MF.ZS", 1.6, 0.99),
    (
        "Charges for the use of intellectual property, payments (BoP, current US$)",
        "BM.GSR.ROYL.CD",
        2.0e6,
        1.09,
    ),
    (
        "Charges for the use of intellectual property, receipts (BoP, current US$)",
        "BX.GSR.ROYL.CD",
        1.0e5,
        1.05,
    ),
];

/// Deterministic noise source (64-bit LCG, top bits only).
struct Lcg(u64);

impl Lcg {
    fn next_unit(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Multiplicative jitter in `1 ± spread`.
    fn jitter(&mut self, spread: f64) -> f64 {
        1.0 + (self.next_unit() * 2.0 - 1.0) * spread
    }
}

fn main() -> Result<()> {
    let mut rng = Lcg(42);
    let mut writer = csv::Writer::from_path(OUTPUT).context("creating output file")?;
    writer.write_record([
        "Country Name",
        "Country ISO3",
        "Year",
        "Indicator.Name",
        "Indicator Code",
        "Value",
    ])?;

    let mut rows = 0usize;
    for &(name, code, start, growth) in INDICATORS {
        let mut level = start;
        for year in FIRST_YEAR..=LAST_YEAR {
            let value = level * rng.jitter(0.05);
            level *= growth;

            // Roughly one gap per indicator, never at the ends.
            let gap = year > FIRST_YEAR && year < LAST_YEAR && rng.next_unit() < 0.05;
            let cell = if gap { String::new() } else { format!("{value:.4}") };

            let year = year.to_string();
            writer.write_record(["Sri Lanka", "LKA", year.as_str(), name, code, cell.as_str()])?;
            rows += 1;
        }
    }
    writer.flush().context("flushing output file")?;

    println!(
        "Wrote {rows} rows ({} indicators, {FIRST_YEAR}-{LAST_YEAR}) to {OUTPUT}",
        INDICATORS.len()
    );
    Ok(())
}

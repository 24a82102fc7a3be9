//! Quote application and derived-metric recomputation.

use std::collections::HashMap;

use tracing::debug;

use crate::dataset::store::{Col, DatasetStore};
use crate::market::types::PriceQuote;

/// What happens to a row's persisted price when a quote matches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwritePolicy {
    /// Take the quoted price unconditionally (canonical).
    Always,
    /// Take the quoted price only when it undercuts the persisted one.
    WhenCheaper,
}

impl OverwritePolicy {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "always" => Ok(OverwritePolicy::Always),
            "when-cheaper" => Ok(OverwritePolicy::WhenCheaper),
            other => anyhow::bail!(
                "unknown overwrite policy '{other}' (expected always or when-cheaper)"
            ),
        }
    }
}

/// Write each quote's price and URL into its matching row.
/// Rows without a quote are untouched. Returns the number of rows updated.
pub fn apply_quotes(
    store: &mut DatasetStore,
    quotes: &[PriceQuote],
    policy: OverwritePolicy,
) -> anyhow::Result<usize> {
    let by_name: HashMap<&str, &PriceQuote> = quotes
        .iter()
        .map(|q| (q.component_name.as_str(), q))
        .collect();

    let mut updated = 0;
    for row in 0..store.len() {
        let Some(quote) = by_name.get(store.get(row, Col::Name)) else {
            continue;
        };

        if policy == OverwritePolicy::WhenCheaper {
            let current = store.numeric(row, Col::Price)?;
            if quote.price >= current {
                debug!(
                    component = %quote.component_name,
                    quoted = quote.price,
                    current,
                    "quote not cheaper, keeping persisted price"
                );
                continue;
            }
        }

        store.set(row, Col::Price, format_price(quote.price));
        store.set(row, Col::Url, quote.url.clone());
        updated += 1;
    }

    Ok(updated)
}

/// Recompute the three efficiency columns for every row from the current
/// price and spec cells. Division by zero yields the +inf sentinel.
///
/// The average is taken over the *formatted* ratios, so the persisted
/// columns stay mutually consistent and a rerun with no new quotes writes
/// identical bytes.
pub fn recompute_metrics(store: &mut DatasetStore) -> anyhow::Result<()> {
    for row in 0..store.len() {
        let perf = store.numeric(row, Col::Performance)?;
        let power = store.numeric(row, Col::Power)?;
        let price = store.numeric(row, Col::Price)?;

        let power_eff = if power == 0.0 { f64::INFINITY } else { perf / power };
        let price_eff = if price == 0.0 { f64::INFINITY } else { perf / price };

        store.set(row, Col::PowerEff, format_metric(power_eff));
        store.set(row, Col::PriceEff, format_metric(price_eff));

        let power_eff = store.numeric(row, Col::PowerEff)?;
        let price_eff = store.numeric(row, Col::PriceEff)?;
        store.set(row, Col::AvgEff, format_metric((power_eff + price_eff) / 2.0));
    }

    Ok(())
}

/// Two decimal places with thousands separators; infinity stays "inf".
pub fn format_price(value: f64) -> String {
    if !value.is_finite() {
        return format!("{value:.2}");
    }

    let fixed = format!("{value:.2}");
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{sign}{grouped}.{frac_part}")
}

/// Four decimal places; infinity stays "inf".
pub fn format_metric(value: f64) -> String {
    format!("{value:.4}")
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use tempfile::{TempDir, tempdir};

    use crate::catalog::Category;

    use super::*;

    fn quote(name: &str, price: f64, url: &str) -> PriceQuote {
        PriceQuote {
            component_name: name.to_string(),
            price,
            title: format!("{name} listing"),
            url: url.to_string(),
            condition: "Used".to_string(),
        }
    }

    fn store_from(csv: &str) -> (TempDir, PathBuf, DatasetStore) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gpu_info.csv");
        fs::write(&path, csv).unwrap();
        let store = DatasetStore::load(&path, Category::Gpu).unwrap();
        (dir, path, store)
    }

    const CSV: &str = "\
Card,FPS,W,Price ($),URL,Power Efficiency (FPS/W),Price Efficiency (FPS/$),Average Efficiency
RTX 3080,100.0,320,\"1,100.00\",https://old.example/a,0,0,0
RTX 3070,80.0,220,600.00,https://old.example/b,0,0,0
";

    #[test]
    fn always_policy_overwrites_even_when_pricier() {
        let (_dir, _path, mut store) = store_from(CSV);
        let quotes = vec![quote("RTX 3070", 700.0, "https://new.example/b")];

        let updated = apply_quotes(&mut store, &quotes, OverwritePolicy::Always).unwrap();
        assert_eq!(updated, 1);
        assert_eq!(store.get(1, Col::Price), "700.00");
        assert_eq!(store.get(1, Col::Url), "https://new.example/b");
        // unmatched row untouched
        assert_eq!(store.get(0, Col::Price), "1,100.00");
    }

    #[test]
    fn when_cheaper_policy_keeps_lower_persisted_price() {
        let (_dir, _path, mut store) = store_from(CSV);
        let quotes = vec![
            quote("RTX 3070", 700.0, "https://new.example/b"),
            quote("RTX 3080", 900.0, "https://new.example/a"),
        ];

        let updated = apply_quotes(&mut store, &quotes, OverwritePolicy::WhenCheaper).unwrap();
        assert_eq!(updated, 1);
        assert_eq!(store.get(1, Col::Price), "600.00");
        assert_eq!(store.get(1, Col::Url), "https://old.example/b");
        assert_eq!(store.get(0, Col::Price), "900.00");
    }

    #[test]
    fn metrics_recomputed_for_every_row() {
        let (_dir, _path, mut store) = store_from(CSV);
        recompute_metrics(&mut store).unwrap();

        // 100 / 320 and 100 / 1100
        assert_eq!(store.get(0, Col::PowerEff), "0.3125");
        assert_eq!(store.get(0, Col::PriceEff), "0.0909");
        assert_eq!(store.get(0, Col::AvgEff), "0.2017");
    }

    #[test]
    fn zero_power_draw_yields_inf_sentinel() {
        let csv = "\
Card,FPS,W,Price ($),URL,Power Efficiency (FPS/W),Price Efficiency (FPS/$),Average Efficiency
Passive Card,60.0,0,300.00,https://example.com/p,0,0,0
";
        let (_dir, _path, mut store) = store_from(csv);
        recompute_metrics(&mut store).unwrap();

        assert_eq!(store.get(0, Col::PowerEff), "inf");
        assert_eq!(store.get(0, Col::AvgEff), "inf");
        assert_eq!(store.get(0, Col::PriceEff), "0.2000");
    }

    #[test]
    fn recompute_is_idempotent() {
        let (_dir, path, mut store) = store_from(CSV);
        recompute_metrics(&mut store).unwrap();
        store.save(&path).unwrap();
        let first = fs::read_to_string(&path).unwrap();

        let mut store = DatasetStore::load(&path, Category::Gpu).unwrap();
        recompute_metrics(&mut store).unwrap();
        store.save(&path).unwrap();
        let second = fs::read_to_string(&path).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn price_formatting_groups_thousands() {
        assert_eq!(format_price(1234.5), "1,234.50");
        assert_eq!(format_price(999.999), "1,000.00");
        assert_eq!(format_price(42.0), "42.00");
        assert_eq!(format_price(1_234_567.891), "1,234,567.89");
        assert_eq!(format_price(f64::INFINITY), "inf");
    }

    #[test]
    fn metric_formatting() {
        assert_eq!(format_metric(0.3125), "0.3125");
        assert_eq!(format_metric(f64::INFINITY), "inf");
    }
}

//! Load/save of the persisted dataset.
//!
//! Rows keep every original column as raw text; only the cells this tool
//! understands are addressed (by header name), so unknown columns and row
//! order survive a round trip byte-for-byte.

use std::path::Path;

use anyhow::Context;

use crate::catalog::{
    AVG_EFF_COLUMN, Category, POWER_EFF_COLUMN, PRICE_COLUMN, PRICE_EFF_COLUMN, URL_COLUMN,
};

/// The dataset cells the pipeline reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Col {
    Name,
    Performance,
    Power,
    Price,
    Url,
    PowerEff,
    PriceEff,
    AvgEff,
}

const COL_COUNT: usize = 8;

#[derive(Debug)]
pub struct DatasetStore {
    category: Category,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    idx: [usize; COL_COUNT],
}

impl DatasetStore {
    /// Read the dataset and resolve the category's required columns.
    /// A missing file or missing column aborts the run.
    pub fn load(path: &Path, category: Category) -> anyhow::Result<Self> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("opening dataset '{}'", path.display()))?;

        let headers: Vec<String> = reader
            .headers()
            .context("reading dataset header")?
            .iter()
            .map(str::to_owned)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.context("reading dataset row")?;
            rows.push(record.iter().map(str::to_owned).collect());
        }

        let idx = resolve_columns(&headers, category)?;

        Ok(Self {
            category,
            headers,
            rows,
            idx,
        })
    }

    /// Rewrite the whole dataset: header plus every row, original order.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("writing dataset '{}'", path.display()))?;

        writer
            .write_record(&self.headers)
            .context("writing dataset header")?;
        for row in &self.rows {
            writer.write_record(row).context("writing dataset row")?;
        }
        writer.flush().context("flushing dataset")?;
        Ok(())
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn component_names(&self) -> impl Iterator<Item = &str> {
        let name_idx = self.idx[Col::Name as usize];
        self.rows.iter().map(move |row| row[name_idx].as_str())
    }

    pub fn get(&self, row: usize, col: Col) -> &str {
        &self.rows[row][self.idx[col as usize]]
    }

    pub fn set(&mut self, row: usize, col: Col, value: String) {
        let i = self.idx[col as usize];
        self.rows[row][i] = value;
    }

    /// Parse a cell as a number, tolerating grouping commas.
    pub fn numeric(&self, row: usize, col: Col) -> anyhow::Result<f64> {
        let raw = self.get(row, col);
        parse_number(raw).with_context(|| {
            let header = &self.headers[self.idx[col as usize]];
            format!("row {row}: column '{header}' holds non-numeric value '{raw}'")
        })
    }
}

fn resolve_columns(headers: &[String], category: Category) -> anyhow::Result<[usize; COL_COUNT]> {
    let cols = category.columns();
    let required = [
        cols.name,
        cols.performance,
        cols.power,
        PRICE_COLUMN,
        URL_COLUMN,
        POWER_EFF_COLUMN,
        PRICE_EFF_COLUMN,
        AVG_EFF_COLUMN,
    ];

    let mut idx = [0usize; COL_COUNT];
    for (slot, name) in idx.iter_mut().zip(required) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("dataset is missing expected column '{name}'"))?;
    }
    Ok(idx)
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.replace(',', "").trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    const GPU_CSV: &str = "\
Card,FPS,W,VRAM (GB),Price ($),URL,Power Efficiency (FPS/W),Price Efficiency (FPS/$),Average Efficiency
RTX 3080,100.0,320,10,\"1,100.00\",https://example.com/a,0.3125,0.0909,0.2017
RTX 3070,80.0,220,8,600.00,https://example.com/b,0.3636,0.1333,0.2485
";

    #[test]
    fn load_resolves_columns_and_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gpu_info.csv");
        fs::write(&path, GPU_CSV).unwrap();

        let store = DatasetStore::load(&path, Category::Gpu).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(0, Col::Name), "RTX 3080");
        assert_eq!(store.numeric(0, Col::Price).unwrap(), 1100.0);
        assert_eq!(store.numeric(1, Col::Power).unwrap(), 220.0);
        let names: Vec<&str> = store.component_names().collect();
        assert_eq!(names, ["RTX 3080", "RTX 3070"]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope.csv");
        assert!(DatasetStore::load(&path, Category::Gpu).is_err());
    }

    #[test]
    fn missing_column_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gpu_info.csv");
        fs::write(&path, "Card,FPS,Price ($)\nRTX 3080,100.0,500.00\n").unwrap();

        let err = DatasetStore::load(&path, Category::Gpu).unwrap_err();
        assert!(err.to_string().contains("missing expected column"));
    }

    #[test]
    fn round_trip_preserves_unknown_columns_and_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gpu_info.csv");
        fs::write(&path, GPU_CSV).unwrap();

        let mut store = DatasetStore::load(&path, Category::Gpu).unwrap();
        store.set(1, Col::Price, "550.00".to_string());
        store.save(&path).unwrap();

        let reloaded = DatasetStore::load(&path, Category::Gpu).unwrap();
        let names: Vec<&str> = reloaded.component_names().collect();
        assert_eq!(names, ["RTX 3080", "RTX 3070"]);
        assert_eq!(reloaded.numeric(1, Col::Price).unwrap(), 550.0);
        // the column this tool never touches is still there
        let vram_idx = reloaded.headers.iter().position(|h| h == "VRAM (GB)").unwrap();
        assert_eq!(reloaded.rows[0][vram_idx], "10");
    }
}

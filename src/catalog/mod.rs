use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::dataset::store::DatasetStore;

/// Hardware category a component belongs to.
///
/// The category decides which dataset columns hold the spec fields and
/// which filter vocabulary applies. Resolved through lookup methods here
/// rather than mode flags threaded through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Gpu,
    Cpu,
}

/// Dataset column names that vary by category.
#[derive(Debug, Clone, Copy)]
pub struct ColumnMap {
    pub name: &'static str,
    pub performance: &'static str,
    pub power: &'static str,
}

pub const PRICE_COLUMN: &str = "Price ($)";
pub const URL_COLUMN: &str = "URL";
pub const POWER_EFF_COLUMN: &str = "Power Efficiency (FPS/W)";
pub const PRICE_EFF_COLUMN: &str = "Price Efficiency (FPS/$)";
pub const AVG_EFF_COLUMN: &str = "Average Efficiency";

impl Category {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "gpu" => Ok(Category::Gpu),
            "cpu" => Ok(Category::Cpu),
            other => anyhow::bail!("unknown category '{other}' (expected gpu or cpu)"),
        }
    }

    pub fn columns(&self) -> ColumnMap {
        match self {
            Category::Gpu => ColumnMap {
                name: "Card",
                performance: "FPS",
                power: "W",
            },
            Category::Cpu => ColumnMap {
                name: "Name",
                performance: "Score",
                power: "TDP",
            },
        }
    }

    /// Variant suffixes that distinguish otherwise identically-numbered
    /// models. Used by the filter's qualifier guard.
    pub fn qualifier_tokens(&self) -> &'static [&'static str] {
        match self {
            Category::Gpu => &["ti", "super"],
            Category::Cpu => &["x3d", "ks"],
        }
    }

    pub fn default_dataset_path(&self) -> &'static str {
        match self {
            Category::Gpu => "gpu_info.csv",
            Category::Cpu => "cpu_info.csv",
        }
    }
}

/// One catalog entry. Identity is the name; specs live in the dataset.
#[derive(Debug, Clone)]
pub struct Component {
    pub name: String,
    pub category: Category,
}

/// Ordered registry of the components to price in this run.
/// External input, read-only once constructed.
#[derive(Debug, Clone)]
pub struct Catalog {
    components: Vec<Component>,
}

impl Catalog {
    pub fn new(names: Vec<String>, category: Category) -> Self {
        let components = names
            .into_iter()
            .map(|name| Component { name, category })
            .collect();
        Self { components }
    }

    /// Load from a JSON array of component name strings.
    pub fn from_json_file(path: &Path, category: Category) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading catalog file '{}'", path.display()))?;
        let names: Vec<String> = serde_json::from_str(&raw)
            .with_context(|| format!("parsing catalog file '{}'", path.display()))?;
        Ok(Self::new(names, category))
    }

    /// Derive the catalog from the dataset's name column, preserving row
    /// order. Used when no separate catalog file is configured.
    pub fn from_store(store: &DatasetStore) -> Self {
        let names = store.component_names().map(str::to_owned).collect();
        Self::new(names, store.category())
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

pub mod outlier;
pub mod traits;

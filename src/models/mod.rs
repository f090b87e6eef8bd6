pub mod market;

pub use market::NormalizedAsset;

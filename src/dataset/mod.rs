pub mod features;
pub mod lpcnet_dataset;
pub mod noise;

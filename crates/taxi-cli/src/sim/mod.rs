//! Synthetic flight tracks for exercising the dataset pipeline.

pub mod taxi_path;

pub use taxi_path::{synthesize_track, TaxiPath, TrackProfile};

pub mod config;
pub mod dataset;
pub mod error;
pub mod features;
pub mod graph;
pub mod matcher;
pub mod models;
pub mod network;
pub mod route;
pub mod schema;
pub mod scoring;
pub mod segmenter;
pub mod spatial;
pub mod tables;

pub use config::EngineConfig;
pub use dataset::{DatasetBuilder, DatasetSummary, TrainingExample};
pub use error::{Result, RouteIssue, TaxiError};
pub use features::{path_features, CoordinateLookup};
pub use graph::{IdentCatalog, TaxiwayGraph};
pub use matcher::{MapMatcher, NearestVertex};
pub use models::{
    GeoPoint, GroundSegment, PathFeatureVector, Segment, TrackSample, Vertex, VertexId,
};
pub use network::{NetworkCache, NetworkSource};
pub use route::{ResolvedRoute, RouteResolver};
pub use scoring::{
    evaluate, ident_length_estimate, predict_taxi_time, AverageSpeedModel, EvaluationMetrics,
    FeatureScaler, ScoringInput, TaxiTimeModel, TaxiTimeReport,
};
pub use segmenter::TrackSegmenter;
pub use spatial::{distance, haversine_distance, num_turns, path_length, sharpness, turn_angles};

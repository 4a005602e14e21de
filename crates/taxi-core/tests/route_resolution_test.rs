//! End-to-end tests over in-memory reference tables.
//!
//! Loads a small airport from CSV, resolves routes against it and checks
//! that map-matched tracks land on the same paths and features.

use chrono::{Duration, TimeZone, Utc};
use taxi_core::dataset::DatasetBuilder;
use taxi_core::features::path_features;
use taxi_core::models::TrackSample;
use taxi_core::scoring::{predict_taxi_time, AverageSpeedModel, FeatureScaler, TaxiTimeModel};
use taxi_core::tables::{read_segments, read_vertices};
use taxi_core::{EngineConfig, RouteIssue, RouteResolver, TaxiError, TaxiwayGraph};

const VERTICES: &str = "\
Vertex_Index,Latitude,Longitude
1,40.8500,-74.0600
2,40.8510,-74.0600
3,40.8520,-74.0600
4,40.8520,-74.0590
5,40.8530,-74.0590
";

const SEGMENTS: &str = "\
Ident,Vertex_Count,Vertex_Indices
L,2,1;2
C,2,2;3
H,2,3;4
RW27,2,4;5
B,2,x;y
";

fn airport() -> TaxiwayGraph {
    let vertices = read_vertices(VERTICES.as_bytes()).unwrap();
    let segments = read_segments(SEGMENTS.as_bytes()).unwrap();
    TaxiwayGraph::build(vertices, &segments)
}

fn sample(secs: i64, lat: f64, lon: f64, altitude: f64) -> TrackSample {
    TrackSample {
        timestamp: Utc.with_ymd_and_hms(2024, 6, 1, 14, 0, 0).unwrap() + Duration::seconds(secs),
        lat,
        lon,
        altitude,
        callsign: Some("JBU42".to_string()),
    }
}

/// Arrival that rolls out over vertices 1, 2, 3, 4 in 90 seconds.
fn arrival_track() -> Vec<TrackSample> {
    vec![
        sample(0, 40.8400, -74.0600, 900.0),
        sample(30, 40.8450, -74.0600, 300.0),
        sample(60, 40.8500, -74.0600, 0.0),
        sample(90, 40.8510, -74.0600, 0.0),
        sample(120, 40.8520, -74.0600, 0.0),
        sample(150, 40.8520, -74.0590, 0.0),
    ]
}

#[test]
fn test_tables_skip_malformed_rows() {
    let graph = airport();
    assert_eq!(graph.node_count(), 5);
    assert!(graph.has_ident("RW27"));
    assert!(!graph.has_ident("B"));
    assert_eq!(graph.edges().len(), 4);
}

#[test]
fn test_missing_column_is_schema_error() {
    let err = read_segments("Name,Vertices\nL,1;2\n".as_bytes()).unwrap_err();
    assert!(matches!(err, TaxiError::Schema { .. }));
}

#[test]
fn test_single_edge_idents_round_trip() {
    let graph = airport();
    let resolved = RouteResolver::new(&graph).resolve("RW27-L-C-H").unwrap();
    assert_eq!(resolved.normalized, vec!["L", "C", "H"]);
    assert_eq!(resolved.path, vec![1, 2, 3, 4]);
    assert_eq!(
        resolved.issues,
        vec![RouteIssue::RunwayDesignator("RW27".to_string())]
    );
}

#[test]
fn test_resolved_route_features() {
    let graph = airport();
    let resolved = RouteResolver::new(&graph).resolve("l,c,h").unwrap();
    let features = path_features(&resolved.path, &graph, &EngineConfig::default()).unwrap();
    assert_eq!(features.num_turns, 1);
    assert!((features.sharpness_deg - 45.0).abs() < 0.5);
    assert!(features.length_m > 300.0 && features.length_m < 310.0);
}

#[test]
fn test_matched_track_agrees_with_resolved_route() {
    let graph = airport();
    let config = EngineConfig::default();
    let mut builder = DatasetBuilder::new(&graph, config.clone());
    let examples = builder.process_track("jbu42.csv", &arrival_track());
    assert_eq!(examples.len(), 1);

    let resolved = RouteResolver::new(&graph).resolve("L-C-H").unwrap();
    assert_eq!(examples[0].vertex_path, resolved.path);
    assert_eq!(
        examples[0].features,
        path_features(&resolved.path, &graph, &config).unwrap()
    );
    assert_eq!(examples[0].taxi_time_s, 90.0);
}

#[test]
fn test_prediction_from_fitted_baseline() {
    let graph = airport();
    let config = EngineConfig::default();
    let mut builder = DatasetBuilder::new(&graph, config.clone());
    let examples = builder.process_track("jbu42.csv", &arrival_track());

    let model = AverageSpeedModel::fit(&examples).unwrap();
    let features: Vec<_> = examples.iter().map(|e| e.features).collect();
    let scaler = FeatureScaler::fit(&features);
    let models: [&dyn TaxiTimeModel; 1] = [&model];

    let report = predict_taxi_time(&graph, "RW27-L-C-H", &scaler, &models, &config);
    assert!(report.success);
    assert_eq!(report.ensemble_s, Some(90.0));
    assert_eq!(report.predictions[0].model, "average_speed");
    let stats = report.path_stats.unwrap();
    assert_eq!(stats.num_turns, 1);
}

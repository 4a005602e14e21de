//! Flight log directories to training examples.

use std::fs;
use std::path::{Path, PathBuf};
use taxi_core::{DatasetBuilder, Result, TrainingExample};

use crate::flight_log::read_flight_log_from_path;

/// CSV files directly inside `dir`, sorted by path.
pub fn list_flight_logs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if path.is_file() && is_csv {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Examples of every log in `files`, plus the number of unreadable files.
///
/// Each example is tagged with its log's file name.
pub fn examples_from_logs(
    builder: &mut DatasetBuilder<'_>,
    files: &[PathBuf],
) -> (Vec<TrainingExample>, usize) {
    let mut examples = Vec::new();
    let mut failed_files = 0usize;
    for path in files {
        let source = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        match read_flight_log_from_path(path) {
            Ok(log) => examples.extend(builder.process_track(&source, &log.samples)),
            Err(err) => {
                tracing::warn!("Skipping {}: {}", path.display(), err);
                failed_files += 1;
            }
        }
    }
    (examples, failed_files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight_log::write_flight_log;
    use crate::sim::{synthesize_track, TaxiPath, TrackProfile};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use taxi_core::{EngineConfig, Segment, TaxiwayGraph, Vertex};

    fn graph() -> TaxiwayGraph {
        let vertices = (1..=3)
            .map(|index| Vertex {
                index,
                lat: 40.85 + index as f64 * 0.001,
                lon: -74.06,
            })
            .collect();
        TaxiwayGraph::build(
            vertices,
            &[Segment {
                ident: "A".to_string(),
                vertices: vec![1, 2, 3],
            }],
        )
    }

    #[test]
    fn test_logs_directory_becomes_examples() {
        let dir = std::env::temp_dir().join(format!("taxi-cli-logs-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let graph = graph();
        let points = graph.vertices().iter().map(|v| v.point()).collect();
        let path = TaxiPath::new(points, 8.0);
        let profile = TrackProfile {
            noise_m: 0.0,
            ..TrackProfile::default()
        };
        let samples = synthesize_track(&path, &profile, &mut StdRng::seed_from_u64(3));
        write_flight_log(fs::File::create(dir.join("b.csv")).unwrap(), &samples).unwrap();
        fs::write(dir.join("a.csv"), "no,usable,columns\n1,2,3\n").unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let files = list_flight_logs(&dir).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.csv"));

        let mut builder = DatasetBuilder::new(&graph, EngineConfig::default());
        let (examples, failed_files) = examples_from_logs(&mut builder, &files);
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(failed_files, 1);
        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].source, "b.csv");
        assert_eq!(examples[0].vertex_path, vec![1, 2, 3]);
    }
}

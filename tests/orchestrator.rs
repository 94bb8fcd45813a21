use std::collections::HashMap;

use tokio::sync::mpsc;

use cartograph::config::AnalyzerConfig;
use cartograph::core::entity::{FileKind, FileRecord, Reference, RepoCoords};
use cartograph::core::events::{AnalysisEvent, AnalysisRequest};
use cartograph::core::RepoAnalyzer;
use cartograph::fetch::{FetchError, RepoFetcher};

struct FakeFetcher {
    files: Vec<FileRecord>,
    bodies: HashMap<String, String>,
    fail_listing: bool,
}

impl FakeFetcher {
    fn new() -> Self {
        Self {
            files: Vec::new(),
            bodies: HashMap::new(),
            fail_listing: false,
        }
    }

    fn with_file(mut self, path: &str, body: &str) -> Self {
        self.files.push(FileRecord::new(
            path.to_string(),
            FileKind::Blob,
            format!("https://github.com/acme/shop/blob/main/{path}"),
        ));
        self.bodies.insert(path.to_string(), body.to_string());
        self
    }
}

#[async_trait::async_trait]
impl RepoFetcher for FakeFetcher {
    async fn list_files(&self) -> Result<Vec<FileRecord>, FetchError> {
        if self.fail_listing {
            return Err(FetchError::RepoNotFound("acme/shop@main".to_string()));
        }
        Ok(self.files.clone())
    }

    async fn fetch_file(&self, path: &str) -> Result<String, FetchError> {
        self.bodies
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                status: 404,
                url: path.to_string(),
            })
    }
}

fn test_config(cache_dir: &std::path::Path) -> AnalyzerConfig {
    AnalyzerConfig {
        cache_dir: Some(cache_dir.to_path_buf()),
        pacing_delay_ms: 0,
        ..AnalyzerConfig::default()
    }
}

fn coords() -> RepoCoords {
    RepoCoords::new("acme", "shop", "main")
}

async fn collect_events(
    analyzer: &RepoAnalyzer,
    fetcher: &FakeFetcher,
) -> Vec<AnalysisEvent> {
    let (tx, mut rx) = mpsc::channel(256);
    analyzer.analyze_with(fetcher, coords(), false, tx).await;

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn one_parse_failure_leaves_a_gap_not_a_crash() {
    let dir = tempfile::TempDir::new().unwrap();
    let analyzer = RepoAnalyzer::new(test_config(dir.path()));

    let mut fetcher = FakeFetcher::new();
    for i in 0..9 {
        fetcher = fetcher.with_file(
            &format!("components/comp{i}.tsx"),
            &format!("export default function Comp{i}() {{ return <div />; }}\n"),
        );
    }
    fetcher = fetcher.with_file("components/broken.tsx", "export default function {{{{\n");
    // Non-candidate entries must not show up in the totals.
    fetcher.files.push(FileRecord::new(
        "README.md".to_string(),
        FileKind::Blob,
        "https://github.com/acme/shop/blob/main/README.md".to_string(),
    ));
    fetcher.files.push(FileRecord::new(
        "components".to_string(),
        FileKind::Tree,
        "https://github.com/acme/shop/blob/main/components".to_string(),
    ));

    let events = collect_events(&analyzer, &fetcher).await;

    let components = events
        .iter()
        .filter(|e| matches!(e, AnalysisEvent::Component { .. }))
        .count();
    assert_eq!(components, 9);

    let progress: Vec<(usize, usize)> = events
        .iter()
        .filter_map(|e| match e {
            AnalysisEvent::Progress { current, total, .. } => Some((*current, *total)),
            _ => None,
        })
        .collect();
    assert_eq!(progress.len(), 10);
    assert!(progress.windows(2).all(|w| w[0].0 <= w[1].0));
    assert!(progress.iter().all(|(_, total)| *total == 10));

    let files_positions: Vec<usize> = events
        .iter()
        .enumerate()
        .filter_map(|(i, e)| matches!(e, AnalysisEvent::Files { .. }).then_some(i))
        .collect();
    assert_eq!(files_positions.len(), 1);
    let first_progress = events
        .iter()
        .position(|e| matches!(e, AnalysisEvent::Progress { .. }))
        .unwrap();
    assert!(files_positions[0] < first_progress);

    match events.last().unwrap() {
        AnalysisEvent::Complete {
            entities,
            total_files,
            analyzed_files,
            from_cache,
        } => {
            assert_eq!(*total_files, 10);
            assert_eq!(*analyzed_files, 9);
            assert_eq!(entities.len(), 9);
            assert!(!*from_cache);
        }
        other => panic!("expected terminal complete, got {other:?}"),
    }
    let terminals = events
        .iter()
        .filter(|e| {
            matches!(
                e,
                AnalysisEvent::Complete { .. } | AnalysisEvent::Error { .. }
            )
        })
        .count();
    assert_eq!(terminals, 1);
}

#[tokio::test]
async fn missing_repository_ends_in_exactly_one_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let analyzer = RepoAnalyzer::new(test_config(dir.path()));

    let mut fetcher = FakeFetcher::new();
    fetcher.fail_listing = true;

    let events = collect_events(&analyzer, &fetcher).await;

    assert!(matches!(events.last(), Some(AnalysisEvent::Error { .. })));
    let terminals = events
        .iter()
        .filter(|e| {
            matches!(
                e,
                AnalysisEvent::Complete { .. } | AnalysisEvent::Error { .. }
            )
        })
        .count();
    assert_eq!(terminals, 1);
}

#[tokio::test]
async fn import_edges_resolve_and_the_second_run_replays_from_cache() {
    let dir = tempfile::TempDir::new().unwrap();
    let analyzer = RepoAnalyzer::new(test_config(dir.path()));

    let fetcher = FakeFetcher::new()
        .with_file(
            "components/a.tsx",
            "import { B } from './b';\nexport default function A() { return <B />; }\n",
        )
        .with_file(
            "components/b.tsx",
            "export default function B() { return <div />; }\n",
        );

    let events = collect_events(&analyzer, &fetcher).await;
    let entities = match events.last().unwrap() {
        AnalysisEvent::Complete {
            entities,
            from_cache,
            ..
        } => {
            assert!(!*from_cache);
            entities.clone()
        }
        other => panic!("expected terminal complete, got {other:?}"),
    };

    let a = entities.iter().find(|e| e.name == "A").unwrap();
    let b = entities.iter().find(|e| e.name == "B").unwrap();
    assert_eq!(a.uses, vec![Reference::Resolved("B".to_string())]);
    assert_eq!(b.used_by, vec!["A".to_string()]);

    // Second run replays the cached record without re-fetching bodies.
    let replay = collect_events(&analyzer, &FakeFetcher::new()).await;
    let replayed_components = replay
        .iter()
        .filter(|e| matches!(e, AnalysisEvent::Component { .. }))
        .count();
    assert_eq!(replayed_components, 2);
    match replay.last().unwrap() {
        AnalysisEvent::Complete {
            entities,
            from_cache,
            ..
        } => {
            assert!(*from_cache);
            assert_eq!(entities.len(), 2);
        }
        other => panic!("expected cached complete, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_coordinates_are_terminal() {
    let dir = tempfile::TempDir::new().unwrap();
    let analyzer = RepoAnalyzer::new(test_config(dir.path()));

    let (tx, mut rx) = mpsc::channel(16);
    analyzer
        .analyze(AnalysisRequest::new("not-a-repo"), tx)
        .await;

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], AnalysisEvent::Error { .. }));
}

#[tokio::test]
async fn consumer_disconnect_stops_delivery_quietly() {
    let dir = tempfile::TempDir::new().unwrap();
    let analyzer = RepoAnalyzer::new(test_config(dir.path()));

    let fetcher = FakeFetcher::new().with_file(
        "components/a.tsx",
        "export default function A() { return <div />; }\n",
    );

    let (tx, rx) = mpsc::channel(16);
    drop(rx);
    // Must return cleanly instead of erroring out or hanging.
    analyzer.analyze_with(&fetcher, coords(), false, tx).await;
}

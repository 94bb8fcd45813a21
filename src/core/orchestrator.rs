use tokio::sync::mpsc::Sender;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

use crate::analysis::{classify, FileAnalyzer};
use crate::cache::{AnalysisCache, CacheRecord};
use crate::config::AnalyzerConfig;
use crate::fetch::{build_fetcher, RepoFetcher};

use super::entity::{FileKind, FileRecord, RepoCoords};
use super::events::{AnalysisEvent, AnalysisRequest};
use super::resolver::ReferenceResolver;

/// Why the pipeline stopped before reaching its natural end.
enum Halt {
    /// The consumer dropped its receiver; stop delivering events.
    Disconnected,
    /// Unrecoverable failure; surfaces as the run's single `error` event.
    Fatal(String),
}

/// Coordinates one analysis pipeline per request:
/// cache check -> fetch -> per-file analysis -> resolution -> cache write,
/// streaming events incrementally while later files are still pending.
///
/// Per-file failures are isolated: a fetch or parse problem on one file is
/// logged and skipped, visible only as a gap between the total and analyzed
/// counts. Every run ends with exactly one terminal `complete` or `error`
/// event.
pub struct RepoAnalyzer {
    cache: AnalysisCache,
    config: AnalyzerConfig,
}

impl RepoAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        let cache = AnalysisCache::new(
            config.resolved_cache_dir(),
            config.cache_ttl_secs,
            config.cache_max_bytes,
        );
        Self { cache, config }
    }

    pub fn cache(&self) -> &AnalysisCache {
        &self.cache
    }

    /// Runs a full analysis for the request, building the fetcher from the
    /// configured strategy.
    pub async fn analyze(&self, request: AnalysisRequest, events: Sender<AnalysisEvent>) {
        let Some(coords) = RepoCoords::parse(&request.location, &request.branch) else {
            let _ = events
                .send(AnalysisEvent::Error {
                    message: format!("malformed repository coordinates: {}", request.location),
                })
                .await;
            return;
        };

        let fetcher = match build_fetcher(
            self.config.strategy,
            &coords,
            self.config.github_token.as_deref(),
        )
        .await
        {
            Ok(fetcher) => fetcher,
            Err(err) => {
                let _ = events
                    .send(AnalysisEvent::Error {
                        message: err.to_string(),
                    })
                    .await;
                return;
            }
        };

        self.analyze_with(fetcher.as_ref(), coords, request.include_all, events)
            .await;
    }

    /// Runs the pipeline against an already-built fetcher. Split out so the
    /// acquisition strategy stays injectable.
    pub async fn analyze_with(
        &self,
        fetcher: &dyn RepoFetcher,
        coords: RepoCoords,
        include_all: bool,
        events: Sender<AnalysisEvent>,
    ) {
        match self.run(fetcher, &coords, include_all, &events).await {
            Ok(()) => {}
            Err(Halt::Disconnected) => {
                debug!("consumer disconnected; stopping event delivery for {coords}");
            }
            Err(Halt::Fatal(message)) => {
                let _ = events.send(AnalysisEvent::Error { message }).await;
            }
        }
    }

    async fn run(
        &self,
        fetcher: &dyn RepoFetcher,
        coords: &RepoCoords,
        include_all: bool,
        events: &Sender<AnalysisEvent>,
    ) -> Result<(), Halt> {
        emit(
            events,
            AnalysisEvent::Status {
                message: format!("checking cache for {coords}"),
            },
        )
        .await?;

        let location = coords.location();
        if let Some(record) = self.cache.get(&location, &coords.branch) {
            return replay(record, include_all, events).await;
        }

        emit(
            events,
            AnalysisEvent::Status {
                message: format!("fetching repository tree for {coords}"),
            },
        )
        .await?;
        let files = fetcher
            .list_files()
            .await
            .map_err(|err| Halt::Fatal(err.to_string()))?;

        let candidates: Vec<FileRecord> = candidate_files(&files).cloned().collect();
        let listed = if include_all {
            files.clone()
        } else {
            candidates.clone()
        };
        emit(
            events,
            AnalysisEvent::Files {
                files: listed,
                repo: coords.clone(),
            },
        )
        .await?;

        let mut analyzer = FileAnalyzer::new().map_err(|err| Halt::Fatal(err.to_string()))?;
        let total = candidates.len();
        let mut entities = Vec::with_capacity(total);

        for (index, file) in candidates.iter().enumerate() {
            emit(
                events,
                AnalysisEvent::Progress {
                    current: index + 1,
                    total,
                    path: file.path.clone(),
                },
            )
            .await?;

            // Fan-out pacing: brief pause every N files so bulk iteration
            // does not hammer the upstream source.
            if index > 0 && index % self.config.pacing_every == 0 {
                sleep(Duration::from_millis(self.config.pacing_delay_ms)).await;
            }

            let content = match fetcher.fetch_file(&file.path).await {
                Ok(content) => content,
                Err(err) => {
                    warn!("skipping {}: {err}", file.path);
                    continue;
                }
            };

            if let Some(entity) = analyzer.analyze(&file.path, &content) {
                emit(
                    events,
                    AnalysisEvent::Component {
                        entity: entity.clone(),
                    },
                )
                .await?;
                entities.push(entity);
            }
        }

        emit(
            events,
            AnalysisEvent::Status {
                message: "resolving relationships".to_string(),
            },
        )
        .await?;
        let mut resolver = ReferenceResolver::new();
        resolver.build_indexes(&entities);
        resolver.resolve(&mut entities);

        self.cache.put(
            &location,
            &coords.branch,
            entities.clone(),
            files,
            coords.clone(),
        );

        let analyzed_files = entities.len();
        emit(
            events,
            AnalysisEvent::Complete {
                entities,
                total_files: total,
                analyzed_files,
                from_cache: false,
            },
        )
        .await?;
        Ok(())
    }
}

/// Replays a cached record as the same event shape a fresh run produces.
async fn replay(
    record: CacheRecord,
    include_all: bool,
    events: &Sender<AnalysisEvent>,
) -> Result<(), Halt> {
    let total = candidate_files(&record.files).count();
    let listed = if include_all {
        record.files.clone()
    } else {
        candidate_files(&record.files).cloned().collect()
    };

    emit(
        events,
        AnalysisEvent::Files {
            files: listed,
            repo: record.repo.clone(),
        },
    )
    .await?;

    for entity in &record.entities {
        emit(
            events,
            AnalysisEvent::Component {
                entity: entity.clone(),
            },
        )
        .await?;
    }

    let analyzed_files = record.entities.len();
    emit(
        events,
        AnalysisEvent::Complete {
            entities: record.entities,
            total_files: total,
            analyzed_files,
            from_cache: true,
        },
    )
    .await?;
    Ok(())
}

fn candidate_files(files: &[FileRecord]) -> impl Iterator<Item = &FileRecord> {
    files
        .iter()
        .filter(|f| f.kind == FileKind::Blob && classify::is_candidate_path(&f.path))
}

async fn emit(events: &Sender<AnalysisEvent>, event: AnalysisEvent) -> Result<(), Halt> {
    events.send(event).await.map_err(|_| Halt::Disconnected)
}

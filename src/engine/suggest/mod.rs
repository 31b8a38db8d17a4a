//! Background suggestion rounds.
//!
//! A round picks up to `max_seeds` core skills, asks the provider for each one
//! on a worker thread, and hands back a [`SuggestionBatch`] through a channel
//! the engine polls once per frame. The live graph is never touched from the
//! worker; merging happens on the caller's thread.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::config::SuggestionConfig;
use crate::error::SuggestionError;

use super::graph::{NodeId, SkillGraph};

mod build;
mod catalog;
mod provider;

pub use build::SuggestionBatch;
use build::{SeedSnapshot, place_candidates};
pub use catalog::CatalogProvider;
pub use provider::{SuggestionCandidate, SuggestionProvider};

type WorkerResult = Result<SuggestionBatch, SuggestionError>;

pub struct SuggestionGenerator {
    provider: Arc<dyn SuggestionProvider>,
    config: SuggestionConfig,
    rng: StdRng,
}

impl SuggestionGenerator {
    pub fn new(provider: Arc<dyn SuggestionProvider>, config: &SuggestionConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            provider,
            config: config.clone(),
            rng,
        }
    }

    /// Picks seeds from the current graph and starts a worker for them.
    ///
    /// `revision` identifies the graph generation the result belongs to, so a
    /// reload in the meantime can discard it.
    pub fn generate(
        &mut self,
        graph: &SkillGraph,
        revision: u64,
    ) -> Result<SuggestionRequest, SuggestionError> {
        let mut seeds = graph
            .nodes()
            .iter()
            .filter(|node| !node.suggested)
            .map(SeedSnapshot::of)
            .collect::<Vec<_>>();
        if seeds.is_empty() {
            return Err(SuggestionError::NoSeeds);
        }
        seeds.shuffle(&mut self.rng);
        seeds.truncate(self.config.max_seeds);

        let taken_names = graph.name_keys();
        let taken_ids = graph
            .nodes()
            .iter()
            .map(|node| node.id().to_owned())
            .collect::<HashSet<NodeId>>();

        debug!(
            seeds = ?seeds.iter().map(|seed| seed.name.as_str()).collect::<Vec<_>>(),
            revision,
            "requesting skill suggestions"
        );

        let (tx, rx) = mpsc::channel();
        let cancelled = Arc::new(AtomicBool::new(false));
        let job = Job {
            provider: Arc::clone(&self.provider),
            seeds,
            taken_names,
            taken_ids,
            config: self.config.clone(),
            rng: StdRng::seed_from_u64(self.rng.random()),
            cancelled: Arc::clone(&cancelled),
        };

        thread::spawn(move || job.run(tx));

        Ok(SuggestionRequest {
            rx,
            cancelled,
            started_at: Instant::now(),
            revision,
        })
    }
}

struct Job {
    provider: Arc<dyn SuggestionProvider>,
    seeds: Vec<SeedSnapshot>,
    taken_names: HashSet<String>,
    taken_ids: HashSet<NodeId>,
    config: SuggestionConfig,
    rng: StdRng,
    cancelled: Arc<AtomicBool>,
}

impl Job {
    fn run(mut self, tx: Sender<WorkerResult>) {
        let result = self.collect();
        if self.is_cancelled() {
            return;
        }
        let _ = tx.send(result);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    fn collect(&mut self) -> WorkerResult {
        let mut batch = SuggestionBatch::default();
        let seeds = std::mem::take(&mut self.seeds);

        for seed in &seeds {
            if self.is_cancelled() {
                return Err(SuggestionError::Cancelled);
            }

            let candidates = self
                .provider
                .generate_suggestions(&seed.name, seed.category.label())
                .map_err(|error| {
                    warn!(seed = %seed.name, "suggestion provider failed: {error:#}");
                    SuggestionError::Provider(format!("{error:#}"))
                })?;

            place_candidates(
                seed,
                candidates,
                &mut self.taken_names,
                &mut self.taken_ids,
                &self.config,
                &mut self.rng,
                &mut batch,
            );
        }

        if batch.is_empty() {
            return Err(SuggestionError::Empty);
        }
        Ok(batch)
    }
}

pub enum SuggestionPoll {
    Pending,
    Ready(WorkerResult),
}

/// Handle on one in-flight round. Dropping it cancels the round.
pub struct SuggestionRequest {
    rx: Receiver<WorkerResult>,
    cancelled: Arc<AtomicBool>,
    started_at: Instant,
    revision: u64,
}

impl SuggestionRequest {
    pub fn poll(&self) -> SuggestionPoll {
        match self.rx.try_recv() {
            Ok(result) => SuggestionPoll::Ready(result),
            Err(TryRecvError::Empty) => SuggestionPoll::Pending,
            Err(TryRecvError::Disconnected) if self.is_cancelled() => {
                SuggestionPoll::Ready(Err(SuggestionError::Cancelled))
            }
            Err(TryRecvError::Disconnected) => {
                SuggestionPoll::Ready(Err(SuggestionError::Disconnected))
            }
        }
    }

    /// The worker checks this between provider calls and never reports after it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl Drop for SuggestionRequest {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::engine::graph::GraphNode;
    use crate::skills::Skill;

    fn graph() -> SkillGraph {
        let mut graph = SkillGraph::new();
        graph.push_node(GraphNode::core(Skill::new("1", "React", 80)));
        graph.push_node(GraphNode::core(Skill::new("2", "Go", 60)));
        graph
    }

    fn config() -> SuggestionConfig {
        SuggestionConfig {
            seed: Some(11),
            ..SuggestionConfig::default()
        }
    }

    fn wait(request: &SuggestionRequest) -> WorkerResult {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if let SuggestionPoll::Ready(result) = request.poll() {
                return result;
            }
            thread::sleep(Duration::from_millis(2));
        }
        panic!("suggestion worker did not report in time");
    }

    #[test]
    fn an_empty_graph_has_no_seeds() {
        let mut generator = SuggestionGenerator::new(Arc::new(CatalogProvider::new()), &config());
        let result = generator.generate(&SkillGraph::new(), 1);
        assert!(matches!(result, Err(SuggestionError::NoSeeds)));
    }

    #[test]
    fn worker_reports_a_batch_for_every_seed() {
        let mut generator = SuggestionGenerator::new(Arc::new(CatalogProvider::new()), &config());
        let request = generator.generate(&graph(), 4).expect("seeds available");

        let batch = wait(&request).expect("catalog yields suggestions");

        assert_eq!(request.revision(), 4);
        assert_eq!(batch.nodes.len(), batch.edges.len());
        let sources = batch
            .nodes
            .iter()
            .filter_map(|node| node.source_node_id.as_deref())
            .collect::<HashSet<_>>();
        assert_eq!(sources, HashSet::from(["1", "2"]));
    }

    #[test]
    fn provider_failure_discards_partial_results() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let provider = move |name: &str, _category: &str| -> anyhow::Result<Vec<SuggestionCandidate>> {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(vec![SuggestionCandidate::new(format!("{name} Pro"), 30, "")])
            } else {
                Err(anyhow::anyhow!("quota exceeded"))
            }
        };
        let mut generator = SuggestionGenerator::new(Arc::new(provider), &config());
        let request = generator.generate(&graph(), 1).expect("seeds available");

        let result = wait(&request);

        assert_eq!(result.err(), Some(SuggestionError::Provider("quota exceeded".to_owned())));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn nothing_usable_is_an_error() {
        let provider = |_: &str, _: &str| -> anyhow::Result<Vec<SuggestionCandidate>> {
            Ok(vec![SuggestionCandidate::new("react", 50, "")])
        };
        let mut generator = SuggestionGenerator::new(Arc::new(provider), &config());
        let request = generator.generate(&graph(), 1).expect("seeds available");

        assert_eq!(wait(&request).err(), Some(SuggestionError::Empty));
    }

    #[test]
    fn cancelled_rounds_never_report_a_batch() {
        let provider = CatalogProvider::with_latency(Duration::from_millis(50));
        let mut generator = SuggestionGenerator::new(Arc::new(provider), &config());
        let request = generator.generate(&graph(), 1).expect("seeds available");

        request.cancel();

        assert_eq!(wait(&request).err(), Some(SuggestionError::Cancelled));
    }
}

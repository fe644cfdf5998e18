use std::time::{Duration, Instant};

use log::{debug, info, trace};

use crate::analysis::{AnalysisLocale, AnalysisRequest, AnalysisService, AnalysisState};
use crate::channel::ChannelRegistry;
use crate::line::LineAssembler;
use crate::record::parse_record;
use crate::sample::{stamp, Sample};
use crate::store::SeriesStore;

/// How long a transport failure is shown before the session reverts to
/// `Idle` so the user can retry.
pub const ERROR_COOLDOWN: Duration = Duration::from_secs(3);

/// Externally visible ingestion state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Active,
    Paused,
    Error,
}

#[derive(Clone, Copy, Debug)]
enum LinkState {
    Idle,
    Active,
    Paused,
    Error { since: Instant },
}

/// Single source of truth for one connection session: epoch, pause state,
/// pending line buffer, series store, channel registry, and the latest
/// analysis outcome. Single writer; readers take owned snapshots.
pub struct IngestionSession {
    state: LinkState,
    epoch: Instant,
    assembler: LineAssembler,
    store: SeriesStore,
    registry: ChannelRegistry,
    analysis: AnalysisState,
}

impl Default for IngestionSession {
    fn default() -> Self {
        Self::new()
    }
}

impl IngestionSession {
    pub fn new() -> Self {
        Self {
            state: LinkState::Idle,
            epoch: Instant::now(),
            assembler: LineAssembler::new(),
            store: SeriesStore::new(),
            registry: ChannelRegistry::new(),
            analysis: AnalysisState::NotRequested,
        }
    }

    /// Current state. A transport error is transient: once the cool-down has
    /// elapsed the session reports `Idle` again.
    pub fn state(&self) -> SessionState {
        match self.state {
            LinkState::Idle => SessionState::Idle,
            LinkState::Active => SessionState::Active,
            LinkState::Paused => SessionState::Paused,
            LinkState::Error { since } => {
                if since.elapsed() >= ERROR_COOLDOWN {
                    SessionState::Idle
                } else {
                    SessionState::Error
                }
            }
        }
    }

    /// Starts a session: epoch moves to now and any stale partial line is
    /// dropped. The series store is deliberately kept, so a reconnect
    /// appends to the existing series.
    pub fn connect(&mut self) {
        self.connect_at(Instant::now());
    }

    pub fn connect_at(&mut self, now: Instant) {
        self.epoch = now;
        self.assembler.reset();
        self.state = LinkState::Active;
        info!("session active, epoch reset");
    }

    pub fn disconnect(&mut self) {
        self.state = LinkState::Idle;
        info!("session idle");
    }

    /// Stops storing accepted records. Chunks keep flowing through the line
    /// assembler and parser so buffering stays correct across the pause
    /// boundary, but accepted records are discarded with no replay backlog.
    pub fn pause(&mut self) {
        if matches!(self.state, LinkState::Active) {
            self.state = LinkState::Paused;
            info!("ingestion paused");
        }
    }

    /// Resumes storing. The epoch is not reset, so relative timestamps
    /// continue from where they left off.
    pub fn resume(&mut self) {
        if matches!(self.state, LinkState::Paused) {
            self.state = LinkState::Active;
            info!("ingestion resumed");
        }
    }

    /// Resets epoch, series store, channel registry, and any outstanding
    /// analysis result. Valid in every state; the state itself is kept.
    pub fn clear(&mut self) {
        self.clear_at(Instant::now());
    }

    pub fn clear_at(&mut self, now: Instant) {
        self.epoch = now;
        self.assembler.reset();
        self.store.clear();
        self.registry.clear();
        self.analysis = AnalysisState::NotRequested;
        info!("session cleared");
    }

    /// Records a transport failure. Locally absorbed: visible only as a
    /// transient `Error` state that cools down to `Idle`.
    pub fn mark_error(&mut self) {
        self.mark_error_at(Instant::now());
    }

    pub fn mark_error_at(&mut self, now: Instant) {
        self.state = LinkState::Error { since: now };
    }

    /// Feeds one transport chunk through assembler, parser, and stamper.
    pub fn feed_chunk(&mut self, chunk: &str) {
        self.feed_chunk_at(chunk, Instant::now());
    }

    pub fn feed_chunk_at(&mut self, chunk: &str, now: Instant) {
        for record in self.assembler.feed(chunk) {
            match parse_record(&record) {
                Ok(values) => self.accept(values, now),
                // Best-effort: noise is dropped, never surfaced.
                Err(rejection) => trace!("dropped record ({rejection}): {record:?}"),
            }
        }
    }

    fn accept(&mut self, values: Vec<f64>, now: Instant) {
        match self.state {
            LinkState::Active => {
                self.registry.register_first(values.len());
                let sample = stamp(values, self.epoch, now);
                trace!("accepted sample at t={:.3}", sample.relative_s);
                self.store.push(sample);
            }
            LinkState::Paused => debug!("paused, discarding accepted record"),
            LinkState::Idle | LinkState::Error { .. } => {}
        }
    }

    /// Runs the analysis service over the full series and keeps the outcome.
    pub fn request_analysis(
        &mut self,
        service: &dyn AnalysisService,
        note: impl Into<String>,
        locale: AnalysisLocale,
    ) {
        let request = AnalysisRequest::new(self.store.all(), &self.registry, note, locale);
        self.analysis = match service.analyze(&request) {
            Ok(text) => AnalysisState::Ready(text),
            Err(err) => AnalysisState::Failed(err.to_string()),
        };
    }

    pub fn analysis(&self) -> &AnalysisState {
        &self.analysis
    }

    pub fn rename_channel(&mut self, key: &str, display_name: &str) -> bool {
        self.registry.rename(key, display_name)
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    /// Most recent `n` samples, oldest first. Copy-on-read.
    pub fn window(&self, n: usize) -> Vec<Sample> {
        self.store.window(n)
    }

    /// Full series in arrival order. Copy-on-read.
    pub fn samples(&self) -> Vec<Sample> {
        self.store.all()
    }

    pub fn sample_count(&self) -> usize {
        self.store.len()
    }
}

//! Process-scoped scan state.
//!
//! A page is scanned once up front, again on a fixed schedule while late
//! content loads, and after bursts of DOM mutations settle. The host drives
//! the clock: every method takes the current [`Instant`].

use std::time::{Duration, Instant};

use mathcopy_dom::{Document, Node};

use crate::config::ExtractorConfig;
use crate::core::discovery::Discovery;
use crate::core::extract::Extractor;

/// Trailing-edge debouncer with a single pending deadline.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Restart the wait from `now`.
    pub fn notify(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Push a pending deadline back to `now + delay`. Does nothing when idle.
    pub fn postpone(&mut self, now: Instant) {
        if self.deadline.is_some() {
            self.notify(now);
        }
    }

    /// `true` once the deadline has passed; clears it.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

/// Scans at fixed offsets from a start time.
#[derive(Debug, Clone)]
pub struct RescanSchedule {
    start: Instant,
    delays: Vec<Duration>,
    next: usize,
}

impl RescanSchedule {
    pub fn new(start: Instant, delays: impl IntoIterator<Item = Duration>) -> Self {
        let mut delays: Vec<Duration> = delays.into_iter().collect();
        delays.sort();
        Self {
            start,
            delays,
            next: 0,
        }
    }

    /// `true` if a scheduled scan came due. Scans missed in between collapse
    /// into one.
    pub fn poll(&mut self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.start);
        let due = self.delays[self.next..]
            .iter()
            .take_while(|delay| **delay <= elapsed)
            .count();
        self.next += due;
        due > 0
    }

    pub fn is_finished(&self) -> bool {
        self.next >= self.delays.len()
    }
}

/// Everything one page's scanning needs, created once per page.
#[derive(Debug)]
pub struct ScanContext {
    extractor: Extractor,
    discovery: Discovery,
    debouncer: Debouncer,
    schedule: RescanSchedule,
    scans: usize,
}

impl ScanContext {
    pub fn new(config: ExtractorConfig, now: Instant) -> Self {
        let debouncer = Debouncer::new(Duration::from_millis(config.debounce_ms));
        let schedule = RescanSchedule::new(
            now,
            config.rescan_delays_ms.iter().map(|ms| Duration::from_millis(*ms)),
        );
        let extractor = Extractor::new(config);
        let discovery = Discovery::new(extractor.platform(), extractor.config());
        log::debug!("scan context for {}", extractor.platform());
        Self {
            extractor,
            discovery,
            debouncer,
            schedule,
            scans: 0,
        }
    }

    /// Record a DOM mutation batch. Every batch restarts a pending wait, but
    /// only a batch that added nodes can start one.
    pub fn on_mutation(&mut self, added: usize, now: Instant) {
        if added > 0 {
            self.debouncer.notify(now);
        } else {
            self.debouncer.postpone(now);
        }
    }

    /// Whether a scan should run at `now`.
    pub fn due(&mut self, now: Instant) -> bool {
        let scheduled = self.schedule.poll(now);
        let settled = self.debouncer.poll(now);
        scheduled || settled
    }

    /// Discover new candidates under the document's `<body>`.
    pub fn scan<'d>(&mut self, doc: &'d Document) -> Vec<Node<'d>> {
        self.scans += 1;
        self.discovery.discover(doc, doc.scan_root())
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    /// Number of scans run so far.
    pub fn scans(&self) -> usize {
        self.scans
    }
}

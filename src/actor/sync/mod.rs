//! Sync Actor - Debounced template → config injection
//!
//! Holds at most one pending injection. Every `Schedule` supersedes the
//! previous one and restarts the quiet period; only the last schedule of a
//! burst fires.
//!
//! ```text
//!          Schedule            quiet period            done
//! Idle ───────────> Scheduled ─────────────> Firing ────────> Idle
//!                    │    ^                    │
//!                    └────┘ Schedule           └ Schedules arriving now
//!                  (re-arm, gen+1)               wait in the channel and
//!                                                arm the next cycle
//! ```
//!
//! Arming bumps a generation counter; the fire path checks the pending
//! action still carries the current generation before running it.


use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use super::messages::{SyncJob, SyncMsg};
use crate::core::Session;
use crate::logger::{status_error, status_success};
use crate::store::{BackupKind, StoreError, inject};

/// Sleep used while nothing is pending (the loop wakes on messages anyway).
const IDLE_SLEEP: Duration = Duration::from_secs(3600);

/// Scheduler state, observable through [`SyncHandle::phase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Scheduled,
    Firing,
}

impl SyncPhase {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Scheduled,
            2 => Self::Firing,
            _ => Self::Idle,
        }
    }
}

/// Counters shared between the actor and its handles.
#[derive(Debug, Default)]
struct SyncStats {
    phase: AtomicU8,
    generation: AtomicU64,
    fired: AtomicUsize,
    failed: AtomicUsize,
}

impl SyncStats {
    fn set_phase(&self, phase: SyncPhase) {
        self.phase.store(phase as u8, Ordering::SeqCst);
    }
}

/// Cloneable sender side; usable from any thread.
#[derive(Debug, Clone)]
pub struct SyncHandle {
    tx: mpsc::UnboundedSender<SyncMsg>,
    stats: Arc<SyncStats>,
}

impl SyncHandle {
    /// Request an injection of `template` into `config` after the quiet period.
    ///
    /// Returns `false` once the actor has stopped.
    pub fn schedule(&self, template: &Path, config: &Path) -> bool {
        let job = SyncJob {
            template: template.to_path_buf(),
            config: config.to_path_buf(),
        };
        self.tx.send(SyncMsg::Schedule(job)).is_ok()
    }

    /// Cancel any pending injection and stop the actor.
    pub fn shutdown(&self) {
        let _ = self.tx.send(SyncMsg::Shutdown);
    }

    pub fn phase(&self) -> SyncPhase {
        SyncPhase::from_u8(self.stats.phase.load(Ordering::SeqCst))
    }

    /// Number of schedules accepted so far.
    pub fn generation(&self) -> u64 {
        self.stats.generation.load(Ordering::SeqCst)
    }

    /// Injections attempted (successful or not).
    pub fn fired(&self) -> usize {
        self.stats.fired.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> usize {
        self.stats.failed.load(Ordering::SeqCst)
    }
}

struct Pending {
    generation: u64,
    job: SyncJob,
    deadline: Instant,
}

/// Sync Actor - owns the single pending injection
pub struct SyncActor {
    rx: mpsc::UnboundedReceiver<SyncMsg>,
    session: Arc<Session>,
    debounce: Duration,
    backup: bool,
    generation: u64,
    pending: Option<Pending>,
    stats: Arc<SyncStats>,
}

impl SyncActor {
    /// Create the actor and its handle. Interval and backup policy come from
    /// the session's `[sync]` settings.
    pub fn new(session: Arc<Session>) -> (Self, SyncHandle) {
        let debounce = session.config().sync.debounce();
        let backup = session.config().sync.backup;
        Self::with_settings(session, debounce, backup)
    }

    pub fn with_settings(
        session: Arc<Session>,
        debounce: Duration,
        backup: bool,
    ) -> (Self, SyncHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let stats = Arc::new(SyncStats::default());
        let actor = Self {
            rx,
            session,
            debounce,
            backup,
            generation: 0,
            pending: None,
            stats: Arc::clone(&stats),
        };
        (actor, SyncHandle { tx, stats })
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        loop {
            let sleep = self.sleep_duration();
            tokio::select! {
                biased;
                msg = self.rx.recv() => match msg {
                    Some(SyncMsg::Schedule(job)) => self.arm(job),
                    Some(SyncMsg::Shutdown) | None => {
                        self.cancel();
                        break;
                    }
                },
                _ = tokio::time::sleep(sleep) => {
                    if crate::core::is_shutdown() {
                        self.cancel();
                        break;
                    }
                    if let Some(pending) = self.take_if_ready() {
                        self.fire(pending).await;
                    }
                }
            }
        }
        crate::debug!("sync"; "stopped");
    }

    /// Replace whatever is pending with `job`.
    fn arm(&mut self, job: SyncJob) {
        self.generation += 1;
        self.stats.generation.store(self.generation, Ordering::SeqCst);

        if let Some(previous) = self.pending.take() {
            crate::debug!("sync"; "superseded #{}", previous.generation);
        }
        crate::debug!("sync"; "scheduled #{}: {}", self.generation, job.template.display());

        self.pending = Some(Pending {
            generation: self.generation,
            job,
            deadline: Instant::now() + self.debounce,
        });
        self.stats.set_phase(SyncPhase::Scheduled);
    }

    fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            crate::debug!("sync"; "cancelled pending #{}", pending.generation);
        }
        self.stats.set_phase(SyncPhase::Idle);
    }

    fn sleep_duration(&self) -> Duration {
        match &self.pending {
            Some(p) => p.deadline.saturating_duration_since(Instant::now()),
            None => IDLE_SLEEP,
        }
    }

    fn take_if_ready(&mut self) -> Option<Pending> {
        let ready = self
            .pending
            .as_ref()
            .is_some_and(|p| p.deadline <= Instant::now() && p.generation == self.generation);
        if ready { self.pending.take() } else { None }
    }

    async fn fire(&mut self, pending: Pending) {
        self.stats.set_phase(SyncPhase::Firing);

        let session = Arc::clone(&self.session);
        let backup = self.backup;
        let job = pending.job;
        let (template, config) = (job.template.clone(), job.config.clone());
        let result = tokio::task::spawn_blocking(move || run_sync(&session, &job, backup)).await;

        self.stats.fired.fetch_add(1, Ordering::SeqCst);
        match result {
            Ok(Ok(backup)) => {
                if let Some(path) = backup {
                    crate::log!("sync"; "backed up config to {}", path.display());
                }
                status_success(&format!(
                    "synced {} → {}",
                    display_name(&template),
                    display_name(&config)
                ));
            }
            Ok(Err(err)) => {
                self.stats.failed.fetch_add(1, Ordering::SeqCst);
                status_error(&format!("sync into {} failed", display_name(&config)), &err.to_string());
            }
            Err(err) => {
                self.stats.failed.fetch_add(1, Ordering::SeqCst);
                crate::log!("error"; "sync task panicked: {}", err);
            }
        }

        self.stats.set_phase(SyncPhase::Idle);
    }
}

/// Backup (once per session) then inject.
///
/// A job for the active template fails up front when that binding has gone
/// stale, so no backup is taken for it.
fn run_sync(session: &Session, job: &SyncJob, backup: bool) -> Result<Option<PathBuf>, StoreError> {
    if session.is_active_template(&job.template) {
        session.require_active()?;
    }
    let backup_path = if backup {
        session.backup_once(&job.config, BackupKind::Config)?
    } else {
        None
    };
    inject(&job.template, &job.config)?;
    Ok(backup_path)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

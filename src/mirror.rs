// src/mirror.rs
// NotionMirror - local progress bar decorated with a remote mirror

use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;
use tokio::runtime::Runtime;

use crate::bar::ProgressSnapshot;
use crate::config::{ConfigError, MirrorConfig};
use crate::notion::{NotionClient, ProgressBackend};
use crate::session::{ProgressSession, SessionError};

const BAR_TEMPLATE: &str = "{msg} [{bar:40}] {pos}/{len} ({percent}%) ETA {eta}";

#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("session error: {0}")]
    Session(#[from] SessionError),

    #[error("runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

/// A terminal progress bar that mirrors its state to a Notion page.
///
/// Composes an [`indicatif::ProgressBar`] rather than extending it: local
/// rendering is forwarded untouched, and the advance/finish paths
/// additionally feed the remote session. Construction blocks until the
/// remote page exists; after that, every tick dispatches at most one
/// fire-and-forget update and never waits on the network. `finish` issues
/// one final forced update synchronously so the completed state reaches the
/// page before the run is considered closed.
///
/// Call from synchronous code only: the mirror drives its own tokio runtime.
pub struct NotionMirror {
    bar: ProgressBar,
    session: Option<ProgressSession>,
    runtime: Option<Runtime>,
}

impl NotionMirror {
    /// Create a mirror talking to the Notion API with the given config.
    pub fn new(total: u64, config: MirrorConfig) -> Result<Self, MirrorError> {
        let backend: Arc<dyn ProgressBackend> = Arc::new(NotionClient::new(config.secret.clone()));
        Self::with_backend(total, config, backend)
    }

    /// Create a mirror with an injected backend.
    ///
    /// In disabled mode the backend is never touched: no page is created
    /// and no update is ever sent.
    pub fn with_backend(
        total: u64,
        config: MirrorConfig,
        backend: Arc<dyn ProgressBackend>,
    ) -> Result<Self, MirrorError> {
        let bar = ProgressBar::new(total);
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .expect("valid progress template")
            .progress_chars(&format!("{}{}", config.filled_char, config.empty_char));
        bar.set_style(style);

        if config.disabled {
            return Ok(Self {
                bar,
                session: None,
                runtime: None,
            });
        }

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;

        let config = Arc::new(config);
        let session = runtime.block_on(ProgressSession::start(backend, config))?;

        Ok(Self {
            bar,
            session: Some(session),
            runtime: Some(runtime),
        })
    }

    /// Advance the bar and mirror the new state without blocking.
    pub fn inc(&self, delta: u64) {
        self.bar.inc(delta);
        self.tick();
    }

    /// Set the absolute position and mirror the new state without blocking.
    pub fn set_position(&self, pos: u64) {
        self.bar.set_position(pos);
        self.tick();
    }

    /// Finish the local bar and deliver the final state synchronously.
    pub fn finish(&self) {
        self.bar.finish();
        self.flush_final();
    }

    pub fn finish_with_message(&self, msg: &'static str) {
        self.bar.finish_with_message(msg);
        self.flush_final();
    }

    pub fn set_message(&self, msg: &'static str) {
        self.bar.set_message(msg);
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn length(&self) -> Option<u64> {
        self.bar.length()
    }

    /// True when remote mirroring is off and only local rendering runs.
    pub fn is_disabled(&self) -> bool {
        self.session.is_none()
    }

    /// The wrapped local bar, for operations not forwarded here.
    pub fn inner(&self) -> &ProgressBar {
        &self.bar
    }

    /// Wrap an iterator so each yielded item advances the mirror by one,
    /// finishing when the iterator is exhausted.
    pub fn wrap_iter<I: Iterator>(&self, iter: I) -> MirrorIter<'_, I> {
        MirrorIter {
            iter,
            mirror: self,
            finished: false,
        }
    }

    fn snapshot(&self) -> Option<ProgressSnapshot> {
        let total = self.bar.length()?;
        ProgressSnapshot::new(self.bar.position(), total, self.bar.eta()).ok()
    }

    fn tick(&self) {
        let (Some(runtime), Some(session)) = (&self.runtime, &self.session) else {
            return;
        };
        let Some(snapshot) = self.snapshot() else {
            return;
        };

        // Fire-and-forget: the throttle inside the session decides whether
        // this snapshot is actually sent.
        let session = session.clone();
        runtime.spawn(async move {
            session.update(&snapshot, false).await;
        });
    }

    fn flush_final(&self) {
        let (Some(runtime), Some(session)) = (&self.runtime, &self.session) else {
            return;
        };
        let Some(snapshot) = self.snapshot() else {
            return;
        };

        runtime.block_on(session.update(&snapshot, true));
    }
}

pub struct MirrorIter<'a, I: Iterator> {
    iter: I,
    mirror: &'a NotionMirror,
    finished: bool,
}

impl<I: Iterator> Iterator for MirrorIter<'_, I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        match self.iter.next() {
            Some(item) => {
                self.mirror.inc(1);
                Some(item)
            }
            None => {
                if !self.finished {
                    self.finished = true;
                    self.mirror.finish();
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notion::testing::FakeBackend;
    use std::time::Duration;

    fn test_config(disabled: bool) -> MirrorConfig {
        MirrorConfig::builder()
            .secret("secret_test")
            .database_id("db_test")
            .page_title("test run")
            .update_interval(Duration::from_millis(10))
            .disabled(disabled)
            .build()
            .unwrap()
    }

    #[test]
    fn test_disabled_mode_makes_zero_network_calls() {
        let backend = Arc::new(FakeBackend::new());
        let mirror = NotionMirror::with_backend(10, test_config(true), backend.clone()).unwrap();

        assert!(mirror.is_disabled());
        for _ in 0..10 {
            mirror.inc(1);
        }
        mirror.finish();

        assert_eq!(backend.create_count(), 0);
        assert_eq!(backend.update_count(), 0);
    }

    #[test]
    fn test_construction_creates_the_page() {
        let backend = Arc::new(FakeBackend::new());
        let mirror = NotionMirror::with_backend(10, test_config(false), backend.clone()).unwrap();

        assert!(!mirror.is_disabled());
        assert_eq!(backend.create_count(), 1);
    }

    #[test]
    fn test_creation_failure_propagates() {
        let backend = Arc::new(FakeBackend::failing_create());
        let result = NotionMirror::with_backend(10, test_config(false), backend.clone());

        assert!(matches!(result, Err(MirrorError::Session(_))));
        assert_eq!(backend.update_count(), 0);
    }

    #[test]
    fn test_finish_delivers_completed_state() {
        let backend = Arc::new(FakeBackend::new());
        let mirror = NotionMirror::with_backend(10, test_config(false), backend.clone()).unwrap();

        mirror.set_position(10);
        mirror.finish();

        assert!(backend.update_count() >= 1);
        let payload = backend.last_payload().unwrap();
        assert!(payload.contains("100%"), "payload: {}", payload);
    }

    #[test]
    fn test_ticks_never_block_and_throttle_limits_calls() {
        let backend = Arc::new(FakeBackend::new());
        let mirror = NotionMirror::with_backend(100, test_config(false), backend.clone()).unwrap();

        for _ in 0..100 {
            mirror.inc(1);
        }
        mirror.finish();

        // Far fewer deliveries than ticks: the loop outruns the 10ms
        // interval, so nearly every snapshot is dropped by the throttle.
        assert!(backend.update_count() < 10, "sent {}", backend.update_count());
        assert!(backend.update_count() >= 1);
    }

    #[test]
    fn test_wrap_iter_advances_and_finishes() {
        let backend = Arc::new(FakeBackend::new());
        let mirror = NotionMirror::with_backend(3, test_config(false), backend.clone()).unwrap();

        let collected: Vec<u32> = mirror.wrap_iter([1u32, 2, 3].into_iter()).collect();
        assert_eq!(collected, vec![1, 2, 3]);
        assert_eq!(mirror.position(), 3);

        let payload = backend.last_payload().unwrap();
        assert!(payload.contains("100%"), "payload: {}", payload);
    }

    #[test]
    fn test_zero_length_bar_sends_no_updates() {
        let backend = Arc::new(FakeBackend::new());
        let mirror = NotionMirror::with_backend(0, test_config(false), backend.clone()).unwrap();

        mirror.inc(1);
        mirror.finish();

        // The page exists, but no snapshot can be taken from a zero total.
        assert_eq!(backend.create_count(), 1);
        assert_eq!(backend.update_count(), 0);
    }
}

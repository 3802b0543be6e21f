// src/session.rs
// ProgressSession - one run, one remote page

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::bar::{format_eta, render_bar, ProgressSnapshot, DEFAULT_BAR_WIDTH};
use crate::config::MirrorConfig;
use crate::notion::{
    CreatePageRequest, NotionError, Parent, ProgressBackend, PropertyValue, UpdatePageRequest,
};

#[derive(Debug, Error)]
pub enum SessionError {
    /// The initial page create failed or its response was malformed. Fatal:
    /// the run has no remote page, so no updates will ever be sent.
    #[error("failed to create progress page: {0}")]
    Creation(#[from] NotionError),
}

/// Single-flight gate over the update path.
///
/// At most one update may be composed/sent per session at a time. A second
/// non-forced request arriving while one is outstanding is dropped, not
/// queued; the interval check additionally rate-limits dispatch.
struct Throttle {
    busy: AtomicBool,
    last_update: Mutex<Instant>,
    min_interval: Duration,
}

impl Throttle {
    fn new(min_interval: Duration) -> Self {
        Self {
            busy: AtomicBool::new(false),
            // Creation counts as the first update: ticks inside the first
            // interval are dropped.
            last_update: Mutex::new(Instant::now()),
            min_interval,
        }
    }

    fn interval_elapsed(&self) -> bool {
        self.last_update
            .lock()
            .map(|t| t.elapsed() > self.min_interval)
            .unwrap_or(true)
    }

    fn can_update(&self) -> bool {
        !self.busy.load(Ordering::Acquire) && self.interval_elapsed()
    }

    /// Acquire the gate for a throttled update, or report that the caller
    /// should drop it.
    fn try_begin(&self) -> bool {
        if !self.interval_elapsed() {
            return false;
        }
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Acquire the gate ignoring the interval. Used by the forced final
    /// update, which must not be dropped.
    fn try_begin_forced(&self) -> bool {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn finish(&self) {
        if let Ok(mut last) = self.last_update.lock() {
            *last = Instant::now();
        }
        self.busy.store(false, Ordering::Release);
    }
}

/// One run's binding to a single remote page.
///
/// Cloneable so ticks can move a handle into spawned update tasks; all
/// clones share the same throttle state.
#[derive(Clone)]
pub struct ProgressSession {
    backend: Arc<dyn ProgressBackend>,
    config: Arc<MirrorConfig>,
    page_id: String,
    throttle: Arc<Throttle>,
}

impl ProgressSession {
    /// Create the remote page for this run, blocking until it exists.
    ///
    /// Nothing may be mirrored before the page id is known, so this is the
    /// one call that the caller must wait for. Failure is fatal to the
    /// session and propagated; there is no retry.
    pub async fn start(
        backend: Arc<dyn ProgressBackend>,
        config: Arc<MirrorConfig>,
    ) -> Result<Self, SessionError> {
        let mut properties = HashMap::new();
        properties.insert(
            config.title_property.clone(),
            PropertyValue::title(config.page_title.clone()),
        );
        properties.insert(
            config.progress_property.clone(),
            PropertyValue::rich_text(format!(
                "{} 0%",
                render_bar(0.0, config.filled_char, config.empty_char, DEFAULT_BAR_WIDTH)
            )),
        );
        properties.insert(config.date_property.clone(), PropertyValue::date_now());

        let request = CreatePageRequest {
            parent: Parent {
                database_id: config.database_id.clone(),
            },
            properties,
        };

        let page_id = backend.create_page(&request).await.map_err(|e| {
            tracing::error!("Progress page creation failed: {}", e);
            SessionError::Creation(e)
        })?;

        tracing::info!("Progress session started: page {}", page_id);

        let throttle = Arc::new(Throttle::new(config.update_interval));
        Ok(Self {
            backend,
            config,
            page_id,
            throttle,
        })
    }

    pub fn page_id(&self) -> &str {
        &self.page_id
    }

    /// True iff a non-forced update issued now would be dispatched.
    pub fn can_update(&self) -> bool {
        self.throttle.can_update()
    }

    /// Mirror a snapshot to the remote page.
    ///
    /// Non-forced calls are lossy: if an update is already in flight or the
    /// interval has not elapsed, the snapshot is silently dropped. A forced
    /// call bypasses the interval and waits for any in-flight update to
    /// drain, then always sends. Delivery failures are logged and swallowed
    /// either way.
    pub async fn update(&self, snapshot: &ProgressSnapshot, force: bool) {
        if force {
            // The in-flight update finishes within the client timeout, so
            // this wait is bounded.
            while !self.throttle.try_begin_forced() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        } else if !self.throttle.try_begin() {
            return;
        }

        let request = self.compose(snapshot);
        match self.backend.update_page(&self.page_id, &request).await {
            Ok(()) => {
                tracing::debug!("Progress update delivered: {}%", snapshot.percent());
            }
            Err(e) => {
                tracing::warn!("Progress update dropped: {}", e);
            }
        }
        self.throttle.finish();
    }

    fn compose(&self, snapshot: &ProgressSnapshot) -> UpdatePageRequest {
        let bar = render_bar(
            snapshot.ratio(),
            self.config.filled_char,
            self.config.empty_char,
            DEFAULT_BAR_WIDTH,
        );

        let mut properties = HashMap::new();
        properties.insert(
            self.config.progress_property.clone(),
            PropertyValue::rich_text(format!("{} {}%", bar, snapshot.percent())),
        );
        properties.insert(
            self.config.time_remaining_property.clone(),
            PropertyValue::rich_text(format_eta(snapshot.eta)),
        );

        UpdatePageRequest { properties }
    }
}

// src/notion/mod.rs
// Notion Module - remote progress backend

mod client;
mod types;

pub use client::NotionClient;
pub use types::{
    CreatePageRequest, NotionError, PageResponse, Parent, PropertyValue, RichText, TextContent,
    UpdatePageRequest,
};

use async_trait::async_trait;

/// Transport seam between the session logic and the Notion API.
///
/// The production implementation is [`NotionClient`]; tests substitute an
/// in-memory fake so no network is involved.
#[async_trait]
pub trait ProgressBackend: Send + Sync {
    /// Create the page tracking this run; returns the assigned page id.
    async fn create_page(&self, request: &CreatePageRequest) -> Result<String, NotionError>;

    /// Patch the progress properties of an existing page.
    async fn update_page(
        &self,
        page_id: &str,
        request: &UpdatePageRequest,
    ) -> Result<(), NotionError>;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::{CreatePageRequest, NotionError, ProgressBackend, UpdatePageRequest};

    /// Counting backend used across the session and mirror tests.
    #[derive(Default)]
    pub struct FakeBackend {
        pub fail_create: bool,
        pub fail_update: bool,
        pub creates: AtomicUsize,
        pub updates: AtomicUsize,
        pub payloads: Mutex<Vec<String>>,
    }

    impl FakeBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_create() -> Self {
            Self {
                fail_create: true,
                ..Self::default()
            }
        }

        pub fn update_count(&self) -> usize {
            self.updates.load(Ordering::SeqCst)
        }

        pub fn create_count(&self) -> usize {
            self.creates.load(Ordering::SeqCst)
        }

        pub fn last_payload(&self) -> Option<String> {
            self.payloads
                .lock()
                .ok()
                .and_then(|p| p.last().cloned())
        }
    }

    #[async_trait]
    impl ProgressBackend for FakeBackend {
        async fn create_page(&self, _request: &CreatePageRequest) -> Result<String, NotionError> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            if self.fail_create {
                return Err(NotionError::Api {
                    status: 400,
                    body: "parent database not found".to_string(),
                });
            }
            Ok("page-1".to_string())
        }

        async fn update_page(
            &self,
            _page_id: &str,
            request: &UpdatePageRequest,
        ) -> Result<(), NotionError> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut payloads) = self.payloads.lock() {
                payloads.push(serde_json::to_string(request).unwrap_or_default());
            }
            if self.fail_update {
                return Err(NotionError::Network("connection reset".to_string()));
            }
            Ok(())
        }
    }
}

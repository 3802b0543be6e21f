//! Terminal progress bars mirrored to a Notion database page.
//!
//! [`NotionMirror`] wraps an [`indicatif::ProgressBar`] and, on top of the
//! normal local rendering, keeps a page in a Notion database up to date
//! with the current bar glyph, percent complete, and time remaining. One
//! page is created per run; throttled fire-and-forget updates follow each
//! tick, and a final forced update is delivered on finish.
//!
//! ```no_run
//! use notion_progress::{MirrorConfig, NotionMirror};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MirrorConfig::builder()
//!     .page_title("nightly import")
//!     .build()?; // secret and database id come from the environment
//!
//! let mirror = NotionMirror::new(1000, config)?;
//! for _ in 0..1000 {
//!     mirror.inc(1);
//! }
//! mirror.finish();
//! # Ok(())
//! # }
//! ```

pub mod bar;
pub mod config;
pub mod mirror;
pub mod notion;
pub mod session;

pub use bar::{format_eta, render_bar, InvalidTotal, ProgressSnapshot, DEFAULT_BAR_WIDTH};
pub use config::{ConfigError, MirrorConfig, MirrorConfigBuilder};
pub use mirror::{MirrorError, MirrorIter, NotionMirror};
pub use notion::{NotionClient, NotionError, ProgressBackend};
pub use session::{ProgressSession, SessionError};

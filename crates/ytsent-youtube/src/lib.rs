//! YouTube collection under a daily quota budget.
//!
//! [`QuotaLedger`] meters the platform's daily unit budget, [`YouTubeClient`]
//! speaks the Data API v3, and [`Collector`] combines the two: every search
//! and every comment page is reserved against the ledger before it is
//! requested and billed only once it has been received.

pub mod client;
pub mod collector;
pub mod error;
pub mod platform;
pub mod quota;
pub mod types;

pub use client::YouTubeClient;
pub use collector::{CommentBatch, Collector, MAX_COMMENT_PAGE_SIZE, MAX_SEARCH_RESULTS};
pub use error::{CollectorError, PlatformError, QuotaExceeded};
pub use platform::{CommentPage, VideoPlatform};
pub use quota::{Clock, QuotaConfig, QuotaCosts, QuotaHold, QuotaLedger, ResetZone, SystemClock};

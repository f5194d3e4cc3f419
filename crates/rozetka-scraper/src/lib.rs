pub mod catalog;
pub mod client;
pub mod error;
pub mod html;
pub mod normalize;
pub mod outcome;
pub mod pagination;
pub mod retry;
pub mod types;

pub use catalog::{Catalog, CategoryHarvest, Endpoints};
pub use client::{HttpTransport, RawResponse, Session, Transport, TransportSettings};
pub use error::ScraperError;
pub use normalize::normalize_product;
pub use outcome::{ParseAs, Payload, RequestOutcome};
pub use retry::{BackoffCurve, FailureClass, JitterRange, RetrievalPolicy};
pub use types::{CommentThread, DetailRecord, MainRecord, ProductId};

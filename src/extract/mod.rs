//! Per-page extraction: routing, strategies, and the extraction service boundary
//!
//! This module contains:
//! - Shared data types (`Article`, `InfoRecord`, link collections)
//! - The link normalizer that builds per-page candidate maps
//! - The generic heuristic strategy and date normalization
//! - The site router and the custom extractor adapter
//! - The extraction service contract and its HTTP client
//! - Built-in custom extractors

mod custom;
mod dates;
mod generic;
mod links;
mod router;
mod service;
mod types;
mod wechat;

pub use custom::{invoke_custom, CustomExtractor, CustomPlan, PluginError};
pub use dates::{date_from_timestamp, normalize_date};
pub use generic::{body_text, extract_generic, first_text, visible_text, GenericPage};
pub use links::{anchor_text, collect_link_candidates, resolve_href};
pub use router::{Route, SiteRouter};
pub use service::{
    invoke_extraction, ExtractionError, ExtractionOutcome, ExtractionRequest, InfoExtractor,
    ServiceExtractor,
};
pub use types::{
    Article, CustomOutput, DiscoveredLinks, InfoRecord, LinkCandidates, SOURCE_URL_FIELD,
};
pub use wechat::{WechatArticleExtractor, WECHAT_DOMAIN};

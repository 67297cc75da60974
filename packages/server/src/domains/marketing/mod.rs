//! Marketing domain - the canonical event payload and its delivery.
//!
//! Every other domain translates its facts into [`MarketingEvent`]s and hands
//! them to [`dispatch_events`], which sends them one by one and never lets a
//! failed send stop the rest.

pub mod effects;
pub mod models;

pub use effects::dispatch::dispatch_events;
pub use models::event::{MarketingEvent, Metric, Properties};
pub use models::properties::line_item_summary;

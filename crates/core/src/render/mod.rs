pub mod header;
pub mod markdown;
pub mod payload;

pub use header::{no_recommendation_label, select_header, HeaderSummary};
pub use markdown::{render, Markup};
pub use payload::{build_payload, PipelineConfig, RenderPayload, TimelineAttributes};

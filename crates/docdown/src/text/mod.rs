//! Text utilities: charset-aware decoding and Markdown normalization.

pub mod decode;
pub mod normalize;

pub use decode::safe_decode;
pub use normalize::normalize_markdown;

pub mod analyzer;
pub mod feed;
pub mod record;

pub use analyzer::{PeakReport, SpectralFluxAnalyzer};
pub use feed::{window_index_for_time, OnsetFeed};
pub use record::OnsetRecord;

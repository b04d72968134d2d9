pub mod analyze;

pub use analyze::{AnalysisHandler, AnalysisOutcome};

pub use super::model::{ActivityRecord, Classified, ParseError, ParsedLine};

/// Outcome of offering a parsed line to an extractor.
///
/// `NotApplicable` hands the line back untouched so the next extractor
/// in the chain can take ownership of it without cloning the payload.
#[derive(Debug)]
pub enum Extraction<T> {
    Matched(T),
    NotApplicable(ParsedLine),
}

impl<T> Extraction<T> {
    pub fn is_matched(&self) -> bool {
        matches!(self, Extraction::Matched(_))
    }
}

pub trait PayloadExtractor: Send + Sync {
    type Output;

    /// recognize and normalize one record kind from a parsed line
    fn extract(&self, line: ParsedLine) -> Extraction<Self::Output>;
}

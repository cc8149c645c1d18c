use super::activity::{ActivityOutcome, ActivityRecordBuilder};
use super::line::{LineParserConfig, LineRecordParser};
use super::system::SystemConfigExtractor;
use super::traits::*;

/// Runs one raw line through parsing and both extractors.
///
/// System config is tried first. A config line that fails field extraction
/// still becomes an activity.
#[derive(Debug, Clone, Default)]
pub struct LineClassifier {
    parser: LineRecordParser,
    system: SystemConfigExtractor,
    activity: ActivityRecordBuilder,
}

impl LineClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parser_config(config: LineParserConfig) -> Self {
        Self {
            parser: LineRecordParser::with_config(config),
            ..Self::default()
        }
    }

    pub fn parser(&self) -> &LineRecordParser {
        &self.parser
    }

    /// Classify a line into exactly one of config, activity or excluded.
    /// `Err` only comes from line parsing and means the line is skipped;
    /// any parsed object that is not a config is an activity.
    pub fn classify(&self, raw: &str) -> Result<Classified, ParseError> {
        let parsed = self.parser.parse(raw)?;

        let parsed = match self.system.extract(parsed) {
            Extraction::Matched(config) => return Ok(Classified::SystemConfig(config)),
            Extraction::NotApplicable(parsed) => parsed,
        };

        Ok(match self.activity.build(parsed) {
            ActivityOutcome::Record(record) => Classified::Activity(record),
            ActivityOutcome::Excluded { activity_key } => Classified::Excluded { activity_key },
        })
    }
}

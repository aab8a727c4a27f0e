use analysis_core::{
    HeadlineResult, LabelCounts, LabelSet, PipelineError, Report, DEFAULT_DISPLAY_LIMIT,
};

/// Tallies verdicts into a [`Report`] and selects the presentation view.
#[derive(Debug, Clone)]
pub struct SentimentAggregator {
    labels: LabelSet,
    display_limit: usize,
}

impl SentimentAggregator {
    pub fn new(labels: LabelSet) -> Self {
        Self {
            labels,
            display_limit: DEFAULT_DISPLAY_LIMIT,
        }
    }

    pub fn with_display_limit(mut self, limit: usize) -> Self {
        self.display_limit = limit;
        self
    }

    pub fn display_limit(&self) -> usize {
        self.display_limit
    }

    /// Every configured label appears in the counts, zero or not. An empty
    /// `results` gives a valid, empty report.
    pub fn aggregate(
        &self,
        ticker: &str,
        results: Vec<HeadlineResult>,
    ) -> Result<Report, PipelineError> {
        let mut counts = LabelCounts::zeroed(&self.labels);
        for result in &results {
            if !counts.increment(result.verdict().label()) {
                return Err(PipelineError::ClassifierFailure(format!(
                    "label '{}' is not in the configured label set",
                    result.verdict().label()
                )));
            }
        }

        Report::new(ticker, results, counts, self.display_limit)
    }

    /// First `min(limit, len)` results in source order. The source lists
    /// news most recent first, so no re-sorting by confidence.
    pub fn top<'a>(&self, results: &'a [HeadlineResult]) -> &'a [HeadlineResult] {
        &results[..self.display_limit.min(results.len())]
    }

    /// One-line summary, e.g. `Positive news sentiment (3 positive, 1 negative, 0 neutral)`.
    pub fn describe(&self, report: &Report) -> String {
        if report.is_empty() {
            return format!("No news found to analyze for {}", report.ticker());
        }

        let breakdown = report
            .counts()
            .iter()
            .map(|(label, count)| format!("{} {}", count, label))
            .collect::<Vec<_>>()
            .join(", ");

        let lead = match report.dominant_label() {
            Some(label) => {
                let mut chars = label.as_str().chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            }
            None => "Mixed".to_string(),
        };

        format!("{} news sentiment ({})", lead, breakdown)
    }
}

use analysis_core::{Headline, HeadlineResult, LabelSet, PipelineError, SentimentClassifier};
use futures_util::stream::{self, StreamExt, TryStreamExt};

/// Runs the classifier over a batch of headlines.
///
/// One call per headline, results in input order, no filtering. Any failed
/// call aborts the whole batch so counts can never drift from results.
#[derive(Debug, Clone)]
pub struct HeadlineAnalyzer {
    labels: LabelSet,
    concurrency: usize,
}

impl HeadlineAnalyzer {
    pub fn new(labels: LabelSet) -> Self {
        Self {
            labels,
            concurrency: 1,
        }
    }

    /// Number of classifier calls kept in flight. Output order is unaffected.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub async fn analyze(
        &self,
        headlines: &[Headline],
        classifier: &dyn SentimentClassifier,
    ) -> Result<Vec<HeadlineResult>, PipelineError> {
        if self.concurrency == 1 {
            let mut results = Vec::with_capacity(headlines.len());
            for headline in headlines {
                results.push(self.classify_one(headline, classifier).await?);
            }
            return Ok(results);
        }

        // `buffered` yields in submission order, matching the sequential path.
        let calls: Vec<_> = headlines
            .iter()
            .map(|headline| self.classify_one(headline, classifier))
            .collect();
        stream::iter(calls)
            .buffered(self.concurrency)
            .try_collect()
            .await
    }

    async fn classify_one(
        &self,
        headline: &Headline,
        classifier: &dyn SentimentClassifier,
    ) -> Result<HeadlineResult, PipelineError> {
        let verdict = classifier.classify(headline.text()).await.map_err(|e| {
            let cause = match e {
                PipelineError::ClassifierFailure(msg) => msg,
                other => other.to_string(),
            };
            PipelineError::ClassifierFailure(format!(
                "{} failed on {:?}: {}",
                classifier.backend_name(),
                headline.text(),
                cause
            ))
        })?;

        if !self.labels.contains(verdict.label()) {
            return Err(PipelineError::ClassifierFailure(format!(
                "{} returned unexpected label '{}' for {:?}",
                classifier.backend_name(),
                verdict.label(),
                headline.text()
            )));
        }

        tracing::trace!(
            "{} [{:.0}%] {}",
            verdict.label(),
            verdict.confidence() * 100.0,
            headline.text()
        );
        Ok(HeadlineResult::new(headline.clone(), verdict))
    }
}

use analysis_core::AnalysisOutcome;
use std::fmt::Write;

/// Plain-text block for one ticker: price line, summary, label breakdown and
/// the top headlines.
pub fn render_outcome(outcome: &AnalysisOutcome, summary: &str) -> String {
    let report = &outcome.report;
    let price = &outcome.price;
    let mut out = String::new();

    let percent = price
        .percent_change()
        .map(|p| format!(", {:+.2}%", p))
        .unwrap_or_default();
    let _ = writeln!(
        out,
        "{}  {:.2} {}  ({:+.2}{})",
        report.ticker(),
        price.current_price,
        price.currency_code,
        price.price_change,
        percent
    );
    let _ = writeln!(out, "{}", summary);

    if report.is_empty() {
        out.push('\n');
        return out;
    }

    for (label, count) in report.counts().iter() {
        let _ = writeln!(
            out,
            "  {:<10} {:>3}  ({:.1}%)",
            label.as_str(),
            count,
            report.ratio(label) * 100.0
        );
    }

    let _ = writeln!(out, "Top headlines:");
    for (i, result) in report.top_headlines().iter().enumerate() {
        let verdict = result.verdict();
        let _ = writeln!(
            out,
            "  {:>2}. [{} {:.1}%] {}",
            i + 1,
            verdict.label(),
            verdict.confidence() * 100.0,
            result.headline().text()
        );
        let _ = writeln!(out, "      {}", result.headline().link());
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{
        Headline, HeadlineResult, LabelCounts, LabelSet, PriceSummary, Report, SentimentLabel,
        SentimentVerdict,
    };

    fn outcome(labels: &[SentimentLabel]) -> AnalysisOutcome {
        let set = LabelSet::default();
        let mut counts = LabelCounts::zeroed(&set);
        let results: Vec<HeadlineResult> = labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                counts.increment(label);
                HeadlineResult::new(
                    Headline::new(format!("Headline {}", i), format!("https://x.test/{}", i)).unwrap(),
                    SentimentVerdict::new(label.clone(), 0.875).unwrap(),
                )
            })
            .collect();
        AnalysisOutcome {
            report: Report::new("AAPL", results, counts, 2).unwrap(),
            price: PriceSummary {
                current_price: 101.0,
                price_change: 1.0,
                currency_code: "USD".into(),
            },
        }
    }

    #[test]
    fn test_render_lists_top_headlines_only() {
        let text = render_outcome(
            &outcome(&[SentimentLabel::Positive, SentimentLabel::Negative, SentimentLabel::Positive]),
            "Positive news sentiment (2 positive, 1 negative, 0 neutral)",
        );
        assert!(text.starts_with("AAPL  101.00 USD  (+1.00, +1.00%)\n"));
        assert!(text.contains("   1. [positive 87.5%] Headline 0"));
        assert!(text.contains("https://x.test/1"));
        assert!(!text.contains("Headline 2"));
        assert!(text.contains("  positive     2  (66.7%)"));
    }

    #[test]
    fn test_render_empty_report() {
        let text = render_outcome(&outcome(&[]), "No news found to analyze for AAPL");
        assert!(text.contains("No news found to analyze for AAPL"));
        assert!(!text.contains("Top headlines"));
    }
}

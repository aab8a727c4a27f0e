use analysis_core::{HistoryBar, PipelineError, PriceSummary, TickerInfo};

/// Rejects histories that cannot support a price delta.
pub(crate) fn validate_history(ticker: &str, history: &[HistoryBar]) -> Result<(), PipelineError> {
    match history.len() {
        0 => Err(PipelineError::NoData(ticker.to_string())),
        1 => Err(PipelineError::InsufficientHistory {
            ticker: ticker.to_string(),
            points: 1,
        }),
        _ => Ok(()),
    }
}

/// Latest close and its change versus the previous close.
pub fn price_summary(
    ticker: &str,
    history: &[HistoryBar],
    info: &TickerInfo,
) -> Result<PriceSummary, PipelineError> {
    validate_history(ticker, history)?;

    let current = history[history.len() - 1].close;
    let previous = history[history.len() - 2].close;

    Ok(PriceSummary {
        current_price: current,
        price_change: current - previous,
        currency_code: info.currency_code().to_string(),
    })
}

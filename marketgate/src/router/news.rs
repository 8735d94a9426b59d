use crate::Gateway;
use crate::gateway_router_method;
use marketgate_types::DataType;

impl Gateway {
    gateway_router_method! {
        /// Fetch recent news for a ticker.
        ///
        /// News data types aggregate across the whole chain by default;
        /// successful payloads are deduplicated by title similarity with
        /// publisher attribution. If deduplication errors or exceeds its
        /// budget, the raw payloads are merged in chain order instead.
        method: news(ticker: &str),
        data_type: DataType::News,
        accessor: as_news_provider,
        not_found: "news",
        call: news(ticker)
    }

    /// Fetch market-wide news.
    ///
    /// Same aggregation and deduplication behavior as [`news`](Self::news),
    /// without a ticker.
    ///
    /// # Errors
    /// Returns an error if no eligible provider succeeds or none support the
    /// operation.
    pub async fn market_news(&self) -> Result<String, marketgate_core::GatewayError> {
        self.execute_operation(
            DataType::MarketNews,
            "market news".to_string(),
            move |c| {
                if c.as_market_news_provider().is_none() {
                    return None;
                }
                Some(async move {
                    if let Some(p) = c.as_market_news_provider() {
                        p.market_news().await
                    } else {
                        Err(marketgate_core::GatewayError::provider(
                            c.id().clone(),
                            "missing market news capability during call",
                        ))
                    }
                })
            },
        )
        .await
    }
}

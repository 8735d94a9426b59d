//! Mock marketgate connector.
//!
//! Provides deterministic payloads from static fixtures for CI-safe demos,
//! plus a closure-driven builder so tests can script per-operation behavior
//! (failures, delays, custom payloads) without a network.
#![warn(missing_docs)]

use std::sync::Arc;

use async_trait::async_trait;

use marketgate_core::connector::{
    FinancialStatementProvider, HealthProbe, HistoricalPricesProvider, HolderInfoProvider,
    MarketNewsProvider, NewsProvider, OptionChainProvider, OptionExpirationDatesProvider,
    ProviderConnector, RecommendationsProvider, StockActionsProvider, StockInfoProvider,
};
use marketgate_core::{GatewayError, validate_ticker};
use marketgate_types::{
    FinancialStatementKind, HolderKind, OptionType, ProviderId, RecommendationKind,
};

mod fixtures;

type StringFn = dyn Fn(&str) -> Result<String, GatewayError> + Send + Sync;
type HistoricalFn = dyn Fn(&str, &str, &str) -> Result<String, GatewayError> + Send + Sync;
type MarketNewsFn = dyn Fn() -> Result<String, GatewayError> + Send + Sync;
type StatementFn =
    dyn Fn(&str, FinancialStatementKind) -> Result<String, GatewayError> + Send + Sync;
type HolderFn = dyn Fn(&str, HolderKind) -> Result<String, GatewayError> + Send + Sync;
type ChainFn =
    dyn Fn(&str, chrono::NaiveDate, OptionType) -> Result<String, GatewayError> + Send + Sync;
type RecommendationsFn =
    dyn Fn(&str, RecommendationKind, u32) -> Result<String, GatewayError> + Send + Sync;
type ProbeFn = dyn Fn() -> Result<(), GatewayError> + Send + Sync;

/// Mock connector with deterministic fixture payloads and optional
/// per-operation closure overrides.
pub struct MockConnector {
    id: ProviderId,
    name: String,
    use_fixtures: bool,
    delay_ms: u64,

    historical_fn: Option<Arc<HistoricalFn>>,
    stock_info_fn: Option<Arc<StringFn>>,
    news_fn: Option<Arc<StringFn>>,
    market_news_fn: Option<Arc<MarketNewsFn>>,
    stock_actions_fn: Option<Arc<StringFn>>,
    financial_statement_fn: Option<Arc<StatementFn>>,
    holder_info_fn: Option<Arc<HolderFn>>,
    option_expirations_fn: Option<Arc<StringFn>>,
    option_chain_fn: Option<Arc<ChainFn>>,
    recommendations_fn: Option<Arc<RecommendationsFn>>,
    probe_fn: Option<Arc<ProbeFn>>,
}

impl MockConnector {
    /// Fixture-backed connector supporting every operation.
    #[must_use]
    pub fn with_fixtures(id: impl Into<ProviderId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            use_fixtures: true,
            delay_ms: 0,
            historical_fn: None,
            stock_info_fn: None,
            news_fn: None,
            market_news_fn: None,
            stock_actions_fn: None,
            financial_statement_fn: None,
            holder_info_fn: None,
            option_expirations_fn: None,
            option_chain_fn: None,
            recommendations_fn: None,
            probe_fn: None,
        }
    }

    /// Start building a connector that only supports the operations given
    /// closures.
    #[must_use]
    pub fn builder(id: impl Into<ProviderId>) -> MockConnectorBuilder {
        MockConnectorBuilder::new(id.into())
    }

    async fn simulate_latency(&self) {
        if self.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        }
    }

    /// Fixture-mode hook: scripted failures for well-known symbols.
    fn maybe_fail(&self, ticker: &str) -> Result<(), GatewayError> {
        match ticker {
            "FAIL" => Err(GatewayError::provider(
                self.id.clone(),
                "500 internal server error (forced)",
            )),
            "MISSING" => Err(GatewayError::not_found(format!("data for {ticker}"))),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl HistoricalPricesProvider for MockConnector {
    async fn historical_prices(
        &self,
        ticker: &str,
        period: &str,
        interval: &str,
    ) -> Result<String, GatewayError> {
        validate_ticker(ticker)?;
        self.simulate_latency().await;
        if let Some(f) = &self.historical_fn {
            return f(ticker, period, interval);
        }
        self.maybe_fail(ticker)?;
        Ok(fixtures::historical_prices(ticker, period, interval))
    }
}

#[async_trait]
impl StockInfoProvider for MockConnector {
    async fn stock_info(&self, ticker: &str) -> Result<String, GatewayError> {
        validate_ticker(ticker)?;
        self.simulate_latency().await;
        if let Some(f) = &self.stock_info_fn {
            return f(ticker);
        }
        self.maybe_fail(ticker)?;
        Ok(fixtures::stock_info(ticker))
    }
}

#[async_trait]
impl NewsProvider for MockConnector {
    async fn news(&self, ticker: &str) -> Result<String, GatewayError> {
        validate_ticker(ticker)?;
        self.simulate_latency().await;
        if let Some(f) = &self.news_fn {
            return f(ticker);
        }
        self.maybe_fail(ticker)?;
        Ok(fixtures::ticker_news(ticker, &self.name))
    }
}

#[async_trait]
impl MarketNewsProvider for MockConnector {
    async fn market_news(&self) -> Result<String, GatewayError> {
        self.simulate_latency().await;
        if let Some(f) = &self.market_news_fn {
            return f();
        }
        Ok(fixtures::market_news(&self.name))
    }
}

#[async_trait]
impl StockActionsProvider for MockConnector {
    async fn stock_actions(&self, ticker: &str) -> Result<String, GatewayError> {
        validate_ticker(ticker)?;
        self.simulate_latency().await;
        if let Some(f) = &self.stock_actions_fn {
            return f(ticker);
        }
        self.maybe_fail(ticker)?;
        Ok(fixtures::stock_actions(ticker))
    }
}

#[async_trait]
impl FinancialStatementProvider for MockConnector {
    async fn financial_statement(
        &self,
        ticker: &str,
        kind: FinancialStatementKind,
    ) -> Result<String, GatewayError> {
        validate_ticker(ticker)?;
        self.simulate_latency().await;
        if let Some(f) = &self.financial_statement_fn {
            return f(ticker, kind);
        }
        self.maybe_fail(ticker)?;
        Ok(fixtures::financial_statement(ticker, kind))
    }
}

#[async_trait]
impl HolderInfoProvider for MockConnector {
    async fn holder_info(&self, ticker: &str, kind: HolderKind) -> Result<String, GatewayError> {
        validate_ticker(ticker)?;
        self.simulate_latency().await;
        if let Some(f) = &self.holder_info_fn {
            return f(ticker, kind);
        }
        self.maybe_fail(ticker)?;
        Ok(fixtures::holder_info(ticker, kind))
    }
}

#[async_trait]
impl OptionExpirationDatesProvider for MockConnector {
    async fn option_expiration_dates(&self, ticker: &str) -> Result<String, GatewayError> {
        validate_ticker(ticker)?;
        self.simulate_latency().await;
        if let Some(f) = &self.option_expirations_fn {
            return f(ticker);
        }
        self.maybe_fail(ticker)?;
        Ok(fixtures::option_expiration_dates(ticker))
    }
}

#[async_trait]
impl OptionChainProvider for MockConnector {
    async fn option_chain(
        &self,
        ticker: &str,
        expiration_date: chrono::NaiveDate,
        option_type: OptionType,
    ) -> Result<String, GatewayError> {
        validate_ticker(ticker)?;
        self.simulate_latency().await;
        if let Some(f) = &self.option_chain_fn {
            return f(ticker, expiration_date, option_type);
        }
        self.maybe_fail(ticker)?;
        Ok(fixtures::option_chain(ticker, expiration_date, option_type))
    }
}

#[async_trait]
impl RecommendationsProvider for MockConnector {
    async fn recommendations(
        &self,
        ticker: &str,
        kind: RecommendationKind,
        months_back: u32,
    ) -> Result<String, GatewayError> {
        validate_ticker(ticker)?;
        self.simulate_latency().await;
        if let Some(f) = &self.recommendations_fn {
            return f(ticker, kind, months_back);
        }
        self.maybe_fail(ticker)?;
        Ok(fixtures::recommendations(ticker, kind, months_back))
    }
}

#[async_trait]
impl HealthProbe for MockConnector {
    async fn probe(&self) -> Result<(), GatewayError> {
        if let Some(f) = &self.probe_fn {
            return f();
        }
        Ok(())
    }
}

impl ProviderConnector for MockConnector {
    fn id(&self) -> &ProviderId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn as_historical_prices_provider(&self) -> Option<&dyn HistoricalPricesProvider> {
        if self.use_fixtures || self.historical_fn.is_some() {
            Some(self as &dyn HistoricalPricesProvider)
        } else {
            None
        }
    }
    fn as_stock_info_provider(&self) -> Option<&dyn StockInfoProvider> {
        if self.use_fixtures || self.stock_info_fn.is_some() {
            Some(self as &dyn StockInfoProvider)
        } else {
            None
        }
    }
    fn as_news_provider(&self) -> Option<&dyn NewsProvider> {
        if self.use_fixtures || self.news_fn.is_some() {
            Some(self as &dyn NewsProvider)
        } else {
            None
        }
    }
    fn as_market_news_provider(&self) -> Option<&dyn MarketNewsProvider> {
        if self.use_fixtures || self.market_news_fn.is_some() {
            Some(self as &dyn MarketNewsProvider)
        } else {
            None
        }
    }
    fn as_stock_actions_provider(&self) -> Option<&dyn StockActionsProvider> {
        if self.use_fixtures || self.stock_actions_fn.is_some() {
            Some(self as &dyn StockActionsProvider)
        } else {
            None
        }
    }
    fn as_financial_statement_provider(&self) -> Option<&dyn FinancialStatementProvider> {
        if self.use_fixtures || self.financial_statement_fn.is_some() {
            Some(self as &dyn FinancialStatementProvider)
        } else {
            None
        }
    }
    fn as_holder_info_provider(&self) -> Option<&dyn HolderInfoProvider> {
        if self.use_fixtures || self.holder_info_fn.is_some() {
            Some(self as &dyn HolderInfoProvider)
        } else {
            None
        }
    }
    fn as_option_expiration_dates_provider(&self) -> Option<&dyn OptionExpirationDatesProvider> {
        if self.use_fixtures || self.option_expirations_fn.is_some() {
            Some(self as &dyn OptionExpirationDatesProvider)
        } else {
            None
        }
    }
    fn as_option_chain_provider(&self) -> Option<&dyn OptionChainProvider> {
        if self.use_fixtures || self.option_chain_fn.is_some() {
            Some(self as &dyn OptionChainProvider)
        } else {
            None
        }
    }
    fn as_recommendations_provider(&self) -> Option<&dyn RecommendationsProvider> {
        if self.use_fixtures || self.recommendations_fn.is_some() {
            Some(self as &dyn RecommendationsProvider)
        } else {
            None
        }
    }
    fn as_health_probe(&self) -> Option<&dyn HealthProbe> {
        if self.use_fixtures || self.probe_fn.is_some() {
            Some(self as &dyn HealthProbe)
        } else {
            None
        }
    }
}

/// Builder for scripting mock behavior per operation.
pub struct MockConnectorBuilder {
    inner: MockConnector,
}

impl MockConnectorBuilder {
    fn new(id: ProviderId) -> Self {
        Self {
            inner: MockConnector {
                name: format!("{id} (mock)"),
                id,
                use_fixtures: false,
                delay_ms: 0,
                historical_fn: None,
                stock_info_fn: None,
                news_fn: None,
                market_news_fn: None,
                stock_actions_fn: None,
                financial_statement_fn: None,
                holder_info_fn: None,
                option_expirations_fn: None,
                option_chain_fn: None,
                recommendations_fn: None,
                probe_fn: None,
            },
        }
    }

    /// Set the display name (used as the news publisher label in fixtures).
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.inner.name = name.into();
        self
    }

    /// Add artificial latency to every operation.
    #[must_use]
    pub fn delay(mut self, delay: std::time::Duration) -> Self {
        self.inner.delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Enable fixtures for all operations without an explicit closure.
    #[must_use]
    pub fn fixtures(mut self) -> Self {
        self.inner.use_fixtures = true;
        self
    }

    /// Script historical prices.
    #[must_use]
    pub fn with_historical_prices_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &str, &str) -> Result<String, GatewayError> + Send + Sync + 'static,
    {
        self.inner.historical_fn = Some(Arc::new(f));
        self
    }

    /// Script stock info.
    #[must_use]
    pub fn with_stock_info_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Result<String, GatewayError> + Send + Sync + 'static,
    {
        self.inner.stock_info_fn = Some(Arc::new(f));
        self
    }

    /// Script ticker news.
    #[must_use]
    pub fn with_news_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Result<String, GatewayError> + Send + Sync + 'static,
    {
        self.inner.news_fn = Some(Arc::new(f));
        self
    }

    /// Script market news.
    #[must_use]
    pub fn with_market_news_fn<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Result<String, GatewayError> + Send + Sync + 'static,
    {
        self.inner.market_news_fn = Some(Arc::new(f));
        self
    }

    /// Script stock actions.
    #[must_use]
    pub fn with_stock_actions_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Result<String, GatewayError> + Send + Sync + 'static,
    {
        self.inner.stock_actions_fn = Some(Arc::new(f));
        self
    }

    /// Script financial statements.
    #[must_use]
    pub fn with_financial_statement_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, FinancialStatementKind) -> Result<String, GatewayError>
            + Send
            + Sync
            + 'static,
    {
        self.inner.financial_statement_fn = Some(Arc::new(f));
        self
    }

    /// Script holder info.
    #[must_use]
    pub fn with_holder_info_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, HolderKind) -> Result<String, GatewayError> + Send + Sync + 'static,
    {
        self.inner.holder_info_fn = Some(Arc::new(f));
        self
    }

    /// Script option expirations.
    #[must_use]
    pub fn with_option_expirations_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Result<String, GatewayError> + Send + Sync + 'static,
    {
        self.inner.option_expirations_fn = Some(Arc::new(f));
        self
    }

    /// Script option chains.
    #[must_use]
    pub fn with_option_chain_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, chrono::NaiveDate, OptionType) -> Result<String, GatewayError>
            + Send
            + Sync
            + 'static,
    {
        self.inner.option_chain_fn = Some(Arc::new(f));
        self
    }

    /// Script recommendations.
    #[must_use]
    pub fn with_recommendations_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, RecommendationKind, u32) -> Result<String, GatewayError>
            + Send
            + Sync
            + 'static,
    {
        self.inner.recommendations_fn = Some(Arc::new(f));
        self
    }

    /// Script the health probe.
    #[must_use]
    pub fn with_probe_fn<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Result<(), GatewayError> + Send + Sync + 'static,
    {
        self.inner.probe_fn = Some(Arc::new(f));
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> Arc<MockConnector> {
        Arc::new(self.inner)
    }
}

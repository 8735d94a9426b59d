use async_trait::async_trait;

use crate::GatewayError;
use marketgate_types::{
    DataType, FinancialStatementKind, HolderKind, OptionType, ProviderId, RecommendationKind,
};

/// Validate a ticker symbol: 1–10 characters, ASCII letters/digits/`.`/`-`.
///
/// # Errors
/// Returns `InvalidArg` describing the violation.
pub fn validate_ticker(ticker: &str) -> Result<(), GatewayError> {
    if ticker.is_empty() || ticker.len() > 10 {
        return Err(GatewayError::invalid_arg(format!(
            "ticker must be 1-10 characters, got {} characters",
            ticker.len()
        )));
    }
    if !ticker
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(GatewayError::invalid_arg(
            "ticker may contain only letters, digits, '.' and '-'".to_string(),
        ));
    }
    Ok(())
}

/// Focused role trait for connectors that provide OHLCV history.
#[async_trait]
pub trait HistoricalPricesProvider: Send + Sync {
    /// Fetch historical prices for the ticker over `period` at `interval`.
    async fn historical_prices(
        &self,
        ticker: &str,
        period: &str,
        interval: &str,
    ) -> Result<String, GatewayError>;
}

/// Focused role trait for connectors that provide company summaries.
#[async_trait]
pub trait StockInfoProvider: Send + Sync {
    /// Fetch a company summary for the ticker.
    async fn stock_info(&self, ticker: &str) -> Result<String, GatewayError>;
}

/// Focused role trait for connectors that provide ticker news.
///
/// News payloads are blank-line-separated `Key: value` blocks so the
/// deduplication pipeline can parse them; other operations return opaque
/// text.
#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Fetch recent news articles for the ticker.
    async fn news(&self, ticker: &str) -> Result<String, GatewayError>;
}

/// Focused role trait for connectors that provide market-wide news.
#[async_trait]
pub trait MarketNewsProvider: Send + Sync {
    /// Fetch market-wide news, no ticker.
    async fn market_news(&self) -> Result<String, GatewayError>;
}

/// Focused role trait for connectors that provide dividends and splits.
#[async_trait]
pub trait StockActionsProvider: Send + Sync {
    /// Fetch dividend and split history for the ticker.
    async fn stock_actions(&self, ticker: &str) -> Result<String, GatewayError>;
}

/// Focused role trait for connectors that provide financial statements.
#[async_trait]
pub trait FinancialStatementProvider: Send + Sync {
    /// Fetch the requested financial statement for the ticker.
    async fn financial_statement(
        &self,
        ticker: &str,
        kind: FinancialStatementKind,
    ) -> Result<String, GatewayError>;
}

/// Focused role trait for connectors that provide holder breakdowns.
#[async_trait]
pub trait HolderInfoProvider: Send + Sync {
    /// Fetch the requested holder breakdown for the ticker.
    async fn holder_info(&self, ticker: &str, kind: HolderKind) -> Result<String, GatewayError>;
}

/// Focused role trait for connectors that list option expirations.
#[async_trait]
pub trait OptionExpirationDatesProvider: Send + Sync {
    /// Fetch option expiration dates for the ticker.
    async fn option_expiration_dates(&self, ticker: &str) -> Result<String, GatewayError>;
}

/// Focused role trait for connectors that provide option chains.
#[async_trait]
pub trait OptionChainProvider: Send + Sync {
    /// Fetch one side of the option chain for an expiration date.
    async fn option_chain(
        &self,
        ticker: &str,
        expiration_date: chrono::NaiveDate,
        option_type: OptionType,
    ) -> Result<String, GatewayError>;
}

/// Focused role trait for connectors that provide analyst recommendations.
#[async_trait]
pub trait RecommendationsProvider: Send + Sync {
    /// Fetch recommendations or upgrades/downgrades over a lookback window.
    async fn recommendations(
        &self,
        ticker: &str,
        kind: RecommendationKind,
        months_back: u32,
    ) -> Result<String, GatewayError>;
}

/// Optional lightweight availability probe.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Succeeds when the upstream is reachable and serving.
    async fn probe(&self) -> Result<(), GatewayError>;
}

/// Main connector trait implemented by provider adapters. Exposes capability
/// discovery through `as_*_provider` accessors; an accessor returning `None`
/// means the operation is unsupported and the router skips the provider.
pub trait ProviderConnector: Send + Sync {
    /// Stable identifier referenced by routing chains. Private to
    /// configuration; never surfaced in payload output.
    fn id(&self) -> &ProviderId;

    /// Human-friendly display name.
    fn name(&self) -> &str;

    /// Adapter version label.
    fn version(&self) -> &str {
        "1.0"
    }

    /// Advertise history capability by returning a usable trait object when supported.
    fn as_historical_prices_provider(&self) -> Option<&dyn HistoricalPricesProvider> {
        None
    }
    /// If implemented, returns a trait object for company summaries.
    fn as_stock_info_provider(&self) -> Option<&dyn StockInfoProvider> {
        None
    }
    /// If implemented, returns a trait object for ticker news.
    fn as_news_provider(&self) -> Option<&dyn NewsProvider> {
        None
    }
    /// If implemented, returns a trait object for market-wide news.
    fn as_market_news_provider(&self) -> Option<&dyn MarketNewsProvider> {
        None
    }
    /// If implemented, returns a trait object for dividends and splits.
    fn as_stock_actions_provider(&self) -> Option<&dyn StockActionsProvider> {
        None
    }
    /// If implemented, returns a trait object for financial statements.
    fn as_financial_statement_provider(&self) -> Option<&dyn FinancialStatementProvider> {
        None
    }
    /// If implemented, returns a trait object for holder breakdowns.
    fn as_holder_info_provider(&self) -> Option<&dyn HolderInfoProvider> {
        None
    }
    /// If implemented, returns a trait object for option expirations.
    fn as_option_expiration_dates_provider(&self) -> Option<&dyn OptionExpirationDatesProvider> {
        None
    }
    /// If implemented, returns a trait object for option chains.
    fn as_option_chain_provider(&self) -> Option<&dyn OptionChainProvider> {
        None
    }
    /// If implemented, returns a trait object for analyst recommendations.
    fn as_recommendations_provider(&self) -> Option<&dyn RecommendationsProvider> {
        None
    }
    /// If implemented, returns a trait object for the availability probe.
    fn as_health_probe(&self) -> Option<&dyn HealthProbe> {
        None
    }

    /// Whether this connector supports the given data type, derived from the
    /// capability accessors.
    fn supports(&self, data_type: DataType) -> bool {
        match data_type {
            DataType::HistoricalPrices => self.as_historical_prices_provider().is_some(),
            DataType::StockInfo => self.as_stock_info_provider().is_some(),
            DataType::News => self.as_news_provider().is_some(),
            DataType::MarketNews => self.as_market_news_provider().is_some(),
            DataType::StockActions => self.as_stock_actions_provider().is_some(),
            DataType::FinancialStatement => self.as_financial_statement_provider().is_some(),
            DataType::HolderInfo => self.as_holder_info_provider().is_some(),
            DataType::OptionExpirationDates => {
                self.as_option_expiration_dates_provider().is_some()
            }
            DataType::OptionChain => self.as_option_chain_provider().is_some(),
            DataType::Recommendations => self.as_recommendations_provider().is_some(),
        }
    }
}

//! The closed set of routable operations and their argument enums.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Routable data-type operations exposed by the gateway.
///
/// These map one-to-one with router endpoints and with the tool surface of
/// the line protocol, and allow match-exhaustive handling when adding new
/// operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataType {
    /// OHLCV history over a period/interval.
    HistoricalPrices,
    /// Company summary and key statistics.
    StockInfo,
    /// Recent news articles for a ticker.
    News,
    /// Market-wide news, no ticker.
    MarketNews,
    /// Dividends and splits.
    StockActions,
    /// Income statement, balance sheet, or cashflow rows.
    FinancialStatement,
    /// Holder breakdowns and insider activity.
    HolderInfo,
    /// Option expiration dates list.
    OptionExpirationDates,
    /// Option chain for an expiration date.
    OptionChain,
    /// Analyst recommendations or upgrades/downgrades.
    Recommendations,
}

impl DataType {
    /// All routable data types, in a stable order.
    pub const ALL: [Self; 10] = [
        Self::HistoricalPrices,
        Self::StockInfo,
        Self::News,
        Self::MarketNews,
        Self::StockActions,
        Self::FinancialStatement,
        Self::HolderInfo,
        Self::OptionExpirationDates,
        Self::OptionChain,
        Self::Recommendations,
    ];

    /// Stable, kebab-case identifier for logs/errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HistoricalPrices => "historical-prices",
            Self::StockInfo => "stock-info",
            Self::News => "news",
            Self::MarketNews => "market-news",
            Self::StockActions => "stock-actions",
            Self::FinancialStatement => "financial-statement",
            Self::HolderInfo => "holder-info",
            Self::OptionExpirationDates => "option-expiration-dates",
            Self::OptionChain => "option-chain",
            Self::Recommendations => "recommendations",
        }
    }

    /// Whether this data type carries news payloads (eligible for
    /// deduplication and aggregated by default).
    #[must_use]
    pub const fn is_news(self) -> bool {
        matches!(self, Self::News | Self::MarketNews)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a wire spelling does not name a known kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {what}: {value}")]
pub struct KindParseError {
    /// Which argument failed to parse (e.g. "financial_type").
    pub what: &'static str,
    /// The rejected input value.
    pub value: String,
}

/// Financial statement variants accepted by `get_financial_statement`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FinancialStatementKind {
    /// Annual income statement.
    IncomeStatement,
    /// Quarterly income statement.
    QuarterlyIncomeStatement,
    /// Annual balance sheet.
    BalanceSheet,
    /// Quarterly balance sheet.
    QuarterlyBalanceSheet,
    /// Annual cashflow statement.
    Cashflow,
    /// Quarterly cashflow statement.
    QuarterlyCashflow,
}

impl FinancialStatementKind {
    /// Wire spelling used by the tool surface.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IncomeStatement => "income_stmt",
            Self::QuarterlyIncomeStatement => "quarterly_income_stmt",
            Self::BalanceSheet => "balance_sheet",
            Self::QuarterlyBalanceSheet => "quarterly_balance_sheet",
            Self::Cashflow => "cashflow",
            Self::QuarterlyCashflow => "quarterly_cashflow",
        }
    }
}

impl FromStr for FinancialStatementKind {
    type Err = KindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income_stmt" => Ok(Self::IncomeStatement),
            "quarterly_income_stmt" => Ok(Self::QuarterlyIncomeStatement),
            "balance_sheet" => Ok(Self::BalanceSheet),
            "quarterly_balance_sheet" => Ok(Self::QuarterlyBalanceSheet),
            "cashflow" => Ok(Self::Cashflow),
            "quarterly_cashflow" => Ok(Self::QuarterlyCashflow),
            other => Err(KindParseError {
                what: "financial_type",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for FinancialStatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Holder breakdown variants accepted by `get_holder_info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HolderKind {
    /// Major holder percentages.
    MajorHolders,
    /// Institutional holders.
    InstitutionalHolders,
    /// Mutual fund holders.
    MutualFundHolders,
    /// Insider transactions.
    InsiderTransactions,
    /// Insider purchase summary.
    InsiderPurchases,
    /// Insider roster.
    InsiderRosterHolders,
}

impl HolderKind {
    /// Wire spelling used by the tool surface.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MajorHolders => "major_holders",
            Self::InstitutionalHolders => "institutional_holders",
            Self::MutualFundHolders => "mutualfund_holders",
            Self::InsiderTransactions => "insider_transactions",
            Self::InsiderPurchases => "insider_purchases",
            Self::InsiderRosterHolders => "insider_roster_holders",
        }
    }
}

impl FromStr for HolderKind {
    type Err = KindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "major_holders" => Ok(Self::MajorHolders),
            "institutional_holders" => Ok(Self::InstitutionalHolders),
            "mutualfund_holders" => Ok(Self::MutualFundHolders),
            "insider_transactions" => Ok(Self::InsiderTransactions),
            "insider_purchases" => Ok(Self::InsiderPurchases),
            "insider_roster_holders" => Ok(Self::InsiderRosterHolders),
            other => Err(KindParseError {
                what: "holder_type",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for HolderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recommendation variants accepted by `get_recommendations`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecommendationKind {
    /// Detailed analyst recommendations.
    Recommendations,
    /// Broker upgrades and downgrades.
    UpgradesDowngrades,
}

impl RecommendationKind {
    /// Wire spelling used by the tool surface.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Recommendations => "recommendations",
            Self::UpgradesDowngrades => "upgrades_downgrades",
        }
    }
}

impl FromStr for RecommendationKind {
    type Err = KindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recommendations" => Ok(Self::Recommendations),
            "upgrades_downgrades" => Ok(Self::UpgradesDowngrades),
            other => Err(KindParseError {
                what: "recommendation_type",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for RecommendationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Option chain side accepted by `get_option_chain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionType {
    /// Call options.
    Calls,
    /// Put options.
    Puts,
}

impl OptionType {
    /// Wire spelling used by the tool surface.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Calls => "calls",
            Self::Puts => "puts",
        }
    }
}

impl FromStr for OptionType {
    type Err = KindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "calls" => Ok(Self::Calls),
            "puts" => Ok(Self::Puts),
            other => Err(KindParseError {
                what: "option_type",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

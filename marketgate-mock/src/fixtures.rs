//! Deterministic text payloads for the mock connector.

use marketgate_types::{FinancialStatementKind, HolderKind, OptionType, RecommendationKind};

pub fn historical_prices(ticker: &str, period: &str, interval: &str) -> String {
    format!(
        "Historical prices for {ticker} (period {period}, interval {interval})\n\
         Date        Open    High    Low     Close   Volume\n\
         2026-01-02  140.00  142.00  139.00  141.00  10000000\n\
         2026-01-03  141.00  143.00  140.00  142.00  11000000\n\
         2026-01-06  142.00  146.00  141.50  145.25  12500000"
    )
}

pub fn stock_info(ticker: &str) -> String {
    format!(
        "Company: {ticker} Demo Corp\n\
         Sector: Technology\n\
         Market Cap: 2.8T\n\
         Trailing P/E: 29.4\n\
         52 Week Range: 164.08 - 237.49"
    )
}

pub fn ticker_news(ticker: &str, publisher: &str) -> String {
    format!(
        "Title: {ticker} Earnings Beat Expectations\n\
         Publisher: {publisher}\n\
         Published: 2026-02-27 10:00:00\n\
         Related Tickers: {ticker}\n\
         URL: https://news.example.com/{lower}/earnings\n\
         \n\
         Title: {ticker} Announces Dividend Increase\n\
         Publisher: {publisher}\n\
         Published: 2026-02-26 14:30:00\n\
         Related Tickers: {ticker}\n\
         URL: https://news.example.com/{lower}/dividend",
        lower = ticker.to_lowercase()
    )
}

pub fn market_news(publisher: &str) -> String {
    format!(
        "Title: Stocks Climb As Rate Cut Hopes Build\n\
         Publisher: {publisher}\n\
         Published: 2026-02-27 09:00:00\n\
         URL: https://news.example.com/markets/rate-cut-hopes\n\
         \n\
         Title: Oil Slides On Demand Worries\n\
         Publisher: {publisher}\n\
         Published: 2026-02-27 07:45:00\n\
         URL: https://news.example.com/markets/oil-slides"
    )
}

pub fn stock_actions(ticker: &str) -> String {
    format!(
        "Actions for {ticker}\n\
         2025-11-08  Dividend  0.24\n\
         2026-02-07  Dividend  0.25\n\
         2020-08-31  Split     4:1"
    )
}

pub fn financial_statement(ticker: &str, kind: FinancialStatementKind) -> String {
    format!(
        "{kind} for {ticker}\n\
         Total Revenue         394328000000\n\
         Gross Profit          170782000000\n\
         Operating Income      114301000000\n\
         Net Income             96995000000"
    )
}

pub fn holder_info(ticker: &str, kind: HolderKind) -> String {
    format!(
        "{kind} for {ticker}\n\
         Vanguard Group Inc          8.21%\n\
         BlackRock Inc               6.64%\n\
         Berkshire Hathaway Inc      5.84%"
    )
}

pub fn option_expiration_dates(ticker: &str) -> String {
    format!(
        "Option expirations for {ticker}\n\
         2026-03-20\n\
         2026-04-17\n\
         2026-06-19\n\
         2027-01-15"
    )
}

pub fn option_chain(ticker: &str, expiration: chrono::NaiveDate, side: OptionType) -> String {
    format!(
        "{side} chain for {ticker} expiring {expiration}\n\
         Strike  Last   Bid    Ask    Volume  Open Interest\n\
         180.00  12.40  12.30  12.55  1843    10233\n\
         185.00   9.10   9.00   9.25  2211     8120\n\
         190.00   6.35   6.25   6.50  3104     9451"
    )
}

pub fn recommendations(ticker: &str, kind: RecommendationKind, months_back: u32) -> String {
    format!(
        "{kind} for {ticker} (last {months_back} months)\n\
         2026-02-10  Morgan Stanley   Overweight -> Overweight\n\
         2026-01-22  Goldman Sachs    Neutral    -> Buy\n\
         2025-12-04  JP Morgan        Overweight -> Overweight"
    )
}

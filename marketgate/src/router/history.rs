use crate::Gateway;
use crate::gateway_router_method;
use marketgate_types::DataType;

impl Gateway {
    gateway_router_method! {
        /// Fetch OHLCV history for a ticker over `period` at `interval`.
        method: historical_prices(ticker: &str, period: &str, interval: &str),
        data_type: DataType::HistoricalPrices,
        accessor: as_historical_prices_provider,
        not_found: "historical prices",
        call: historical_prices(ticker, period, interval)
    }
}

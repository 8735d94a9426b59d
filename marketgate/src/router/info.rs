use crate::Gateway;
use crate::gateway_router_method;
use marketgate_types::DataType;

impl Gateway {
    gateway_router_method! {
        /// Fetch a company summary and key statistics for a ticker.
        method: stock_info(ticker: &str),
        data_type: DataType::StockInfo,
        accessor: as_stock_info_provider,
        not_found: "stock info",
        call: stock_info(ticker)
    }
}

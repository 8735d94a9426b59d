use crate::Gateway;
use crate::gateway_router_method;
use marketgate_types::DataType;

impl Gateway {
    gateway_router_method! {
        /// Fetch dividend and split history for a ticker.
        method: stock_actions(ticker: &str),
        data_type: DataType::StockActions,
        accessor: as_stock_actions_provider,
        not_found: "stock actions",
        call: stock_actions(ticker)
    }
}

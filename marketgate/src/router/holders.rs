use crate::Gateway;
use crate::gateway_router_method;
use marketgate_types::{DataType, HolderKind};

impl Gateway {
    gateway_router_method! {
        /// Fetch a holder breakdown (major, institutional, fund, or insider
        /// activity) for a ticker.
        method: holder_info(ticker: &str, kind: HolderKind),
        data_type: DataType::HolderInfo,
        accessor: as_holder_info_provider,
        not_found: "holder info",
        call: holder_info(ticker, kind)
    }
}

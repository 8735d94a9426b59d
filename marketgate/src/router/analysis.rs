use crate::Gateway;
use crate::gateway_router_method;
use marketgate_types::{DataType, RecommendationKind};

impl Gateway {
    gateway_router_method! {
        /// Fetch analyst recommendations or upgrades/downgrades over a
        /// lookback window in months.
        method: recommendations(ticker: &str, kind: RecommendationKind, months_back: u32),
        data_type: DataType::Recommendations,
        accessor: as_recommendations_provider,
        not_found: "recommendations",
        call: recommendations(ticker, kind, months_back)
    }
}

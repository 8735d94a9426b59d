use crate::Gateway;
use crate::gateway_router_method;
use marketgate_types::{DataType, OptionType};

impl Gateway {
    gateway_router_method! {
        /// List option expiration dates for a ticker.
        method: option_expiration_dates(ticker: &str),
        data_type: DataType::OptionExpirationDates,
        accessor: as_option_expiration_dates_provider,
        not_found: "option expiration dates",
        call: option_expiration_dates(ticker)
    }

    gateway_router_method! {
        /// Fetch one side of the option chain for an expiration date.
        method: option_chain(ticker: &str, expiration_date: chrono::NaiveDate, option_type: OptionType),
        data_type: DataType::OptionChain,
        accessor: as_option_chain_provider,
        not_found: "option chain",
        call: option_chain(ticker, expiration_date, option_type)
    }
}

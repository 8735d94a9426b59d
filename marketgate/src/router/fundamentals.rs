use crate::Gateway;
use crate::gateway_router_method;
use marketgate_types::{DataType, FinancialStatementKind};

impl Gateway {
    gateway_router_method! {
        /// Fetch a financial statement (income, balance sheet, or cashflow,
        /// annual or quarterly) for a ticker.
        method: financial_statement(ticker: &str, kind: FinancialStatementKind),
        data_type: DataType::FinancialStatement,
        accessor: as_financial_statement_provider,
        not_found: "financial statement",
        call: financial_statement(ticker, kind)
    }
}

//! The tool surface: definitions exposed by `tools/list` and dispatch of
//! `tools/call` onto the router.

use serde_json::json;

use marketgate::{Gateway, GatewayError};
use marketgate_types::{FinancialStatementKind, HolderKind, OptionType, RecommendationKind};

use crate::protocol::ToolDef;

/// Default lookback for `get_recommendations`.
const DEFAULT_MONTHS_BACK: u32 = 12;

fn ticker_schema(extra: serde_json::Value) -> serde_json::Value {
    let mut properties = json!({
        "ticker": {
            "type": "string",
            "description": "Ticker symbol, e.g. AAPL"
        }
    });
    let mut required = vec!["ticker".to_string()];
    if let (Some(props), Some(obj)) = (properties.as_object_mut(), extra.as_object()) {
        for (k, v) in obj {
            props.insert(k.clone(), v["schema"].clone());
            if v["required"].as_bool() == Some(true) {
                required.push(k.clone());
            }
        }
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

/// The closed set of tool definitions.
pub fn definitions() -> Vec<ToolDef> {
    vec![
        ToolDef {
            name: "get_historical_stock_prices".into(),
            description: "Historical OHLCV prices for a ticker over a period and interval.".into(),
            input_schema: ticker_schema(json!({
                "period": {
                    "schema": {"type": "string", "description": "Lookback period (default 1mo)"},
                    "required": false
                },
                "interval": {
                    "schema": {"type": "string", "description": "Bar interval (default 1d)"},
                    "required": false
                }
            })),
        },
        ToolDef {
            name: "get_stock_info".into(),
            description: "Company summary and key statistics for a ticker.".into(),
            input_schema: ticker_schema(json!({})),
        },
        ToolDef {
            name: "get_yahoo_finance_news".into(),
            description: "Recent news articles for a ticker, deduplicated across providers.".into(),
            input_schema: ticker_schema(json!({})),
        },
        ToolDef {
            name: "get_market_news".into(),
            description: "Market-wide news, deduplicated across providers.".into(),
            input_schema: json!({"type": "object", "properties": {}}),
        },
        ToolDef {
            name: "get_stock_actions".into(),
            description: "Dividend and split history for a ticker.".into(),
            input_schema: ticker_schema(json!({})),
        },
        ToolDef {
            name: "get_financial_statement".into(),
            description: "A financial statement for a ticker.".into(),
            input_schema: ticker_schema(json!({
                "financial_type": {
                    "schema": {
                        "type": "string",
                        "enum": [
                            "income_stmt", "quarterly_income_stmt",
                            "balance_sheet", "quarterly_balance_sheet",
                            "cashflow", "quarterly_cashflow"
                        ]
                    },
                    "required": true
                }
            })),
        },
        ToolDef {
            name: "get_holder_info".into(),
            description: "Holder breakdowns and insider activity for a ticker.".into(),
            input_schema: ticker_schema(json!({
                "holder_type": {
                    "schema": {
                        "type": "string",
                        "enum": [
                            "major_holders", "institutional_holders", "mutualfund_holders",
                            "insider_transactions", "insider_purchases", "insider_roster_holders"
                        ]
                    },
                    "required": true
                }
            })),
        },
        ToolDef {
            name: "get_option_expiration_dates".into(),
            description: "Option expiration dates for a ticker.".into(),
            input_schema: ticker_schema(json!({})),
        },
        ToolDef {
            name: "get_option_chain".into(),
            description: "One side of the option chain for an expiration date.".into(),
            input_schema: ticker_schema(json!({
                "expiration_date": {
                    "schema": {"type": "string", "description": "YYYY-MM-DD"},
                    "required": true
                },
                "option_type": {
                    "schema": {"type": "string", "enum": ["calls", "puts"]},
                    "required": true
                }
            })),
        },
        ToolDef {
            name: "get_recommendations".into(),
            description: "Analyst recommendations or upgrades/downgrades for a ticker.".into(),
            input_schema: ticker_schema(json!({
                "recommendation_type": {
                    "schema": {"type": "string", "enum": ["recommendations", "upgrades_downgrades"]},
                    "required": true
                },
                "months_back": {
                    "schema": {"type": "integer", "description": "Lookback in months (default 12)"},
                    "required": false
                }
            })),
        },
    ]
}

fn required_str<'a>(
    arguments: &'a serde_json::Value,
    key: &str,
) -> Result<&'a str, GatewayError> {
    arguments
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| GatewayError::invalid_arg(format!("missing required argument: {key}")))
}

fn optional_str<'a>(arguments: &'a serde_json::Value, key: &str, default: &'a str) -> &'a str {
    arguments.get(key).and_then(|v| v.as_str()).unwrap_or(default)
}

/// Invoke a tool by name against the router.
///
/// # Errors
/// `InvalidArg` for unknown tools or malformed arguments; otherwise whatever
/// the router surfaces.
pub async fn call(
    gateway: &Gateway,
    name: &str,
    arguments: &serde_json::Value,
) -> Result<String, GatewayError> {
    match name {
        "get_historical_stock_prices" => {
            let ticker = required_str(arguments, "ticker")?;
            let period = optional_str(arguments, "period", "1mo");
            let interval = optional_str(arguments, "interval", "1d");
            gateway.historical_prices(ticker, period, interval).await
        }
        "get_stock_info" => {
            let ticker = required_str(arguments, "ticker")?;
            gateway.stock_info(ticker).await
        }
        "get_yahoo_finance_news" => {
            let ticker = required_str(arguments, "ticker")?;
            gateway.news(ticker).await
        }
        "get_market_news" => gateway.market_news().await,
        "get_stock_actions" => {
            let ticker = required_str(arguments, "ticker")?;
            gateway.stock_actions(ticker).await
        }
        "get_financial_statement" => {
            let ticker = required_str(arguments, "ticker")?;
            let kind: FinancialStatementKind = required_str(arguments, "financial_type")?
                .parse()
                .map_err(|e: marketgate_types::KindParseError| {
                    GatewayError::invalid_arg(e.to_string())
                })?;
            gateway.financial_statement(ticker, kind).await
        }
        "get_holder_info" => {
            let ticker = required_str(arguments, "ticker")?;
            let kind: HolderKind = required_str(arguments, "holder_type")?
                .parse()
                .map_err(|e: marketgate_types::KindParseError| {
                    GatewayError::invalid_arg(e.to_string())
                })?;
            gateway.holder_info(ticker, kind).await
        }
        "get_option_expiration_dates" => {
            let ticker = required_str(arguments, "ticker")?;
            gateway.option_expiration_dates(ticker).await
        }
        "get_option_chain" => {
            let ticker = required_str(arguments, "ticker")?;
            let date_str = required_str(arguments, "expiration_date")?;
            let expiration = chrono::NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
                .map_err(|_| {
                    GatewayError::invalid_arg(format!(
                        "expiration_date must be YYYY-MM-DD, got {date_str}"
                    ))
                })?;
            let side: OptionType = required_str(arguments, "option_type")?
                .parse()
                .map_err(|e: marketgate_types::KindParseError| {
                    GatewayError::invalid_arg(e.to_string())
                })?;
            gateway.option_chain(ticker, expiration, side).await
        }
        "get_recommendations" => {
            let ticker = required_str(arguments, "ticker")?;
            let kind: RecommendationKind = required_str(arguments, "recommendation_type")?
                .parse()
                .map_err(|e: marketgate_types::KindParseError| {
                    GatewayError::invalid_arg(e.to_string())
                })?;
            let months_back = arguments
                .get("months_back")
                .and_then(serde_json::Value::as_u64)
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(DEFAULT_MONTHS_BACK);
            gateway.recommendations(ticker, kind, months_back).await
        }
        other => Err(GatewayError::invalid_arg(format!("unknown tool: {other}"))),
    }
}

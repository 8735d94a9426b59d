/// Generate a ticker-keyed router method that resolves the provider chain,
/// checks capability support, and executes through breaker and health
/// tracking in the configured mode.
///
/// Notes on `not_found`:
/// - Pass a noun phrase only (e.g., "stock info", "option chain").
/// - The final error is formatted as "{label} for {TICKER}".
#[macro_export]
macro_rules! gateway_router_method {
    (
        $(#[$meta:meta])*
        method: $name:ident( $ticker:ident : &str $(, $arg:ident : $arg_ty:ty )* ),
        data_type: $dt:expr,
        accessor: $accessor:ident,
        not_found: $label:literal,
        call: $call_name:ident( $call_ticker:ident $(, $call_rest:ident )* )
    ) => {
        $(#[$meta])*
        ///
        /// # Errors
        /// Returns an error if the ticker is malformed, no eligible provider
        /// succeeds, or none support the operation.
        pub async fn $name(
            &self,
            $ticker: &str,
            $( $arg: $arg_ty ),*
        ) -> Result<String, marketgate_core::GatewayError> {
            marketgate_core::validate_ticker($ticker)?;
            let label = format!(concat!($label, " for {}"), $ticker);
            self.execute_operation($dt, label, move |c| {
                if c.$accessor().is_none() {
                    return None;
                }
                let $ticker = $ticker;
                $( let $arg = $arg.clone(); )*
                Some(async move {
                    if let Some(p) = c.$accessor() {
                        p.$call_name($call_ticker $(, $call_rest )*).await
                    } else {
                        Err(marketgate_core::GatewayError::provider(
                            c.id().clone(),
                            concat!("missing ", $label, " capability during call"),
                        ))
                    }
                })
            })
            .await
        }
    };
}

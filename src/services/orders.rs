use crate::error::AppError;
use crate::models::{OrderReceipt, OrderRequest};
use crate::services::broker::Broker;
use rust_decimal::Decimal;

const TRANSACTION_TYPES: [&str; 2] = ["BUY", "SELL"];
const ORDER_TYPES: [&str; 4] = ["MARKET", "LIMIT", "SL", "SL-M"];

/// Normalise casing and check the order before it reaches the broker.
pub fn validate_order(request: OrderRequest) -> Result<OrderRequest, AppError> {
    let symbol = request.symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(AppError::Validation("Symbol is required".to_string()));
    }

    if request.quantity <= 0 {
        return Err(AppError::Validation("Quantity must be greater than 0".to_string()));
    }

    let transaction_type = request.transaction_type.trim().to_uppercase();
    if !TRANSACTION_TYPES.contains(&transaction_type.as_str()) {
        return Err(AppError::Validation(format!(
            "Invalid transaction type: {}",
            request.transaction_type
        )));
    }

    let order_type = request.order_type.trim().to_uppercase();
    if !ORDER_TYPES.contains(&order_type.as_str()) {
        return Err(AppError::Validation(format!("Invalid order type: {}", request.order_type)));
    }

    if order_type == "LIMIT" && !request.price.is_some_and(|p| p > Decimal::ZERO) {
        return Err(AppError::Validation("LIMIT orders require a positive price".to_string()));
    }

    Ok(OrderRequest {
        symbol,
        transaction_type,
        quantity: request.quantity,
        order_type,
        price: request.price,
    })
}

pub async fn place_order(broker: &dyn Broker, request: OrderRequest) -> Result<OrderReceipt, AppError> {
    let order = validate_order(request)?;
    Ok(broker.place_order(&order).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn order(transaction_type: &str, quantity: i64, order_type: &str, price: Option<Decimal>) -> OrderRequest {
        OrderRequest {
            symbol: " reliance ".to_string(),
            transaction_type: transaction_type.to_string(),
            quantity,
            order_type: order_type.to_string(),
            price,
        }
    }

    #[test]
    fn normalises_valid_order() {
        let validated = validate_order(order("buy", 10, "market", None)).unwrap();
        assert_eq!(validated.symbol, "RELIANCE");
        assert_eq!(validated.transaction_type, "BUY");
        assert_eq!(validated.order_type, "MARKET");
    }

    #[test]
    fn rejects_non_positive_quantity() {
        assert!(matches!(
            validate_order(order("SELL", 0, "MARKET", None)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn rejects_unknown_transaction_type() {
        assert!(validate_order(order("HOLD", 1, "MARKET", None)).is_err());
    }

    #[test]
    fn limit_orders_need_a_price() {
        assert!(validate_order(order("BUY", 1, "LIMIT", None)).is_err());
        assert!(validate_order(order("BUY", 1, "LIMIT", Some(dec!(0)))).is_err());
        assert!(validate_order(order("BUY", 1, "LIMIT", Some(dec!(2450.5)))).is_ok());
    }
}

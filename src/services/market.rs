use crate::models::{Macd, Ohlc, Quote, RawQuote, SupportResistance, TechnicalAnalysis};
use crate::utils::{round_decimal, stable_hash};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const HIGH_VOLUME: i64 = 1_000_000;
const RSI_OVERBOUGHT: Decimal = dec!(70);
const RSI_OVERSOLD: Decimal = dec!(30);

/// Qualify a bare symbol with the default exchange, e.g. `INFY` -> `NSE:INFY`.
pub fn instrument(symbol: &str) -> String {
    if symbol.contains(':') {
        symbol.to_string()
    } else {
        format!("NSE:{}", symbol)
    }
}

pub fn change_percent(last_price: Decimal, close: Decimal) -> Decimal {
    if close.is_zero() {
        return dec!(0);
    }
    round_decimal((last_price - close) / close * dec!(100), 2)
}

fn volume_status(volume: i64) -> String {
    let status = if volume > HIGH_VOLUME { "High" } else { "Normal" };
    status.to_string()
}

fn price_trend(last_price: Decimal, open: Decimal) -> String {
    let trend = if last_price > open { "Bullish" } else { "Bearish" };
    trend.to_string()
}

fn day_range(ohlc: &Ohlc) -> String {
    format!("₹{} - ₹{}", ohlc.low.normalize(), ohlc.high.normalize())
}

pub fn enrich_quote(raw: RawQuote) -> Quote {
    Quote {
        change_percent: change_percent(raw.last_price, raw.ohlc.close),
        day_range: day_range(&raw.ohlc),
        volume_status: volume_status(raw.volume),
        price_trend: price_trend(raw.last_price, raw.ohlc.open),
        last_price: raw.last_price,
        volume: raw.volume,
        ohlc: raw.ohlc,
    }
}

pub fn demo_quote(symbol: &str) -> Quote {
    let hash = stable_hash(symbol);
    let last_price = dec!(100) + Decimal::from(hash % 50);
    let volume = HIGH_VOLUME + (hash % 500_000) as i64;
    let ohlc = Ohlc {
        open: dec!(98),
        high: dec!(105),
        low: dec!(95),
        close: dec!(102),
    };

    Quote {
        change_percent: Decimal::from(hash % 10) - dec!(5),
        day_range: day_range(&ohlc),
        volume_status: volume_status(volume),
        price_trend: price_trend(last_price, ohlc.open),
        last_price,
        volume,
        ohlc,
    }
}

fn placeholder_macd() -> Macd {
    Macd {
        macd_line: dec!(0.5),
        signal_line: dec!(0.3),
        histogram: dec!(0.2),
    }
}

fn support_resistance(price: Decimal) -> SupportResistance {
    SupportResistance {
        resistance_1: round_decimal(price * dec!(1.05), 2),
        support_1: round_decimal(price * dec!(0.95), 2),
        pivot_point: round_decimal(price, 2),
    }
}

pub fn rsi_signal(rsi: Decimal) -> &'static str {
    if rsi > RSI_OVERBOUGHT {
        "RSI Overbought - Consider Selling"
    } else if rsi < RSI_OVERSOLD {
        "RSI Oversold - Consider Buying"
    } else {
        "RSI in neutral zone"
    }
}

/// Single-quote RSI proxy: 50 shifted by the day's percentage move, clamped to [0, 100].
pub fn technical_analysis(symbol: &str, quote: &RawQuote) -> TechnicalAnalysis {
    let price = quote.last_price;
    let move_percent = if quote.ohlc.close.is_zero() {
        dec!(0)
    } else {
        (price - quote.ohlc.close) / quote.ohlc.close * dec!(100)
    };
    let rsi = (dec!(50) + move_percent).clamp(dec!(0), dec!(100));

    TechnicalAnalysis {
        symbol: symbol.to_string(),
        current_price: price,
        rsi: round_decimal(rsi, 2),
        macd: placeholder_macd(),
        support_resistance: support_resistance(price),
        signals: vec![rsi_signal(rsi).to_string()],
    }
}

pub fn demo_technical_analysis(symbol: &str) -> TechnicalAnalysis {
    let hash = stable_hash(symbol);
    let price = dec!(100) + Decimal::from(hash % 100);

    TechnicalAnalysis {
        symbol: symbol.to_string(),
        current_price: price,
        rsi: dec!(45) + Decimal::from(hash % 40),
        macd: placeholder_macd(),
        support_resistance: support_resistance(price),
        signals: vec![
            "RSI in neutral zone".to_string(),
            "MACD bullish crossover".to_string(),
        ],
    }
}

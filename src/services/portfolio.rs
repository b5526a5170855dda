use crate::error::AnalysisError;
use crate::models::{
    AnalysisResult, Holding, HoldingAnalysis, LargestPosition, PortfolioMetrics, RiskAnalysis,
    RiskLevel,
};
use crate::utils::round_decimal;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const HIGH_CONCENTRATION: Decimal = dec!(0.25);
const MEDIUM_CONCENTRATION: Decimal = dec!(0.15);
const MIN_DIVERSIFIED_HOLDINGS: usize = 5;

/// Full-precision aggregates over a snapshot. Rounding happens in `analyze`.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregates {
    pub total_investment: Decimal,
    pub current_value: Decimal,
    pub total_pnl: Decimal,
    pub total_pnl_percent: Decimal,
    pub profitable_holdings: usize,
    pub loss_making_holdings: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskProfile {
    pub weights: Vec<Decimal>,
    pub concentration: Decimal,
    pub risk_level: RiskLevel,
    pub diversification_score: Decimal,
    /// Index into the snapshot of the largest position.
    pub largest_index: usize,
}

pub fn aggregate(holdings: &[Holding]) -> Result<Aggregates, AnalysisError> {
    if holdings.is_empty() {
        return Err(AnalysisError::NoHoldings);
    }

    let mut total_investment = dec!(0);
    let mut current_value = dec!(0);
    let mut profitable_holdings = 0;
    let mut loss_making_holdings = 0;

    for holding in holdings {
        total_investment += holding.invested_value();
        current_value += holding.current_value();

        let pnl = holding.pnl();
        if pnl > dec!(0) {
            profitable_holdings += 1;
        } else if pnl < dec!(0) {
            loss_making_holdings += 1;
        }
    }

    let total_pnl = current_value - total_investment;
    let total_pnl_percent = if total_investment.is_zero() {
        dec!(0)
    } else {
        total_pnl / total_investment * dec!(100)
    };

    Ok(Aggregates {
        total_investment,
        current_value,
        total_pnl,
        total_pnl_percent,
        profitable_holdings,
        loss_making_holdings,
    })
}

pub fn risk_level(concentration: Decimal) -> RiskLevel {
    if concentration > HIGH_CONCENTRATION {
        RiskLevel::High
    } else if concentration > MEDIUM_CONCENTRATION {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

pub fn analyze_risk(holdings: &[Holding]) -> Result<RiskProfile, AnalysisError> {
    if holdings.is_empty() {
        return Err(AnalysisError::NoHoldings);
    }

    let values: Vec<Decimal> = holdings.iter().map(Holding::current_value).collect();
    let total: Decimal = values.iter().sum();
    if total <= dec!(0) {
        return Err(AnalysisError::DegenerateInput);
    }

    let weights: Vec<Decimal> = values.iter().map(|value| value / total).collect();
    let concentration: Decimal = weights.iter().map(|w| w * w).sum();

    // Strict comparison keeps the first of equal maxima.
    let mut largest_index = 0;
    for (i, value) in values.iter().enumerate().skip(1) {
        if *value > values[largest_index] {
            largest_index = i;
        }
    }

    Ok(RiskProfile {
        weights,
        concentration,
        risk_level: risk_level(concentration),
        diversification_score: (dec!(1) - concentration) * dec!(100),
        largest_index,
    })
}

/// Rules are evaluated independently and emitted in rule order.
pub fn generate_recommendations(holdings: &[HoldingAnalysis], concentration: Decimal) -> Vec<String> {
    let mut recommendations = Vec::new();

    if concentration > HIGH_CONCENTRATION {
        recommendations.push("⚠️ High portfolio concentration - consider diversification".to_string());
    }

    let profitable = holdings.iter().filter(|h| h.pnl_percent > dec!(0)).count();
    let loss_making = holdings.iter().filter(|h| h.pnl_percent < dec!(0)).count();
    if loss_making > profitable {
        recommendations.push("📉 More losing positions than winning - review strategy".to_string());
    }

    if holdings.len() < MIN_DIVERSIFIED_HOLDINGS {
        recommendations.push("🌐 Consider adding more stocks for diversification".to_string());
    }

    recommendations
}

pub fn analyze(holdings: &[Holding]) -> Result<AnalysisResult, AnalysisError> {
    let totals = aggregate(holdings)?;
    let risk = analyze_risk(holdings)?;

    let holdings_analysis: Vec<HoldingAnalysis> = holdings
        .iter()
        .map(|holding| HoldingAnalysis {
            symbol: holding.symbol.clone(),
            quantity: Some(holding.quantity),
            avg_price: Some(holding.average_price),
            ltp: Some(holding.last_price),
            current_value: holding.current_value(),
            pnl: Some(holding.pnl()),
            pnl_percent: holding.pnl_percent(),
        })
        .collect();

    let recommendations = generate_recommendations(&holdings_analysis, risk.concentration);

    let largest = &holdings[risk.largest_index];

    Ok(AnalysisResult {
        portfolio_metrics: PortfolioMetrics {
            total_investment: round_decimal(totals.total_investment, 2),
            current_value: round_decimal(totals.current_value, 2),
            total_pnl: round_decimal(totals.total_pnl, 2),
            total_pnl_percent: round_decimal(totals.total_pnl_percent, 2),
            total_holdings: holdings.len(),
            profitable_holdings: totals.profitable_holdings,
            loss_making_holdings: totals.loss_making_holdings,
        },
        holdings_analysis,
        risk_analysis: RiskAnalysis {
            risk_level: risk.risk_level,
            concentration_index: round_decimal(risk.concentration, 4),
            diversification_score: round_decimal(risk.diversification_score, 2),
            largest_position: LargestPosition {
                symbol: largest.symbol.clone(),
                weight: round_decimal(risk.weights[risk.largest_index] * dec!(100), 2),
            },
        },
        recommendations,
    })
}

/// Fixed analysis served in demo mode.
pub fn demo_analysis() -> AnalysisResult {
    let row = |symbol: &str, pnl_percent: Decimal, current_value: Decimal| HoldingAnalysis {
        symbol: symbol.to_string(),
        quantity: None,
        avg_price: None,
        ltp: None,
        current_value,
        pnl: None,
        pnl_percent,
    };

    AnalysisResult {
        portfolio_metrics: PortfolioMetrics {
            total_investment: dec!(91.08),
            current_value: dec!(91.08),
            total_pnl: dec!(-7.62),
            total_pnl_percent: dec!(-8.37),
            total_holdings: 7,
            profitable_holdings: 2,
            loss_making_holdings: 5,
        },
        holdings_analysis: vec![
            row("YESBANK", dec!(-42.6), dec!(38.84)),
            row("SALASAR", dec!(-18.88), dec!(12.47)),
            row("MAPMYINDIA", dec!(8.24), dec!(15.67)),
        ],
        risk_analysis: RiskAnalysis {
            risk_level: RiskLevel::High,
            concentration_index: dec!(0.35),
            diversification_score: dec!(65),
            largest_position: LargestPosition {
                symbol: "YESBANK".to_string(),
                weight: dec!(42.6),
            },
        },
        recommendations: vec![
            "⚠️ High concentration in YESBANK - consider reducing position".to_string(),
            "📉 Review loss-making positions for stop-loss".to_string(),
            "🌐 Add more diversification across sectors".to_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holding(symbol: &str, quantity: i64, avg: Decimal, ltp: Decimal) -> Holding {
        Holding::new(symbol, quantity, avg, ltp)
    }

    fn sample() -> Vec<Holding> {
        vec![
            holding("INFY", 10, dec!(1500), dec!(1620.5)),
            holding("TCS", 4, dec!(3400), dec!(3310)),
            holding("HDFCBANK", 12, dec!(1580.25), dec!(1580.25)),
            holding("ITC", 50, dec!(410), dec!(437.8)),
        ]
    }

    #[test]
    fn empty_snapshot_is_rejected() {
        assert_eq!(analyze(&[]), Err(AnalysisError::NoHoldings));
        assert_eq!(aggregate(&[]), Err(AnalysisError::NoHoldings));
    }

    #[test]
    fn zero_current_value_is_degenerate() {
        let holdings = vec![holding("DELISTED", 10, dec!(25), dec!(0))];
        assert_eq!(analyze(&holdings), Err(AnalysisError::DegenerateInput));
    }

    #[test]
    fn negative_current_value_is_degenerate() {
        let holdings = vec![
            holding("BADTICK", 10, dec!(25), dec!(-5)),
            holding("ITC", 1, dec!(410), dec!(20)),
        ];
        assert_eq!(analyze_risk(&holdings).err(), Some(AnalysisError::DegenerateInput));
        assert_eq!(analyze(&holdings), Err(AnalysisError::DegenerateInput));
    }

    #[test]
    fn aggregates_are_consistent() {
        let totals = aggregate(&sample()).unwrap();
        assert_eq!(totals.total_investment, dec!(15000) + dec!(13600) + dec!(18963) + dec!(20500));
        assert_eq!(totals.current_value, dec!(16205) + dec!(13240) + dec!(18963) + dec!(21890));
        assert_eq!(totals.total_pnl, totals.current_value - totals.total_investment);
        assert_eq!(
            totals.total_pnl_percent,
            totals.total_pnl / totals.total_investment * dec!(100)
        );
    }

    #[test]
    fn zero_pnl_holdings_count_in_neither_bucket() {
        let totals = aggregate(&sample()).unwrap();
        assert_eq!(totals.profitable_holdings, 2);
        assert_eq!(totals.loss_making_holdings, 1);
        assert!(totals.profitable_holdings + totals.loss_making_holdings <= sample().len());
    }

    #[test]
    fn zero_investment_yields_zero_percent() {
        let holdings = vec![holding("BONUS", 5, dec!(0), dec!(12))];
        let totals = aggregate(&holdings).unwrap();
        assert_eq!(totals.total_pnl_percent, dec!(0));
        assert_eq!(totals.total_pnl, dec!(60));
    }

    #[test]
    fn weights_sum_to_one() {
        let risk = analyze_risk(&sample()).unwrap();
        let sum: Decimal = risk.weights.iter().sum();
        assert!((sum - dec!(1)).abs() < dec!(0.000000001));
    }

    #[test]
    fn concentration_is_one_for_single_holding() {
        let risk = analyze_risk(&[holding("SBIN", 3, dec!(600), dec!(812))]).unwrap();
        assert_eq!(risk.concentration, dec!(1));
        assert_eq!(risk.risk_level, RiskLevel::High);
        assert_eq!(risk.diversification_score, dec!(0));
    }

    #[test]
    fn concentration_is_below_one_for_many_holdings() {
        let risk = analyze_risk(&sample()).unwrap();
        assert!(risk.concentration > dec!(0));
        assert!(risk.concentration < dec!(1));
    }

    #[test]
    fn risk_tier_boundaries_are_exclusive() {
        assert_eq!(risk_level(dec!(0.25)), RiskLevel::Medium);
        assert_eq!(risk_level(dec!(0.2501)), RiskLevel::High);
        assert_eq!(risk_level(dec!(0.15)), RiskLevel::Low);
        assert_eq!(risk_level(dec!(0.1501)), RiskLevel::Medium);
        assert_eq!(risk_level(dec!(0.01)), RiskLevel::Low);
    }

    #[test]
    fn risk_tier_is_monotonic() {
        let mut previous = RiskLevel::Low;
        for step in 0..=100 {
            let tier = risk_level(Decimal::new(step, 2));
            assert!(tier >= previous);
            previous = tier;
        }
    }

    #[test]
    fn largest_position_prefers_first_on_ties() {
        let holdings = vec![
            holding("AAA", 1, dec!(10), dec!(50)),
            holding("BBB", 5, dec!(10), dec!(10)),
            holding("CCC", 2, dec!(10), dec!(20)),
        ];
        let risk = analyze_risk(&holdings).unwrap();
        assert_eq!(risk.largest_index, 0);
    }

    #[test]
    fn concentrated_two_holding_portfolio() {
        // 90% in a loser, 10% in a winner.
        let holdings = vec![
            holding("HEAVY", 9, dec!(70), dec!(63)),
            holding("LIGHT", 1, dec!(60), dec!(63)),
        ];
        let result = analyze(&holdings).unwrap();

        assert_eq!(result.risk_analysis.concentration_index, dec!(0.82));
        assert_eq!(result.risk_analysis.risk_level, RiskLevel::High);
        assert_eq!(result.risk_analysis.largest_position.symbol, "HEAVY");
        assert_eq!(result.risk_analysis.largest_position.weight, dec!(90));
        assert_eq!(result.holdings_analysis[0].pnl_percent, dec!(-10));
        assert_eq!(result.holdings_analysis[1].pnl_percent, dec!(5));
        assert_eq!(
            result.recommendations,
            vec![
                "⚠️ High portfolio concentration - consider diversification".to_string(),
                "🌐 Consider adding more stocks for diversification".to_string(),
            ]
        );
    }

    #[test]
    fn recommendations_can_be_empty() {
        let holdings: Vec<Holding> = ["A", "B", "C", "D", "E", "F", "G", "H"]
            .iter()
            .map(|symbol| holding(symbol, 10, dec!(100), dec!(110)))
            .collect();
        let result = analyze(&holdings).unwrap();
        assert_eq!(result.risk_analysis.risk_level, RiskLevel::Low);
        assert_eq!(result.risk_analysis.diversification_score, dec!(87.5));
        assert!(result.recommendations.is_empty());
    }

    #[test]
    fn losing_majority_triggers_review() {
        let holdings: Vec<Holding> = ["A", "B", "C", "D", "E", "F"]
            .iter()
            .enumerate()
            .map(|(i, symbol)| {
                let ltp = if i < 4 { dec!(90) } else { dec!(120) };
                holding(symbol, 10, dec!(100), ltp)
            })
            .collect();
        let recommendations = analyze(&holdings).unwrap().recommendations;
        assert_eq!(
            recommendations,
            vec!["📉 More losing positions than winning - review strategy".to_string()]
        );
    }

    #[test]
    fn output_is_rounded_at_the_boundary() {
        let holdings = vec![
            holding("X", 3, dec!(33.333), dec!(34.4444)),
            holding("Y", 7, dec!(12.1212), dec!(11.0101)),
        ];
        let metrics = analyze(&holdings).unwrap().portfolio_metrics;
        assert_eq!(metrics.total_investment, dec!(184.85));
        assert_eq!(metrics.current_value, dec!(180.40));
        assert_eq!(metrics.total_pnl, dec!(-4.44));
    }

    #[test]
    fn demo_analysis_fixture() {
        let demo = demo_analysis();
        assert_eq!(demo.portfolio_metrics.total_investment, dec!(91.08));
        assert_eq!(demo.portfolio_metrics.total_pnl, dec!(-7.62));
        assert_eq!(demo.portfolio_metrics.total_holdings, 7);
        assert_eq!(demo.recommendations.len(), 3);
    }
}

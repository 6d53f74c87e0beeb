//! 50/30/20 budget calculator.
//!
//! Pure arithmetic behind the landing-page demo: half of monthly income to
//! essentials, 30% to wants, 20% to savings, plus a debt-to-income figure.
//! Input amounts arrive as free-form text ("$5,500" is fine) and weekly
//! figures are scaled to monthly with a fixed ×4 multiplier.

use crate::error::BudgetError;

/// How often the entered figure recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Frequency {
    #[default]
    Monthly,
    Weekly,
}

impl Frequency {
    /// Multiplier to normalize a figure to monthly.
    pub fn monthly_multiplier(self) -> f64 {
        match self {
            Self::Monthly => 1.0,
            Self::Weekly => 4.0,
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monthly" | "month" => Ok(Self::Monthly),
            "weekly" | "week" => Ok(Self::Weekly),
            other => Err(format!("unknown frequency: {other} (use monthly or weekly)")),
        }
    }
}

/// The derived figures, all monthly.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetBreakdown {
    pub monthly_income: f64,
    pub monthly_spending: f64,
    /// 50% of income.
    pub essentials: f64,
    /// 30% of income.
    pub wants: f64,
    /// 20% of income.
    pub savings: f64,
    /// Spending over income, as a percentage.
    pub debt_to_income: f64,
    /// True when the income figure was scaled up from weekly.
    pub income_scaled: bool,
    /// True when the spending figure was scaled up from weekly.
    pub spending_scaled: bool,
}

/// Strip everything outside `[0-9.-]` and parse the remainder.
///
/// Mirrors how the demo form tolerates currency symbols and thousands
/// separators. `None` when nothing numeric is left.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let normalized: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if normalized.is_empty() {
        return None;
    }
    normalized.parse().ok().filter(|v: &f64| v.is_finite())
}

/// Compute the breakdown from already-parsed amounts.
pub fn compute(
    income: f64,
    spending: f64,
    income_frequency: Frequency,
    spending_frequency: Frequency,
) -> Result<BudgetBreakdown, BudgetError> {
    if !income.is_finite() {
        return Err(BudgetError::InvalidAmount { field: "income" });
    }
    if !spending.is_finite() {
        return Err(BudgetError::InvalidAmount { field: "spending" });
    }
    if income <= 0.0 {
        return Err(BudgetError::NonPositiveIncome);
    }
    if spending < 0.0 {
        return Err(BudgetError::NegativeSpending);
    }

    let monthly_income = income * income_frequency.monthly_multiplier();
    let monthly_spending = spending * spending_frequency.monthly_multiplier();

    Ok(BudgetBreakdown {
        monthly_income,
        monthly_spending,
        essentials: monthly_income * 0.5,
        wants: monthly_income * 0.3,
        savings: monthly_income * 0.2,
        debt_to_income: (monthly_spending / monthly_income) * 100.0,
        income_scaled: income_frequency == Frequency::Weekly,
        spending_scaled: spending_frequency == Frequency::Weekly,
    })
}

/// Parse raw form input and compute the breakdown.
pub fn compute_raw(
    income_raw: &str,
    spending_raw: &str,
    income_frequency: Frequency,
    spending_frequency: Frequency,
) -> Result<BudgetBreakdown, BudgetError> {
    let income = parse_amount(income_raw).ok_or(BudgetError::InvalidAmount { field: "income" })?;
    let spending =
        parse_amount(spending_raw).ok_or(BudgetError::InvalidAmount { field: "spending" })?;
    compute(income, spending, income_frequency, spending_frequency)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn reference_figures_for_5500_income_3200_spending() {
        let breakdown = compute(5500.0, 3200.0, Frequency::Monthly, Frequency::Monthly).unwrap();
        assert_eq!(breakdown.essentials, 2750.0);
        assert_eq!(breakdown.wants, 1650.0);
        assert_eq!(breakdown.savings, 1100.0);
        assert!((breakdown.debt_to_income - 58.1818).abs() < 0.001);
    }

    #[test]
    fn weekly_income_is_scaled_by_four() {
        let breakdown = compute(1000.0, 0.0, Frequency::Weekly, Frequency::Monthly).unwrap();
        assert_eq!(breakdown.monthly_income, 4000.0);
        assert_eq!(breakdown.essentials, 2000.0);
        assert!(breakdown.income_scaled);
        assert!(!breakdown.spending_scaled);
    }

    #[test]
    fn zero_income_is_rejected() {
        let err = compute(0.0, 100.0, Frequency::Monthly, Frequency::Monthly).unwrap_err();
        assert!(matches!(err, BudgetError::NonPositiveIncome));
    }

    #[test]
    fn negative_income_is_rejected() {
        let err = compute(-500.0, 100.0, Frequency::Monthly, Frequency::Monthly).unwrap_err();
        assert!(matches!(err, BudgetError::NonPositiveIncome));
    }

    #[test]
    fn negative_spending_is_rejected() {
        let err = compute(5000.0, -1.0, Frequency::Monthly, Frequency::Monthly).unwrap_err();
        assert!(matches!(err, BudgetError::NegativeSpending));
    }

    #[test]
    fn zero_spending_is_fine() {
        let breakdown = compute(5000.0, 0.0, Frequency::Monthly, Frequency::Monthly).unwrap();
        assert_eq!(breakdown.debt_to_income, 0.0);
    }

    #[test]
    fn parse_amount_strips_currency_noise() {
        assert_eq!(parse_amount("$5,500"), Some(5500.0));
        assert_eq!(parse_amount("  3200.50 AUD "), Some(3200.5));
        assert_eq!(parse_amount("-12"), Some(-12.0));
    }

    #[test]
    fn parse_amount_rejects_non_numeric_input() {
        assert!(parse_amount("").is_none());
        assert!(parse_amount("abc").is_none());
        assert!(parse_amount("$ ,").is_none());
    }

    #[test]
    fn compute_raw_round_trips_formatted_input() {
        let breakdown =
            compute_raw("$5,500", "3,200", Frequency::Monthly, Frequency::Monthly).unwrap();
        assert_eq!(breakdown.essentials, 2750.0);
    }

    #[test]
    fn compute_raw_invalid_income_names_the_field() {
        let err =
            compute_raw("???", "100", Frequency::Monthly, Frequency::Monthly).unwrap_err();
        assert!(matches!(err, BudgetError::InvalidAmount { field: "income" }));
    }

    #[test]
    fn frequency_parses_from_str() {
        assert_eq!("weekly".parse::<Frequency>().unwrap(), Frequency::Weekly);
        assert_eq!("Monthly".parse::<Frequency>().unwrap(), Frequency::Monthly);
        assert!("daily".parse::<Frequency>().is_err());
    }
}

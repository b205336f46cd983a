use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::row::{ScheduleLine, ScheduleRow};
use crate::types::{Money, Rate};

/// Headline project economics derived from the schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSummary {
    /// Sum of every presales booking, including years outside the timeline
    pub total_revenue: Money,
    /// Presales booked inside the timeline
    pub presales_booked: Money,
    pub revenue_recognised: Money,
    pub total_cogs: Money,
    pub gross_profit: Money,
    pub gross_margin: Rate,
    pub interest_capitalized: Money,
    pub interest_expensed: Money,
    pub total_interest: Money,
    pub total_pbt: Money,
    pub total_tax: Money,
    pub total_pat: Money,
    pub net_margin: Rate,
    pub peak_debt_balance: Money,
    /// Deepest cumulative cash deficit, reported as a positive amount
    pub peak_funding_requirement: Money,
    pub ending_cash: Money,
}

pub fn summarise(rows: &[ScheduleRow], totals: &ScheduleLine, total_revenue: Money) -> ProjectSummary {
    let gross_profit = (totals.revenue_recognition - totals.cogs).normalize();
    let peak_debt_balance = rows
        .iter()
        .map(|r| r.line.debt_balance)
        .max()
        .unwrap_or(Decimal::ZERO);
    let lowest_cash = rows
        .iter()
        .map(|r| r.line.cumulative_cash_balance)
        .min()
        .unwrap_or(Decimal::ZERO);

    ProjectSummary {
        total_revenue,
        presales_booked: totals.presales,
        revenue_recognised: totals.revenue_recognition,
        total_cogs: totals.cogs,
        gross_profit,
        gross_margin: safe_divide(gross_profit, totals.revenue_recognition).normalize(),
        interest_capitalized: totals.interest_capitalized,
        interest_expensed: totals.interest_expense,
        total_interest: (totals.interest_capitalized + totals.interest_expense).normalize(),
        total_pbt: totals.pbt,
        total_tax: totals.tax,
        total_pat: totals.pat,
        net_margin: safe_divide(totals.pat, totals.revenue_recognition).normalize(),
        peak_debt_balance,
        peak_funding_requirement: if lowest_cash < Decimal::ZERO {
            -lowest_cash
        } else {
            Decimal::ZERO
        },
        ending_cash: totals.cumulative_cash_balance,
    }
}

/// Residuals below this are division rounding, not open balances.
const CLOSE_OUT_TOLERANCE: Decimal = dec!(0.000001);

/// Balances that did not close out by the end of the timeline.
pub fn reconciliation_warnings(rows: &[ScheduleRow], totals: &ScheduleLine) -> Vec<String> {
    let mut warnings = Vec::new();

    if totals.debt_balance.abs() > CLOSE_OUT_TOLERANCE {
        warnings.push(format!(
            "Debt balance of {} remains outstanding at the end of the timeline",
            totals.debt_balance
        ));
    }
    if totals.inventory_balance.abs() > CLOSE_OUT_TOLERANCE {
        warnings.push(format!(
            "Inventory of {} was never released to COGS",
            totals.inventory_balance
        ));
    }
    for row in rows {
        if row.line.customer_prepayment_balance < -CLOSE_OUT_TOLERANCE {
            warnings.push(format!(
                "Year {}: revenue recognised ahead of cash collected (customer prepayment balance {})",
                row.year, row.line.customer_prepayment_balance
            ));
        }
    }

    warnings
}

fn safe_divide(numerator: Money, denominator: Money) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

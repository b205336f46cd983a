use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::period::{Timeline, YearPeriod};
use super::placement::{outflow, YearSeries};
use super::row::{ScheduleLine, ScheduleRow};
use crate::types::{Money, Rate, Year};

// ---------------------------------------------------------------------------
// Debt and interest
// ---------------------------------------------------------------------------

/// How a year's interest reaches the accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestTreatment {
    /// Added to inventory; still paid in cash.
    Capitalized,
    /// Charged to profit before tax; paid in cash.
    Expensed,
    /// No interest in any form.
    None,
}

/// Debt roll-forward and interest for a single year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebtYear {
    pub disbursement: Money,
    /// Negative
    pub repayment: Money,
    pub opening_balance: Money,
    pub ending_balance: Money,
    pub average_balance: Money,
    pub interest: Money,
    pub treatment: InterestTreatment,
}

impl DebtYear {
    pub fn capitalized(&self) -> Money {
        match self.treatment {
            InterestTreatment::Capitalized => self.interest,
            _ => Decimal::ZERO,
        }
    }

    pub fn expensed(&self) -> Money {
        match self.treatment {
            InterestTreatment::Expensed => self.interest,
            _ => Decimal::ZERO,
        }
    }

    pub fn cash_outflow(&self) -> Money {
        match self.treatment {
            InterestTreatment::None => Decimal::ZERO,
            _ => outflow(self.interest),
        }
    }
}

/// Interest is capitalised strictly before revenue booking starts (every
/// year when no booking period is configured) and expensed whenever a
/// positive balance is outstanding otherwise.
pub fn classify_interest(
    year: Year,
    booking_period: Option<&YearPeriod>,
    average_balance: Money,
    interest: Money,
) -> InterestTreatment {
    let before_booking = booking_period.map_or(true, |p| year < p.start);
    if before_booking && interest > Decimal::ZERO {
        InterestTreatment::Capitalized
    } else if average_balance > Decimal::ZERO {
        InterestTreatment::Expensed
    } else {
        InterestTreatment::None
    }
}

/// Roll the debt balance forward one year and charge interest on the average
/// of the opening and ending balances. `repayment` is already negative.
pub fn debt_step(
    year: Year,
    opening_balance: Money,
    disbursement: Money,
    repayment: Money,
    interest_rate: Rate,
    booking_period: Option<&YearPeriod>,
) -> DebtYear {
    let ending_balance = opening_balance + disbursement + repayment;
    let average_balance = (opening_balance + ending_balance) / dec!(2);
    let raw_interest = average_balance * interest_rate;
    let treatment = classify_interest(year, booking_period, average_balance, raw_interest);
    let interest = match treatment {
        InterestTreatment::None => Decimal::ZERO,
        _ => raw_interest,
    };
    DebtYear {
        disbursement,
        repayment,
        opening_balance,
        ending_balance,
        average_balance,
        interest,
        treatment,
    }
}

/// Pre-pass over the debt path: total interest capitalised across the whole
/// timeline. Capitalisation depends only on debt flows, so this is exact and
/// lets COGS release against the final inventory total from the first
/// booking year on.
pub fn total_capitalized_interest(
    timeline: &Timeline,
    disbursement: &YearSeries,
    repayment: &YearSeries,
    interest_rate: Rate,
    booking_period: Option<&YearPeriod>,
) -> Money {
    timeline
        .years()
        .enumerate()
        .fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(balance, capitalized), (idx, year)| {
                let debt = debt_step(
                    year,
                    balance,
                    disbursement.at(idx),
                    repayment.at(idx),
                    interest_rate,
                    booking_period,
                );
                (debt.ending_balance, capitalized + debt.capitalized())
            },
        )
        .1
}

// ---------------------------------------------------------------------------
// Year-by-year fold
// ---------------------------------------------------------------------------

/// Parameters fixed for the whole projection.
#[derive(Debug, Clone, Copy)]
pub struct AccrualContext {
    pub interest_rate: Rate,
    pub sga_percentage: Rate,
    pub tax_rate: Rate,
    pub booking_period: Option<YearPeriod>,
    /// Sum of all presales bookings; the base for COGS release.
    pub total_revenue: Money,
    /// Construction + land + all capitalised interest.
    pub total_expected_inventory: Money,
}

/// Pre-computed flows for one year, in the sign convention of the output.
#[derive(Debug, Clone, Copy, Default)]
pub struct YearFlows {
    pub year: Year,
    pub disbursement: Money,
    pub repayment: Money,
    pub construction_cost: Money,
    pub construction_outflow: Money,
    pub land_cost: Money,
    pub land_outflow: Money,
    pub presales_booked: Money,
    pub cash_collected: Money,
    pub revenue_recognised: Money,
}

/// Running balances carried from one year to the next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CarryForward {
    pub debt_balance: Money,
    pub inventory_balance: Money,
    pub prepayment_balance: Money,
    pub cumulative_cash: Money,
}

/// Split of inventory into cost of sales and the closing balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryRelease {
    pub cogs: Money,
    pub closing_balance: Money,
}

/// Release inventory for one year.
///
/// Outside the booking period (or with no revenue) inventory accumulates.
/// Inside it, COGS follows the year's share of total revenue applied to the
/// final expected inventory, except in the last booking year which releases
/// everything left.
pub fn release_inventory(
    year: Year,
    opening_balance: Money,
    addition: Money,
    revenue_recognised: Money,
    ctx: &AccrualContext,
) -> InventoryRelease {
    let in_booking = ctx.booking_period.is_some_and(|p| p.contains(year));
    if !in_booking || ctx.total_revenue <= Decimal::ZERO {
        return InventoryRelease {
            cogs: Decimal::ZERO,
            closing_balance: opening_balance + addition,
        };
    }

    let is_last_booking_year = ctx.booking_period.is_some_and(|p| p.end == year);
    if is_last_booking_year {
        InventoryRelease {
            cogs: opening_balance + addition,
            closing_balance: Decimal::ZERO,
        }
    } else {
        let revenue_share = revenue_recognised / ctx.total_revenue;
        let cogs = ctx.total_expected_inventory * revenue_share;
        InventoryRelease {
            cogs,
            closing_balance: opening_balance + addition - cogs,
        }
    }
}

impl CarryForward {
    /// Produce the year's row and the balances for the next year.
    pub fn advance(&self, flows: &YearFlows, ctx: &AccrualContext) -> (ScheduleRow, CarryForward) {
        let debt = debt_step(
            flows.year,
            self.debt_balance,
            flows.disbursement,
            flows.repayment,
            ctx.interest_rate,
            ctx.booking_period.as_ref(),
        );

        let interest_capitalized = debt.capitalized();
        let inventory_addition = flows.construction_cost + flows.land_cost + interest_capitalized;
        let release = release_inventory(
            flows.year,
            self.inventory_balance,
            inventory_addition,
            flows.revenue_recognised,
            ctx,
        );

        let prepayment_balance =
            self.prepayment_balance + flows.cash_collected - flows.revenue_recognised;

        // SG&A follows cash collected
        let sga_expense = if flows.cash_collected > Decimal::ZERO {
            flows.cash_collected * ctx.sga_percentage
        } else {
            Decimal::ZERO
        };

        let interest_expense = debt.expensed();
        let pbt = flows.revenue_recognised - release.cogs - sga_expense - interest_expense;
        let tax = if pbt > Decimal::ZERO {
            pbt * ctx.tax_rate
        } else {
            Decimal::ZERO
        };
        let pat = pbt - tax;

        let mut line = ScheduleLine {
            debt_balance: debt.ending_balance,
            land_cost: flows.land_cost,
            construction_cost: flows.construction_cost,
            interest_capitalized,
            inventory_addition,
            inventory_balance: release.closing_balance,
            presales: flows.presales_booked,
            customer_prepayment_balance: prepayment_balance,
            revenue_recognition: flows.revenue_recognised,
            cogs: release.cogs,
            sga_expense,
            interest_expense,
            pbt,
            tax,
            pat,
            cash_inflow_presales: flows.cash_collected,
            debt_disbursement: flows.disbursement,
            debt_repayment: flows.repayment,
            cash_outflow_land: flows.land_outflow,
            cash_outflow_construction: flows.construction_outflow,
            cash_outflow_interest: debt.cash_outflow(),
            cash_outflow_sga: outflow(sga_expense),
            cash_outflow_tax: outflow(tax),
            cash_balance_change: Decimal::ZERO,
            cumulative_cash_balance: Decimal::ZERO,
        };
        line.cash_balance_change = line.signed_cash_flows();
        line.cumulative_cash_balance = self.cumulative_cash + line.cash_balance_change;
        let line = line.normalized();

        let next = CarryForward {
            debt_balance: line.debt_balance,
            inventory_balance: line.inventory_balance,
            prepayment_balance: line.customer_prepayment_balance,
            cumulative_cash: line.cumulative_cash_balance,
        };
        (
            ScheduleRow {
                year: flows.year,
                line,
            },
            next,
        )
    }
}

/// Fold the year flows into rows, strictly in year order.
pub fn run_accrual(flows: &[YearFlows], ctx: &AccrualContext) -> Vec<ScheduleRow> {
    flows
        .iter()
        .scan(CarryForward::default(), |carry, year_flows| {
            let (row, next) = carry.advance(year_flows, ctx);
            *carry = next;
            Some(row)
        })
        .collect()
}

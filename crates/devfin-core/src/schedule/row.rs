use serde::{Deserialize, Serialize};

use crate::types::{Money, Year};

/// Every column of the projection for one year (or the totals line).
///
/// Outflow columns and `debt_repayment` carry negative amounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleLine {
    // Debt
    pub debt_balance: Money,
    // Costs
    pub land_cost: Money,
    pub construction_cost: Money,
    pub interest_capitalized: Money,
    // Inventory
    pub inventory_addition: Money,
    pub inventory_balance: Money,
    // Presales and revenue
    pub presales: Money,
    pub customer_prepayment_balance: Money,
    pub revenue_recognition: Money,
    // P&L
    pub cogs: Money,
    pub sga_expense: Money,
    pub interest_expense: Money,
    pub pbt: Money,
    pub tax: Money,
    pub pat: Money,
    // Cash flow
    pub cash_inflow_presales: Money,
    pub debt_disbursement: Money,
    pub debt_repayment: Money,
    pub cash_outflow_land: Money,
    pub cash_outflow_construction: Money,
    pub cash_outflow_interest: Money,
    pub cash_outflow_sga: Money,
    pub cash_outflow_tax: Money,
    pub cash_balance_change: Money,
    pub cumulative_cash_balance: Money,
}

/// One year of the projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub year: Year,
    #[serde(flatten)]
    pub line: ScheduleLine,
}

impl ScheduleLine {
    /// Sum of every signed cash column for the year.
    pub fn signed_cash_flows(&self) -> Money {
        self.cash_inflow_presales
            + self.debt_disbursement
            + self.cash_outflow_construction
            + self.cash_outflow_land
            + self.cash_outflow_interest
            + self.cash_outflow_sga
            + self.cash_outflow_tax
            + self.debt_repayment
    }

    /// Same values with trailing zeros stripped (`4.500` -> `4.5`), so every
    /// output format prints a column the same way.
    pub fn normalized(&self) -> ScheduleLine {
        ScheduleLine {
            debt_balance: self.debt_balance.normalize(),
            land_cost: self.land_cost.normalize(),
            construction_cost: self.construction_cost.normalize(),
            interest_capitalized: self.interest_capitalized.normalize(),
            inventory_addition: self.inventory_addition.normalize(),
            inventory_balance: self.inventory_balance.normalize(),
            presales: self.presales.normalize(),
            customer_prepayment_balance: self.customer_prepayment_balance.normalize(),
            revenue_recognition: self.revenue_recognition.normalize(),
            cogs: self.cogs.normalize(),
            sga_expense: self.sga_expense.normalize(),
            interest_expense: self.interest_expense.normalize(),
            pbt: self.pbt.normalize(),
            tax: self.tax.normalize(),
            pat: self.pat.normalize(),
            cash_inflow_presales: self.cash_inflow_presales.normalize(),
            debt_disbursement: self.debt_disbursement.normalize(),
            debt_repayment: self.debt_repayment.normalize(),
            cash_outflow_land: self.cash_outflow_land.normalize(),
            cash_outflow_construction: self.cash_outflow_construction.normalize(),
            cash_outflow_interest: self.cash_outflow_interest.normalize(),
            cash_outflow_sga: self.cash_outflow_sga.normalize(),
            cash_outflow_tax: self.cash_outflow_tax.normalize(),
            cash_balance_change: self.cash_balance_change.normalize(),
            cumulative_cash_balance: self.cumulative_cash_balance.normalize(),
        }
    }

    /// Totals line: flow columns are summed, balance columns take the last
    /// year's value.
    pub fn totals(rows: &[ScheduleRow]) -> ScheduleLine {
        let mut totals = rows.iter().fold(ScheduleLine::default(), |mut acc, row| {
            let l = &row.line;
            acc.land_cost += l.land_cost;
            acc.construction_cost += l.construction_cost;
            acc.interest_capitalized += l.interest_capitalized;
            acc.inventory_addition += l.inventory_addition;
            acc.presales += l.presales;
            acc.revenue_recognition += l.revenue_recognition;
            acc.cogs += l.cogs;
            acc.sga_expense += l.sga_expense;
            acc.interest_expense += l.interest_expense;
            acc.pbt += l.pbt;
            acc.tax += l.tax;
            acc.pat += l.pat;
            acc.cash_inflow_presales += l.cash_inflow_presales;
            acc.debt_disbursement += l.debt_disbursement;
            acc.debt_repayment += l.debt_repayment;
            acc.cash_outflow_land += l.cash_outflow_land;
            acc.cash_outflow_construction += l.cash_outflow_construction;
            acc.cash_outflow_interest += l.cash_outflow_interest;
            acc.cash_outflow_sga += l.cash_outflow_sga;
            acc.cash_outflow_tax += l.cash_outflow_tax;
            acc.cash_balance_change += l.cash_balance_change;
            acc
        });

        if let Some(last) = rows.last() {
            totals.debt_balance = last.line.debt_balance;
            totals.inventory_balance = last.line.inventory_balance;
            totals.customer_prepayment_balance = last.line.customer_prepayment_balance;
            totals.cumulative_cash_balance = last.line.cumulative_cash_balance;
        }
        totals.normalized()
    }
}

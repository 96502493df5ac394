//! Field tables for the intake form, as ordered `(field key, display label)` pairs.
//!
//! Iteration order is the order lines appear in charts and in the document.

pub type CategoryTable = &'static [(&'static str, &'static str)];

pub const INCOME_FIELDS: CategoryTable = &[
    ("monthly_salary", "Monthly Salary"),
    ("business_income", "Business Income"),
    ("rental_income", "Rental Income"),
    ("other_income", "Other Income"),
];

pub const EXPENSE_FIELDS: CategoryTable = &[
    ("household", "Household"),
    ("rent_emi", "Rent / EMI"),
    ("education", "Education"),
    ("insurance_premiums", "Insurance Premiums"),
    ("lifestyle", "Lifestyle"),
    ("other_expenses", "Other Expenses"),
];

pub const INVESTMENT_FIELDS: CategoryTable = &[
    ("mutual_funds", "Mutual Funds"),
    ("stocks", "Stocks"),
    ("fixed_deposits", "Fixed Deposits"),
    ("ppf_epf", "PPF / EPF"),
    ("real_estate", "Real Estate"),
    ("gold", "Gold"),
    ("other_investments", "Other Investments"),
];

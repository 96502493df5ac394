pub mod categories;

use crate::domain::profile::{
    ClientProfile, EmergencyFund, FlaggedGoal, GoalPlan, RiskSurvey, RiskTolerance,
};
use categories::{CategoryTable, EXPENSE_FIELDS, INCOME_FIELDS, INVESTMENT_FIELDS};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownLine {
    pub key: String,
    pub label: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub lines: Vec<BreakdownLine>,
    pub total: f64,
}

impl Breakdown {
    pub fn from_form(table: CategoryTable, form: &HashMap<String, String>) -> Self {
        let lines: Vec<BreakdownLine> = table
            .iter()
            .map(|(key, label)| BreakdownLine {
                key: key.to_string(),
                label: label.to_string(),
                amount: parse_amount(form.get(*key).map(String::as_str)),
            })
            .collect();
        let total = lines.iter().map(|l| l.amount).sum();
        Self { lines, total }
    }
}

/// Everything derived from one form submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intake {
    pub profile: ClientProfile,
    pub income: Breakdown,
    pub expenses: Breakdown,
    pub investments: Breakdown,
    pub emergency_fund: EmergencyFund,
    pub plan: GoalPlan,
}

impl Intake {
    pub fn from_form(form: &HashMap<String, String>) -> Self {
        let text = |key: &str| form.get(key).map(|v| v.trim().to_string()).unwrap_or_default();

        let profile = ClientProfile {
            name: text("name"),
            email: text("email"),
            phone: text("phone"),
            city: text("city"),
            age: form.get("age").and_then(|v| v.trim().parse::<i64>().ok()),
            risk: RiskTolerance::parse(form.get("risk").map(String::as_str).unwrap_or_default()),
        };

        let income = Breakdown::from_form(INCOME_FIELDS, form);
        let expenses = Breakdown::from_form(EXPENSE_FIELDS, form);
        let investments = Breakdown::from_form(INVESTMENT_FIELDS, form);

        let fund_amount = parse_amount(form.get("emergency_fund_amount").map(String::as_str));
        let fund_available = is_yes(form.get("emergency_fund"));
        let emergency_fund = EmergencyFund {
            available: fund_available,
            amount: fund_amount,
            // No coverage figure for a fund the client does not hold.
            months_covered: (fund_available && expenses.total > 0.0)
                .then(|| fund_amount / expenses.total),
        };

        let plan = GoalPlan {
            retirement: flagged_goal(form, "retirement_goal", "retirement_amount"),
            education: flagged_goal(form, "education_goal", "education_amount"),
            other_goals: text("other_goals"),
            time_horizon: text("time_horizon"),
            survey: RiskSurvey {
                loss_reaction: text("loss_reaction"),
                primary_goal: text("primary_goal"),
                income_stability: text("income_stability"),
                liabilities: text("liabilities"),
                savings_rate: text("savings_rate"),
            },
            consent: is_checked(form.get("consent")),
        };

        Self {
            profile,
            income,
            expenses,
            investments,
            emergency_fund,
            plan,
        }
    }
}

/// Lenient numeric coercion: absent, blank, unparsable or non-finite input is 0.0.
pub fn parse_amount(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return 0.0;
    };
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

fn is_yes(v: Option<&String>) -> bool {
    v.is_some_and(|s| s.trim().eq_ignore_ascii_case("yes"))
}

fn is_checked(v: Option<&String>) -> bool {
    v.is_some_and(|s| {
        matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "on" | "yes" | "true" | "1"
        )
    })
}

fn flagged_goal(form: &HashMap<String, String>, flag_key: &str, amount_key: &str) -> FlaggedGoal {
    let wanted = is_yes(form.get(flag_key));
    FlaggedGoal {
        wanted,
        target_amount: wanted.then(|| parse_amount(form.get(amount_key).map(String::as_str))),
    }
}

use crate::domain::profile::{AgeBucket, RiskTolerance};
use serde::{Deserialize, Serialize};

const DEFAULT_GOALS: &[&str] = &["Emergency Fund", "Insurance Review"];

// (bucket, risk) -> goals. Lookup is exact; anything else falls back to DEFAULT_GOALS.
const GOAL_RULES: &[(AgeBucket, &str, &[&str])] = &[
    (
        AgeBucket::Under30,
        "High",
        &["Wealth Creation", "Equity Investing", "Travel"],
    ),
    (
        AgeBucket::Thirties,
        "Moderate",
        &["Child Education", "Retirement Corpus", "Insurance Planning"],
    ),
    (
        AgeBucket::Forties,
        "Low",
        &["Debt Reduction", "Child Marriage", "Emergency Fund"],
    ),
    (
        AgeBucket::Fifties,
        "Moderate",
        &["Retirement Planning", "Health Corpus", "Passive Income"],
    ),
    (
        AgeBucket::SixtyPlus,
        "Low",
        &["Health Fund", "Fixed Income", "Estate Planning"],
    ),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub bucket: AgeBucket,
    pub goals: Vec<String>,
}

pub fn recommend_goals(bucket: AgeBucket, risk: &RiskTolerance) -> Vec<String> {
    let goals = GOAL_RULES
        .iter()
        .find(|(b, r, _)| *b == bucket && *r == risk.label())
        .map(|(_, _, goals)| *goals)
        .unwrap_or(DEFAULT_GOALS);

    goals.iter().map(|g| g.to_string()).collect()
}

pub fn classify(age: Option<i64>, risk: &RiskTolerance) -> Classification {
    let bucket = AgeBucket::from_age(age);
    Classification {
        bucket,
        goals: recommend_goals(bucket, risk),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thirties_moderate_matches_rule() {
        let c = classify(Some(35), &RiskTolerance::Moderate);
        assert_eq!(c.bucket, AgeBucket::Thirties);
        assert_eq!(
            c.goals,
            vec!["Child Education", "Retirement Corpus", "Insurance Planning"]
        );
    }

    #[test]
    fn every_rule_is_reachable() {
        for (bucket, risk, goals) in GOAL_RULES {
            let got = recommend_goals(*bucket, &RiskTolerance::parse(risk));
            assert_eq!(got, goals.to_vec());
            assert!((2..=3).contains(&got.len()));
        }
    }

    #[test]
    fn unmatched_pairs_fall_back_to_default() {
        let buckets = [
            AgeBucket::Under30,
            AgeBucket::Thirties,
            AgeBucket::Forties,
            AgeBucket::Fifties,
            AgeBucket::SixtyPlus,
            AgeBucket::Unknown,
        ];
        let risks = [
            RiskTolerance::Low,
            RiskTolerance::Moderate,
            RiskTolerance::High,
            RiskTolerance::Other(String::new()),
            RiskTolerance::Other("Aggressive".to_string()),
        ];

        for bucket in buckets {
            for risk in &risks {
                let in_table = GOAL_RULES
                    .iter()
                    .any(|(b, r, _)| *b == bucket && *r == risk.label());
                if in_table {
                    continue;
                }
                assert_eq!(
                    recommend_goals(bucket, risk),
                    vec!["Emergency Fund", "Insurance Review"],
                    "{bucket} / {risk}"
                );
            }
        }
    }

    #[test]
    fn missing_age_uses_unknown_bucket_and_default_goals() {
        let c = classify(None, &RiskTolerance::High);
        assert_eq!(c.bucket.label(), "Unknown");
        assert_eq!(c.goals, vec!["Emergency Fund", "Insurance Review"]);
    }
}

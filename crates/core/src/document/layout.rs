use crate::chart::{ChartBitmap, PieChart};
use crate::config::AdvisorIdentity;
use crate::document::format::{format_amount, yes_no};
use crate::domain::profile::FlaggedGoal;
use crate::domain::recommendation::Classification;
use crate::intake::{Breakdown, Intake};
use chrono::NaiveDate;

pub const REPORT_TITLE: &str = "Financial Summary Report";

const CONSENT_GIVEN: &str = "The client confirms that the information provided is accurate and \
consents to its use for preparing this financial plan.";
const CONSENT_MISSING: &str = "The client has not yet given consent for this information to be \
used for financial planning.";

#[derive(Debug, Clone)]
pub struct CoverPage {
    pub title: String,
    pub client_name: String,
    pub date: String,
    pub footer: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ChartBlock {
    pub chart: PieChart,
    pub bitmap: ChartBitmap,
}

#[derive(Debug, Clone)]
pub enum Block {
    Field { label: String, value: String },
    /// A field rendered in bold, used for totals.
    Total { label: String, value: String },
    Bullet(String),
    Paragraph(String),
    Chart(ChartBlock),
}

#[derive(Debug, Clone)]
pub struct Section {
    pub title: String,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone)]
pub struct ReportLayout {
    pub cover: CoverPage,
    pub sections: Vec<Section>,
}

impl ReportLayout {
    /// All visible text in reading order, one entry per line of output.
    pub fn text_lines(&self) -> Vec<String> {
        let mut out = vec![
            self.cover.title.clone(),
            self.cover.client_name.clone(),
            self.cover.date.clone(),
        ];
        out.extend(self.cover.footer.iter().cloned());

        for section in &self.sections {
            out.push(section.title.clone());
            for block in &section.blocks {
                match block {
                    Block::Field { label, value } | Block::Total { label, value } => {
                        out.push(format!("{label}: {value}"))
                    }
                    Block::Bullet(s) => out.push(format!("- {s}")),
                    Block::Paragraph(s) => out.push(s.clone()),
                    Block::Chart(c) => {
                        for s in &c.chart.slices {
                            out.push(format!("{} ({:.1}%)", s.label, s.percent));
                        }
                    }
                }
            }
        }
        out
    }

    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }
}

fn field(label: &str, value: impl Into<String>) -> Block {
    Block::Field {
        label: label.to_string(),
        value: value.into(),
    }
}

fn breakdown_section(
    title: &str,
    total_label: &str,
    breakdown: &Breakdown,
    chart: Option<ChartBlock>,
) -> Section {
    let mut blocks: Vec<Block> = breakdown
        .lines
        .iter()
        .map(|l| field(&l.label, format_amount(l.amount)))
        .collect();
    blocks.push(Block::Total {
        label: total_label.to_string(),
        value: format_amount(breakdown.total),
    });
    if let Some(chart) = chart {
        blocks.push(Block::Chart(chart));
    }
    Section {
        title: title.to_string(),
        blocks,
    }
}

fn goal_fields(blocks: &mut Vec<Block>, label: &str, amount_label: &str, goal: &FlaggedGoal) {
    blocks.push(field(label, yes_no(goal.wanted)));
    if let Some(amount) = goal.target_amount.filter(|_| goal.wanted) {
        blocks.push(field(amount_label, format_amount(amount)));
    }
}

fn chart_block(title: &str, breakdown: &Breakdown) -> anyhow::Result<Option<ChartBlock>> {
    let Some(chart) = PieChart::from_amounts(
        title,
        breakdown.lines.iter().map(|l| (l.label.as_str(), l.amount)),
    ) else {
        return Ok(None);
    };
    let bitmap = chart.render_bitmap()?;
    Ok(Some(ChartBlock { chart, bitmap }))
}

/// Fills the report template. Charts are rendered here and owned by the returned layout.
pub fn compose(
    intake: &Intake,
    classification: &Classification,
    identity: &AdvisorIdentity,
    date: NaiveDate,
) -> anyhow::Result<ReportLayout> {
    let profile = &intake.profile;

    let cover = CoverPage {
        title: REPORT_TITLE.to_string(),
        client_name: profile.name.clone(),
        date: date.format("%d %B %Y").to_string(),
        footer: vec![
            format!("Prepared by {}", identity.name),
            identity.firm.clone(),
            identity.contact.clone(),
        ],
    };

    let mut sections = Vec::with_capacity(9);

    sections.push(Section {
        title: "Client Profile".to_string(),
        blocks: vec![
            field("Name", profile.name.clone()),
            field("Email", profile.email.clone()),
            field("Phone", profile.phone.clone()),
            field("City", profile.city.clone()),
            field(
                "Age",
                profile.age.map(|a| a.to_string()).unwrap_or_default(),
            ),
            field("Age Group", classification.bucket.label()),
            field("Risk Tolerance", profile.risk.label()),
        ],
    });

    sections.push(Section {
        title: "Recommended Goals".to_string(),
        blocks: classification
            .goals
            .iter()
            .map(|g| Block::Bullet(g.clone()))
            .collect(),
    });

    sections.push(breakdown_section(
        "Income",
        "Total Income",
        &intake.income,
        chart_block("Income Distribution", &intake.income)?,
    ));
    sections.push(breakdown_section(
        "Expenses",
        "Total Expenses",
        &intake.expenses,
        chart_block("Expense Distribution", &intake.expenses)?,
    ));
    sections.push(breakdown_section(
        "Investments",
        "Total Investments",
        &intake.investments,
        None,
    ));

    let fund = &intake.emergency_fund;
    let mut fund_blocks = vec![
        field("Emergency Fund Available", yes_no(fund.available)),
        field("Emergency Fund Amount", format_amount(fund.amount)),
    ];
    if let Some(months) = fund.months_covered {
        fund_blocks.push(field("Months of Expenses Covered", format!("{months:.1}")));
    }
    fund_blocks.push(field(
        "Monthly Surplus",
        format_amount(intake.income.total - intake.expenses.total),
    ));
    sections.push(Section {
        title: "Emergency Fund".to_string(),
        blocks: fund_blocks,
    });

    let plan = &intake.plan;
    let mut goal_blocks = Vec::new();
    goal_fields(
        &mut goal_blocks,
        "Retirement Goal",
        "Retirement Target Amount",
        &plan.retirement,
    );
    goal_fields(
        &mut goal_blocks,
        "Education Goal",
        "Education Target Amount",
        &plan.education,
    );
    goal_blocks.push(field("Other Goals", plan.other_goals.clone()));
    goal_blocks.push(field("Time Horizon", plan.time_horizon.clone()));
    sections.push(Section {
        title: "Goal Planning".to_string(),
        blocks: goal_blocks,
    });

    let survey = &plan.survey;
    sections.push(Section {
        title: "Risk Capacity Assessment".to_string(),
        blocks: vec![
            field("Reaction to a 20% Loss", survey.loss_reaction.clone()),
            field("Primary Investment Goal", survey.primary_goal.clone()),
            field("Income Stability", survey.income_stability.clone()),
            field("Existing Liabilities", survey.liabilities.clone()),
            field("Savings Rate", survey.savings_rate.clone()),
        ],
    });

    sections.push(Section {
        title: "Consent".to_string(),
        blocks: vec![
            field("Consent Given", yes_no(plan.consent)),
            Block::Paragraph(
                if plan.consent {
                    CONSENT_GIVEN
                } else {
                    CONSENT_MISSING
                }
                .to_string(),
            ),
        ],
    });

    Ok(ReportLayout { cover, sections })
}

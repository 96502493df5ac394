use finsummary_core::activity::report::escape_html;
use finsummary_core::activity::ActivityReport;
use finsummary_core::intake::categories::{
    CategoryTable, EXPENSE_FIELDS, INCOME_FIELDS, INVESTMENT_FIELDS,
};
use std::fmt::Write as _;

const STYLE: &str = "body{font-family:sans-serif;max-width:960px;margin:2rem auto;padding:0 1rem;color:#222}\
fieldset{margin-bottom:1.2rem;border:1px solid #ccc;border-radius:6px}\
label{display:inline-block;min-width:220px;margin:.3rem 0}\
input,select,textarea{padding:.3rem;min-width:220px}\
.table{border-collapse:collapse;margin:1rem 0}\
.table td,.table th{border:1px solid #ccc;padding:.35rem .7rem;text-align:left}\
.error{color:#b00020}";

fn page(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>{}</title>\
         <style>{STYLE}</style></head>\n<body>\n{body}\n</body></html>",
        escape_html(title)
    )
}

fn text_input(out: &mut String, name: &str, label: &str, kind: &str) {
    let _ = writeln!(
        out,
        "<div><label for=\"{name}\">{label}</label><input type=\"{kind}\" id=\"{name}\" name=\"{name}\"></div>"
    );
}

fn select(out: &mut String, name: &str, label: &str, options: &[&str]) {
    let _ = write!(
        out,
        "<div><label for=\"{name}\">{label}</label><select id=\"{name}\" name=\"{name}\">"
    );
    for opt in options {
        let _ = write!(out, "<option value=\"{opt}\">{opt}</option>");
    }
    out.push_str("</select></div>\n");
}

fn amount_fieldset(out: &mut String, legend: &str, table: CategoryTable) {
    let _ = writeln!(out, "<fieldset><legend>{legend}</legend>");
    for (key, label) in table {
        let _ = writeln!(
            out,
            "<div><label for=\"{key}\">{label}</label>\
             <input type=\"number\" step=\"0.01\" id=\"{key}\" name=\"{key}\"></div>"
        );
    }
    out.push_str("</fieldset>\n");
}

pub fn intake_form() -> String {
    let mut body = String::from(
        "<h1>Financial Profile</h1>\n<form method=\"post\" action=\"/\">\n\
         <fieldset><legend>Client</legend>\n",
    );
    text_input(&mut body, "name", "Full Name", "text");
    text_input(&mut body, "email", "Email", "email");
    text_input(&mut body, "phone", "Phone", "tel");
    text_input(&mut body, "city", "City", "text");
    text_input(&mut body, "age", "Age", "number");
    select(&mut body, "risk", "Risk Tolerance", &["Low", "Moderate", "High"]);
    body.push_str("</fieldset>\n");

    amount_fieldset(&mut body, "Monthly Income", INCOME_FIELDS);
    amount_fieldset(&mut body, "Monthly Expenses", EXPENSE_FIELDS);
    amount_fieldset(&mut body, "Investments", INVESTMENT_FIELDS);

    body.push_str("<fieldset><legend>Emergency Fund</legend>\n");
    select(&mut body, "emergency_fund", "Emergency Fund Available", &["No", "Yes"]);
    text_input(&mut body, "emergency_fund_amount", "Emergency Fund Amount", "number");
    body.push_str("</fieldset>\n<fieldset><legend>Goals</legend>\n");
    select(&mut body, "retirement_goal", "Planning for Retirement", &["No", "Yes"]);
    text_input(&mut body, "retirement_amount", "Retirement Target Amount", "number");
    select(&mut body, "education_goal", "Planning for Education", &["No", "Yes"]);
    text_input(&mut body, "education_amount", "Education Target Amount", "number");
    text_input(&mut body, "other_goals", "Other Goals", "text");
    select(
        &mut body,
        "time_horizon",
        "Time Horizon",
        &["Less than 3 years", "3-5 years", "5-10 years", "More than 10 years"],
    );
    body.push_str("</fieldset>\n<fieldset><legend>Risk Capacity</legend>\n");
    select(
        &mut body,
        "loss_reaction",
        "If your portfolio fell 20%",
        &["Sell everything", "Sell some", "Hold", "Buy more"],
    );
    select(
        &mut body,
        "primary_goal",
        "Primary Investment Goal",
        &["Capital preservation", "Regular income", "Balanced growth", "Aggressive growth"],
    );
    select(
        &mut body,
        "income_stability",
        "Income Stability",
        &["Very stable", "Stable", "Variable", "Uncertain"],
    );
    select(
        &mut body,
        "liabilities",
        "Existing Liabilities",
        &["None", "Low", "Moderate", "High"],
    );
    select(
        &mut body,
        "savings_rate",
        "Savings Rate",
        &["Below 10%", "10-20%", "20-30%", "Above 30%"],
    );
    body.push_str(
        "</fieldset>\n<div><label><input type=\"checkbox\" name=\"consent\"> \
         I confirm the information above is accurate and consent to its use for financial planning.\
         </label></div>\n<button type=\"submit\">Download Summary</button>\n</form>\n\
         <p><a href=\"/admin-login\">Operator login</a></p>",
    );

    page("Financial Profile", &body)
}

pub fn login_form(error: Option<&str>) -> String {
    let mut body = String::from("<h1>Operator Login</h1>\n");
    if let Some(error) = error {
        let _ = writeln!(body, "<h3 class=\"error\">{}</h3>", escape_html(error));
    }
    body.push_str("<form method=\"post\" action=\"/admin-login\">\n");
    text_input(&mut body, "username", "Username", "text");
    text_input(&mut body, "password", "Password", "password");
    body.push_str("<button type=\"submit\">Log in</button>\n</form>");
    page("Operator Login", &body)
}

pub fn no_activity() -> String {
    page(
        "Activity Log",
        "<h3>No activity yet.</h3>\n<p><a href=\"/logout\">Log out</a></p>",
    )
}

pub fn activity_log(report: &ActivityReport, chart_svg: Option<&str>) -> String {
    let mut body = format!(
        "<h1>Activity Log</h1>\n<p>{} records. <a href=\"/activity-log/export\">Export spreadsheet</a> \
         | <a href=\"/logout\">Log out</a></p>\n",
        report.total()
    );
    if let Some(svg) = chart_svg {
        let _ = writeln!(body, "<div class=\"chart\">{svg}</div>");
    }
    body.push_str(&report.html_summary());
    body.push('\n');
    body.push_str(&report.html_table());
    page("Activity Log", &body)
}

use axum::{
    extract::{FromRef, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use axum_extra::extract::cookie::{Key, SignedCookieJar};
use chrono::Utc;
use finsummary_core::activity::{ActivityLog, ActivityReport};
use finsummary_core::config::{AdminCredentials, AdvisorIdentity};
use finsummary_core::document::ascii_filename;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::pages;
use crate::session::{removal_cookie, AdminSession};

const PDF_CONTENT_TYPE: &str = "application/pdf";
const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const EXPORT_FILENAME: &str = "activity_report.xlsx";

#[derive(Clone)]
pub struct AppState {
    pub log: ActivityLog,
    pub identity: Arc<AdvisorIdentity>,
    /// `None` disables operator login entirely.
    pub credentials: Option<Arc<AdminCredentials>>,
    pub key: Key,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/", get(intake_form).post(submit_intake))
        .route("/admin-login", get(login_form).post(login))
        .route("/activity-log", get(activity_log))
        .route("/activity-log/export", get(export_activity))
        .route("/logout", get(logout))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

async fn intake_form() -> Html<String> {
    Html(pages::intake_form())
}

async fn submit_intake(
    State(state): State<AppState>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Response, StatusCode> {
    let today = chrono::Local::now().date_naive();
    let log = state.log.clone();
    let identity = state.identity.clone();

    let doc = run_blocking(move || {
        finsummary_core::pipeline::generate_summary(&form, &identity, &log, today)
    })
    .await?;

    let disposition = attachment_disposition(&doc.filename);
    Ok((
        [
            (header::CONTENT_TYPE, PDF_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        doc.bytes,
    )
        .into_response())
}

async fn login_form() -> Html<String> {
    Html(pages::login_form(None))
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let verified = match &state.credentials {
        Some(creds) => creds.verify(&form.username, &form.password),
        None => {
            tracing::warn!("operator login attempted but ADMIN_USERNAME/ADMIN_PASSWORD are not set");
            false
        }
    };

    if !verified {
        tracing::warn!(username = %form.username, "operator login rejected");
        return (
            StatusCode::UNAUTHORIZED,
            Html(pages::login_form(Some("Invalid credentials"))),
        )
            .into_response();
    }

    tracing::info!(username = %form.username, "operator logged in");
    let session = AdminSession::new(&form.username, Utc::now());
    (jar.add(session.into_cookie()), Redirect::to("/activity-log")).into_response()
}

async fn logout(jar: SignedCookieJar) -> (SignedCookieJar, Redirect) {
    (jar.remove(removal_cookie()), Redirect::to("/admin-login"))
}

async fn activity_log(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<Response, StatusCode> {
    if AdminSession::from_jar(&jar, Utc::now()).is_none() {
        return Ok(Redirect::to("/admin-login").into_response());
    }

    let log = state.log.clone();
    let page = run_blocking(move || {
        let Some(report) = log.report()? else {
            return Ok(pages::no_activity());
        };
        let svg = report.pie_chart().map(|c| c.render_svg()).transpose()?;
        Ok(pages::activity_log(&report, svg.as_deref()))
    })
    .await?;

    Ok(Html(page).into_response())
}

async fn export_activity(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<Response, StatusCode> {
    if AdminSession::from_jar(&jar, Utc::now()).is_none() {
        return Ok(Redirect::to("/admin-login").into_response());
    }

    let log = state.log.clone();
    let export = run_blocking(move || {
        log.report()?
            .as_ref()
            .map(ActivityReport::to_xlsx)
            .transpose()
    })
    .await?;

    let Some(bytes) = export else {
        return Ok(Html(pages::no_activity()).into_response());
    };

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILENAME}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// `Content-Disposition` with an ASCII `filename` and the exact UTF-8 name in `filename*`.
fn attachment_disposition(filename: &str) -> String {
    let fallback = ascii_filename(filename);
    if fallback == filename {
        return format!("attachment; filename=\"{filename}\"");
    }
    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        utf8_percent_encode(filename, NON_ALPHANUMERIC)
    )
}

/// Runs file and rendering work off the async workers; failures are reported and become a 500.
async fn run_blocking<T, F>(f: F) -> Result<T, StatusCode>
where
    T: Send + 'static,
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
{
    let joined = tokio::task::spawn_blocking(f).await.map_err(|e| {
        let err = anyhow::Error::new(e);
        sentry_anyhow::capture_anyhow(&err);
        tracing::error!(error = %err, "blocking task panicked");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    joined.map_err(|e| {
        sentry_anyhow::capture_anyhow(&e);
        tracing::error!(error = %format!("{e:#}"), "request failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    struct Harness {
        _dir: tempfile::TempDir,
        log: ActivityLog,
        app: Router,
    }

    fn harness() -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let log = ActivityLog::new(dir.path().join("activity.csv"));
        let state = AppState {
            log: log.clone(),
            identity: Arc::new(AdvisorIdentity::default()),
            credentials: Some(Arc::new(AdminCredentials::new("operator", "correct horse"))),
            key: Key::generate(),
        };
        Harness {
            _dir: dir,
            log,
            app: router(state),
        }
    }

    fn form_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut req = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        req.body(Body::empty()).unwrap()
    }

    async fn body_string(res: Response) -> String {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    async fn login_cookie(app: &Router) -> String {
        let res = app
            .clone()
            .oneshot(form_post("/admin-login", "username=operator&password=correct+horse"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()[header::LOCATION], "/activity-log");
        let set_cookie = res.headers()[header::SET_COOKIE].to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn submission_returns_pdf_attachment_and_logs() {
        let h = harness();
        let res = h
            .app
            .clone()
            .oneshot(form_post("/", "name=Asha+Rao&age=35&risk=Moderate"))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[header::CONTENT_TYPE], PDF_CONTENT_TYPE);
        assert_eq!(
            res.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Asha_Rao_summary.pdf\""
        );
        let body = res.into_body().collect().await.unwrap().to_bytes();
        assert!(body.starts_with(b"%PDF"));

        let records = h.log.read_all().unwrap().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].actor, "Asha Rao");
        assert_eq!(records[0].action, "Generated");
    }

    #[tokio::test]
    async fn non_latin_names_keep_their_letters_in_the_download_name() {
        let h = harness();
        let res = h
            .app
            .clone()
            .oneshot(form_post(
                "/",
                "name=%E0%A4%86%E0%A4%B6%E0%A4%BE+%E0%A4%B0%E0%A4%BE%E0%A4%B5+Jos%C3%A9&age=35",
            ))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Jos_summary.pdf\"; \
             filename*=UTF-8''%E0%A4%86%E0%A4%B6%E0%A4%BE%5F%E0%A4%B0%E0%A4%BE%E0%A4%B5%5FJos%C3%A9%5Fsummary%2Epdf"
        );
        let records = h.log.read_all().unwrap().unwrap();
        assert_eq!(records[0].actor, "आशा राव José");
    }

    #[tokio::test]
    async fn protected_pages_redirect_without_session() {
        let h = harness();
        for uri in ["/activity-log", "/activity-log/export"] {
            let res = h.app.clone().oneshot(get(uri, None)).await.unwrap();
            assert_eq!(res.status(), StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(res.headers()[header::LOCATION], "/admin-login");
        }
    }

    #[tokio::test]
    async fn forged_session_cookie_is_ignored() {
        let h = harness();
        let res = h
            .app
            .clone()
            .oneshot(get("/activity-log", Some("admin_session=1760000000|operator")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn bad_credentials_are_rejected_inline() {
        let h = harness();
        let res = h
            .app
            .clone()
            .oneshot(form_post("/admin-login", "username=operator&password=nope"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(res.headers().get(header::SET_COOKIE).is_none());
        assert!(body_string(res).await.contains("Invalid credentials"));
    }

    #[tokio::test]
    async fn activity_log_before_and_after_submissions() {
        let h = harness();
        let cookie = login_cookie(&h.app).await;

        let res = h
            .app
            .clone()
            .oneshot(get("/activity-log", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(body_string(res).await.contains("No activity yet."));

        for body in ["name=Asha+Rao&age=35&risk=Moderate", "name=Ravi&age=61&risk=Low"] {
            let res = h.app.clone().oneshot(form_post("/", body)).await.unwrap();
            assert_eq!(res.status(), StatusCode::OK);
        }

        let res = h
            .app
            .clone()
            .oneshot(get("/activity-log", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let html = body_string(res).await;
        assert!(html.contains("<td>Asha Rao</td><td>Generated</td>"));
        assert!(html.contains("<td>Ravi</td><td>Generated</td>"));
        assert!(html.contains("<svg"));
    }

    #[tokio::test]
    async fn export_returns_spreadsheet() {
        let h = harness();
        let cookie = login_cookie(&h.app).await;

        let res = h
            .app
            .clone()
            .oneshot(get("/activity-log/export", Some(&cookie)))
            .await
            .unwrap();
        assert!(body_string(res).await.contains("No activity yet."));

        h.log.record("Asha Rao", "Generated").unwrap();
        let res = h
            .app
            .clone()
            .oneshot(get("/activity-log/export", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[header::CONTENT_TYPE], XLSX_CONTENT_TYPE);
        let body = res.into_body().collect().await.unwrap().to_bytes();
        assert!(body.starts_with(b"PK"));
    }

    #[tokio::test]
    async fn logout_clears_session_cookie() {
        let h = harness();
        let cookie = login_cookie(&h.app).await;
        let res = h
            .app
            .clone()
            .oneshot(get("/logout", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()[header::LOCATION], "/admin-login");
        let set_cookie = res.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(set_cookie.starts_with("admin_session="));
        assert!(set_cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn login_disabled_without_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(AppState {
            log: ActivityLog::new(dir.path().join("activity.csv")),
            identity: Arc::new(AdvisorIdentity::default()),
            credentials: None,
            key: Key::generate(),
        });
        let res = app
            .oneshot(form_post("/admin-login", "username=&password="))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}

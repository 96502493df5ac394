pub mod activity;
pub mod chart;
pub mod document;
pub mod domain;
pub mod intake;
pub mod pipeline;

pub mod config {
    use anyhow::Context;
    use sha2::{Digest, Sha256};

    const DEFAULT_ACTIVITY_LOG_PATH: &str = "pdf_activity_log.csv";
    const DEFAULT_ADVISOR_FIRM: &str = "Financial Planning Desk";
    const DEFAULT_ADVISOR_NAME: &str = "Certified Financial Planner";
    const DEFAULT_ADVISOR_CONTACT: &str = "planning@example.com";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub activity_log_path: String,
        pub admin_username: Option<String>,
        pub admin_password: Option<String>,
        pub session_secret: Option<String>,
        pub sentry_dsn: Option<String>,
        pub advisor_firm: String,
        pub advisor_name: String,
        pub advisor_contact: String,
    }

    /// Footer block printed on the cover page of every generated report.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct AdvisorIdentity {
        pub firm: String,
        pub name: String,
        pub contact: String,
    }

    impl Default for AdvisorIdentity {
        fn default() -> Self {
            Self {
                firm: DEFAULT_ADVISOR_FIRM.to_string(),
                name: DEFAULT_ADVISOR_NAME.to_string(),
                contact: DEFAULT_ADVISOR_CONTACT.to_string(),
            }
        }
    }

    /// Operator credentials. Only the SHA-256 digest of the password is kept.
    #[derive(Clone)]
    pub struct AdminCredentials {
        username: String,
        password_sha256: [u8; 32],
    }

    impl std::fmt::Debug for AdminCredentials {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("AdminCredentials")
                .field("username", &self.username)
                .finish_non_exhaustive()
        }
    }

    impl AdminCredentials {
        pub fn new(username: &str, password: &str) -> Self {
            Self {
                username: username.to_string(),
                password_sha256: digest(password),
            }
        }

        pub fn username(&self) -> &str {
            &self.username
        }

        pub fn verify(&self, username: &str, password: &str) -> bool {
            // Compare both digests in full so the check does not short-circuit on the username.
            let user_ok = digest(username) == digest(&self.username);
            let pass_ok = digest(password) == self.password_sha256;
            user_ok & pass_ok
        }
    }

    fn digest(s: &str) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&Sha256::digest(s.as_bytes()));
        out
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                activity_log_path: std::env::var("ACTIVITY_LOG_PATH")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_ACTIVITY_LOG_PATH.to_string()),
                admin_username: non_empty_var("ADMIN_USERNAME"),
                admin_password: non_empty_var("ADMIN_PASSWORD"),
                session_secret: non_empty_var("SESSION_SECRET"),
                sentry_dsn: non_empty_var("SENTRY_DSN"),
                advisor_firm: non_empty_var("ADVISOR_FIRM")
                    .unwrap_or_else(|| DEFAULT_ADVISOR_FIRM.to_string()),
                advisor_name: non_empty_var("ADVISOR_NAME")
                    .unwrap_or_else(|| DEFAULT_ADVISOR_NAME.to_string()),
                advisor_contact: non_empty_var("ADVISOR_CONTACT")
                    .unwrap_or_else(|| DEFAULT_ADVISOR_CONTACT.to_string()),
            })
        }

        pub fn require_admin_credentials(&self) -> anyhow::Result<AdminCredentials> {
            let username = self
                .admin_username
                .as_deref()
                .context("ADMIN_USERNAME is required")?;
            let password = self
                .admin_password
                .as_deref()
                .context("ADMIN_PASSWORD is required")?;
            Ok(AdminCredentials::new(username, password))
        }

        pub fn advisor_identity(&self) -> AdvisorIdentity {
            AdvisorIdentity {
                firm: self.advisor_firm.clone(),
                name: self.advisor_name.clone(),
                contact: self.advisor_contact.clone(),
            }
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|s| !s.trim().is_empty())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn credentials_verify_exact_pair_only() {
            let creds = AdminCredentials::new("operator", "s3cret-pass");
            assert!(creds.verify("operator", "s3cret-pass"));
            assert!(!creds.verify("operator", "s3cret-pas"));
            assert!(!creds.verify("Operator", "s3cret-pass"));
            assert!(!creds.verify("", ""));
        }

        #[test]
        fn debug_output_hides_password_digest() {
            let creds = AdminCredentials::new("operator", "s3cret-pass");
            let s = format!("{creds:?}");
            assert!(s.contains("operator"));
            assert!(!s.contains("password"));
        }

        #[test]
        fn missing_credentials_are_reported_by_name() {
            let settings = Settings {
                activity_log_path: DEFAULT_ACTIVITY_LOG_PATH.to_string(),
                admin_username: Some("operator".to_string()),
                admin_password: None,
                session_secret: None,
                sentry_dsn: None,
                advisor_firm: DEFAULT_ADVISOR_FIRM.to_string(),
                advisor_name: DEFAULT_ADVISOR_NAME.to_string(),
                advisor_contact: DEFAULT_ADVISOR_CONTACT.to_string(),
            };
            let err = settings.require_admin_credentials().unwrap_err();
            assert!(err.to_string().contains("ADMIN_PASSWORD"));
        }
    }
}

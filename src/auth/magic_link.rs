use crate::error::AppResult;

/// Delivers a sign-in link to its owner.
pub trait LinkSender: Send + Sync {
    fn send(&self, email: &str, link: &str) -> AppResult<()>;
}

/// Writes the link to the application log; stands in for a mail relay.
pub struct LogLinkSender;

impl LinkSender for LogLinkSender {
    fn send(&self, email: &str, link: &str) -> AppResult<()> {
        tracing::info!(email, link, "Magic link issued");
        Ok(())
    }
}

pub fn build_link(base_url: &str, token: &str) -> String {
    format!("{}/auth/verify?token={}", base_url.trim_end_matches('/'), token)
}

/// Only same-site paths are accepted as post-sign-in destinations.
pub fn sanitize_redirect(redirect_to: Option<&str>) -> Option<String> {
    redirect_to
        .map(str::trim)
        .filter(|r| r.starts_with('/') && !r.starts_with("//"))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_points_at_verify_endpoint() {
        assert_eq!(
            build_link("https://leave.brink.eu/", "abc"),
            "https://leave.brink.eu/auth/verify?token=abc"
        );
    }

    #[test]
    fn only_local_redirects_survive() {
        assert_eq!(sanitize_redirect(Some("/manager")), Some("/manager".into()));
        assert_eq!(sanitize_redirect(Some("https://evil.example")), None);
        assert_eq!(sanitize_redirect(Some("//evil.example")), None);
        assert_eq!(sanitize_redirect(None), None);
    }
}

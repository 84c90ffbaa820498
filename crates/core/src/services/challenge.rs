//! Anti-abuse challenge verification.

use async_trait::async_trait;
use serde::Deserialize;
use tierboard_common::AppResult;

const SITEVERIFY_URL: &str = "https://challenges.cloudflare.com/turnstile/v0/siteverify";

/// Verifies a client-supplied challenge token before a ballot is accepted.
#[async_trait]
pub trait ChallengeVerifier: Send + Sync {
    /// Returns whether the token passes. `Err` is reserved for verifier
    /// misconfiguration, a failed check is `Ok(false)`.
    async fn verify(&self, token: Option<&str>, remote_ip: Option<&str>) -> AppResult<bool>;
}

/// Cloudflare Turnstile verifier.
///
/// Without a configured secret every token passes, so local development
/// does not need a Turnstile site.
pub struct TurnstileVerifier {
    secret: Option<String>,
    http: reqwest::Client,
}

impl TurnstileVerifier {
    #[must_use]
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret,
            http: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct SiteverifyResponse {
    success: bool,
}

#[async_trait]
impl ChallengeVerifier for TurnstileVerifier {
    async fn verify(&self, token: Option<&str>, remote_ip: Option<&str>) -> AppResult<bool> {
        let Some(secret) = self.secret.as_deref() else {
            return Ok(true);
        };
        let Some(token) = token else {
            return Ok(false);
        };

        let mut form = vec![("secret", secret), ("response", token)];
        if let Some(ip) = remote_ip {
            form.push(("remoteip", ip));
        }

        match self.http.post(SITEVERIFY_URL).form(&form).send().await {
            Ok(response) => match response.json::<SiteverifyResponse>().await {
                Ok(body) => Ok(body.success),
                Err(e) => {
                    tracing::warn!(error = %e, "challenge verifier returned malformed body");
                    Ok(false)
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "challenge verification request failed");
                Ok(false)
            }
        }
    }
}

/// Verifier with a fixed outcome, for tests.
pub struct StaticVerifier(pub bool);

#[async_trait]
impl ChallengeVerifier for StaticVerifier {
    async fn verify(&self, _token: Option<&str>, _remote_ip: Option<&str>) -> AppResult<bool> {
        Ok(self.0)
    }
}

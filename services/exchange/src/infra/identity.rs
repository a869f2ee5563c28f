use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use url::Url;

use santa_domain::admin::AuthProvider;

use crate::config::OAuthCredentials;
use crate::domain::repository::IdentityPort;
use crate::domain::types::ProviderProfile;
use crate::error::ExchangeServiceError;

struct Endpoints {
    authorize: &'static str,
    token: &'static str,
    profile: &'static str,
    scope: &'static str,
}

fn endpoints(provider: AuthProvider) -> Endpoints {
    match provider {
        AuthProvider::Discord => Endpoints {
            authorize: "https://discord.com/api/oauth2/authorize",
            token: "https://discord.com/api/oauth2/token",
            profile: "https://discord.com/api/users/@me",
            scope: "identify email",
        },
        AuthProvider::Google => Endpoints {
            authorize: "https://accounts.google.com/o/oauth2/v2/auth",
            token: "https://oauth2.googleapis.com/token",
            profile: "https://www.googleapis.com/oauth2/v2/userinfo",
            scope: "openid email profile",
        },
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct DiscordUser {
    id: String,
    username: String,
    email: Option<String>,
    #[serde(default)]
    verified: bool,
}

#[derive(Deserialize)]
struct GoogleUser {
    id: String,
    name: Option<String>,
    email: Option<String>,
    #[serde(default)]
    verified_email: bool,
}

/// OAuth2 authorization-code flow against Discord and Google.
#[derive(Clone)]
pub struct HttpIdentityProvider {
    pub client: Client,
    pub discord: Option<OAuthCredentials>,
    pub google: Option<OAuthCredentials>,
    pub public_base_url: String,
}

impl HttpIdentityProvider {
    pub fn new(
        timeout: Duration,
        discord: Option<OAuthCredentials>,
        google: Option<OAuthCredentials>,
        public_base_url: String,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            discord,
            google,
            public_base_url,
        })
    }

    fn credentials(
        &self,
        provider: AuthProvider,
    ) -> Result<&OAuthCredentials, ExchangeServiceError> {
        let creds = match provider {
            AuthProvider::Discord => self.discord.as_ref(),
            AuthProvider::Google => self.google.as_ref(),
        };
        creds.ok_or(ExchangeServiceError::InvalidRequest(
            "sign-in provider is not configured",
        ))
    }

    pub fn redirect_uri(&self, provider: AuthProvider) -> String {
        format!("{}/auth/{provider}/callback", self.public_base_url)
    }
}

fn upstream(
    provider: AuthProvider,
    stage: &'static str,
) -> impl FnOnce(reqwest::Error) -> ExchangeServiceError {
    move |e| {
        tracing::warn!(error = %e, %provider, stage, "identity provider unavailable");
        ExchangeServiceError::UpstreamUnavailable
    }
}

impl IdentityPort for HttpIdentityProvider {
    fn authorize_url(
        &self,
        provider: AuthProvider,
        state: &str,
    ) -> Result<String, ExchangeServiceError> {
        let creds = self.credentials(provider)?;
        let ep = endpoints(provider);
        let redirect_uri = self.redirect_uri(provider);
        let mut params = vec![
            ("client_id", creds.client_id.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("response_type", "code"),
            ("scope", ep.scope),
            ("state", state),
        ];
        if provider == AuthProvider::Google {
            params.push(("prompt", "select_account"));
        }
        let url = Url::parse_with_params(ep.authorize, &params)
            .map_err(|e| anyhow::anyhow!("build authorize url: {e}"))?;
        Ok(url.into())
    }

    async fn exchange_code(
        &self,
        provider: AuthProvider,
        code: &str,
    ) -> Result<String, ExchangeServiceError> {
        let creds = self.credentials(provider)?;
        let redirect_uri = self.redirect_uri(provider);
        let form = [
            ("client_id", creds.client_id.as_str()),
            ("client_secret", creds.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri.as_str()),
        ];
        let resp = self
            .client
            .post(endpoints(provider).token)
            .form(&form)
            .send()
            .await
            .map_err(upstream(provider, "token"))?;

        if resp.status().is_server_error() {
            tracing::warn!(%provider, status = %resp.status(), "token endpoint failed");
            return Err(ExchangeServiceError::UpstreamUnavailable);
        }
        if !resp.status().is_success() {
            // Expired or replayed authorization code.
            tracing::info!(%provider, status = %resp.status(), "token exchange rejected");
            return Err(ExchangeServiceError::Unauthorized);
        }
        let token: TokenResponse = resp.json().await.map_err(upstream(provider, "token body"))?;
        Ok(token.access_token)
    }

    async fn fetch_profile(
        &self,
        provider: AuthProvider,
        access_token: &str,
    ) -> Result<ProviderProfile, ExchangeServiceError> {
        let resp = self
            .client
            .get(endpoints(provider).profile)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(upstream(provider, "profile"))?;
        if !resp.status().is_success() {
            tracing::warn!(%provider, status = %resp.status(), "profile fetch failed");
            return Err(ExchangeServiceError::UpstreamUnavailable);
        }

        // Only provider-verified emails are trusted for admin matching.
        let profile = match provider {
            AuthProvider::Discord => {
                let user: DiscordUser =
                    resp.json().await.map_err(upstream(provider, "profile body"))?;
                ProviderProfile {
                    id: user.id,
                    username: user.username,
                    email: user.email.filter(|_| user.verified),
                }
            }
            AuthProvider::Google => {
                let user: GoogleUser =
                    resp.json().await.map_err(upstream(provider, "profile body"))?;
                let username = user
                    .name
                    .clone()
                    .or_else(|| user.email.clone())
                    .unwrap_or_else(|| user.id.clone());
                ProviderProfile {
                    id: user.id,
                    username,
                    email: user.email.filter(|_| user.verified_email),
                }
            }
        };
        Ok(profile)
    }
}

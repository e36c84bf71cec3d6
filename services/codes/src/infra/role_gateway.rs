use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::domain::ports::RoleGateway;
use crate::domain::types::RoleGrant;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
enum RoleAction {
    Grant,
    Revoke,
}

#[derive(Serialize)]
struct RoleWebhookPayload<'a> {
    action: RoleAction,
    #[serde(rename = "roleId")]
    role_id: &'a str,
    claimant: &'a str,
    #[serde(rename = "revokeAt", serialize_with = "rolegate_core::serde::to_unix_millis")]
    revoke_at: &'a DateTime<Utc>,
}

/// Posts grant/revoke instructions to the chat bot, which applies them.
/// Requests carry the webhook's own bearer token.
#[derive(Clone)]
pub struct WebhookRoleGateway {
    client: reqwest::Client,
    url: reqwest::Url,
    token: String,
}

impl WebhookRoleGateway {
    pub fn new(url: &str, token: impl Into<String>) -> anyhow::Result<Self> {
        let url = reqwest::Url::parse(url).context("invalid ROLE_WEBHOOK_URL")?;
        let token = token.into();
        if token.trim().is_empty() {
            anyhow::bail!("ROLE_WEBHOOK_TOKEN must be set when ROLE_WEBHOOK_URL is");
        }
        let client = reqwest::Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .context("failed to build webhook client")?;
        Ok(Self {
            client,
            url,
            token,
        })
    }

    async fn send(&self, action: RoleAction, grant: &RoleGrant) -> anyhow::Result<()> {
        let payload = RoleWebhookPayload {
            action,
            role_id: &grant.role_id,
            claimant: grant.claimant.as_str(),
            revoke_at: &grant.revoke_at,
        };
        self.client
            .post(self.url.clone())
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("role webhook {action:?} request failed"))?
            .error_for_status()
            .with_context(|| format!("role webhook rejected {action:?}"))?;
        Ok(())
    }
}

impl RoleGateway for WebhookRoleGateway {
    async fn grant(&self, grant: &RoleGrant) -> anyhow::Result<()> {
        self.send(RoleAction::Grant, grant).await
    }

    async fn revoke(&self, grant: &RoleGrant) -> anyhow::Result<()> {
        self.send(RoleAction::Revoke, grant).await
    }
}

/// Records grants in the log only. Used when no webhook is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRoleGateway;

impl RoleGateway for LogRoleGateway {
    async fn grant(&self, grant: &RoleGrant) -> anyhow::Result<()> {
        info!(
            role_id = %grant.role_id,
            claimant = %grant.claimant,
            revoke_at = %grant.revoke_at,
            "role granted (log only)"
        );
        Ok(())
    }

    async fn revoke(&self, grant: &RoleGrant) -> anyhow::Result<()> {
        info!(
            role_id = %grant.role_id,
            claimant = %grant.claimant,
            "role revoked (log only)"
        );
        Ok(())
    }
}

/// Gateway chosen at startup from configuration.
#[derive(Clone)]
pub enum ConfiguredRoleGateway {
    Webhook(WebhookRoleGateway),
    Log(LogRoleGateway),
}

impl ConfiguredRoleGateway {
    pub fn from_webhook(url: Option<&str>, token: Option<&str>) -> anyhow::Result<Self> {
        match url {
            Some(url) => Ok(Self::Webhook(WebhookRoleGateway::new(
                url,
                token.unwrap_or_default(),
            )?)),
            None => Ok(Self::Log(LogRoleGateway)),
        }
    }
}

impl RoleGateway for ConfiguredRoleGateway {
    async fn grant(&self, grant: &RoleGrant) -> anyhow::Result<()> {
        match self {
            Self::Webhook(g) => g.grant(grant).await,
            Self::Log(g) => g.grant(grant).await,
        }
    }

    async fn revoke(&self, grant: &RoleGrant) -> anyhow::Result<()> {
        match self {
            Self::Webhook(g) => g.revoke(grant).await,
            Self::Log(g) => g.revoke(grant).await,
        }
    }
}

use std::sync::Arc;

use tracing::{info, warn};

use crate::client::{ApiError, GatewayApi};
use crate::models::{RuleAction, RuleDraft};

use super::Session;
use super::activity::Action;
use super::error::ConsoleError;

/// Composes and deploys policy rules. Admin only.
pub struct RuleAdmin {
    api: Arc<dyn GatewayApi>,
    session: Session,
}

impl RuleAdmin {
    pub fn new(api: Arc<dyn GatewayApi>, session: Session) -> Self {
        Self { api, session }
    }

    pub async fn draft(&self) -> RuleDraft {
        self.session.rule_draft().await
    }

    pub async fn set_pattern(&self, pattern: impl Into<String>) -> Result<(), ConsoleError> {
        let pattern = pattern.into();
        self.edit(move |draft| draft.pattern = pattern).await
    }

    pub async fn set_action(&self, action: RuleAction) -> Result<(), ConsoleError> {
        self.edit(move |draft| draft.action = action).await
    }

    pub async fn set_description(&self, description: impl Into<String>) -> Result<(), ConsoleError> {
        let description = description.into();
        self.edit(move |draft| draft.description = description).await
    }

    /// Draft edits are refused while a submission is in flight, so the
    /// post-success reset cannot discard them.
    async fn edit(&self, apply: impl FnOnce(&mut RuleDraft)) -> Result<(), ConsoleError> {
        self.session.admin(Action::SubmitRule).await?;
        if self.session.is_busy(Action::SubmitRule) {
            return Err(ConsoleError::Busy(Action::SubmitRule));
        }
        apply(&mut self.session.lock().await.rule_draft);
        Ok(())
    }

    /// Post the current draft to the gateway.
    ///
    /// On success the draft is reset to its defaults and the submitted rule is
    /// returned. On failure the draft is left exactly as it was. The pattern is
    /// not validated locally.
    pub async fn submit_rule(&self) -> Result<RuleDraft, ConsoleError> {
        let (credential, epoch) = self.session.admin(Action::SubmitRule).await?;
        let _guard = self.session.begin(Action::SubmitRule)?;

        let draft = self.session.rule_draft().await;

        match self.api.create_rule(&credential, &draft).await {
            Ok(()) => {
                let mut state = self.session.lock().await;
                if state.epoch == epoch {
                    state.rule_draft = RuleDraft::default();
                }
                info!("Rule deployed: {} {:?}", draft.action, draft.pattern);
                Ok(draft)
            }
            Err(ApiError::Status { status, detail }) if (400..500).contains(&status) => {
                warn!("Rule rejected (HTTP {}): {}", status, detail);
                Err(ConsoleError::ValidationFailed { detail })
            }
            Err(err) => {
                warn!("Rule submission failed: {}", err);
                Err(ConsoleError::from_api(err))
            }
        }
    }
}

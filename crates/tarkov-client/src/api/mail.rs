use serde_json::Value;
use tracing::info;

use super::ACTION_TM;
use crate::client::{SessionClient, action_result, handle_response};
use crate::error::{ClientError, Result};
use crate::requests::{
    CrcRequest, DialogRequest, DialogViewRequest, ItemAction, ItemLocation, MoveTarget,
    MovingRequest, PreviousOwner,
};

/// Container a claimed reward is dropped into
const REWARD_CONTAINER: &str = "hideout";

impl SessionClient {
    pub async fn mail_dialogs(&mut self) -> Result<Value> {
        let url = self.prod("/client/mail/dialog/list");
        self.request("mail_dialogs", url, Some(&CrcRequest::FRESH)).await
    }

    /// Messages of one dialog; `kind` is the dialog type from the list
    pub async fn mail_dialog(&mut self, dialog_id: &str, kind: i64) -> Result<Value> {
        if dialog_id.is_empty() {
            return Err(ClientError::InvalidArgument("dialog id is empty"));
        }
        let url = self.prod("/client/mail/dialog/view");
        self.request("mail_dialog", url, Some(&DialogViewRequest { dialog_id, kind }))
            .await
    }

    pub async fn mail_attachments(&mut self, dialog_id: &str) -> Result<Value> {
        if dialog_id.is_empty() {
            return Err(ClientError::InvalidArgument("dialog id is empty"));
        }
        let url = self.prod("/client/mail/dialog/getAllAttachments");
        self.request("mail_attachments", url, Some(&DialogRequest { dialog_id }))
            .await
    }

    /// Move an attachment out of a dialog into `to_item_id`
    pub async fn claim_mail_reward(
        &mut self,
        from_item_id: &str,
        to_item_id: &str,
        previous_owner_id: &str,
        location: ItemLocation,
    ) -> Result<Value> {
        if from_item_id.is_empty() || to_item_id.is_empty() || previous_owner_id.is_empty() {
            return Err(ClientError::InvalidArgument(
                "reward, target and dialog ids are required",
            ));
        }
        let body = MovingRequest::single(
            ItemAction::Move {
                item: from_item_id,
                to: MoveTarget {
                    id: to_item_id,
                    container: REWARD_CONTAINER,
                    location,
                },
                from_owner: Some(PreviousOwner {
                    id: previous_owner_id,
                    kind: "Mail",
                }),
            },
            Some(ACTION_TM),
        );
        let envelope = self.item_action("claim_mail_reward", &body).await?;
        let data = handle_response("claim_mail_reward", envelope)?;
        let claimed = action_result(data)?;
        info!("Claimed mail reward {from_item_id}");
        Ok(claimed)
    }
}

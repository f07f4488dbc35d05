use serde_json::Value;
use tracing::debug;

use super::{ACTION_TM, LOOKUP_LANGUAGE};
use crate::client::{SessionClient, action_result, handle_response};
use crate::error::{ClientError, Result};
use crate::requests::{ItemAction, MoveDestination, MoveTarget, MovingRequest};
use crate::stack::{self, OwnedStack, ROUBLE_TEMPLATE_ID, StackSelection};

/// Locale name of the stash container
const STASH_NAME: &str = "Stash";

impl SessionClient {
    /// Inventory items of the main profile
    ///
    /// Selects that profile first, as the game client does.
    pub async fn my_items(&mut self) -> Result<Vec<Value>> {
        let mut profile = self.my_profile().await?;
        let profile_id = profile
            .get("_id")
            .and_then(Value::as_str)
            .ok_or_else(|| ClientError::malformed("profile has no '_id'"))?
            .to_string();
        self.select_profile(&profile_id).await?;

        match profile.pointer_mut("/Inventory/items").map(Value::take) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(ClientError::malformed("profile has no 'Inventory.items' list")),
        }
    }

    pub async fn owned_stacks(&mut self) -> Result<Vec<OwnedStack>> {
        let items = self.my_items().await?;
        Ok(stack::owned_stacks(&items))
    }

    /// Total units held across every stack of `template_id`
    pub async fn currency_count(&mut self, template_id: &str) -> Result<u64> {
        if template_id.is_empty() {
            return Err(ClientError::InvalidArgument("template id is empty"));
        }
        let total = self
            .owned_stacks()
            .await?
            .iter()
            .filter(|s| s.template_id == template_id)
            .map(|s| s.count)
            .sum();
        debug!("Holding {total} of {template_id}");
        Ok(total)
    }

    pub async fn rouble_count(&mut self) -> Result<u64> {
        self.currency_count(ROUBLE_TEMPLATE_ID).await
    }

    /// Stacks of `template_id` covering `required` units
    ///
    /// Check [`StackSelection::is_covered`] before paying with the result.
    pub async fn find_item_stack(&mut self, template_id: &str, required: u64) -> Result<StackSelection> {
        if template_id.is_empty() {
            return Err(ClientError::InvalidArgument("template id is empty"));
        }
        let stacks = self.owned_stacks().await?;
        Ok(stack::find_covering_stacks(&stacks, template_id, required))
    }

    /// English name of an item template
    pub async fn item_name(&mut self, template_id: &str) -> Result<String> {
        let locale = self.locale(LOOKUP_LANGUAGE).await?;
        find_item_name(locale, template_id)
            .map(str::to_string)
            .ok_or_else(|| ClientError::NotFound {
                kind: "item",
                key: template_id.to_string(),
            })
    }

    /// Id of the stash container holding the rest of the inventory
    pub async fn main_stash_id(&mut self) -> Result<String> {
        let items = self.my_items().await?;
        for item in &items {
            let (Some(id), Some(template_id)) = (
                item.get("_id").and_then(Value::as_str),
                item.get("_tpl").and_then(Value::as_str),
            ) else {
                continue;
            };
            match self.item_name(template_id).await {
                Ok(name) if name == STASH_NAME => return Ok(id.to_string()),
                Ok(_) | Err(ClientError::NotFound { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        Err(ClientError::NotFound {
            kind: "stash",
            key: STASH_NAME.to_string(),
        })
    }

    /// Merge stack `from` entirely into stack `to`
    pub async fn merge_items(&mut self, from: &str, to: &str) -> Result<Value> {
        require_pair(from, to)?;
        let body = MovingRequest::single(ItemAction::Merge { item: from, with: to }, Some(ACTION_TM));
        let envelope = self.item_action("merge_items", &body).await?;
        action_result(handle_response("merge_items", envelope)?)
    }

    /// Move `count` units from stack `from` into stack `to`
    pub async fn transfer_items(&mut self, from: &str, to: &str, count: u64) -> Result<Value> {
        require_pair(from, to)?;
        if count == 0 {
            return Err(ClientError::InvalidArgument("count must be positive"));
        }
        let body = MovingRequest::single(
            ItemAction::Transfer {
                item: from,
                with: to,
                count,
            },
            Some(ACTION_TM),
        );
        let envelope = self.item_action("transfer_items", &body).await?;
        action_result(handle_response("transfer_items", envelope)?)
    }

    pub async fn move_item(&mut self, item_id: &str, destination: &MoveDestination) -> Result<Value> {
        if item_id.is_empty() || destination.id.is_empty() {
            return Err(ClientError::InvalidArgument("item and destination ids are required"));
        }
        let body = MovingRequest::single(
            ItemAction::Move {
                item: item_id,
                to: MoveTarget {
                    id: &destination.id,
                    container: &destination.container,
                    location: destination.location,
                },
                from_owner: None,
            },
            Some(ACTION_TM),
        );
        let envelope = self.item_action("move_item", &body).await?;
        action_result(handle_response("move_item", envelope)?)
    }
}

fn require_pair(from: &str, to: &str) -> Result<()> {
    if from.is_empty() || to.is_empty() {
        Err(ClientError::InvalidArgument("source and target item ids are required"))
    } else {
        Ok(())
    }
}

/// `Name` of the first locale entry keyed by `template_id`
fn find_item_name<'a>(locale: &'a Value, template_id: &str) -> Option<&'a str> {
    locale
        .as_object()?
        .values()
        .filter_map(|section| section.get(template_id))
        .find_map(|entry| entry.get("Name").and_then(Value::as_str))
}

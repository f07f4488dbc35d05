use serde_json::Value;
use tracing::info;

use super::{LOOKUP_LANGUAGE, TRADE_TM};
use crate::catalog::{CatalogResolution, resolve_trader_items};
use crate::client::{SessionClient, action_result, handle_response};
use crate::error::{ClientError, Result};
use crate::requests::{ItemAction, MovingRequest, PaymentLine, SellLine, TradingConfirm};

impl SessionClient {
    pub async fn traders(&mut self) -> Result<Value> {
        let url = self.trading("/client/trading/api/getTradersList");
        self.request("traders", url, None::<&()>).await
    }

    pub async fn trader(&mut self, trader_id: &str) -> Result<Value> {
        require_trader(trader_id)?;
        let url = self.trading(&format!("/client/trading/api/getTrader/{trader_id}"));
        self.request("trader", url, None::<&()>).await
    }

    /// Trader id for a nickname, looked up in the English locale
    pub async fn trader_id_by_name(&mut self, nickname: &str) -> Result<String> {
        let locale = self.locale(LOOKUP_LANGUAGE).await?;
        find_trader_id(locale, nickname).ok_or_else(|| ClientError::NotFound {
            kind: "trader",
            key: nickname.to_string(),
        })
    }

    /// Raw assortment document (`items`, `barter_scheme`, `loyal_level_items`)
    pub async fn trader_assort_raw(&mut self, trader_id: &str) -> Result<Value> {
        require_trader(trader_id)?;
        let url = self.trading(&format!("/client/trading/api/getTraderAssort/{trader_id}"));
        self.request("trader_assort_raw", url, None::<&()>).await
    }

    /// Raw currency price table, keyed by assortment item id
    pub async fn trader_prices_raw(&mut self, trader_id: &str) -> Result<Value> {
        require_trader(trader_id)?;
        let url = self.trading(&format!(
            "/client/trading/api/getUserAssortPrice/trader/{trader_id}"
        ));
        self.request("trader_prices_raw", url, None::<&()>).await
    }

    /// Everything a trader sells, with costs and loyalty gates resolved
    pub async fn trader_items(&mut self, trader_id: &str) -> Result<CatalogResolution> {
        let assort = self.trader_assort_raw(trader_id).await?;
        let prices = self.trader_prices_raw(trader_id).await?;
        resolve_trader_items(trader_id, &assort, &prices)
    }

    /// Buy `count` of assortment item `item_id`, paying with `payment`
    pub async fn trade_item(
        &mut self,
        trader_id: &str,
        item_id: &str,
        count: u64,
        payment: &[PaymentLine],
    ) -> Result<Value> {
        if trader_id.is_empty() || item_id.is_empty() {
            return Err(ClientError::InvalidArgument("trader and item ids are required"));
        }
        if count == 0 {
            return Err(ClientError::InvalidArgument("count must be positive"));
        }
        if payment.is_empty() {
            return Err(ClientError::InvalidArgument("payment is empty"));
        }

        let body = MovingRequest::single(
            ItemAction::TradingConfirm(TradingConfirm::Buy {
                tid: trader_id,
                item_id,
                count,
                scheme_id: 0,
                scheme_items: payment,
            }),
            Some(TRADE_TM),
        );
        let envelope = self.item_action("trade_item", &body).await?;
        let items = action_result(handle_response("trade_item", envelope)?)?;
        info!("Bought {count} x {item_id} from {trader_id}");
        Ok(items)
    }

    /// Sell `count` of inventory item `item_id` to a trader
    pub async fn sell_item(&mut self, trader_id: &str, item_id: &str, count: u64) -> Result<Value> {
        if trader_id.is_empty() || item_id.is_empty() {
            return Err(ClientError::InvalidArgument("trader and item ids are required"));
        }
        if count == 0 {
            return Err(ClientError::InvalidArgument("count must be positive"));
        }

        let body = MovingRequest::single(
            ItemAction::TradingConfirm(TradingConfirm::Sell {
                tid: trader_id,
                items: vec![SellLine {
                    id: item_id,
                    count,
                    scheme_id: "0",
                }],
            }),
            Some(TRADE_TM),
        );
        let envelope = self.item_action("sell_item", &body).await?;
        let data = handle_response("sell_item", envelope)?;
        if data.get("items").is_none() {
            return Err(ClientError::malformed("sell response has no 'items'"));
        }
        let items = action_result(data)?;
        info!("Sold {count} x {item_id} to {trader_id}");
        Ok(items)
    }
}

fn require_trader(trader_id: &str) -> Result<()> {
    if trader_id.is_empty() {
        Err(ClientError::InvalidArgument("trader id is empty"))
    } else {
        Ok(())
    }
}

/// Key of the first locale entry whose `Nickname` is `nickname`
fn find_trader_id(locale: &Value, nickname: &str) -> Option<String> {
    locale
        .as_object()?
        .values()
        .filter_map(Value::as_object)
        .flat_map(|section| section.iter())
        .find(|(_, entry)| entry.get("Nickname").and_then(Value::as_str) == Some(nickname))
        .map(|(key, _)| key.clone())
}

use serde_json::Value;
use tracing::{error, info};

use super::ACTION_TM;
use crate::client::{SessionClient, action_result, handle_response, is_offer_gone};
use crate::error::{ClientError, Result};
use crate::requests::{
    BuyOffer, ItemAction, MarketFilter, MarketPriceRequest, MovingRequest, OfferRequirement,
    OfferRequirementLine, PaymentLine,
};

impl SessionClient {
    /// Search flea market offers
    pub async fn search_market(&mut self, filter: &MarketFilter) -> Result<Value> {
        if filter.limit == 0 {
            return Err(ClientError::InvalidArgument("search limit must be positive"));
        }
        let url = self.ragfair("/client/ragfair/find");
        self.request("search_market", url, Some(filter)).await
    }

    /// Buy `count` units of a market offer
    ///
    /// Returns `None` when the offer sold out or disappeared before the
    /// purchase went through.
    pub async fn buy_offer(
        &mut self,
        offer_id: &str,
        count: u64,
        payment: &[PaymentLine],
    ) -> Result<Option<Value>> {
        if offer_id.is_empty() {
            return Err(ClientError::InvalidArgument("offer id is empty"));
        }
        if count == 0 {
            return Err(ClientError::InvalidArgument("count must be positive"));
        }
        if payment.is_empty() {
            return Err(ClientError::InvalidArgument("payment is empty"));
        }

        let body = MovingRequest::single(
            ItemAction::RagFairBuyOffer {
                offers: vec![BuyOffer {
                    id: offer_id,
                    count,
                    items: payment,
                }],
            },
            Some(ACTION_TM),
        );
        let envelope = self.item_action("buy_offer", &body).await?;
        match handle_response("buy_offer", envelope) {
            Ok(data) => {
                let items = action_result(data)?;
                info!("Bought {count} unit(s) of offer {offer_id}");
                Ok(Some(items))
            }
            Err(e) if e.code().is_some_and(is_offer_gone) => {
                error!("Offer not found! Offer: {offer_id}");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// List inventory items on the market for `requirement`
    ///
    /// With `sell_all` the items can only be bought together.
    pub async fn offer_items(
        &mut self,
        items: &[String],
        requirement: &OfferRequirement,
        sell_all: bool,
    ) -> Result<Value> {
        if items.is_empty() {
            return Err(ClientError::InvalidArgument("no items to offer"));
        }
        if requirement.template_id.is_empty() && requirement.price == 0 {
            return Err(ClientError::InvalidArgument("offer requirement is empty"));
        }

        let body = MovingRequest::single(
            ItemAction::RagFairAddOffer {
                sell_in_one_piece: sell_all,
                items,
                requirements: vec![OfferRequirementLine {
                    template_id: &requirement.template_id,
                    count: requirement.price,
                    level: 0,
                    side: 0,
                    only_functional: false,
                }],
                tm: ACTION_TM,
            },
            None,
        );
        let envelope = self.item_action("offer_items", &body).await?;
        let listed = action_result(handle_response("offer_items", envelope)?)?;
        info!("Listed {} item(s) for {}", items.len(), requirement.price);
        Ok(listed)
    }

    /// Average market prices for an item template
    pub async fn item_market_price(&mut self, template_id: &str) -> Result<Value> {
        if template_id.is_empty() {
            return Err(ClientError::InvalidArgument("template id is empty"));
        }
        let url = self.ragfair("/client/ragfair/itemMarketPrice");
        self.request(
            "item_market_price",
            url,
            Some(&MarketPriceRequest { template_id }),
        )
        .await
    }
}

/// Total cost of `amount` units at `unit_price`, rounded up to a whole unit
pub fn listing_price(unit_price: f64, amount: u64) -> u64 {
    (unit_price * amount as f64).ceil() as u64
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::requests::{MarketSort, SortDirection};
    use crate::stack::ROUBLE_TEMPLATE_ID;
    use crate::testing::{ScriptedTransport, envelope_response, session_client};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_listing_price_rounds_up() {
        assert_eq!(listing_price(10.0, 3), 30);
        assert_eq!(listing_price(10.25, 3), 31);
        assert_eq!(listing_price(0.1, 1), 1);
        assert_eq!(listing_price(99.5, 0), 0);
    }

    #[tokio::test]
    async fn test_search_market() {
        let transport = ScriptedTransport::new([envelope_response(0, json!({"offers": [], "offersCount": 0}))]);
        let mut client = session_client(&transport);

        assert!(matches!(
            client.search_market(&MarketFilter::default().limit(0)).await,
            Err(ClientError::InvalidArgument(_))
        ));

        let filter = MarketFilter::for_template(ROUBLE_TEMPLATE_ID)
            .sort(MarketSort::Price, SortDirection::Ascending)
            .limit(5);
        let result = client.search_market(&filter).await.expect("Operation should succeed");
        assert_eq!(result["offersCount"], 0);

        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].url, "https://ragfair.escapefromtarkov.com/client/ragfair/find");
        assert_eq!(transport.body(0)["limit"], 5);
        assert_eq!(transport.body(0)["handbookId"], ROUBLE_TEMPLATE_ID);
    }

    #[tokio::test]
    async fn test_buy_offer_gone_returns_none() {
        let transport = ScriptedTransport::new([
            envelope_response(1507, json!(null)),
            envelope_response(1503, json!(null)),
            envelope_response(1510, json!(null)),
        ]);
        let mut client = session_client(&transport);
        let payment = [PaymentLine::new("rub", 100)];

        assert_eq!(
            client.buy_offer("offer", 1, &payment).await.expect("Operation should succeed"),
            None
        );
        assert_eq!(
            client.buy_offer("offer", 1, &payment).await.expect("Operation should succeed"),
            None
        );
        let err = client
            .buy_offer("offer", 1, &payment)
            .await
            .expect_err("Test operation should fail");
        assert_eq!(err.code(), Some(tarkov_protocol::ErrorCode::BAD_LOYALTY_LEVEL));
    }

    #[tokio::test]
    async fn test_buy_offer_body_and_items() {
        let transport = ScriptedTransport::new([envelope_response(
            0,
            json!({"items": {"new": [{"_id": "x"}]}, "badRequest": []}),
        )]);
        let mut client = session_client(&transport);

        let items = client
            .buy_offer("offer", 3, &[PaymentLine::new("rub", 300)])
            .await
            .expect("Operation should succeed");
        assert_eq!(items, Some(json!({"new": [{"_id": "x"}]})));
        assert_eq!(
            transport.body(0),
            json!({
                "data": [{
                    "Action": "RagFairBuyOffer",
                    "offers": [{"id": "offer", "count": 3, "items": [{"id": "rub", "count": 300}]}]
                }],
                "tm": 2
            })
        );
    }

    #[tokio::test]
    async fn test_offer_items() {
        let transport = ScriptedTransport::new([envelope_response(0, json!({"items": {}, "badRequest": []}))]);
        let mut client = session_client(&transport);
        let requirement = OfferRequirement {
            template_id: ROUBLE_TEMPLATE_ID.to_string(),
            price: 15000,
        };

        assert!(client.offer_items(&[], &requirement, false).await.is_err());
        let empty = OfferRequirement {
            template_id: String::new(),
            price: 0,
        };
        assert!(client.offer_items(&["a".to_string()], &empty, false).await.is_err());

        client
            .offer_items(&["a".to_string()], &requirement, true)
            .await
            .expect("Operation should succeed");
        let body = transport.body(0);
        assert!(body.get("tm").is_none());
        assert_eq!(body["data"][0]["sellInOnePiece"], true);
        assert_eq!(body["data"][0]["requirements"][0]["count"], 15000);
    }

    #[tokio::test]
    async fn test_item_market_price() {
        let transport = ScriptedTransport::new([envelope_response(0, json!({"avg": 10.5, "min": 7, "max": 20}))]);
        let mut client = session_client(&transport);

        let price = client
            .item_market_price(ROUBLE_TEMPLATE_ID)
            .await
            .expect("Operation should succeed");
        assert_eq!(price["min"], 7);
        assert_eq!(transport.body(0), json!({"templateId": ROUBLE_TEMPLATE_ID}));
    }
}

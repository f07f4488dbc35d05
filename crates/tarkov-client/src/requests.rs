//! Typed request bodies
//!
//! Every request body the client sends is one of these structs serialized
//! with serde; nothing is assembled by hand.

use serde::{Deserialize, Serialize};

// Launcher

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub pass: String,
    #[serde(rename = "hwCode")]
    pub hw_code: &'a str,
    /// Empty when no captcha was solved
    pub captcha: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HardwareActivationRequest<'a> {
    pub activate_code: &'a str,
    pub hw_code: &'a str,
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct GameStartRequest<'a> {
    #[serde(rename = "hwCode")]
    pub hw_code: &'a str,
    pub version: VersionContext<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct VersionContext<'a> {
    pub backend: &'a str,
    pub game: &'a str,
    pub major: &'a str,
}

// Session

/// `{"crc": 0}`, sent with cacheable static data requests
#[derive(Debug, Serialize)]
pub(crate) struct CrcRequest {
    pub crc: u32,
}

impl CrcRequest {
    pub const FRESH: Self = Self { crc: 0 };
}

#[derive(Debug, Serialize)]
pub(crate) struct SelectProfileRequest<'a> {
    pub uid: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DialogRequest<'a> {
    pub dialog_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DialogViewRequest<'a> {
    pub dialog_id: &'a str,
    #[serde(rename = "type")]
    pub kind: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MarketPriceRequest<'a> {
    pub template_id: &'a str,
}

// Item moving

/// Body of `/client/game/profile/items/moving`
#[derive(Debug, Serialize)]
pub(crate) struct MovingRequest<'a> {
    pub data: Vec<ItemAction<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tm: Option<i64>,
}

impl<'a> MovingRequest<'a> {
    pub fn single(action: ItemAction<'a>, tm: Option<i64>) -> Self {
        Self {
            data: vec![action],
            tm,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "Action")]
pub(crate) enum ItemAction<'a> {
    TradingConfirm(TradingConfirm<'a>),
    RagFairBuyOffer {
        offers: Vec<BuyOffer<'a>>,
    },
    RagFairAddOffer {
        #[serde(rename = "sellInOnePiece")]
        sell_in_one_piece: bool,
        items: &'a [String],
        requirements: Vec<OfferRequirementLine<'a>>,
        tm: i64,
    },
    Merge {
        item: &'a str,
        with: &'a str,
    },
    Transfer {
        item: &'a str,
        with: &'a str,
        count: u64,
    },
    Move {
        item: &'a str,
        to: MoveTarget<'a>,
        #[serde(rename = "fromOwner", skip_serializing_if = "Option::is_none")]
        from_owner: Option<PreviousOwner<'a>>,
    },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub(crate) enum TradingConfirm<'a> {
    #[serde(rename = "buy_from_trader")]
    Buy {
        tid: &'a str,
        item_id: &'a str,
        count: u64,
        scheme_id: u32,
        scheme_items: &'a [PaymentLine],
    },
    #[serde(rename = "sell_to_trader")]
    Sell {
        tid: &'a str,
        items: Vec<SellLine<'a>>,
    },
}

#[derive(Debug, Serialize)]
pub(crate) struct SellLine<'a> {
    pub id: &'a str,
    pub count: u64,
    pub scheme_id: &'static str,
}

#[derive(Debug, Serialize)]
pub(crate) struct BuyOffer<'a> {
    pub id: &'a str,
    pub count: u64,
    pub items: &'a [PaymentLine],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OfferRequirementLine<'a> {
    #[serde(rename = "_tpl")]
    pub template_id: &'a str,
    pub count: u64,
    pub level: u32,
    pub side: u32,
    pub only_functional: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct MoveTarget<'a> {
    pub id: &'a str,
    pub container: &'a str,
    pub location: ItemLocation,
}

#[derive(Debug, Serialize)]
pub(crate) struct PreviousOwner<'a> {
    pub id: &'a str,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

// Public argument types

/// One owned stack surrendered as payment: `{id, count}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentLine {
    pub id: String,
    pub count: u64,
}

impl PaymentLine {
    pub fn new(id: impl Into<String>, count: u64) -> Self {
        Self {
            id: id.into(),
            count,
        }
    }
}

/// Grid position inside a container
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemLocation {
    pub x: i64,
    pub y: i64,
    /// Rotation, 0 or 1
    pub r: i64,
}

/// Destination of an item move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveDestination {
    /// Parent item id (usually the stash)
    pub id: String,
    /// Container slot inside the parent, `main` for stash grids
    pub container: String,
    pub location: ItemLocation,
}

impl MoveDestination {
    /// Position in the main grid of `parent_id`
    pub fn main(parent_id: impl Into<String>, location: ItemLocation) -> Self {
        Self {
            id: parent_id.into(),
            container: "main".to_string(),
            location,
        }
    }
}

/// What a flea market listing asks in return
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferRequirement {
    /// Template id of the requested item or currency
    pub template_id: String,
    /// Requested amount
    pub price: u64,
}

// Market search

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum MarketSort {
    Id,
    BarteringOffers,
    MerchantRating,
    #[default]
    Price,
    Expiry,
}

impl From<MarketSort> for u8 {
    fn from(value: MarketSort) -> Self {
        match value {
            MarketSort::Id => 0,
            MarketSort::BarteringOffers => 2,
            MarketSort::MerchantRating => 3,
            MarketSort::Price => 5,
            MarketSort::Expiry => 6,
        }
    }
}

impl TryFrom<u8> for MarketSort {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Id),
            2 => Ok(Self::BarteringOffers),
            3 => Ok(Self::MerchantRating),
            5 => Ok(Self::Price),
            6 => Ok(Self::Expiry),
            other => Err(format!("unknown market sort type {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl From<SortDirection> for u8 {
    fn from(value: SortDirection) -> Self {
        match value {
            SortDirection::Ascending => 0,
            SortDirection::Descending => 1,
        }
    }
}

impl TryFrom<u8> for SortDirection {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Ascending),
            1 => Ok(Self::Descending),
            other => Err(format!("unknown sort direction {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum MarketCurrency {
    #[default]
    Any,
    Rouble,
    Dollar,
    Euro,
}

impl From<MarketCurrency> for u8 {
    fn from(value: MarketCurrency) -> Self {
        value as Self
    }
}

impl TryFrom<u8> for MarketCurrency {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Any),
            1 => Ok(Self::Rouble),
            2 => Ok(Self::Dollar),
            3 => Ok(Self::Euro),
            other => Err(format!("unknown market currency {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum OfferOwner {
    #[default]
    Any,
    Traders,
    Players,
}

impl From<OfferOwner> for u8 {
    fn from(value: OfferOwner) -> Self {
        value as Self
    }
}

impl TryFrom<u8> for OfferOwner {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Any),
            1 => Ok(Self::Traders),
            2 => Ok(Self::Players),
            other => Err(format!("unknown offer owner type {other}")),
        }
    }
}

/// Flea market search filter
///
/// Defaults mirror what the game client sends for a plain price-sorted
/// search: 15 offers per page, barter offers removed, functional items only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketFilter {
    pub page: u32,
    pub limit: u32,
    pub sort_type: MarketSort,
    pub sort_direction: SortDirection,
    pub currency: MarketCurrency,
    pub price_from: u64,
    pub price_to: u64,
    pub quantity_from: u64,
    pub quantity_to: u64,
    pub condition_from: u8,
    pub condition_to: u8,
    pub one_hour_expiration: bool,
    pub remove_bartering: bool,
    pub offer_owner_type: OfferOwner,
    pub only_functional: bool,
    pub update_offer_count: bool,
    pub handbook_id: String,
    pub linked_search_id: String,
    pub needed_search_id: String,
    pub tm: u32,
}

impl Default for MarketFilter {
    fn default() -> Self {
        Self {
            page: 0,
            limit: 15,
            sort_type: MarketSort::Price,
            sort_direction: SortDirection::Ascending,
            currency: MarketCurrency::Any,
            price_from: 0,
            price_to: 0,
            quantity_from: 0,
            quantity_to: 0,
            condition_from: 0,
            condition_to: 100,
            one_hour_expiration: false,
            remove_bartering: true,
            offer_owner_type: OfferOwner::Any,
            only_functional: true,
            update_offer_count: true,
            handbook_id: String::new(),
            linked_search_id: String::new(),
            needed_search_id: String::new(),
            tm: 1,
        }
    }
}

impl MarketFilter {
    /// Offers for a single item template
    pub fn for_template(template_id: impl Into<String>) -> Self {
        Self {
            handbook_id: template_id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn sort(mut self, sort_type: MarketSort, direction: SortDirection) -> Self {
        self.sort_type = sort_type;
        self.sort_direction = direction;
        self
    }

    #[must_use]
    pub fn currency(mut self, currency: MarketCurrency) -> Self {
        self.currency = currency;
        self
    }

    #[must_use]
    pub fn price_range(mut self, from: u64, to: u64) -> Self {
        self.price_from = from;
        self.price_to = to;
        self
    }

    #[must_use]
    pub fn owner(mut self, owner: OfferOwner) -> Self {
        self.offer_owner_type = owner;
        self
    }

    #[must_use]
    pub fn include_barters(mut self, include: bool) -> Self {
        self.remove_bartering = !include;
        self
    }
}

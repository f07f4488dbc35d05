//! Static game data, memoized per session

use serde_json::Value;
use tracing::debug;

use crate::client::SessionClient;
use crate::error::{ClientError, Result};
use crate::requests::CrcRequest;

impl SessionClient {
    /// Locale strings for `language`, fetched once per language
    pub async fn locale(&mut self, language: &str) -> Result<&Value> {
        if language.is_empty() {
            return Err(ClientError::InvalidArgument("language is empty"));
        }
        if self.cache.has_locale(language) {
            debug!("Locale '{language}' served from cache");
        } else {
            let url = self.prod(&format!("/client/locale/{language}"));
            let data = self.request("locale", url, None::<&()>).await?;
            self.cache.locales.insert(language.to_string(), data);
        }
        self.cache
            .locales
            .get(language)
            .ok_or_else(|| ClientError::NotFound {
                kind: "locale",
                key: language.to_string(),
            })
    }

    /// Item template database, fetched once
    pub async fn items(&mut self) -> Result<&Value> {
        let data = match self.cache.items.take() {
            Some(data) => data,
            None => {
                let url = self.prod("/client/items");
                self.request("items", url, Some(&CrcRequest::FRESH)).await?
            }
        };
        Ok(self.cache.items.insert(data))
    }

    /// Handbook prices, fetched once
    pub async fn item_prices(&mut self) -> Result<&Value> {
        let data = match self.cache.item_prices.take() {
            Some(data) => data,
            None => {
                let url = self.prod("/client/items/prices");
                self.request("item_prices", url, Some(&CrcRequest::FRESH))
                    .await?
            }
        };
        Ok(self.cache.item_prices.insert(data))
    }

    /// Map and location data, fetched once
    pub async fn locations(&mut self) -> Result<&Value> {
        let data = match self.cache.locations.take() {
            Some(data) => data,
            None => {
                let url = self.prod("/client/locations");
                self.request("locations", url, Some(&CrcRequest::FRESH))
                    .await?
            }
        };
        Ok(self.cache.locations.insert(data))
    }

    pub async fn weather(&mut self) -> Result<Value> {
        let url = self.prod("/client/weather");
        self.request("weather", url, None::<&()>).await
    }
}

use serde_json::Value;
use tracing::{error, info};

use crate::client::SessionClient;
use crate::error::{ClientError, Result};
use crate::requests::SelectProfileRequest;

const SCAV_SIDE: &str = "Savage";

impl SessionClient {
    /// Keep the session alive; any non-zero code is an error
    pub async fn keep_alive(&mut self) -> Result<()> {
        let url = self.prod("/client/game/keepalive");
        let envelope = self.post(url, None::<&()>).await?;
        if envelope.is_ok() {
            return Ok(());
        }
        error!("Keepalive failed with code {}", envelope.err);
        Err(ClientError::api("keep_alive", envelope.err, envelope.errmsg))
    }

    /// All profiles of the account (main character and scav)
    pub async fn profiles(&mut self) -> Result<Value> {
        let url = self.prod("/client/game/profile/list");
        self.request("profiles", url, None::<&()>).await
    }

    /// First profile that is not a scav
    pub async fn my_profile(&mut self) -> Result<Value> {
        let profiles = self.profiles().await?;
        let Value::Array(profiles) = profiles else {
            return Err(ClientError::malformed("profile list is not an array"));
        };
        profiles
            .into_iter()
            .find(|profile| {
                profile
                    .pointer("/Info/Side")
                    .and_then(Value::as_str)
                    .is_some_and(|side| side != SCAV_SIDE)
            })
            .ok_or_else(|| ClientError::NotFound {
                kind: "profile",
                key: "main".to_string(),
            })
    }

    pub async fn select_profile(&mut self, uid: &str) -> Result<()> {
        if uid.is_empty() {
            return Err(ClientError::InvalidArgument("profile id is empty"));
        }
        let url = self.prod("/client/game/profile/select");
        self.request("select_profile", url, Some(&SelectProfileRequest { uid }))
            .await?;
        info!("Selected profile {uid}");
        Ok(())
    }

    pub async fn friends(&mut self) -> Result<Value> {
        let url = self.prod("/client/friend/list");
        self.request("friends", url, None::<&()>).await
    }
}

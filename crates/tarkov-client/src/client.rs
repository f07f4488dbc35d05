//! Session client
//!
//! Every game API call goes through [`SessionClient::post`], which stamps the
//! per-session headers (cookie, client versions, request id), hands the
//! request to the transport and decodes the envelope. Domain operations live
//! in the `api` modules as thin request builders on top of it.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tarkov_protocol::envelope::{self, ResponseEnvelope};
use tarkov_protocol::{ClientConfig, ErrorCode, HttpTransport, ProtocolError, Transport, TransportRequest};
use tracing::{debug, error, trace};

use crate::cache::SessionCache;
use crate::error::{ClientError, Result};
use crate::launcher::LauncherClient;
use crate::requests::MovingRequest;
use crate::session::Session;

pub(crate) const ITEMS_MOVING_PATH: &str = "/client/game/profile/items/moving";

/// Non-fatal business codes logged by message; anything else is logged raw
const CLASSIFIED_CODES: [ErrorCode; 10] = [
    ErrorCode::INVALID_USER_ID,
    ErrorCode::INVALID_PARAMETERS,
    ErrorCode::MAINTENANCE,
    ErrorCode::BACKEND_ERROR,
    ErrorCode::MAX_OFFER_COUNT,
    ErrorCode::INSUFFICIENT_TAX_FUNDS,
    ErrorCode::OFFER_NOT_FOUND,
    ErrorCode::BAD_LOYALTY_LEVEL,
    ErrorCode::OFFER_NOT_AVAILABLE_YET,
    ErrorCode::TRANSACTION_ERROR,
];

/// Authenticated client for the game, trading and market APIs
///
/// Calls run one at a time through `&mut self`; share an instance across
/// tasks only behind a lock.
pub struct SessionClient {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
    session: Session,
    pub(crate) cache: SessionCache,
}

impl SessionClient {
    pub fn new(transport: Arc<dyn Transport>, config: ClientConfig, session: Session) -> Self {
        Self {
            transport,
            config,
            session,
            cache: SessionCache::default(),
        }
    }

    /// Session client over a fresh reqwest transport
    pub fn with_http(config: ClientConfig, session: Session) -> Result<Self> {
        let transport = HttpTransport::with_config(&config.http, config.retry_policy.clone())?;
        Ok(Self::new(Arc::new(transport), config, session))
    }

    /// Reuse the launcher's transport and (possibly refreshed) versions
    pub fn from_launcher(launcher: &LauncherClient, session: Session) -> Self {
        Self::new(launcher.transport(), launcher.config().clone(), session)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn cache(&self) -> &SessionCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut SessionCache {
        &mut self.cache
    }

    /// POST `body` to `url` with the session headers and decode the envelope
    ///
    /// No response classification happens here; see the domain operations.
    pub async fn post(&mut self, url: String, body: Option<&impl Serialize>) -> Result<ResponseEnvelope> {
        let body = match body {
            Some(body) => serde_json::to_string(body).map_err(ProtocolError::from)?,
            None => String::new(),
        };
        let request_id = self.session.next_request_id();
        debug!("Request: {} To: {}", body, url);

        let request = TransportRequest::new(url, body)
            .header("Content-Type", "application/json")
            .header(
                "User-Agent",
                format!(
                    "UnityPlayer/{} (UnityWebRequest/1.0, libcurl/7.52.0-DEV)",
                    self.config.unity_version
                ),
            )
            .header("App-Version", format!("EFT Client {}", self.config.game_version))
            .header("X-Unity-Version", self.config.unity_version.as_str())
            .header("Cookie", format!("PHPSESSID={}", self.session.id()))
            .header("GClient-RequestId", request_id.to_string());

        let response = self.transport.post(request).await?;
        let envelope = envelope::decode_response(&response)?;
        trace!("Response: {}", envelope.data);
        Ok(envelope)
    }

    /// Post and require a successful envelope
    pub(crate) async fn request(
        &mut self,
        operation: &'static str,
        url: String,
        body: Option<&impl Serialize>,
    ) -> Result<Value> {
        let envelope = self.post(url, body).await?;
        handle_response(operation, envelope)
    }

    /// Post an inventory action to the item-moving endpoint
    pub(crate) async fn item_action(
        &mut self,
        operation: &'static str,
        body: &MovingRequest<'_>,
    ) -> Result<ResponseEnvelope> {
        debug!("{operation}: {} item action(s)", body.data.len());
        let url = self.config.prod_endpoint(ITEMS_MOVING_PATH);
        self.post(url, Some(body)).await
    }

    pub(crate) fn prod(&self, path: &str) -> String {
        self.config.prod_endpoint(path)
    }

    pub(crate) fn trading(&self, path: &str) -> String {
        self.config.trading_endpoint(path)
    }

    pub(crate) fn ragfair(&self, path: &str) -> String {
        self.config.ragfair_endpoint(path)
    }
}

/// Classify an envelope: `data` on success, a logged [`ClientError::ApiServer`] otherwise
pub(crate) fn handle_response(operation: &'static str, envelope: ResponseEnvelope) -> Result<Value> {
    if envelope.is_ok() {
        debug!("{operation}: request completed");
        return Ok(envelope.data);
    }

    if is_classified(envelope.err) {
        error!("Func: {operation} - Error: {}", envelope.err.message());
    } else {
        error!(
            "Func: {operation} - Error code: {} Data: {}",
            envelope.err, envelope.data
        );
    }
    Err(ClientError::api(operation, envelope.err, envelope.errmsg))
}

/// Post-process an item-moving result
///
/// A non-empty `badRequest` list is a rejection even under `err == 0`;
/// otherwise the `items` sub-document is returned when present.
pub(crate) fn action_result(mut data: Value) -> Result<Value> {
    if let Some(bad) = data.get("badRequest")
        && !is_empty_document(bad)
    {
        error!("Request rejected: {bad}");
        return Err(ClientError::BadRequest(bad.to_string()));
    }
    match data.get_mut("items") {
        Some(items) => Ok(items.take()),
        None => Ok(data),
    }
}

pub(crate) fn is_empty_document(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn is_classified(code: ErrorCode) -> bool {
    CLASSIFIED_CODES.contains(&code)
}

/// Codes the market treats as "offer already gone"
pub(crate) fn is_offer_gone(code: ErrorCode) -> bool {
    matches!(code.value(), 1503 | 1506 | 1507)
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedTransport, envelope_response, session_client as client};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn test_session_headers_and_counter() {
        let transport = ScriptedTransport::new([
            envelope_response(0, Value::Null),
            envelope_response(0, Value::Null),
        ]);
        let mut client = client(&transport);

        for _ in 0..2 {
            client
                .post(client.prod("/client/game/keepalive"), None::<&()>)
                .await
                .expect("Operation should succeed");
        }

        let sent = transport.requests();
        assert_eq!(sent[0].url, "https://prod.escapefromtarkov.com/client/game/keepalive");
        assert_eq!(sent[0].body, "");
        assert_eq!(
            sent[0].header_value("User-Agent"),
            Some("UnityPlayer/2018.4.13f1 (UnityWebRequest/1.0, libcurl/7.52.0-DEV)")
        );
        assert_eq!(sent[0].header_value("App-Version"), Some("EFT Client 0.12.3.5834"));
        assert_eq!(sent[0].header_value("X-Unity-Version"), Some("2018.4.13f1"));
        assert_eq!(sent[0].header_value("Cookie"), Some("PHPSESSID=sess"));
        assert_eq!(sent[0].header_value("GClient-RequestId"), Some("1"));
        assert_eq!(sent[1].header_value("GClient-RequestId"), Some("2"));
        assert_eq!(client.session().peek_request_id(), 3);
    }

    #[tokio::test]
    async fn test_counter_advances_on_failed_requests() {
        let transport = ScriptedTransport::new([envelope_response(1000, Value::Null)]);
        let mut client = client(&transport);

        let err = client
            .request("weather", client.prod("/client/weather"), None::<&()>)
            .await
            .expect_err("Test operation should fail");
        assert_eq!(err.code(), Some(ErrorCode::BACKEND_ERROR));

        // Script exhausted: transport error, counter still moves
        assert!(
            client
                .post(client.prod("/client/weather"), None::<&()>)
                .await
                .is_err()
        );
        assert_eq!(client.session().peek_request_id(), 3);
    }

    #[test]
    fn test_handle_response_classifies() {
        let ok = handle_response("op", ResponseEnvelope::ok(json!({"a": 1})));
        assert_eq!(ok.expect("Operation should succeed"), json!({"a": 1}));

        let known = handle_response("op", ResponseEnvelope::error(ErrorCode::MAINTENANCE, "down"))
            .expect_err("Test operation should fail");
        match known {
            ClientError::ApiServer {
                operation,
                code,
                message,
                detail,
            } => {
                assert_eq!(operation, "op");
                assert_eq!(code, ErrorCode::MAINTENANCE);
                assert_eq!(message, "Backend is down for maintenance");
                assert_eq!(detail, "down");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let unknown = handle_response("op", ResponseEnvelope::error(ErrorCode(4321), ""))
            .expect_err("Test operation should fail");
        assert!(unknown.to_string().contains("4321"));
    }

    #[test]
    fn test_action_result() {
        assert_eq!(
            action_result(json!({"items": {"new": [1]}, "badRequest": []}))
                .expect("Operation should succeed"),
            json!({"new": [1]})
        );
        assert_eq!(
            action_result(json!({"profileChanges": {}})).expect("Operation should succeed"),
            json!({"profileChanges": {}})
        );
        assert!(matches!(
            action_result(json!({"badRequest": [{"err": 228}]})),
            Err(ClientError::BadRequest(msg)) if msg.contains("228")
        ));
    }

    #[test]
    fn test_only_business_codes_are_classified() {
        for code in [205, 207, 263, 1000, 1501, 1502, 1507, 1510, 1512, 1514] {
            assert!(is_classified(ErrorCode(code)), "{code}");
        }
        // Registered, but only meaningful to the launcher
        for code in [201, 206, 209, 211, 214, 230] {
            assert!(ErrorCode(code).is_registered());
            assert!(!is_classified(ErrorCode(code)), "{code}");
        }
        assert!(!is_classified(ErrorCode::OK));
        assert!(!is_classified(ErrorCode(4321)));

        // Unclassified codes still fail with the registry message
        let err = handle_response("op", ResponseEnvelope::error(ErrorCode::BAD_LOGIN, ""))
            .expect_err("Test operation should fail");
        assert_eq!(err.code(), Some(ErrorCode::BAD_LOGIN));
    }

    #[test]
    fn test_offer_gone_codes() {
        assert!(is_offer_gone(ErrorCode(1503)));
        assert!(is_offer_gone(ErrorCode(1506)));
        assert!(is_offer_gone(ErrorCode::OFFER_NOT_FOUND));
        assert!(!is_offer_gone(ErrorCode::MAX_OFFER_COUNT));
    }
}

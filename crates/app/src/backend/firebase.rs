//! Firebase REST backend.
//!
//! Talks to the Google identity toolkit, Firestore and Cloud Storage REST
//! surfaces. Firestore's REST API has no push channel, so collection
//! subscriptions are backed by per-collection pollers that publish full
//! snapshots into watch channels; consumers see the same
//! replace-all-on-notify stream the local backend produces.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, warn};

use crate::{
    backend::{BlobStore, Collection, Document, DocumentStore, IdentityProvider, WriteError},
    session::{CredentialError, Identity, ProfileUpdate},
};

use super::UploadError;

const IDENTITY_BASE: &str = "https://identitytoolkit.googleapis.com/v1";
const FIRESTORE_BASE: &str = "https://firestore.googleapis.com/v1";
const STORAGE_BASE: &str = "https://firebasestorage.googleapis.com/v0";

/// How often collection snapshots are refreshed.
const POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Project coordinates for a Firebase backend.
#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    /// Web API key.
    pub api_key: String,

    /// Project id, e.g. `"makanbar-58f4b"`.
    pub project_id: String,

    /// Storage bucket, e.g. `"makanbar-58f4b.appspot.com"`.
    pub storage_bucket: String,
}

impl FirebaseConfig {
    /// Reads the configuration from `MAKANBAR_FIREBASE_API_KEY`,
    /// `MAKANBAR_FIREBASE_PROJECT_ID` and
    /// `MAKANBAR_FIREBASE_STORAGE_BUCKET`.
    ///
    /// Returns `None` unless all three are set and non-empty; the caller
    /// then falls back to the local backend.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let read = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|value| !value.trim().is_empty())
        };

        Some(Self {
            api_key: read("MAKANBAR_FIREBASE_API_KEY")?,
            project_id: read("MAKANBAR_FIREBASE_PROJECT_ID")?,
            storage_bucket: read("MAKANBAR_FIREBASE_STORAGE_BUCKET")?,
        })
    }
}

#[derive(Debug, Clone)]
struct AuthState {
    id_token: String,
    identity: Identity,
}

/// The remote backend provider.
pub struct FirebaseBackend {
    config: FirebaseConfig,
    http: Client,
    auth: Arc<RwLock<Option<AuthState>>>,
    identity_tx: watch::Sender<Option<Identity>>,
    collections: FxHashMap<Collection, watch::Sender<Vec<Document>>>,
    pollers: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for FirebaseBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseBackend")
            .field("project_id", &self.config.project_id)
            .finish_non_exhaustive()
    }
}

impl FirebaseBackend {
    /// Creates the backend and starts the collection pollers.
    ///
    /// Must be called from within a Tokio runtime; the pollers are
    /// spawned tasks torn down when the backend is dropped.
    #[must_use]
    pub fn new(config: FirebaseConfig) -> Self {
        let http = Client::new();
        let auth = Arc::new(RwLock::new(None));

        let mut collections = FxHashMap::default();
        let mut pollers = Vec::with_capacity(Collection::ALL.len());

        for collection in Collection::ALL {
            let (tx, _rx) = watch::channel(Vec::new());

            pollers.push(spawn_poller(
                http.clone(),
                config.clone(),
                Arc::clone(&auth),
                collection,
                tx.clone(),
            ));
            collections.insert(collection, tx);
        }

        Self {
            config,
            http,
            auth,
            identity_tx: watch::channel(None).0,
            collections,
            pollers,
        }
    }

    fn identity_url(&self, endpoint: &str) -> String {
        format!(
            "{IDENTITY_BASE}/accounts:{endpoint}?key={}",
            self.config.api_key
        )
    }

    fn bearer_token(&self) -> Option<String> {
        self.auth
            .read()
            .ok()
            .and_then(|auth| auth.as_ref().map(|state| state.id_token.clone()))
    }

    fn adopt(&self, state: AuthState) -> Identity {
        let identity = state.identity.clone();

        if let Ok(mut auth) = self.auth.write() {
            *auth = Some(state);
        }
        self.identity_tx.send_replace(Some(identity.clone()));

        identity
    }

    async fn identity_call(
        &self,
        endpoint: &str,
        body: Value,
    ) -> Result<AccountResponse, CredentialError> {
        let response = self
            .http
            .post(self.identity_url(endpoint))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let parsed: Result<ApiErrorResponse, _> = response.json().await;

            return Err(match parsed {
                Ok(body) => credential_error_for(&body.error.message),
                Err(error) => CredentialError::Network(error),
            });
        }

        Ok(response.json().await?)
    }

    fn collection_sender(&self, collection: Collection) -> &watch::Sender<Vec<Document>> {
        // The map is keyed by every `Collection` variant at construction.
        self.collections
            .get(&collection)
            .unwrap_or_else(|| unreachable!("collection {collection:?} not registered"))
    }

    /// Refreshes one collection immediately instead of waiting for the
    /// next poll, so writers observe their own writes promptly.
    async fn refresh_collection(&self, collection: Collection) {
        match list_documents(&self.http, &self.config, &self.auth, collection).await {
            Ok(documents) => {
                self.collection_sender(collection).send_replace(documents);
            }
            Err(error) => {
                warn!(%error, collection = collection.as_str(), "post-write refresh failed");
            }
        }
    }
}

impl Drop for FirebaseBackend {
    fn drop(&mut self) {
        for poller in &self.pollers {
            poller.abort();
        }
    }
}

#[async_trait]
impl IdentityProvider for FirebaseBackend {
    async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Identity, CredentialError> {
        let created = self
            .identity_call(
                "signUp",
                json!({
                    "email": email,
                    "password": password,
                    "returnSecureToken": true,
                }),
            )
            .await?;

        // Attach the display name in a follow-up call, as the sign-up
        // endpoint does not accept one.
        let updated = self
            .identity_call(
                "update",
                json!({
                    "idToken": created.id_token,
                    "displayName": display_name,
                    "returnSecureToken": false,
                }),
            )
            .await?;

        let identity = Identity::new(created.local_id, created.email, updated.display_name);

        Ok(self.adopt(AuthState {
            id_token: created.id_token,
            identity,
        }))
    }

    async fn login(&self, email: &str, password: &str) -> Result<Identity, CredentialError> {
        let account = self
            .identity_call(
                "signInWithPassword",
                json!({
                    "email": email,
                    "password": password,
                    "returnSecureToken": true,
                }),
            )
            .await?;

        let identity = Identity::new(account.local_id, account.email, account.display_name);

        Ok(self.adopt(AuthState {
            id_token: account.id_token,
            identity,
        }))
    }

    async fn logout(&self) -> Result<(), CredentialError> {
        // The REST surface has no sign-out call; discarding the token is
        // the whole operation, so this can never fail.
        if let Ok(mut auth) = self.auth.write() {
            *auth = None;
        }
        self.identity_tx.send_replace(None);

        Ok(())
    }

    async fn update_profile(&self, update: ProfileUpdate) -> Result<Identity, CredentialError> {
        let state = self
            .auth
            .read()
            .ok()
            .and_then(|auth| auth.clone())
            .ok_or(CredentialError::UserNotFound)?;

        let display_name = update
            .display_name
            .unwrap_or_else(|| state.identity.display_name.clone());

        let updated = self
            .identity_call(
                "update",
                json!({
                    "idToken": state.id_token,
                    "displayName": display_name,
                    "returnSecureToken": false,
                }),
            )
            .await?;

        let identity = Identity::new(
            state.identity.id.clone(),
            state.identity.email.clone(),
            updated.display_name,
        );

        Ok(self.adopt(AuthState {
            id_token: state.id_token,
            identity,
        }))
    }

    fn observe(&self) -> watch::Receiver<Option<Identity>> {
        self.identity_tx.subscribe()
    }
}

#[async_trait]
impl DocumentStore for FirebaseBackend {
    async fn create(&self, collection: Collection, data: Value) -> Result<String, WriteError> {
        let url = collection_url(&self.config, collection);

        let mut request = self
            .http
            .post(&url)
            .json(&json!({ "fields": encode_fields(&data) }));
        if let Some(token) = self.bearer_token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(rejected(response).await);
        }

        let created: FirestoreDocument = response.json().await?;
        let id = document_id(&created.name);

        self.refresh_collection(collection).await;

        Ok(id)
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        data: Value,
    ) -> Result<(), WriteError> {
        let url = format!("{}/{id}", collection_url(&self.config, collection));

        let mut request = self
            .http
            .patch(&url)
            .json(&json!({ "fields": encode_fields(&data) }));
        if let Some(token) = self.bearer_token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(WriteError::NotFound);
        }
        if !response.status().is_success() {
            return Err(rejected(response).await);
        }

        self.refresh_collection(collection).await;

        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), WriteError> {
        let url = format!("{}/{id}", collection_url(&self.config, collection));

        let mut request = self.http.delete(&url);
        if let Some(token) = self.bearer_token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        // Firestore treats deleting an absent document as success; mirror
        // that for an explicit 404 as well.
        if !response.status().is_success() && response.status() != reqwest::StatusCode::NOT_FOUND {
            return Err(rejected(response).await);
        }

        self.refresh_collection(collection).await;

        Ok(())
    }

    fn subscribe(&self, collection: Collection) -> watch::Receiver<Vec<Document>> {
        self.collection_sender(collection).subscribe()
    }
}

#[async_trait]
impl BlobStore for FirebaseBackend {
    async fn store(&self, bytes: &[u8], path: &str) -> Result<String, UploadError> {
        let url = format!(
            "{STORAGE_BASE}/b/{}/o?uploadType=media&name={path}",
            self.config.storage_bucket
        );

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes.to_vec())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(UploadError::Rejected(format!(
                "upload failed with status {status}: {text}"
            )));
        }

        let uploaded: StorageObject = response.json().await?;
        let encoded = path.replace('/', "%2F");
        let mut public_url = format!(
            "{STORAGE_BASE}/b/{}/o/{encoded}?alt=media",
            self.config.storage_bucket
        );
        if let Some(token) = uploaded.download_tokens {
            public_url.push_str("&token=");
            public_url.push_str(&token);
        }

        Ok(public_url)
    }
}

fn spawn_poller(
    http: Client,
    config: FirebaseConfig,
    auth: Arc<RwLock<Option<AuthState>>>,
    collection: Collection,
    tx: watch::Sender<Vec<Document>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(POLL_INTERVAL);

        loop {
            interval.tick().await;

            match list_documents(&http, &config, &auth, collection).await {
                Ok(documents) => {
                    debug!(
                        collection = collection.as_str(),
                        count = documents.len(),
                        "snapshot refreshed"
                    );
                    tx.send_replace(documents);
                }
                Err(error) => {
                    // Stale-but-consistent: keep the last good snapshot.
                    warn!(%error, collection = collection.as_str(), "snapshot poll failed");
                }
            }
        }
    })
}

async fn list_documents(
    http: &Client,
    config: &FirebaseConfig,
    auth: &Arc<RwLock<Option<AuthState>>>,
    collection: Collection,
) -> Result<Vec<Document>, WriteError> {
    let url = format!("{}?pageSize=300", collection_url(config, collection));

    let mut request = http.get(&url);
    let token = auth
        .read()
        .ok()
        .and_then(|state| state.as_ref().map(|state| state.id_token.clone()));
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }

    let response = request.send().await?;
    if !response.status().is_success() {
        return Err(rejected(response).await);
    }

    let listing: FirestoreListing = response.json().await?;

    Ok(listing
        .documents
        .into_iter()
        .map(|document| Document {
            id: document_id(&document.name),
            data: decode_fields(&document.fields),
        })
        .collect())
}

fn collection_url(config: &FirebaseConfig, collection: Collection) -> String {
    format!(
        "{FIRESTORE_BASE}/projects/{}/databases/(default)/documents/{}?key={}",
        config.project_id,
        collection.as_str(),
        config.api_key
    )
}

async fn rejected(response: reqwest::Response) -> WriteError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    WriteError::Rejected(format!("status {status}: {text}"))
}

/// The final path segment of a Firestore document name.
fn document_id(name: &str) -> String {
    name.rsplit('/').next().unwrap_or(name).to_owned()
}

fn credential_error_for(message: &str) -> CredentialError {
    // Firebase appends detail after a colon for some codes, e.g.
    // "WEAK_PASSWORD : Password should be at least 6 characters".
    let code = message.split_whitespace().next().unwrap_or(message);

    match code {
        "EMAIL_NOT_FOUND" => CredentialError::UserNotFound,
        "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => CredentialError::WrongPassword,
        "EMAIL_EXISTS" => CredentialError::EmailInUse,
        "WEAK_PASSWORD" => CredentialError::WeakPassword,
        "INVALID_EMAIL" | "MISSING_EMAIL" => CredentialError::InvalidEmail,
        "TOO_MANY_ATTEMPTS_TRY_LATER" => CredentialError::RateLimited,
        _ => CredentialError::Unknown(message.to_owned()),
    }
}

// --- Firestore value mapping -------------------------------------------

/// Encodes a JSON object into Firestore's typed field map.
fn encode_fields(data: &Value) -> Value {
    match data.as_object() {
        Some(fields) => Value::Object(
            fields
                .iter()
                .map(|(key, value)| (key.clone(), encode_value(value)))
                .collect(),
        ),
        None => Value::Object(Map::new()),
    }
}

fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(flag) => json!({ "booleanValue": flag }),
        Value::Number(number) if number.is_f64() => json!({ "doubleValue": number }),
        // Firestore carries integers as decimal strings.
        Value::Number(number) => json!({ "integerValue": number.to_string() }),
        Value::String(text) => json!({ "stringValue": text }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(_) => json!({ "mapValue": { "fields": encode_fields(value) } }),
    }
}

/// Decodes Firestore's typed field map back into a plain JSON object.
fn decode_fields(fields: &Value) -> Value {
    match fields.as_object() {
        Some(fields) => Value::Object(
            fields
                .iter()
                .map(|(key, value)| (key.clone(), decode_value(value)))
                .collect(),
        ),
        None => Value::Object(Map::new()),
    }
}

fn decode_value(value: &Value) -> Value {
    if let Some(text) = value.get("stringValue").and_then(Value::as_str) {
        return Value::String(text.to_owned());
    }
    if let Some(integer) = value.get("integerValue") {
        let parsed = integer
            .as_str()
            .and_then(|text| text.parse::<i64>().ok())
            .or_else(|| integer.as_i64());
        if let Some(parsed) = parsed {
            return json!(parsed);
        }
    }
    if let Some(double) = value.get("doubleValue").and_then(Value::as_f64) {
        return json!(double);
    }
    if let Some(flag) = value.get("booleanValue").and_then(Value::as_bool) {
        return Value::Bool(flag);
    }
    if let Some(items) = value
        .get("arrayValue")
        .and_then(|array| array.get("values"))
        .and_then(Value::as_array)
    {
        return Value::Array(items.iter().map(decode_value).collect());
    }
    if let Some(fields) = value.get("mapValue").and_then(|map| map.get("fields")) {
        return decode_fields(fields);
    }
    if let Some(timestamp) = value.get("timestampValue").and_then(Value::as_str) {
        return Value::String(timestamp.to_owned());
    }

    Value::Null
}

#[derive(Debug, Deserialize)]
struct AccountResponse {
    #[serde(rename = "localId", default)]
    local_id: String,

    #[serde(rename = "idToken", default)]
    id_token: String,

    #[serde(default)]
    email: String,

    #[serde(rename = "displayName", default)]
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct FirestoreListing {
    #[serde(default)]
    documents: Vec<FirestoreDocument>,
}

#[derive(Debug, Deserialize)]
struct FirestoreDocument {
    name: String,

    #[serde(default)]
    fields: Value,
}

#[derive(Debug, Deserialize)]
struct StorageObject {
    #[serde(rename = "downloadTokens")]
    download_tokens: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_encoding_round_trips() {
        let data = json!({
            "name": "Pizza mozzarella",
            "price": 40_000,
            "popular": true,
            "ingredients": ["Mozzarella cheese", "Tomato sauce"],
            "valid_until": null,
        });

        let decoded = decode_fields(&encode_fields(&data));

        assert_eq!(decoded, data);
    }

    #[test]
    fn integers_ride_as_decimal_strings() {
        let encoded = encode_value(&json!(40_000));

        assert_eq!(encoded, json!({ "integerValue": "40000" }));
        assert_eq!(decode_value(&encoded), json!(40_000));
    }

    #[test]
    fn document_id_is_the_last_path_segment() {
        let name = "projects/makanbar/databases/(default)/documents/menus/abc123";

        assert_eq!(document_id(name), "abc123");
    }

    #[test]
    fn firebase_error_codes_map_onto_the_taxonomy() {
        assert!(matches!(
            credential_error_for("EMAIL_NOT_FOUND"),
            CredentialError::UserNotFound
        ));
        assert!(matches!(
            credential_error_for("EMAIL_EXISTS"),
            CredentialError::EmailInUse
        ));
        assert!(matches!(
            credential_error_for("WEAK_PASSWORD : Password should be at least 6 characters"),
            CredentialError::WeakPassword
        ));
        assert!(matches!(
            credential_error_for("TOO_MANY_ATTEMPTS_TRY_LATER"),
            CredentialError::RateLimited
        ));
        assert!(matches!(
            credential_error_for("SOMETHING_ELSE"),
            CredentialError::Unknown(_)
        ));
    }

    #[test]
    fn config_from_env_requires_all_three_values() {
        // Not set in the test environment.
        assert!(FirebaseConfig::from_env().is_none());
    }
}

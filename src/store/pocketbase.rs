//! PocketBase REST implementation of the record store

use crate::config::StoreConfig;
use crate::store::traits::{ListQuery, RecordStore, StoreError, StoreResult};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use url::Url;

/// Items requested per list page
const PAGE_SIZE: usize = 500;

/// Password-auth endpoints, tried in order
const AUTH_ENDPOINTS: &[(&str, &str)] = &[
    ("admin", "api/admins/auth-with-password"),
    ("user", "api/collections/users/auth-with-password"),
];

#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    items: Vec<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    id: String,
}

/// PocketBase client
pub struct PocketBaseStore {
    client: Client,
    api_base: Url,
    token: Option<String>,
}

impl PocketBaseStore {
    /// Creates an anonymous client for the given API base URL
    pub fn new(api_base: &str) -> StoreResult<Self> {
        let mut api_base =
            Url::parse(api_base).map_err(|e| StoreError::InvalidUrl(format!("{}: {}", api_base, e)))?;
        if !api_base.path().ends_with('/') {
            let path = format!("{}/", api_base.path());
            api_base.set_path(&path);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            api_base,
            token: None,
        })
    }

    /// Creates a client and logs in with the configured credentials
    ///
    /// Admin auth is tried first, then user auth. Missing or rejected
    /// credentials leave the client anonymous with a warning.
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        let mut store = Self::new(&config.api_base)?;
        tracing::debug!("Initializing store client: {}", config.api_base);

        if config.is_anonymous() {
            tracing::warn!(
                "No store credentials provided, running anonymously. \
                 Make sure collection permissions allow it."
            );
            return Ok(store);
        }

        store.authenticate(&config.email, &config.password).await;
        Ok(store)
    }

    async fn authenticate(&mut self, identity: &str, password: &str) {
        for (role, path) in AUTH_ENDPOINTS {
            match self.auth_with_password(path, identity, password).await {
                Ok(token) => {
                    tracing::info!("Logged in to store as {} {}", role, identity);
                    self.token = Some(token);
                    return;
                }
                Err(e) => tracing::debug!("Store {} auth failed: {}", role, e),
            }
        }

        tracing::warn!(
            "Store authentication failed, running anonymously. Check credentials and permissions."
        );
    }

    async fn auth_with_password(
        &self,
        path: &str,
        identity: &str,
        password: &str,
    ) -> StoreResult<String> {
        let response = self
            .client
            .post(self.endpoint(path)?)
            .json(&json!({ "identity": identity, "password": password }))
            .send()
            .await?;
        let auth: AuthResponse = read_json(response, "auth-with-password").await?;
        Ok(auth.token)
    }

    /// Returns true if a login succeeded
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn endpoint(&self, path: &str) -> StoreResult<Url> {
        self.api_base
            .join(path)
            .map_err(|e| StoreError::InvalidUrl(format!("{}: {}", path, e)))
    }

    fn records_endpoint(&self, collection: &str) -> StoreResult<Url> {
        self.endpoint(&format!("api/collections/{}/records", collection))
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.header(AUTHORIZATION, token),
            None => builder,
        }
    }
}

#[async_trait]
impl RecordStore for PocketBaseStore {
    async fn list(
        &self,
        collection: &str,
        query: &ListQuery,
    ) -> StoreResult<Vec<Map<String, Value>>> {
        let endpoint = self.records_endpoint(collection)?;
        let mut results = Vec::new();
        let mut page = 1usize;

        loop {
            let mut params = vec![
                ("page", page.to_string()),
                ("perPage", PAGE_SIZE.to_string()),
                ("skipTotal", "true".to_string()),
            ];
            if let Some(filter) = &query.filter {
                params.push(("filter", filter.clone()));
            }
            if !query.fields.is_empty() {
                params.push(("fields", query.fields.join(",")));
            }

            let response = self
                .authorize(self.client.get(endpoint.clone()).query(&params))
                .send()
                .await?;
            let list: ListResponse = read_json(response, &format!("list {}", collection)).await?;

            let count = list.items.len();
            results.extend(list.items);

            if count < PAGE_SIZE {
                break;
            }
            page += 1;
        }

        tracing::debug!("Read {} items from {}", results.len(), collection);
        Ok(results)
    }

    async fn create(&self, collection: &str, body: &Map<String, Value>) -> StoreResult<String> {
        let response = self
            .authorize(self.client.post(self.records_endpoint(collection)?).json(body))
            .send()
            .await?;
        let created: CreateResponse =
            read_json(response, &format!("create {}", collection)).await?;
        Ok(created.id)
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(
    response: Response,
    operation: &str,
) -> StoreResult<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(StoreError::Status {
            status: status.as_u16(),
            operation: operation.to_string(),
            body,
        });
    }

    Ok(serde_json::from_str(&body)?)
}

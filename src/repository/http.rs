//! HTTP implementation of the equipment repository

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use super::EquipmentRepository;
use crate::{
    config::ApiConfig,
    error::{AppError, AppResult, ErrorResponse},
    models::{
        CheckoutRequest, Equipment, EquipmentCheckout, EquipmentType, Profile,
        StagedCheckoutRequest,
    },
};

const GET_ALL_TYPES: &str = "/api/equipment/get_all_types";
const GET_ALL: &str = "/api/equipment/get_all";
const UPDATE: &str = "/api/equipment/update";
const ADD_REQUEST: &str = "/api/equipment/add_request";
const DELETE_REQUEST: &str = "/api/equipment/delete_request";
const GET_ALL_REQUESTS: &str = "/api/equipment/get_all_requests";
const CREATE_STAGED_REQUEST: &str = "/api/equipment/create_staged_request";
const GET_EQUIPMENT_FOR_REQUEST: &str = "/api/equipment/get_equipment_for_request";
const UPDATE_WAIVER_FIELD: &str = "/api/equipment/update_waiver_field";
const GET_ALL_STAGED_REQUESTS: &str = "/api/equipment/get_all_staged_requests";
const DELETE_STAGED_REQUEST: &str = "/api/equipment/delete_staged_request";
const GET_ALL_ACTIVE_CHECKOUTS: &str = "/api/equipment/get_all_active_checkouts";
const CREATE_CHECKOUT: &str = "/api/equipment/create_checkout";
const RETURN_CHECKOUT: &str = "/api/equipment/return_checkout";
const PROFILE: &str = "/api/profile";

#[derive(Clone)]
pub struct HttpRepository {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpRepository {
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            AppError::Configuration(format!("Invalid API base URL {}: {}", config.base_url, e))
        })?;

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("equipment-checkout/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: config.token.clone().filter(|t| !t.is_empty()),
        })
    }

    /// Absolute URL of an endpoint; extra path segments are percent-encoded
    fn url(&self, path: &str, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut parts = url.path_segments_mut().map_err(|_| {
                AppError::Configuration(format!("API base URL {} cannot hold a path", self.base_url))
            })?;
            parts.pop_if_empty();
            parts.extend(path.trim_start_matches('/').split('/'));
            parts.extend(segments);
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let url = self.url(path, &[])?;
        let response = self.request(Method::GET, url).send().await?;
        Self::json(response).await
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: &B) -> AppResult<T>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path, &[])?;
        let response = self.request(method, url).json(body).send().await?;
        Self::json(response).await
    }

    async fn send_no_content<B>(&self, method: Method, path: &str, body: &B) -> AppResult<()>
    where
        B: serde::Serialize + ?Sized,
    {
        let url = self.url(path, &[])?;
        let response = self.request(method, url).json(body).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn json<T: DeserializeOwned>(response: Response) -> AppResult<T> {
        let response = Self::check(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Turn non-success statuses into `AppError::Api` carrying the backend detail
    async fn check(response: Response) -> AppResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(error) => error.into_detail(),
            Err(_) if body.is_empty() => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
            Err(_) => body,
        };

        tracing::debug!("Backend answered {}: {}", status, detail);
        Err(AppError::Api {
            status: status.as_u16(),
            detail,
        })
    }
}

#[async_trait]
impl EquipmentRepository for HttpRepository {
    async fn get_all_types(&self) -> AppResult<Vec<EquipmentType>> {
        self.get(GET_ALL_TYPES).await
    }

    async fn get_all_equipment(&self) -> AppResult<Vec<Equipment>> {
        self.get(GET_ALL).await
    }

    async fn update_equipment(&self, item: &Equipment) -> AppResult<Equipment> {
        self.send(Method::PUT, UPDATE, item).await
    }

    async fn add_request(&self, request: &CheckoutRequest) -> AppResult<CheckoutRequest> {
        self.send(Method::POST, ADD_REQUEST, request).await
    }

    async fn delete_request(&self, request: &CheckoutRequest) -> AppResult<()> {
        self.send_no_content(Method::DELETE, DELETE_REQUEST, request).await
    }

    async fn get_all_requests(&self) -> AppResult<Vec<CheckoutRequest>> {
        self.get(GET_ALL_REQUESTS).await
    }

    async fn create_staged_request(
        &self,
        staged: &StagedCheckoutRequest,
    ) -> AppResult<StagedCheckoutRequest> {
        self.send(Method::POST, CREATE_STAGED_REQUEST, staged).await
    }

    async fn get_equipment_for_request(&self, model: &str) -> AppResult<Vec<Equipment>> {
        let url = self.url(GET_EQUIPMENT_FOR_REQUEST, &[model])?;
        let response = self.request(Method::GET, url).send().await?;
        Self::json(response).await
    }

    async fn update_waiver_field(&self, profile: &Profile) -> AppResult<Profile> {
        self.send(Method::PUT, UPDATE_WAIVER_FIELD, profile).await
    }

    async fn get_all_staged_requests(&self) -> AppResult<Vec<StagedCheckoutRequest>> {
        self.get(GET_ALL_STAGED_REQUESTS).await
    }

    async fn delete_staged_request(&self, staged: &StagedCheckoutRequest) -> AppResult<()> {
        self.send_no_content(Method::DELETE, DELETE_STAGED_REQUEST, staged).await
    }

    async fn get_all_active_checkouts(&self) -> AppResult<Vec<EquipmentCheckout>> {
        self.get(GET_ALL_ACTIVE_CHECKOUTS).await
    }

    async fn create_checkout(&self, checkout: &EquipmentCheckout) -> AppResult<EquipmentCheckout> {
        self.send(Method::POST, CREATE_CHECKOUT, checkout).await
    }

    async fn return_checkout(&self, checkout: &EquipmentCheckout) -> AppResult<EquipmentCheckout> {
        self.send(Method::PUT, RETURN_CHECKOUT, checkout).await
    }

    async fn get_profile(&self) -> AppResult<Profile> {
        self.get(PROFILE).await
    }
}

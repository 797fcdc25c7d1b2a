use std::sync::Arc;

use serde_json::{json, Value};

use crate::dispatcher::{ApiRequest, Dispatcher};
use crate::domain::{Alert, AlertStatus, CreateAlertRequest, ListAlertsParams, NotificationChannel};
use crate::envelope::{decode, Page};
use crate::error::Result;
use crate::pagination::AlertPager;
use crate::resources::{encode_body, path_segment};
use crate::validation::{require_id, validate_create_request, validate_status_update};

/// `/alerts` endpoints.
#[derive(Clone)]
pub struct Alerts {
    dispatcher: Arc<Dispatcher>,
}

impl Alerts {
    pub(crate) fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    /// `GET /alerts`. Filters left as `None` are not sent; the symbol filter
    /// is uppercased.
    pub async fn list(&self, params: &ListAlertsParams) -> Result<Page<Alert>> {
        let request = ApiRequest::get("/alerts")
            .with_optional_query("status", params.status.map(AlertStatus::as_str))
            .with_optional_query(
                "symbol",
                params
                    .symbol
                    .as_deref()
                    .map(|symbol| symbol.trim().to_ascii_uppercase()),
            )
            .with_optional_query("condition", params.condition.map(|c| c.as_str()))
            .with_optional_query("limit", params.limit)
            .with_optional_query("offset", params.offset);

        let value = self.dispatcher.dispatch(request).await?;
        Page::from_value(value)
    }

    /// `POST /alerts`. Notification defaults to email; the request is
    /// validated locally before anything is sent.
    pub async fn create(&self, mut request: CreateAlertRequest) -> Result<Alert> {
        if request.notification.is_none() {
            request.notification = Some(NotificationChannel::default().into());
        }
        validate_create_request(&mut request)?;

        let body = encode_body(&request)?;
        let value = self
            .dispatcher
            .dispatch(ApiRequest::post("/alerts").with_json(body))
            .await?;
        decode(value)
    }

    /// `GET /alerts/{id}`.
    pub async fn get(&self, id: &str) -> Result<Alert> {
        require_id("Alert", id)?;
        let value = self
            .dispatcher
            .dispatch(ApiRequest::get(format!("/alerts/{}", path_segment(id))))
            .await?;
        decode(value)
    }

    /// `PUT /alerts/{id}` with `{"status": ...}`; only active or paused.
    pub async fn update(&self, id: &str, status: AlertStatus) -> Result<Alert> {
        require_id("Alert", id)?;
        validate_status_update(status)?;
        let value = self
            .dispatcher
            .dispatch(
                ApiRequest::put(format!("/alerts/{}", path_segment(id)))
                    .with_json(json!({ "status": status.as_str() })),
            )
            .await?;
        decode(value)
    }

    /// `DELETE /alerts/{id}`.
    pub async fn delete(&self, id: &str) -> Result<Value> {
        require_id("Alert", id)?;
        self.dispatcher
            .dispatch(ApiRequest::delete(format!("/alerts/{}", path_segment(id))))
            .await
    }

    /// Lazily walks every alert matching `params`, starting at offset 0.
    pub fn iterate(&self, params: ListAlertsParams) -> AlertPager {
        AlertPager::new(self.clone(), params)
    }
}

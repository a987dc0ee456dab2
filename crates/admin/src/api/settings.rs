//! Shipping-rate and payment-configuration endpoints.

use reqwest::Method;
use tracing::instrument;

use cuztory_core::ShippingRateId;

use super::{AdminApiClient, ApiError};
use crate::models::{PaymentConfig, ShippingRate, ShippingRateForm};

impl AdminApiClient {
    /// `GET /shipping-rates`
    #[instrument(skip(self))]
    pub async fn list_shipping_rates(&self) -> Result<Vec<ShippingRate>, ApiError> {
        self.get_json("/shipping-rates").await
    }

    /// `POST /shipping-rates/add`
    #[instrument(skip(self, form), fields(name = %form.name))]
    pub async fn add_shipping_rate(&self, form: &ShippingRateForm) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "/shipping-rates/add")
            .json(form);
        self.send_empty(request).await
    }

    /// `DELETE /shipping-rates/:id`
    #[instrument(skip(self), fields(rate_id = %id))]
    pub async fn delete_shipping_rate(&self, id: &ShippingRateId) -> Result<(), ApiError> {
        let path = format!("/shipping-rates/{}", urlencoding::encode(id.as_str()));
        self.send_empty(self.request(Method::DELETE, &path)).await
    }

    /// `GET /payment-config/get`; a store that never saved one gets the
    /// defaults.
    #[instrument(skip(self))]
    pub async fn payment_config(&self) -> Result<PaymentConfig, ApiError> {
        let config: Option<PaymentConfig> = self.get_json("/payment-config/get").await?;
        Ok(config.unwrap_or_default())
    }

    /// `POST /payment-config/set`
    #[instrument(skip(self, config))]
    pub async fn save_payment_config(&self, config: &PaymentConfig) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "/payment-config/set")
            .json(config);
        self.send_empty(request).await
    }
}

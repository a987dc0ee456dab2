//! Catalog and store-settings screens.
//!
//! Each mutation validates its form first, asks before deleting and hands
//! back the refetched list on success.

use std::future::Future;

use tracing::instrument;

use cuztory_core::{BannerId, CollectionId, ProductId, ShippingRateId};

use crate::api::{AdminApiClient, ApiError};
use crate::console::{Notice, Operator};
use crate::error::{AppError, ValidationError};
use crate::models::{
    AnalyticsSummary, Banner, BannerForm, Collection, CollectionForm, PaymentConfig, Product,
    ProductForm, ShippingRate, ShippingRateForm,
};

/// Catalog and settings actions for one operator.
pub struct CatalogScreens<O> {
    client: AdminApiClient,
    operator: O,
}

impl<O: Operator> CatalogScreens<O> {
    pub const fn new(client: AdminApiClient, operator: O) -> Self {
        Self { client, operator }
    }

    pub const fn operator(&self) -> &O {
        &self.operator
    }

    fn fail<T>(&self, error: impl Into<AppError>) -> Result<T, AppError> {
        let error = error.into();
        error.report();
        self.operator.notify(Notice::Error(error.operator_message()));
        Err(error)
    }

    /// Run a fetch, reporting failures.
    async fn load<T>(
        &self,
        fetch: impl Future<Output = Result<T, ApiError>>,
    ) -> Result<T, AppError> {
        match fetch.await {
            Ok(value) => Ok(value),
            Err(e) => self.fail(e),
        }
    }

    /// Validate, run `call`, announce `done`.
    async fn mutate(
        &self,
        validation: Result<(), ValidationError>,
        call: impl Future<Output = Result<(), ApiError>>,
        done: String,
    ) -> Result<(), AppError> {
        if let Err(e) = validation {
            return self.fail(e);
        }
        match call.await {
            Ok(()) => {
                tracing::info!(action = %done, "Catalog updated");
                self.operator.notify(Notice::Success(done));
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    fn confirm_delete(&self, what: &str) -> Result<(), AppError> {
        if self.operator.confirm(&format!("Delete this {what}?")) {
            Ok(())
        } else {
            Err(AppError::Cancelled(format!("{what} not deleted")))
        }
    }

    // =========================================================================
    // Collections
    // =========================================================================

    /// Collections with their products.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Api` if any fetch fails.
    pub async fn collections(&self) -> Result<Vec<Collection>, AppError> {
        self.load(self.client.list_collections_with_products()).await
    }

    /// Create a collection, or update `id` when given.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` (no request is made) or `AppError::Api`.
    #[instrument(skip(self, form), fields(name = %form.name))]
    pub async fn save_collection(
        &self,
        id: Option<&CollectionId>,
        form: &CollectionForm,
    ) -> Result<Vec<Collection>, AppError> {
        match id {
            Some(id) => {
                self.mutate(
                    form.validate(),
                    self.client.update_collection(id, form),
                    format!("Collection \"{}\" updated", form.name.trim()),
                )
                .await?;
            }
            None => {
                self.mutate(
                    form.validate(),
                    self.client.create_collection(form),
                    format!("Collection \"{}\" created", form.name.trim()),
                )
                .await?;
            }
        }
        self.collections().await
    }

    /// # Errors
    ///
    /// Returns `AppError::Cancelled` if the operator declines, or
    /// `AppError::Api`.
    #[instrument(skip(self), fields(collection_id = %id))]
    pub async fn delete_collection(&self, id: &CollectionId) -> Result<Vec<Collection>, AppError> {
        self.confirm_delete("collection")?;
        self.mutate(
            Ok(()),
            self.client.delete_collection(id),
            "Collection deleted".to_string(),
        )
        .await?;
        self.collections().await
    }

    // =========================================================================
    // Banners
    // =========================================================================

    /// # Errors
    ///
    /// Returns `AppError::Api` if the fetch fails.
    pub async fn banners(&self) -> Result<Vec<Banner>, AppError> {
        self.load(self.client.list_banners()).await
    }

    /// Create a banner, or update `id` when given.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` (no request is made) or `AppError::Api`.
    #[instrument(skip(self, form), fields(title = %form.title))]
    pub async fn save_banner(
        &self,
        id: Option<&BannerId>,
        form: &BannerForm,
    ) -> Result<Vec<Banner>, AppError> {
        match id {
            Some(id) => {
                self.mutate(
                    form.validate(),
                    self.client.update_banner(id, form),
                    format!("Banner \"{}\" updated", form.title.trim()),
                )
                .await?;
            }
            None => {
                self.mutate(
                    form.validate(),
                    self.client.create_banner(form),
                    format!("Banner \"{}\" created", form.title.trim()),
                )
                .await?;
            }
        }
        self.banners().await
    }

    /// # Errors
    ///
    /// Returns `AppError::Cancelled` if the operator declines, or
    /// `AppError::Api`.
    #[instrument(skip(self), fields(banner_id = %id))]
    pub async fn delete_banner(&self, id: &BannerId) -> Result<Vec<Banner>, AppError> {
        self.confirm_delete("banner")?;
        self.mutate(
            Ok(()),
            self.client.delete_banner(id),
            "Banner deleted".to_string(),
        )
        .await?;
        self.banners().await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// # Errors
    ///
    /// Returns `AppError::Api` if the fetch fails.
    pub async fn products(&self) -> Result<Vec<Product>, AppError> {
        self.load(self.client.list_products()).await
    }

    /// Create a product, or update `id` when given.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` (no request is made) or `AppError::Api`.
    #[instrument(skip(self, form), fields(title = %form.title))]
    pub async fn save_product(
        &self,
        id: Option<&ProductId>,
        form: &ProductForm,
    ) -> Result<Vec<Product>, AppError> {
        match id {
            Some(id) => {
                self.mutate(
                    form.validate(),
                    self.client.update_product(id, form),
                    format!("Product \"{}\" updated", form.title.trim()),
                )
                .await?;
            }
            None => {
                self.mutate(
                    form.validate(),
                    self.client.create_product(form),
                    format!("Product \"{}\" created", form.title.trim()),
                )
                .await?;
            }
        }
        self.products().await
    }

    /// # Errors
    ///
    /// Returns `AppError::Cancelled` if the operator declines, or
    /// `AppError::Api`.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<Vec<Product>, AppError> {
        self.confirm_delete("product")?;
        self.mutate(
            Ok(()),
            self.client.delete_product(id),
            "Product deleted".to_string(),
        )
        .await?;
        self.products().await
    }

    // =========================================================================
    // Settings
    // =========================================================================

    /// # Errors
    ///
    /// Returns `AppError::Api` if the fetch fails.
    pub async fn shipping_rates(&self) -> Result<Vec<ShippingRate>, AppError> {
        self.load(self.client.list_shipping_rates()).await
    }

    /// # Errors
    ///
    /// Returns `AppError::Validation` (no request is made) or `AppError::Api`.
    #[instrument(skip(self, form), fields(name = %form.name))]
    pub async fn add_shipping_rate(
        &self,
        form: &ShippingRateForm,
    ) -> Result<Vec<ShippingRate>, AppError> {
        self.mutate(
            form.validate(),
            self.client.add_shipping_rate(form),
            format!("Shipping rate \"{}\" added", form.name.trim()),
        )
        .await?;
        self.shipping_rates().await
    }

    /// # Errors
    ///
    /// Returns `AppError::Cancelled` if the operator declines, or
    /// `AppError::Api`.
    #[instrument(skip(self), fields(shipping_rate_id = %id))]
    pub async fn delete_shipping_rate(
        &self,
        id: &ShippingRateId,
    ) -> Result<Vec<ShippingRate>, AppError> {
        self.confirm_delete("shipping rate")?;
        self.mutate(
            Ok(()),
            self.client.delete_shipping_rate(id),
            "Shipping rate deleted".to_string(),
        )
        .await?;
        self.shipping_rates().await
    }

    /// # Errors
    ///
    /// Returns `AppError::Api` if the fetch fails.
    pub async fn payment_config(&self) -> Result<PaymentConfig, AppError> {
        self.load(self.client.payment_config()).await
    }

    /// # Errors
    ///
    /// Returns `AppError::Validation` (no request is made) or `AppError::Api`.
    #[instrument(skip(self, config))]
    pub async fn save_payment_config(
        &self,
        config: &PaymentConfig,
    ) -> Result<PaymentConfig, AppError> {
        self.mutate(
            config.validate(),
            self.client.save_payment_config(config),
            "Payment configuration saved".to_string(),
        )
        .await?;
        self.payment_config().await
    }

    /// # Errors
    ///
    /// Returns `AppError::Api` if the fetch fails.
    pub async fn analytics(&self) -> Result<AnalyticsSummary, AppError> {
        self.load(self.client.analytics()).await
    }
}

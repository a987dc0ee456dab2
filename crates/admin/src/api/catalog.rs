//! Collection, banner and product endpoints.
//!
//! Create and edit requests are `multipart/form-data`; nested product fields
//! travel as JSON strings inside the form.

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use tracing::instrument;

use cuztory_core::{BannerId, CollectionId, ProductId};

use super::{AdminApiClient, ApiError};
use crate::models::{Banner, BannerForm, Collection, CollectionForm, Product, ProductForm, Upload};

fn id_path(prefix: &str, id: &str) -> String {
    format!("{prefix}/{}", urlencoding::encode(id))
}

fn file_part(upload: &Upload) -> Result<Part, ApiError> {
    Ok(Part::bytes(upload.bytes.clone())
        .file_name(upload.file_name.clone())
        .mime_str(&upload.content_type)?)
}

fn collection_form(form: &CollectionForm) -> Result<Form, ApiError> {
    let mut multipart = Form::new()
        .text("name", form.name.trim().to_string())
        .text("description", form.description.clone());
    if let Some(image) = &form.image {
        multipart = multipart.part("file", file_part(image)?);
    }
    Ok(multipart)
}

fn banner_form(form: &BannerForm) -> Result<Form, ApiError> {
    let mut multipart = Form::new()
        .text("title", form.title.trim().to_string())
        .text("subtitle", form.subtitle.clone())
        .text("link", form.link.clone())
        .text("isActive", form.is_active.to_string());
    if let Some(image) = &form.image {
        multipart = multipart.part("file", file_part(image)?);
    }
    Ok(multipart)
}

fn product_form(form: &ProductForm) -> Result<Form, ApiError> {
    let mut multipart = Form::new()
        .text("title", form.title.trim().to_string())
        .text("description", form.description.clone())
        .text("price", form.price.to_string())
        .text("category", form.category.clone())
        .text("collection", form.collection.clone())
        .text("isCustomizable", form.is_customizable.to_string())
        .text(
            "customizationFields",
            serde_json::to_string(&form.customization_fields)?,
        )
        .text("specifications", serde_json::to_string(&form.specifications)?)
        .text("stock", form.stock.to_string())
        .text("images", serde_json::to_string(&form.existing_images)?);
    for image in &form.new_images {
        multipart = multipart.part("productImages", file_part(image)?);
    }
    Ok(multipart)
}

impl AdminApiClient {
    // =========================================================================
    // Collections
    // =========================================================================

    /// `GET /collections`
    #[instrument(skip(self))]
    pub async fn list_collections(&self) -> Result<Vec<Collection>, ApiError> {
        self.get_json("/collections").await
    }

    /// `GET /collections/:id`, including the collection's products.
    #[instrument(skip(self), fields(collection_id = %id))]
    pub async fn get_collection(&self, id: &CollectionId) -> Result<Collection, ApiError> {
        self.get_json(&id_path("/collections", id.as_str())).await
    }

    /// Every collection with its products filled in.
    ///
    /// The list endpoint omits products, so each collection is fetched
    /// again individually.
    #[instrument(skip(self))]
    pub async fn list_collections_with_products(&self) -> Result<Vec<Collection>, ApiError> {
        let mut collections = self.list_collections().await?;
        for collection in &mut collections {
            collection.products = self.get_collection(&collection.id).await?.products;
        }
        Ok(collections)
    }

    /// `POST /collections/admin/create`
    #[instrument(skip(self, form), fields(name = %form.name))]
    pub async fn create_collection(&self, form: &CollectionForm) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "/collections/admin/create")
            .multipart(collection_form(form)?);
        self.send_empty(request).await
    }

    /// `PUT /collections/admin/edit/:id`
    #[instrument(skip(self, form), fields(collection_id = %id))]
    pub async fn update_collection(
        &self,
        id: &CollectionId,
        form: &CollectionForm,
    ) -> Result<(), ApiError> {
        let request = self
            .request(Method::PUT, &id_path("/collections/admin/edit", id.as_str()))
            .multipart(collection_form(form)?);
        self.send_empty(request).await
    }

    /// `DELETE /collections/admin/delete/:id`
    #[instrument(skip(self), fields(collection_id = %id))]
    pub async fn delete_collection(&self, id: &CollectionId) -> Result<(), ApiError> {
        let request = self.request(
            Method::DELETE,
            &id_path("/collections/admin/delete", id.as_str()),
        );
        self.send_empty(request).await
    }

    // =========================================================================
    // Banners
    // =========================================================================

    /// `GET /banners`; a `null` body is an empty list.
    #[instrument(skip(self))]
    pub async fn list_banners(&self) -> Result<Vec<Banner>, ApiError> {
        let banners: Option<Vec<Banner>> = self.get_json("/banners").await?;
        Ok(banners.unwrap_or_default())
    }

    /// `POST /banners/admin/create`
    #[instrument(skip(self, form), fields(title = %form.title))]
    pub async fn create_banner(&self, form: &BannerForm) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "/banners/admin/create")
            .multipart(banner_form(form)?);
        self.send_empty(request).await
    }

    /// `PUT /banners/admin/edit/:id`
    #[instrument(skip(self, form), fields(banner_id = %id))]
    pub async fn update_banner(&self, id: &BannerId, form: &BannerForm) -> Result<(), ApiError> {
        let request = self
            .request(Method::PUT, &id_path("/banners/admin/edit", id.as_str()))
            .multipart(banner_form(form)?);
        self.send_empty(request).await
    }

    /// `DELETE /banners/admin/delete/:id`
    #[instrument(skip(self), fields(banner_id = %id))]
    pub async fn delete_banner(&self, id: &BannerId) -> Result<(), ApiError> {
        let request = self.request(
            Method::DELETE,
            &id_path("/banners/admin/delete", id.as_str()),
        );
        self.send_empty(request).await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// `GET /products?forAdmin=true`
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.get_json("/products?forAdmin=true").await
    }

    /// `POST /products/add`
    #[instrument(skip(self, form), fields(title = %form.title, new_images = form.new_images.len()))]
    pub async fn create_product(&self, form: &ProductForm) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "/products/add")
            .multipart(product_form(form)?);
        self.send_empty(request).await
    }

    /// `PUT /products/admin/edit/:id`
    #[instrument(skip(self, form), fields(product_id = %id, new_images = form.new_images.len()))]
    pub async fn update_product(&self, id: &ProductId, form: &ProductForm) -> Result<(), ApiError> {
        let request = self
            .request(Method::PUT, &id_path("/products/admin/edit", id.as_str()))
            .multipart(product_form(form)?);
        self.send_empty(request).await
    }

    /// `DELETE /products/admin/delete/:id`
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), ApiError> {
        let request = self.request(
            Method::DELETE,
            &id_path("/products/admin/delete", id.as_str()),
        );
        self.send_empty(request).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_path_encodes() {
        assert_eq!(id_path("/collections", "c 1"), "/collections/c%201");
    }

    #[test]
    fn test_multipart_forms_build() {
        let collection = CollectionForm {
            name: "Mugs".to_string(),
            description: String::new(),
            image: Some(Upload::new("mug.png", vec![0x89, b'P', b'N', b'G'])),
        };
        assert!(collection_form(&collection).is_ok());

        let banner = BannerForm {
            title: "Diwali Sale".to_string(),
            ..BannerForm::default()
        };
        assert!(banner_form(&banner).is_ok());

        let product = ProductForm {
            title: "Photo Mug".to_string(),
            new_images: vec![Upload::new("front.jpg", vec![0xFF, 0xD8])],
            ..ProductForm::default()
        };
        assert!(product_form(&product).is_ok());
    }
}

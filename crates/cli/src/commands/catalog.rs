//! Collection, banner and product commands.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use rust_decimal::Decimal;

use cuztory_admin::models::{
    BannerForm, CollectionForm, CustomizationField, ProductForm, ProductSpecification, Upload,
};
use cuztory_admin::{AdminConfig, AppError, CatalogScreens, ValidationError};
use cuztory_core::{BannerId, CollectionId, ProductId};

use super::{client, print};
use crate::operator::TerminalOperator;
use crate::output;

#[derive(Subcommand)]
pub enum CollectionAction {
    /// List collections with their products
    List,
    /// Create a collection
    Create(CollectionArgs),
    /// Replace a collection's details
    Edit {
        id: String,
        #[command(flatten)]
        args: CollectionArgs,
    },
    /// Delete a collection
    Delete { id: String },
}

#[derive(Args)]
pub struct CollectionArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    description: String,
    /// Image file to upload
    #[arg(long)]
    image: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum BannerAction {
    /// List banners
    List,
    /// Create a banner
    Create(BannerArgs),
    /// Replace a banner's details
    Edit {
        id: String,
        #[command(flatten)]
        args: BannerArgs,
    },
    /// Delete a banner
    Delete { id: String },
}

#[derive(Args)]
pub struct BannerArgs {
    #[arg(long)]
    title: String,
    #[arg(long, default_value = "")]
    subtitle: String,
    #[arg(long, default_value = "")]
    link: String,
    /// Create the banner hidden
    #[arg(long)]
    hidden: bool,
    #[arg(long)]
    image: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum ProductAction {
    /// List products
    List,
    /// Create a product
    Create(ProductArgs),
    /// Change a product; omitted fields keep their value
    Edit {
        id: String,
        #[command(flatten)]
        args: ProductArgs,
    },
    /// Delete a product
    Delete { id: String },
}

#[derive(Args)]
pub struct ProductArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    price: Option<Decimal>,
    #[arg(long)]
    category: Option<String>,
    /// Collection id
    #[arg(long)]
    collection: Option<String>,
    #[arg(long)]
    stock: Option<i64>,
    #[arg(long)]
    customizable: Option<bool>,
    /// JSON array of `{"label": "...", "type": "text|number|file"}`
    #[arg(long)]
    customization_fields: Option<String>,
    /// JSON array of `{"key": "...", "values": [{"value": "...", "stock": 0}]}`
    #[arg(long)]
    specifications: Option<String>,
    /// Image file to add; repeat for several
    #[arg(long = "image")]
    images: Vec<PathBuf>,
}

fn upload(path: &Path) -> Result<Upload, AppError> {
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .map_or_else(|| "upload".to_string(), |n| n.to_string_lossy().into_owned());
    Ok(Upload::new(name, bytes))
}

fn parse_json<T: serde::de::DeserializeOwned>(field: &str, raw: &str) -> Result<T, AppError> {
    serde_json::from_str(raw)
        .map_err(|e| ValidationError::new(format!("{field} is not valid JSON: {e}")).into())
}

impl CollectionArgs {
    fn into_form(self) -> Result<CollectionForm, AppError> {
        Ok(CollectionForm {
            name: self.name,
            description: self.description,
            image: self.image.as_deref().map(upload).transpose()?,
        })
    }
}

impl BannerArgs {
    fn into_form(self) -> Result<BannerForm, AppError> {
        Ok(BannerForm {
            title: self.title,
            subtitle: self.subtitle,
            link: self.link,
            is_active: !self.hidden,
            image: self.image.as_deref().map(upload).transpose()?,
        })
    }
}

impl ProductArgs {
    /// Apply the given flags on top of `form`.
    fn apply(self, mut form: ProductForm) -> Result<ProductForm, AppError> {
        if let Some(title) = self.title {
            form.title = title;
        }
        if let Some(description) = self.description {
            form.description = description;
        }
        if let Some(price) = self.price {
            form.price = price;
        }
        if let Some(category) = self.category {
            form.category = category;
        }
        if let Some(collection) = self.collection {
            form.collection = collection;
        }
        if let Some(stock) = self.stock {
            form.stock = stock;
        }
        if let Some(customizable) = self.customizable {
            form.is_customizable = customizable;
        }
        if let Some(raw) = self.customization_fields {
            form.customization_fields =
                parse_json::<Vec<CustomizationField>>("customization-fields", &raw)?;
        }
        if let Some(raw) = self.specifications {
            form.specifications = parse_json::<Vec<ProductSpecification>>("specifications", &raw)?;
        }
        form.new_images = self
            .images
            .iter()
            .map(|p| upload(p))
            .collect::<Result<_, _>>()?;
        Ok(form)
    }
}

pub async fn run_collection(
    config: &AdminConfig,
    operator: TerminalOperator,
    action: CollectionAction,
) -> Result<(), AppError> {
    let screens = CatalogScreens::new(client(config)?, operator);

    let collections = match action {
        CollectionAction::List => screens.collections().await?,
        CollectionAction::Create(args) => screens.save_collection(None, &args.into_form()?).await?,
        CollectionAction::Edit { id, args } => {
            screens
                .save_collection(Some(&CollectionId::new(id)), &args.into_form()?)
                .await?
        }
        CollectionAction::Delete { id } => {
            screens.delete_collection(&CollectionId::new(id)).await?
        }
    };
    print(|out| output::collections(out, &collections))
}

pub async fn run_banner(
    config: &AdminConfig,
    operator: TerminalOperator,
    action: BannerAction,
) -> Result<(), AppError> {
    let screens = CatalogScreens::new(client(config)?, operator);

    let banners = match action {
        BannerAction::List => screens.banners().await?,
        BannerAction::Create(args) => screens.save_banner(None, &args.into_form()?).await?,
        BannerAction::Edit { id, args } => {
            screens
                .save_banner(Some(&BannerId::new(id)), &args.into_form()?)
                .await?
        }
        BannerAction::Delete { id } => screens.delete_banner(&BannerId::new(id)).await?,
    };
    print(|out| output::banners(out, &banners))
}

pub async fn run_product(
    config: &AdminConfig,
    operator: TerminalOperator,
    action: ProductAction,
) -> Result<(), AppError> {
    let screens = CatalogScreens::new(client(config)?, operator);

    let products = match action {
        ProductAction::List => screens.products().await?,
        ProductAction::Create(args) => {
            let form = args.apply(ProductForm::default())?;
            screens.save_product(None, &form).await?
        }
        ProductAction::Edit { id, args } => {
            let id = ProductId::new(id);
            let current = screens
                .products()
                .await?
                .into_iter()
                .find(|p| p.id == id)
                .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
            let form = args.apply(ProductForm::from_product(&current))?;
            screens.save_product(Some(&id), &form).await?
        }
        ProductAction::Delete { id } => screens.delete_product(&ProductId::new(id)).await?,
    };
    print(|out| output::products(out, &products, config.currency))
}

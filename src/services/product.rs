use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::product::{NewProduct, Product};
use crate::models::product_image::ImageUpload;
use crate::repositories::product::ProductRepository;
use crate::services::category::CategoryService;
use crate::services::color::ColorService;
use crate::services::image::ImageService;
use crate::services::product_image::{ImageUploadTask, ProductImageService};
use crate::services::size::SizeService;
use crate::services::store::StoreService;

/// A committed product plus the uploads still running for its images.
pub struct ProductCreation {
    pub product: Product,
    pub image_uploads: Vec<ImageUploadTask>,
}

#[derive(Clone)]
pub struct ProductService {
    products: ProductRepository,
    stores: StoreService,
    categories: CategoryService,
    sizes: SizeService,
    colors: ColorService,
    product_images: ProductImageService,
}

impl ProductService {
    pub fn new(
        products: ProductRepository,
        stores: StoreService,
        categories: CategoryService,
        sizes: SizeService,
        colors: ColorService,
        product_images: ProductImageService,
    ) -> Self {
        Self {
            products,
            stores,
            categories,
            sizes,
            colors,
            product_images,
        }
    }

    /// Creates a product and starts uploading its images.
    ///
    /// Every image is checked before the row is inserted. The product stays
    /// committed whatever happens to the uploads afterwards.
    ///
    /// # Arguments
    ///
    /// * `store_id` - The store the product is created in
    /// * `user_id` - The caller, who must own the store
    /// * `new_product` - The product fields
    /// * `images` - At least one image
    pub async fn create_product(
        &self,
        store_id: Uuid,
        user_id: Uuid,
        new_product: NewProduct,
        images: Vec<ImageUpload>,
    ) -> Result<ProductCreation> {
        if images.is_empty() {
            return Err(AppError::Validation("At least one image is required".to_string()));
        }
        images.iter().try_for_each(ImageService::validate)?;

        self.stores.owned_store(store_id, user_id).await?;
        self.sizes.find_in_store(store_id, new_product.size_id).await?;
        self.colors.find_in_store(store_id, new_product.color_id).await?;
        self.categories
            .find_in_store(store_id, new_product.category_id)
            .await?;

        let product = new_product.into_product(store_id);
        self.products.create(&product).await?;
        tracing::info!("✅ Product {} created in store {}", product.id, store_id);

        let image_uploads = self.product_images.dispatch(product.id, images);
        Ok(ProductCreation {
            product,
            image_uploads,
        })
    }
}

use super::Repo;
use crate::models::product_image::ProductImage;
use crate::persistence::RepoError;

#[derive(Clone)]
pub struct ProductImageRepository {
    repo: Repo<ProductImage>,
}

impl ProductImageRepository {
    pub fn new(repo: Repo<ProductImage>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, image: &ProductImage) -> Result<(), RepoError> {
        self.repo.create(image).await
    }
}

use super::Repo;
use crate::models::product::Product;
use crate::persistence::RepoError;

#[derive(Clone)]
pub struct ProductRepository {
    repo: Repo<Product>,
}

impl ProductRepository {
    pub fn new(repo: Repo<Product>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, product: &Product) -> Result<(), RepoError> {
        self.repo.create(product).await
    }
}

//! Typed repositories: each wraps the generic [`Repository`] for one entity
//! and names the lookups the services need.

use std::sync::Arc;

use deadpool_postgres::Pool;

use crate::persistence::{Entity, MemoryDatabase, PgRepository, Repository};

pub mod billboard;
pub mod category;
pub mod color;
pub mod otp;
pub mod product;
pub mod product_image;
pub mod session;
pub mod size;
pub mod store;
pub mod user;

/// A shared handle on a generic repository.
pub type Repo<T> = Arc<dyn Repository<T>>;

/// Every repository the services are built from.
#[derive(Clone)]
pub struct Repositories {
    pub users: user::UserRepository,
    pub sessions: session::SessionRepository,
    pub otps: otp::OtpRepository,
    pub stores: store::StoreRepository,
    pub billboards: billboard::BillboardRepository,
    pub categories: category::CategoryRepository,
    pub sizes: size::SizeRepository,
    pub colors: color::ColorRepository,
    pub products: product::ProductRepository,
    pub product_images: product_image::ProductImageRepository,
}

/// Something that can hand out a generic repository for any entity.
pub trait RepoFactory {
    fn repo<T: Entity>(&self) -> Repo<T>;
}

impl RepoFactory for Pool {
    fn repo<T: Entity>(&self) -> Repo<T> {
        Arc::new(PgRepository::<T>::new(self.clone()))
    }
}

impl RepoFactory for MemoryDatabase {
    fn repo<T: Entity>(&self) -> Repo<T> {
        Arc::new(self.repository::<T>())
    }
}

impl Repositories {
    pub fn new(factory: &impl RepoFactory) -> Self {
        Self {
            users: user::UserRepository::new(factory.repo()),
            sessions: session::SessionRepository::new(factory.repo()),
            otps: otp::OtpRepository::new(factory.repo()),
            stores: store::StoreRepository::new(factory.repo()),
            billboards: billboard::BillboardRepository::new(factory.repo()),
            categories: category::CategoryRepository::new(factory.repo()),
            sizes: size::SizeRepository::new(factory.repo()),
            colors: color::ColorRepository::new(factory.repo()),
            products: product::ProductRepository::new(factory.repo()),
            product_images: product_image::ProductImageRepository::new(factory.repo()),
        }
    }
}

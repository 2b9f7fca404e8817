use std::sync::Arc;

use anyhow::Context;

use crate::clients::cloudflare::{CloudflareClient, ImageUploader};
use crate::clients::smtp::{Mailer, SmtpMailer};
use crate::config::{Config, StorageBackend};
use crate::notifications::email::EmailNotifier;
use crate::persistence::MemoryDatabase;
use crate::repositories::Repositories;
use crate::services::{
    auth::AuthService, billboard::BillboardService, category::CategoryService,
    color::ColorService, image::ImageService, otp::OtpManager, product::ProductService,
    product_image::ProductImageService, register::RegisterService, session::SessionManager,
    size::SizeService, store::StoreService, token::TokenIssuer, user::UserManager,
};

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration.
    pub config: Arc<Config>,
    /// Verifies session tokens for the auth middleware.
    pub tokens: Arc<TokenIssuer>,
    pub auth: AuthService,
    pub register: RegisterService,
    pub stores: StoreService,
    pub billboards: BillboardService,
    pub categories: CategoryService,
    pub sizes: SizeService,
    pub colors: ColorService,
    pub products: ProductService,
}

impl AppState {
    /// Creates a new `AppState` with the configured storage backend and the
    /// real SMTP and image storage clients.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let repositories = match config.storage {
            StorageBackend::Postgres => {
                let pool = crate::db::create_pool(&config.postgres)?;
                crate::db::migrate(&pool).await?;
                tracing::info!("✅ PostgreSQL pool initialized with deadpool-postgres");
                Repositories::new(&pool)
            }
            StorageBackend::Memory => {
                tracing::warn!("Using the in-memory storage backend; data is lost on exit");
                Repositories::new(&MemoryDatabase::new())
            }
        };

        let uploader = CloudflareClient::new(&config.image_storage)
            .context("Failed to build the image storage client")?;
        tracing::info!("✅ Image storage client initialized");

        let mailer = SmtpMailer::new(&config.smtp).context("Failed to build the SMTP mailer")?;
        tracing::info!("✅ SMTP mailer initialized");

        Self::build(config, repositories, Arc::new(uploader), Arc::new(mailer))
    }

    /// Wires every service from its dependencies.
    pub fn build(
        config: Config,
        repositories: Repositories,
        uploader: Arc<dyn ImageUploader>,
        mailer: Arc<dyn Mailer>,
    ) -> anyhow::Result<Self> {
        let tokens = Arc::new(
            TokenIssuer::from_keys(&config.keys).context("Failed to load the ECDSA key pair")?,
        );

        let users = UserManager::new(repositories.users.clone());
        let sessions = SessionManager::new(repositories.sessions.clone(), Arc::clone(&tokens));
        let otps = OtpManager::new(repositories.otps.clone());
        let notifier = EmailNotifier::new(mailer);

        let auth = AuthService::new(users.clone(), sessions, otps, notifier);
        let register = RegisterService::new(users, auth.clone());

        let images = ImageService::new(uploader);
        let stores = StoreService::new(repositories.stores.clone());
        let billboards = BillboardService::new(
            repositories.billboards.clone(),
            stores.clone(),
            images.clone(),
        );
        let categories = CategoryService::new(
            repositories.categories.clone(),
            stores.clone(),
            billboards.clone(),
        );
        let sizes = SizeService::new(repositories.sizes.clone(), stores.clone());
        let colors = ColorService::new(repositories.colors.clone(), stores.clone());
        let product_images = ProductImageService::new(
            images,
            repositories.product_images.clone(),
            config.image_retry,
        );
        let products = ProductService::new(
            repositories.products.clone(),
            stores.clone(),
            categories.clone(),
            sizes.clone(),
            colors.clone(),
            product_images,
        );

        Ok(AppState {
            config: Arc::new(config),
            tokens,
            auth,
            register,
            stores,
            billboards,
            categories,
            sizes,
            colors,
            products,
        })
    }
}

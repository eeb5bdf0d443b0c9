use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_mysql::*;
use crate::logger::*;
use crate::settings::Settings;
use sqlx::{MySql, Pool};
use std::sync::Arc;

pub struct Server {
    pub user_service: Arc<dyn UserService>,
    pool: Option<Pool<MySql>>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let (user_service, pool): (Arc<dyn UserService>, Option<Pool<MySql>>) =
            match settings.user.backend.as_str() {
                "fake" => (Arc::new(FakeUserService::new()), None),
                "real" => {
                    let pool = Pool::<MySql>::connect(&settings.database.dsn).await?;

                    let user_repo: Arc<dyn UserRepo> = Arc::new(MySqlUserRepo::new(pool.clone()));
                    let credential_hasher: Arc<dyn CredentialHasher> =
                        Arc::new(Argon2PasswordHasher {});

                    (
                        Arc::new(RealUserService::new(user_repo, credential_hasher)),
                        Some(pool),
                    )
                }
                other => return Err(anyhow::anyhow!("Unknown user backend: {}", other)),
            };

        info!("server started");

        Ok(Self { user_service, pool })
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}

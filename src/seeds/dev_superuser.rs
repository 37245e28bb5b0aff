use std::env;

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::app::db::{self, companies::NewCompany, organizations::NewOrganization, NewUser};
use crate::app::domain::{CompanyId, Email, OrganizationId, UserId};
use crate::seeds::{Seed, SeedOutcome};

/// A superuser homed in the root organization of a fresh company, so a new
/// database has someone able to create everything else.
pub struct DevSuperuser;

#[async_trait]
impl Seed for DevSuperuser {
    fn version(&self) -> i64 {
        20260301120000
    }

    fn description(&self) -> &str {
        "dev_superuser"
    }

    async fn run(&self, pool: &SqlitePool) -> Result<SeedOutcome, sqlx::Error> {
        let email = match env::var("SEED_ADMIN_EMAIL").ok().map(Email::new) {
            Some(Ok(email)) => email,
            _ => return Ok(SeedOutcome::Skipped),
        };
        if db::users::find_by_email(pool, &email).await?.is_some() {
            return Ok(SeedOutcome::Applied);
        }

        let company_name = env::var("SEED_COMPANY_NAME").unwrap_or_else(|_| "Headquarters".to_string());
        let company_id = CompanyId::new();
        let organization_id = OrganizationId::new();
        let user_id = UserId::new();

        let mut tx = pool.begin().await?;
        db::companies::insert(
            &mut *tx,
            &NewCompany {
                id: company_id,
                name: company_name.clone(),
            },
        )
        .await?;
        db::organizations::insert(
            &mut *tx,
            &NewOrganization {
                id: organization_id,
                name: company_name,
                code: "ROOT".to_string(),
                company_id,
                parent_id: None,
                level: 1,
            },
        )
        .await?;
        db::users::insert(
            &mut *tx,
            &NewUser {
                id: user_id,
                name: "Administrator".to_string(),
                email: email.clone(),
                organization_id: Some(organization_id),
                is_superuser: true,
            },
        )
        .await?;
        tx.commit().await?;

        eprintln!("Created superuser {} (x-user-id: {})", email.as_str(), user_id);
        Ok(SeedOutcome::Applied)
    }
}

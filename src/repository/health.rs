use diesel::RunQueryDsl;

use crate::domain::types::StoreKind;
use crate::repository::{
    DieselAlertRepository, DieselCatalogRepository, DieselPersonnelRepository, RepositoryResult,
    StoreHealth,
};

macro_rules! impl_store_health {
    ($repo:ty, |$self_:ident| $kind:expr) => {
        impl StoreHealth for $repo {
            fn store(&self) -> StoreKind {
                let $self_ = self;
                $kind
            }

            fn ping(&self) -> RepositoryResult<()> {
                let mut conn = self.conn()?;
                diesel::sql_query("SELECT 1").execute(&mut conn)?;
                Ok(())
            }
        }
    };
}

impl_store_health!(DieselPersonnelRepository, |_repo| StoreKind::Personnel);
impl_store_health!(DieselCatalogRepository, |repo| repo.catalog.into());
impl_store_health!(DieselAlertRepository, |_repo| StoreKind::Alerts);

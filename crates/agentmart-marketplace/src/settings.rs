//! Site settings: readable by anyone, written by admins

use tracing::info;

use agentmart_policy::Operation;
use agentmart_types::{validate_setting_key, Caller, MarketError, Result, Setting};

use crate::access::gate;
use crate::Context;

pub struct SettingsService {
    ctx: Context,
}

impl SettingsService {
    pub(crate) fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    pub async fn get(&self, key: &str) -> Result<Option<Setting>> {
        Ok(self.ctx.db.settings_repo().get(key).await?)
    }

    /// Every setting, sorted by key
    pub async fn list(&self) -> Result<Vec<Setting>> {
        Ok(self.ctx.db.settings_repo().list_all().await?)
    }

    /// Create or replace a setting
    pub async fn set(&self, caller: Caller, key: &str, value: String) -> Result<Setting> {
        let subject = self.ctx.subject(caller).await?;
        gate(Operation::SettingSet, &subject)?;
        let user_id = subject.user_id().ok_or(MarketError::Unauthenticated)?;
        validate_setting_key(key)?;

        let setting = self
            .ctx
            .db
            .settings_repo()
            .upsert(Setting {
                key: key.to_string(),
                value,
                updated_by: user_id,
                updated_at: self.ctx.now(),
            })
            .await?;
        info!(key = %setting.key, by = %user_id, "Setting changed");
        Ok(setting)
    }
}

#[cfg(test)]
mod tests {
    use crate::Marketplace;
    use agentmart_db::Database;
    use agentmart_types::{Caller, MarketError, NewProfile, UserId};

    #[tokio::test]
    async fn test_admin_writes_anyone_reads() {
        let market = Marketplace::new(Database::in_memory().await.unwrap());
        let admin = Caller::User(UserId::new());
        let user = Caller::User(UserId::new());
        for caller in [admin, user] {
            market
                .profiles()
                .create(caller, NewProfile { name: "N".into(), email: "n@x.io".into() })
                .await
                .unwrap();
        }

        let err = market.settings().set(user, "site.banner", "hi".into()).await.unwrap_err();
        assert_eq!(err.to_string(), "Only admins can change settings");
        let err = market.settings().set(Caller::Anonymous, "site.banner", "hi".into()).await.unwrap_err();
        assert_eq!(err, MarketError::Unauthenticated);

        market.settings().set(admin, "site.banner", "hi".into()).await.unwrap();
        let updated = market.settings().set(admin, "site.banner", "hello".into()).await.unwrap();
        assert_eq!(updated.updated_by, admin.user_id().unwrap());

        let read = market.settings().get("site.banner").await.unwrap().unwrap();
        assert_eq!(read.value, "hello");
        assert!(market.settings().get("missing").await.unwrap().is_none());
        assert_eq!(market.settings().list().await.unwrap().len(), 1);

        assert!(matches!(
            market.settings().set(admin, "bad key", "x".into()).await,
            Err(MarketError::InvalidInput { .. })
        ));
    }
}

//! Identity and profile operations
//!
//! The first profile ever created becomes `admin`; everyone after is `user`
//! until an admin promotes them.

use tracing::{debug, info};

use agentmart_db::SetRoleOutcome;
use agentmart_policy::Operation;
use agentmart_types::{Caller, MarketError, NewProfile, Profile, ProfileId, ProfileUpdate, Result, Role, UserId};

use crate::access::gate;
use crate::Context;

pub struct ProfileService {
    ctx: Context,
}

impl ProfileService {
    pub(crate) fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    /// The caller's identity, or `None` when anonymous
    pub fn resolve_caller(&self, caller: Caller) -> Option<UserId> {
        caller.user_id()
    }

    /// The caller's own profile. `None` means first-time setup is pending.
    pub async fn get_own(&self, caller: Caller) -> Result<Option<Profile>> {
        let Some(user_id) = caller.user_id() else {
            return Ok(None);
        };
        Ok(self.ctx.db.profile_repo().find_by_user(user_id).await?)
    }

    pub async fn get_by_user(&self, user_id: UserId) -> Result<Option<Profile>> {
        debug!(user_id = %user_id, "Profile lookup");
        Ok(self.ctx.db.profile_repo().find_by_user(user_id).await?)
    }

    /// Create the caller's profile, or return the existing one unchanged
    pub async fn create(&self, caller: Caller, input: NewProfile) -> Result<Profile> {
        let subject = self.ctx.subject(caller).await?;
        gate(Operation::ProfileCreate, &subject)?;
        let user_id = subject.user_id().ok_or(MarketError::Unauthenticated)?;

        let _guard = self.ctx.db.lock_user(user_id).await;
        let repo = self.ctx.db.profile_repo();
        if let Some(existing) = repo.find_by_user(user_id).await? {
            return Ok(existing);
        }

        // The first profile ever stored is the admin
        let profile = repo
            .create_claiming_bootstrap(Profile {
                id: ProfileId::new(),
                user_id,
                name: input.name,
                email: input.email,
                role: Role::User,
                avatar: None,
                bio: None,
                created_at: self.ctx.now(),
            })
            .await?;

        info!(profile_id = %profile.id, user_id = %user_id, role = %profile.role, "Profile created");
        Ok(profile)
    }

    /// Update the caller's own name, bio or avatar
    pub async fn update_own(&self, caller: Caller, update: ProfileUpdate) -> Result<Profile> {
        let subject = self.ctx.subject(caller).await?;
        gate(Operation::ProfileUpdateOwn, &subject)?;
        let user_id = subject.user_id().ok_or(MarketError::Unauthenticated)?;

        let repo = self.ctx.db.profile_repo();
        let profile = repo
            .find_by_user(user_id)
            .await?
            .ok_or_else(|| MarketError::not_found("Profile", user_id))?;

        let updated = repo.update(profile.id, |p| update.apply(p)).await?;
        info!(profile_id = %updated.id, "Profile updated");
        Ok(updated)
    }

    /// Change another profile's role (admin only)
    pub async fn set_role(&self, caller: Caller, profile_id: ProfileId, role: Role) -> Result<Profile> {
        let subject = self.ctx.subject(caller).await?;
        gate(Operation::ProfileSetRole, &subject)?;

        match self.ctx.db.profile_repo().set_role(profile_id, role).await? {
            SetRoleOutcome::Updated(profile) => {
                info!(profile_id = %profile_id, role = %role, by = ?subject.user_id(), "Role changed");
                Ok(profile)
            }
            SetRoleOutcome::LastAdmin => Err(MarketError::LastAdmin),
        }
    }

    /// Every profile, oldest first (admin only; empty otherwise)
    pub async fn list_all(&self, caller: Caller) -> Result<Vec<Profile>> {
        let subject = self.ctx.subject(caller).await?;
        if let Err(denied) = gate(Operation::ProfileListAll, &subject) {
            return denied.resolve(Vec::new());
        }
        let mut profiles = self.ctx.db.profile_repo().list_all().await?;
        profiles.sort_by_key(|p| p.created_at);
        Ok(profiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Marketplace;
    use agentmart_db::Database;

    fn input(name: &str) -> NewProfile {
        NewProfile {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
        }
    }

    #[tokio::test]
    async fn test_anonymous_cannot_create() {
        let market = Marketplace::new(Database::in_memory().await.unwrap());
        let err = market.profiles().create(Caller::Anonymous, input("Anon")).await.unwrap_err();
        assert_eq!(err, MarketError::Unauthenticated);
        assert!(market.profiles().get_own(Caller::Anonymous).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_own_requires_profile() {
        let market = Marketplace::new(Database::in_memory().await.unwrap());
        let caller = Caller::User(UserId::new());
        let err = market
            .profiles()
            .update_own(caller, ProfileUpdate::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Profile not found");
    }

    #[tokio::test]
    async fn test_update_own_applies_fields() {
        let market = Marketplace::new(Database::in_memory().await.unwrap());
        let caller = Caller::User(UserId::new());
        market.profiles().create(caller, input("Alice")).await.unwrap();

        let updated = market
            .profiles()
            .update_own(
                caller,
                ProfileUpdate {
                    name: Some(String::new()),
                    bio: Some("Builds bots".to_string()),
                    avatar: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Alice");
        assert_eq!(updated.bio.as_deref(), Some("Builds bots"));
        assert_eq!(updated.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_set_role_admin_only() {
        let market = Marketplace::new(Database::in_memory().await.unwrap());
        let admin = Caller::User(UserId::new());
        let bob = Caller::User(UserId::new());
        market.profiles().create(admin, input("Admin")).await.unwrap();
        let bob_profile = market.profiles().create(bob, input("Bob")).await.unwrap();

        let err = market.profiles().set_role(bob, bob_profile.id, Role::Admin).await.unwrap_err();
        assert_eq!(err.to_string(), "Only admins can change roles");

        let promoted = market.profiles().set_role(admin, bob_profile.id, Role::Agent).await.unwrap();
        assert_eq!(promoted.role, Role::Agent);

        let err = market
            .profiles()
            .set_role(admin, ProfileId::new(), Role::Agent)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Profile not found");
    }

    #[tokio::test]
    async fn test_last_admin_cannot_self_demote() {
        let market = Marketplace::new(Database::in_memory().await.unwrap());
        let admin = Caller::User(UserId::new());
        let profile = market.profiles().create(admin, input("Admin")).await.unwrap();
        let err = market.profiles().set_role(admin, profile.id, Role::User).await.unwrap_err();
        assert_eq!(err, MarketError::LastAdmin);
    }

    #[tokio::test]
    async fn test_list_all_soft_denied() {
        let market = Marketplace::new(Database::in_memory().await.unwrap());
        let admin = Caller::User(UserId::new());
        let user = Caller::User(UserId::new());
        market.profiles().create(admin, input("Admin")).await.unwrap();
        market.profiles().create(user, input("User")).await.unwrap();

        assert!(market.profiles().list_all(user).await.unwrap().is_empty());
        assert!(market.profiles().list_all(Caller::Anonymous).await.unwrap().is_empty());
        let all = market.profiles().list_all(admin).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all.iter().filter(|p| p.role == Role::Admin).count(), 1);
    }
}

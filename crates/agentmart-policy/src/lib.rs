//! AgentMart Policy - Role and ownership rules for every operation
//!
//! Each [`Operation`] has exactly one [`Rule`]. Evaluation happens in two
//! steps so the caller can load the target in between:
//!
//! 1. [`check_gate`] before any read, using only the subject
//! 2. [`check_ownership`] after the target is loaded, using its owner
//!
//! A failed check yields a [`Denied`] whose [`Denial`] mode says whether the
//! operation fails hard or answers with an empty result.

use serde::{Deserialize, Serialize};
use std::fmt;

use agentmart_types::{Caller, MarketError, Role, UserId};

/// Every guarded operation of the marketplace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    // Profiles
    ProfileGetOwn,
    ProfileGetByUser,
    ProfileCreate,
    ProfileUpdateOwn,
    ProfileSetRole,
    ProfileListAll,
    // Agents
    AgentList,
    AgentListPublic,
    AgentGet,
    AgentCreate,
    AgentUpdate,
    AgentRemove,
    AgentIncrementUsage,
    AgentCategories,
    AgentStats,
    // Posts
    PostList,
    PostListPublic,
    PostGet,
    PostCreate,
    PostUpdate,
    PostRemove,
    // Subscriptions
    SubscriptionCreate,
    SubscriptionCancel,
    SubscriptionCheck,
    SubscriptionListMine,
    SubscriptionListAll,
    // Transactions
    TransactionCreate,
    TransactionUpdateStatus,
    TransactionSettle,
    TransactionListMine,
    TransactionListAll,
    // Analytics
    AnalyticsTrack,
    AnalyticsAgent,
    AnalyticsDashboard,
    // Settings
    SettingGet,
    SettingSet,
}

impl Operation {
    pub const ALL: &'static [Operation] = &[
        Self::ProfileGetOwn,
        Self::ProfileGetByUser,
        Self::ProfileCreate,
        Self::ProfileUpdateOwn,
        Self::ProfileSetRole,
        Self::ProfileListAll,
        Self::AgentList,
        Self::AgentListPublic,
        Self::AgentGet,
        Self::AgentCreate,
        Self::AgentUpdate,
        Self::AgentRemove,
        Self::AgentIncrementUsage,
        Self::AgentCategories,
        Self::AgentStats,
        Self::PostList,
        Self::PostListPublic,
        Self::PostGet,
        Self::PostCreate,
        Self::PostUpdate,
        Self::PostRemove,
        Self::SubscriptionCreate,
        Self::SubscriptionCancel,
        Self::SubscriptionCheck,
        Self::SubscriptionListMine,
        Self::SubscriptionListAll,
        Self::TransactionCreate,
        Self::TransactionUpdateStatus,
        Self::TransactionSettle,
        Self::TransactionListMine,
        Self::TransactionListAll,
        Self::AnalyticsTrack,
        Self::AnalyticsAgent,
        Self::AnalyticsDashboard,
        Self::SettingGet,
        Self::SettingSet,
    ];

    /// The rule governing this operation
    pub fn rule(self) -> Rule {
        use Operation::*;
        const ADMIN: &[Role] = &[Role::Admin];
        const SELLERS: &[Role] = &[Role::Admin, Role::Agent];

        match self {
            ProfileGetOwn | ProfileGetByUser => Rule::public(),
            ProfileCreate | ProfileUpdateOwn => Rule::authenticated(),
            ProfileSetRole => Rule::roles(ADMIN, "Only admins can change roles"),
            ProfileListAll => Rule::roles(ADMIN, "Not authorized").soft(),

            AgentList | AgentListPublic | AgentGet | AgentIncrementUsage | AgentCategories => Rule::public(),
            AgentCreate => Rule::roles(SELLERS, "Only admins and agents can create agents"),
            AgentUpdate => Rule::authenticated().owned(Ownership::OwnerOrAdmin, "Not authorized"),
            AgentRemove => Rule::roles(ADMIN, "Only admins can delete agents"),
            AgentStats => Rule::roles(ADMIN, "Not authorized").soft(),

            PostList | PostListPublic | PostGet => Rule::public(),
            PostCreate => Rule::roles(SELLERS, "Not authorized to create posts")
                .owned(Ownership::OwnerOrAdmin, "Not authorized for this agent"),
            PostUpdate | PostRemove => Rule::authenticated().owned(Ownership::OwnerOrAdmin, "Not authorized"),

            SubscriptionCreate => Rule::authenticated(),
            SubscriptionCancel => Rule::authenticated().owned(Ownership::OwnerOnly, "Not authorized"),
            SubscriptionCheck | SubscriptionListMine => Rule::authenticated().soft(),
            SubscriptionListAll => Rule::roles(ADMIN, "Not authorized").soft(),

            TransactionCreate => Rule::authenticated(),
            TransactionUpdateStatus => Rule::roles(ADMIN, "Not authorized"),
            // The provider signature is checked before the event reaches the service
            TransactionSettle => Rule::public(),
            TransactionListMine => Rule::authenticated().soft(),
            TransactionListAll => Rule::roles(ADMIN, "Not authorized").soft(),

            AnalyticsTrack => Rule::public(),
            AnalyticsAgent => Rule::authenticated()
                .owned(Ownership::OwnerOrAdmin, "Not authorized")
                .soft(),
            AnalyticsDashboard => Rule::roles(ADMIN, "Not authorized").soft(),

            SettingGet => Rule::public(),
            SettingSet => Rule::roles(ADMIN, "Only admins can change settings"),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Who may attempt an operation at all
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Anyone,
    /// Any resolved identity, with or without a profile
    Authenticated,
    /// A profile holding one of these roles
    Roles(&'static [Role]),
}

/// Relation the subject must have to the loaded target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    None,
    OwnerOrAdmin,
    OwnerOnly,
}

/// What a denied caller gets back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Denial {
    /// An error
    Fail,
    /// An empty list or `None`
    Empty,
}

/// One row of the policy table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub gate: Gate,
    pub ownership: Ownership,
    pub denial: Denial,
    /// Message when the role gate refuses an identified caller
    pub role_message: &'static str,
    /// Message when the ownership gate refuses
    pub owner_message: &'static str,
}

impl Rule {
    const fn base(gate: Gate, role_message: &'static str) -> Self {
        Self {
            gate,
            ownership: Ownership::None,
            denial: Denial::Fail,
            role_message,
            owner_message: "Not authorized",
        }
    }

    const fn public() -> Self {
        Self::base(Gate::Anyone, "")
    }

    const fn authenticated() -> Self {
        Self::base(Gate::Authenticated, "")
    }

    const fn roles(roles: &'static [Role], message: &'static str) -> Self {
        Self::base(Gate::Roles(roles), message)
    }

    const fn owned(mut self, ownership: Ownership, message: &'static str) -> Self {
        self.ownership = ownership;
        self.owner_message = message;
        self
    }

    const fn soft(mut self) -> Self {
        self.denial = Denial::Empty;
        self
    }
}

/// The caller plus its profile role, if it has a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Subject {
    pub caller: Caller,
    pub role: Option<Role>,
}

impl Subject {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn new(caller: Caller, role: Option<Role>) -> Self {
        Self { caller, role }
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.caller.user_id()
    }

    pub fn is_admin(&self) -> bool {
        self.role.map_or(false, |r| r.is_admin())
    }
}

/// A refused check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denied {
    pub operation: Operation,
    pub denial: Denial,
    pub error: MarketError,
}

impl Denied {
    fn new(operation: Operation, error: MarketError) -> Self {
        Self {
            operation,
            denial: operation.rule().denial,
            error,
        }
    }

    /// Hard-fail denials become errors; soft ones yield `empty`
    pub fn resolve<T>(self, empty: T) -> Result<T, MarketError> {
        match self.denial {
            Denial::Fail => Err(self.error),
            Denial::Empty => Ok(empty),
        }
    }
}

impl From<Denied> for MarketError {
    fn from(denied: Denied) -> Self {
        denied.error
    }
}

/// Role gate: may this subject attempt `operation`?
pub fn check_gate(operation: Operation, subject: &Subject) -> Result<(), Denied> {
    let rule = operation.rule();
    match rule.gate {
        Gate::Anyone => Ok(()),
        _ if !subject.caller.is_authenticated() => Err(Denied::new(operation, MarketError::Unauthenticated)),
        Gate::Authenticated => Ok(()),
        Gate::Roles(roles) => match subject.role {
            Some(role) if roles.contains(&role) => Ok(()),
            _ => Err(Denied::new(operation, MarketError::forbidden(rule.role_message))),
        },
    }
}

/// Ownership gate against the loaded target's owner
pub fn check_ownership(operation: Operation, subject: &Subject, owner: &UserId) -> Result<(), Denied> {
    let rule = operation.rule();
    let is_owner = subject.user_id().as_ref() == Some(owner);
    let allowed = match rule.ownership {
        Ownership::None => true,
        Ownership::OwnerOrAdmin => is_owner || subject.is_admin(),
        Ownership::OwnerOnly => is_owner,
    };
    if allowed {
        Ok(())
    } else {
        Err(Denied::new(operation, MarketError::forbidden(rule.owner_message)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn user(role: Option<Role>) -> (Subject, UserId) {
        let id = UserId::new();
        (Subject::new(Caller::User(id), role), id)
    }

    #[test]
    fn test_anonymous_hard_fail_is_unauthenticated() {
        let denied = check_gate(Operation::AgentCreate, &Subject::anonymous()).unwrap_err();
        assert_eq!(denied.error, MarketError::Unauthenticated);
        assert_eq!(denied.denial, Denial::Fail);
    }

    #[test]
    fn test_role_gate_messages() {
        let (plain, _) = user(Some(Role::User));
        let err = check_gate(Operation::AgentCreate, &plain).unwrap_err().error;
        assert_eq!(err.to_string(), "Only admins and agents can create agents");

        let err = check_gate(Operation::AgentRemove, &user(Some(Role::Agent)).0).unwrap_err().error;
        assert_eq!(err.to_string(), "Only admins can delete agents");
    }

    #[test]
    fn test_profile_less_caller_fails_role_gate() {
        let (no_profile, _) = user(None);
        assert!(check_gate(Operation::SubscriptionCreate, &no_profile).is_ok());
        assert!(check_gate(Operation::PostCreate, &no_profile).is_err());
    }

    #[test]
    fn test_post_create_has_distinct_messages() {
        let rule = Operation::PostCreate.rule();
        assert_eq!(rule.role_message, "Not authorized to create posts");
        assert_eq!(rule.owner_message, "Not authorized for this agent");
    }

    #[test]
    fn test_ownership() {
        let (seller, seller_id) = user(Some(Role::Agent));
        let (other, _) = user(Some(Role::Agent));
        let (admin, _) = user(Some(Role::Admin));

        assert!(check_ownership(Operation::AgentUpdate, &seller, &seller_id).is_ok());
        assert!(check_ownership(Operation::AgentUpdate, &admin, &seller_id).is_ok());
        let denied = check_ownership(Operation::AgentUpdate, &other, &seller_id).unwrap_err();
        assert_eq!(denied.error.to_string(), "Not authorized");
    }

    #[test]
    fn test_owner_only_excludes_admin() {
        let (_, owner) = user(Some(Role::User));
        let (admin, _) = user(Some(Role::Admin));
        assert!(check_ownership(Operation::SubscriptionCancel, &admin, &owner).is_err());
    }

    #[test]
    fn test_soft_denial_resolves_empty() {
        let denied = check_gate(Operation::ProfileListAll, &Subject::anonymous()).unwrap_err();
        let listed: Vec<u8> = denied.resolve(Vec::new()).unwrap();
        assert!(listed.is_empty());

        let denied = check_gate(Operation::SettingSet, &user(Some(Role::User)).0).unwrap_err();
        assert!(denied.resolve(()).is_err());
    }

    #[test]
    fn test_every_role_gate_has_a_message() {
        for op in Operation::ALL {
            let rule = op.rule();
            if let Gate::Roles(roles) = rule.gate {
                assert!(!roles.is_empty(), "{op}");
                assert!(!rule.role_message.is_empty(), "{op}");
            }
        }
    }

    fn any_role() -> impl Strategy<Value = Option<Role>> {
        prop_oneof![
            Just(None),
            Just(Some(Role::Admin)),
            Just(Some(Role::Agent)),
            Just(Some(Role::User)),
        ]
    }

    proptest! {
        #[test]
        fn prop_admin_passes_every_gate(idx in 0..Operation::ALL.len()) {
            let (admin, _) = user(Some(Role::Admin));
            prop_assert!(check_gate(Operation::ALL[idx], &admin).is_ok());
        }

        #[test]
        fn prop_owner_passes_owner_checks(idx in 0..Operation::ALL.len(), role in any_role()) {
            let (subject, id) = user(role);
            prop_assert!(check_ownership(Operation::ALL[idx], &subject, &id).is_ok());
        }

        #[test]
        fn prop_denial_mode_matches_rule(idx in 0..Operation::ALL.len(), role in any_role(), anon in any::<bool>()) {
            let op = Operation::ALL[idx];
            let subject = if anon { Subject::anonymous() } else { user(role).0 };
            if let Err(denied) = check_gate(op, &subject) {
                prop_assert_eq!(denied.denial, op.rule().denial);
                prop_assert_eq!(denied.operation, op);
            }
        }
    }
}

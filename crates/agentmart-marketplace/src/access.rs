//! Subject resolution and policy checks with denial logging

use tracing::{debug, warn};

use agentmart_policy::{self as policy, Denial, Denied, Operation, Subject};
use agentmart_types::{Caller, Result, UserId};

use crate::Context;

impl Context {
    /// The caller plus its profile role
    pub(crate) async fn subject(&self, caller: Caller) -> Result<Subject> {
        let role = match caller.user_id() {
            Some(user_id) => self.db.profile_repo().find_by_user(user_id).await?.map(|p| p.role),
            None => None,
        };
        Ok(Subject::new(caller, role))
    }
}

pub(crate) fn gate(operation: Operation, subject: &Subject) -> std::result::Result<(), Denied> {
    policy::check_gate(operation, subject).map_err(|denied| log_denial(denied, subject))
}

pub(crate) fn ownership(operation: Operation, subject: &Subject, owner: &UserId) -> std::result::Result<(), Denied> {
    policy::check_ownership(operation, subject, owner).map_err(|denied| log_denial(denied, subject))
}

fn log_denial(denied: Denied, subject: &Subject) -> Denied {
    let user = subject.user_id().map(|u| u.to_string()).unwrap_or_else(|| "anonymous".to_string());
    match denied.denial {
        Denial::Fail => warn!(operation = %denied.operation, user = %user, reason = %denied.error, "Denied"),
        Denial::Empty => debug!(operation = %denied.operation, user = %user, "Soft-denied read"),
    }
    denied
}

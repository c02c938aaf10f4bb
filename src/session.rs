//! Who is acting, and what they are allowed to do.

use crate::error::{AttendanceError, GatewayError};
use crate::gateway::DirectoryGateway;
use crate::models::{Role, User};

/// The identity of whoever is driving an operation.
///
/// Sessions are plain values handed to every operation that needs to know the actor. Nothing is
/// ever read from process-wide state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user: User,
}

impl Session {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    /// Fails with [`AttendanceError::Unauthorized`] unless the actor has one of `roles`.
    pub fn require(&self, roles: &[Role], action: &str) -> Result<(), AttendanceError> {
        if roles.contains(&self.user.role) {
            Ok(())
        } else {
            Err(AttendanceError::unauthorized(&self.user.email, action))
        }
    }
}

/// Resolves an email address to a session.
///
/// There is no credential check here: whoever presents a known email becomes that user.
pub fn sign_in<G>(gateway: &mut G, email: &str) -> Result<Session, AttendanceError>
where
    G: DirectoryGateway + ?Sized,
{
    let email = email.trim();
    if email.is_empty() {
        return Err(AttendanceError::InvalidArgument("email is empty".into()));
    }

    match gateway.find_user_by_email(email)? {
        Some(user) => {
            tracing::info!(user_id = %user.id, role = %user.role, "signed in");
            Ok(Session::new(user))
        }
        None => Err(AttendanceError::NotFound("Invalid credentials".into())),
    }
}

/// Decides whether an actor may record attendance for a class.
///
/// Any `FnMut(&User, &str) -> bool` is a policy. Policies that need to look something up get the
/// gateway the write is about to go through.
pub trait Authorize<G: ?Sized> {
    fn may_mark(
        &mut self,
        gateway: &mut G,
        actor: &User,
        class_id: &str,
    ) -> Result<bool, GatewayError>;
}

impl<G, F> Authorize<G> for F
where
    G: ?Sized,
    F: FnMut(&User, &str) -> bool,
{
    fn may_mark(
        &mut self,
        _gateway: &mut G,
        actor: &User,
        class_id: &str,
    ) -> Result<bool, GatewayError> {
        Ok(self(actor, class_id))
    }
}

/// Admins may mark any class, teachers only the classes they teach, students nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassTeacherPolicy;

impl<G> Authorize<G> for ClassTeacherPolicy
where
    G: DirectoryGateway + ?Sized,
{
    fn may_mark(
        &mut self,
        gateway: &mut G,
        actor: &User,
        class_id: &str,
    ) -> Result<bool, GatewayError> {
        match actor.role {
            Role::Admin => Ok(true),
            Role::Student => Ok(false),
            Role::Teacher => Ok(gateway
                .find_class(class_id)?
                .is_some_and(|class| class.teacher_id == actor.id)),
        }
    }
}

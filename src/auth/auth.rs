use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use futures::future::{Ready, ready};

use crate::{auth::session::Session, error::PayrollError, model::role::Role};

/// The signed-in caller, taken from the session the middleware attached.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,
}

impl From<Session> for AuthUser {
    fn from(session: Session) -> Self {
        Self {
            user_id: session.user_id,
            username: session.username,
            role: session.role,
        }
    }
}

impl FromRequest for AuthUser {
    type Error = PayrollError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let session = req.extensions().get::<Session>().cloned();

        ready(
            session
                .map(AuthUser::from)
                .ok_or_else(|| PayrollError::Unauthorized("Missing session".into())),
        )
    }
}

impl AuthUser {
    /// Admin or HR; required to generate payroll and settle line items.
    pub fn require_payroll_manager(&self) -> Result<(), PayrollError> {
        if self.role.manages_payroll() {
            Ok(())
        } else {
            Err(PayrollError::Forbidden("HR/Admin only".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;
    use chrono::Utc;

    use super::*;

    fn session(role: Role) -> Session {
        Session {
            user_id: 3,
            username: "clerk".into(),
            full_name: "Payroll Clerk".into(),
            role,
            login_time: Utc::now(),
        }
    }

    #[actix_web::test]
    async fn reads_the_attached_session() {
        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(session(Role::Hr));

        let user = AuthUser::extract(&req).await.unwrap();
        assert_eq!(user.username, "clerk");
        assert!(user.require_payroll_manager().is_ok());
    }

    #[actix_web::test]
    async fn missing_session_is_unauthorized() {
        let req = TestRequest::default().to_http_request();
        assert!(matches!(
            AuthUser::extract(&req).await,
            Err(PayrollError::Unauthorized(_))
        ));
    }

    #[test]
    fn employees_cannot_manage_payroll() {
        let user = AuthUser::from(session(Role::Employee));
        assert!(matches!(
            user.require_payroll_manager(),
            Err(PayrollError::Forbidden(_))
        ));
    }
}

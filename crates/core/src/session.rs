use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::customer::CustomerProfile;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated { customer: CustomerProfile, signed_in_at: DateTime<Utc> },
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    pub fn customer(&self) -> Option<&CustomerProfile> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated { customer, .. } => Some(customer),
        }
    }

    pub fn sign_in(&mut self, customer: CustomerProfile) {
        *self = Self::Authenticated { customer, signed_in_at: Utc::now() };
    }

    pub fn sign_out(&mut self) -> Option<CustomerProfile> {
        match std::mem::take(self) {
            Self::Anonymous => None,
            Self::Authenticated { customer, .. } => Some(customer),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::customer::{CustomerId, CustomerProfile};

    use super::Session;

    fn customer() -> CustomerProfile {
        CustomerProfile {
            id: CustomerId("u-1".to_string()),
            name: "Dana".to_string(),
            email: "dana@example.com".to_string(),
            phone: None,
        }
    }

    #[test]
    fn new_session_is_anonymous() {
        let session = Session::default();
        assert!(!session.is_authenticated());
        assert!(session.customer().is_none());
    }

    #[test]
    fn sign_in_then_out_round_trips() {
        let mut session = Session::default();
        session.sign_in(customer());
        assert!(session.is_authenticated());
        assert_eq!(session.customer().map(|c| c.email.as_str()), Some("dana@example.com"));

        let signed_out = session.sign_out();
        assert_eq!(signed_out, Some(customer()));
        assert!(!session.is_authenticated());
        assert_eq!(session.sign_out(), None);
    }
}

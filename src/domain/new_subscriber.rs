use serde::Deserialize;
use serde_json::error::Category;

use crate::domain::subscriber_email::SubscriberEmail;

pub struct NewSubscriber {
    pub email: SubscriberEmail,
}

#[derive(Deserialize)]
pub struct NewSubscriberBody {
    pub email: Option<String>,
}

/// Why a request body could not produce a subscriber. Every variant is answered the same way.
#[derive(Debug, thiserror::Error)]
pub enum BodyRejection {
    #[error("request body is not a JSON document: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("email field has the wrong type: {0}")]
    WrongType(#[source] serde_json::Error),
    #[error("request body is not a JSON object")]
    NotAnObject,
    #[error("email field is missing")]
    MissingEmail,
    #[error("request body is larger than {0} bytes")]
    TooLarge(usize),
    #[error("request body could not be read: {0}")]
    Unreadable(String),
    #[error("{0}")]
    InvalidEmail(String),
}

impl NewSubscriberBody {
    pub fn decode(raw: &[u8]) -> Result<Self, BodyRejection> {
        let document: serde_json::Value =
            serde_json::from_slice(raw).map_err(BodyRejection::Malformed)?;

        // Derived structs also decode from arrays, only `{ "email": ... }` is accepted
        if !document.is_object() {
            return Err(BodyRejection::NotAnObject);
        }

        serde_json::from_value(document).map_err(|err| match err.classify() {
            Category::Data => BodyRejection::WrongType(err),
            Category::Io | Category::Syntax | Category::Eof => BodyRejection::Malformed(err),
        })
    }
}

impl TryFrom<NewSubscriberBody> for NewSubscriber {
    type Error = BodyRejection;

    fn try_from(body: NewSubscriberBody) -> Result<Self, Self::Error> {
        let email = body.email.ok_or(BodyRejection::MissingEmail)?;
        let email = SubscriberEmail::parse(email).map_err(BodyRejection::InvalidEmail)?;

        Ok(NewSubscriber { email })
    }
}

impl TryFrom<&[u8]> for NewSubscriber {
    type Error = BodyRejection;

    fn try_from(raw: &[u8]) -> Result<Self, Self::Error> {
        NewSubscriberBody::decode(raw)?.try_into()
    }
}

use actix_web::web;
use serde::Deserialize;

use crate::domain::subscriber_email::SubscriberEmail;

pub struct NewSubscriber {
    pub email: SubscriberEmail,
}

#[derive(Deserialize)]
pub struct SignupBody {
    pub email: String,
}

impl TryFrom<web::Json<SignupBody>> for NewSubscriber {
    type Error = String;

    fn try_from(body: web::Json<SignupBody>) -> Result<Self, Self::Error> {
        let email = SubscriberEmail::parse(body.email.clone())?;

        Ok(NewSubscriber { email })
    }
}

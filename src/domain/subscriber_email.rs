use validator::validate_email;

#[derive(Debug, Clone, serde::Serialize)]
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    pub fn parse(email: String) -> Result<SubscriberEmail, String> {
        // validate_email accepts dotless domains ("user@localhost"); subscribers
        // must provide a dotted one with at least one character before the dot
        let has_dotted_domain = email
            .rsplit_once('@')
            .and_then(|(_, domain)| domain.find('.'))
            .map_or(false, |dot_index| dot_index > 0);

        if !validate_email(&email) || !has_dotted_domain {
            return Err(format!("{} email is not valid", email));
        }

        Ok(Self(email))
    }
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

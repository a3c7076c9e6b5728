//! Captcha retry protocol
//!
//! When a call is answered with a captcha challenge, the caller shows the
//! image to the user and re-issues the same request with two extra
//! parameters: `captcha_sid` (the challenge id) and `captcha_key` (what the
//! user typed). A retried request may be challenged again; callers loop.

use thiserror::Error;

use crate::outcome::CaptchaQuestion;
use crate::request::RequestDescriptor;

/// Parameter carrying the challenge id
pub const CAPTCHA_SID_PARAM: &str = "captcha_sid";

/// Parameter carrying the user's answer
pub const CAPTCHA_KEY_PARAM: &str = "captcha_key";

/// Errors when applying a captcha answer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptchaError {
    /// The request already carries captcha parameters
    #[error("Request already carries a captcha answer")]
    AlreadyAnswered(CaptchaAnswer),
}

/// A user's answer to a captcha challenge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptchaAnswer {
    question: CaptchaQuestion,
    user_response: String,
}

impl CaptchaAnswer {
    /// Pair a challenge with the user's answer
    pub fn new(question: CaptchaQuestion, user_response: impl Into<String>) -> Self {
        Self {
            question,
            user_response: user_response.into(),
        }
    }

    /// The challenge being answered
    pub fn question(&self) -> &CaptchaQuestion {
        &self.question
    }

    /// What the user typed
    pub fn user_response(&self) -> &str {
        &self.user_response
    }

    /// Produce the request to resubmit
    ///
    /// The original request must have been built without captcha parameters.
    /// Answering a request that already carries them is refused, and the
    /// answer is handed back inside the error.
    ///
    /// # Examples
    /// ```
    /// use vk_api::{methods::messages, CaptchaAnswer, CaptchaQuestion};
    ///
    /// let request = messages::restore("42");
    /// let question = CaptchaQuestion::new("854844498568", "http://api.vk.com/captcha.php?sid=854844498568");
    ///
    /// let retry = CaptchaAnswer::new(question, "x7k2p").apply(request).unwrap();
    /// assert_eq!(retry.param_value("captcha_sid"), Some("854844498568"));
    /// assert_eq!(retry.param_value("captcha_key"), Some("x7k2p"));
    /// assert_eq!(retry.param_value("mid"), Some("42"));
    /// ```
    pub fn apply<T>(self, request: RequestDescriptor<T>) -> Result<RequestDescriptor<T>, CaptchaError> {
        if request.has_param(CAPTCHA_SID_PARAM) || request.has_param(CAPTCHA_KEY_PARAM) {
            return Err(CaptchaError::AlreadyAnswered(self));
        }

        Ok(request
            .param(CAPTCHA_SID_PARAM, self.question.captcha_id)
            .param(CAPTCHA_KEY_PARAM, self.user_response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{HttpMethod, Priority};
    use serde_json::Value;

    fn question() -> CaptchaQuestion {
        CaptchaQuestion::new("S", "http://captcha/S")
    }

    fn send_request() -> RequestDescriptor<Value> {
        RequestDescriptor::method("messages.send", HttpMethod::Post)
            .param("uid", "85635407")
            .param("message", "hello")
            .priority(Priority::General)
    }

    #[test]
    fn test_apply_adds_both_params() {
        let original = send_request();
        let retry = CaptchaAnswer::new(question(), "abc")
            .apply(original.clone())
            .unwrap();

        assert_eq!(retry.param_value(CAPTCHA_SID_PARAM), Some("S"));
        assert_eq!(retry.param_value(CAPTCHA_KEY_PARAM), Some("abc"));
        assert_eq!(retry.query_pairs().count(), original.query_pairs().count() + 2);
    }

    #[test]
    fn test_apply_keeps_everything_else() {
        let original = send_request();
        let retry = CaptchaAnswer::new(question(), "abc")
            .apply(original.clone())
            .unwrap();

        assert_eq!(retry.resource(), original.resource());
        assert_eq!(retry.http_method(), original.http_method());
        assert_eq!(retry.envelope(), original.envelope());
        assert_eq!(retry.priority_tag(), original.priority_tag());
        assert_eq!(retry.param_value("message"), Some("hello"));
        assert_eq!(retry.param_value("uid"), Some("85635407"));
    }

    #[test]
    fn test_second_application_is_refused() {
        let answered = CaptchaAnswer::new(question(), "abc")
            .apply(send_request())
            .unwrap();

        let again = CaptchaAnswer::new(CaptchaQuestion::new("T", "http://captcha/T"), "def");
        let err = again.clone().apply(answered).unwrap_err();
        assert_eq!(err, CaptchaError::AlreadyAnswered(again));
    }

    #[test]
    fn test_request_with_only_key_is_refused() {
        let request = send_request().param(CAPTCHA_KEY_PARAM, "stale");
        assert!(CaptchaAnswer::new(question(), "abc").apply(request).is_err());
    }

    #[test]
    fn test_accessors() {
        let answer = CaptchaAnswer::new(question(), "abc");
        assert_eq!(answer.question().captcha_id, "S");
        assert_eq!(answer.user_response(), "abc");
    }
}

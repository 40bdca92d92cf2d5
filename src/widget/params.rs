use url::form_urlencoded;

/// Widget initialization parameters
///
/// Supplied via query parameters when the widget is loaded; every one is
/// optional with a safe default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetParams {
    pub question_id: String,
    pub question_title: String,
    pub answer_field_id: Option<String>,
    pub webhook_url: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl Default for WidgetParams {
    fn default() -> Self {
        Self {
            question_id: "voice-question".to_string(),
            question_title: "Voice Response".to_string(),
            answer_field_id: None,
            webhook_url: None,
            name: None,
            email: None,
        }
    }
}

impl WidgetParams {
    /// Parse init parameters from a query string. Unknown keys are
    /// ignored; empty values keep their defaults.
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::default();

        let query = query.trim_start_matches('?');

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if value.is_empty() {
                continue;
            }
            let value = value.into_owned();

            match key.as_ref() {
                "questionId" => params.question_id = value,
                "questionTitle" => params.question_title = value,
                "answerFieldId" => params.answer_field_id = Some(value),
                "webhookUrl" => params.webhook_url = Some(value),
                "name" => params.name = Some(value),
                "email" => params.email = Some(value),
                _ => {}
            }
        }

        params
    }
}

//! Message template model and placeholder rendering

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;
use std::sync::OnceLock;
use uuid::Uuid;

/// Template used for outbound mail, with `{{name}}` placeholders
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Template {
    pub id: Uuid,
    pub name: String,
    pub subject: String,
    pub body: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateFields {
    pub name: String,
    pub subject: String,
    pub body: String,
}

/// Subject and body with placeholders substituted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTemplate {
    pub subject: String,
    pub body: String,
}

impl Template {
    pub fn render(&self, vars: &HashMap<&str, String>) -> RenderedTemplate {
        RenderedTemplate {
            subject: substitute(&self.subject, vars),
            body: substitute(&self.body, vars),
        }
    }
}

/// Replace `{{ key }}` with its value; unknown placeholders are left as is
fn substitute(text: &str, vars: &HashMap<&str, String>) -> String {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    let regex = PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{\s*([a-zA-Z0-9_]+)\s*\}\}").expect("Failed to compile placeholder regex")
    });

    regex
        .replace_all(text, |caps: &regex::Captures| match vars.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(subject: &str, body: &str) -> Template {
        Template {
            id: Uuid::nil(),
            name: "tfa_code".into(),
            subject: subject.into(),
            body: body.into(),
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_render_substitutes_known_placeholders() {
        let tpl = template("Code for {{name}}", "Hi {{ name }}, use {{code}}.");
        let vars = HashMap::from([("name", "Ada".to_string()), ("code", "123456".to_string())]);

        let rendered = tpl.render(&vars);
        assert_eq!(rendered.subject, "Code for Ada");
        assert_eq!(rendered.body, "Hi Ada, use 123456.");
    }

    #[test]
    fn test_render_keeps_unknown_placeholders() {
        let tpl = template("Hello", "Expires in {{minutes}} minutes");
        let rendered = tpl.render(&HashMap::new());
        assert_eq!(rendered.body, "Expires in {{minutes}} minutes");
    }
}

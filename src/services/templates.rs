use serde_json::Value;

use crate::queue::{EmailBody, EmailJob, EmailTemplate};
use crate::services::MailError;

const VOLUNTEER_APPLICATION: &str = "\
<message>

Applicant: <user.name> <<user.email>>
Project: <project.name>
Skills: <skills>
";

const APPLICANT_APPLICATION: &str = "\
Thank you for applying to <project.name> with <org.name>.

You can follow the project at <projectLink>

Questions about the project can go to <user.name> <<user.email>>.
";

/// Produce the plain-text body of a queued email
pub fn render_job(job: &EmailJob) -> Result<String, MailError> {
    match &job.body {
        EmailBody::Text { body } => Ok(body.clone()),
        EmailBody::Template { template, context } => render(*template, context),
    }
}

pub fn render(template: EmailTemplate, context: &Value) -> Result<String, MailError> {
    if !context.is_object() {
        return Err(MailError::Render(format!(
            "context for {} must be an object",
            template.as_str()
        )));
    }

    let text = match template {
        EmailTemplate::VolunteerApplication => VOLUNTEER_APPLICATION,
        EmailTemplate::ApplicantApplication => APPLICANT_APPLICATION,
    };

    Ok(substitute_placeholders(text, context))
}

/// Replace `<a.b>` placeholders with values looked up in the context
fn substitute_placeholders(text: &str, context: &Value) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('<') {
        result.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        match after.find('>') {
            Some(end) if is_path(&after[..end]) => {
                result.push_str(&lookup(context, &after[..end]));
                rest = &after[end + 1..];
            }
            _ => {
                result.push('<');
                rest = after;
            }
        }
    }

    result.push_str(rest);
    result
}

fn is_path(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
}

fn lookup(context: &Value, path: &str) -> String {
    let pointer = format!("/{}", path.replace('.', "/"));
    match context.pointer(&pointer) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Some(value) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_volunteer_application() {
        let context = json!({
            "user": { "name": "Ada", "email": "ada@example.com" },
            "skills": ["Rust", "Design"],
            "project": { "id": 3, "name": "Food Bank Website" },
            "message": "You received an application."
        });

        let text = render(EmailTemplate::VolunteerApplication, &context).unwrap();
        assert!(text.starts_with("You received an application."));
        assert!(text.contains("Applicant: Ada <ada@example.com>"));
        assert!(text.contains("Project: Food Bank Website"));
        assert!(text.contains("Skills: Rust, Design"));
    }

    #[test]
    fn test_render_applicant_application() {
        let context = json!({
            "org": { "name": "Food Bank" },
            "user": { "name": "Grace", "email": "grace@foodbank.org" },
            "projectLink": "http://dev.code4socialgood.org/project/view/3",
            "project": { "name": "Food Bank Website" }
        });

        let text = render(EmailTemplate::ApplicantApplication, &context).unwrap();
        assert!(text.contains("applying to Food Bank Website with Food Bank"));
        assert!(text.contains("http://dev.code4socialgood.org/project/view/3"));
        assert!(text.contains("Grace <grace@foodbank.org>"));
    }

    #[test]
    fn test_missing_values_render_empty() {
        let text = substitute_placeholders("Hi <user.name>!", &json!({}));
        assert_eq!(text, "Hi !");
    }

    #[test]
    fn test_non_placeholder_brackets_kept() {
        let text = substitute_placeholders("a < b and <not a path> <n>", &json!({ "n": 5 }));
        assert_eq!(text, "a < b and <not a path> 5");
    }

    #[test]
    fn test_context_must_be_object() {
        let result = render(EmailTemplate::ApplicantApplication, &json!("oops"));
        assert!(matches!(result, Err(MailError::Render(_))));
    }
}

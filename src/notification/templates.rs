//! Stored notification templates.
//!
//! Layout under the notification directory:
//!
//! ```text
//! email/<key>.html
//! sms/<key>.txt
//! ```
//!
//! Email bodies are HTML-escaped; SMS bodies are plain text.

use handlebars::{no_escape, Handlebars};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use utoipa::ToSchema;

use super::NotificationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TemplateName {
    BirthDeclaration,
    BirthRegistration,
    BirthRejection,
    DeathDeclaration,
    DeathRegistration,
    DeathRejection,
    UserCredentials,
    ResetPassword,
}

impl TemplateName {
    pub const ALL: [TemplateName; 8] = [
        TemplateName::BirthDeclaration,
        TemplateName::BirthRegistration,
        TemplateName::BirthRejection,
        TemplateName::DeathDeclaration,
        TemplateName::DeathRegistration,
        TemplateName::DeathRejection,
        TemplateName::UserCredentials,
        TemplateName::ResetPassword,
    ];

    /// File stem of the template.
    pub fn key(&self) -> &'static str {
        match self {
            TemplateName::BirthDeclaration => "birth_declaration",
            TemplateName::BirthRegistration => "birth_registration",
            TemplateName::BirthRejection => "birth_rejection",
            TemplateName::DeathDeclaration => "death_declaration",
            TemplateName::DeathRegistration => "death_registration",
            TemplateName::DeathRejection => "death_rejection",
            TemplateName::UserCredentials => "user_credentials",
            TemplateName::ResetPassword => "reset_password",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|name| name.key() == key)
    }

    pub fn email_subject(&self) -> &'static str {
        match self {
            TemplateName::BirthDeclaration => "Voaray ny fanambarana fahaterahana",
            TemplateName::BirthRegistration => "Voasoratra ny fahaterahana",
            TemplateName::BirthRejection => "Mila fanitsiana ny fanambarana fahaterahana",
            TemplateName::DeathDeclaration => "Voaray ny fanambarana fahafatesana",
            TemplateName::DeathRegistration => "Voasoratra ny fahafatesana",
            TemplateName::DeathRejection => "Mila fanitsiana ny fanambarana fahafatesana",
            TemplateName::UserCredentials => "Ny kaontinao OpenCRVS",
            TemplateName::ResetPassword => "Famerenana ny teny miafina",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

pub struct NotificationTemplates {
    email: Handlebars<'static>,
    sms: Handlebars<'static>,
}

impl Default for NotificationTemplates {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationTemplates {
    pub fn new() -> Self {
        let mut sms = Handlebars::new();
        sms.register_escape_fn(no_escape);
        Self {
            email: Handlebars::new(),
            sms,
        }
    }

    pub fn register_email(&mut self, name: TemplateName, source: &str) -> Result<(), NotificationError> {
        register(&mut self.email, name, source)
    }

    pub fn register_sms(&mut self, name: TemplateName, source: &str) -> Result<(), NotificationError> {
        register(&mut self.sms, name, source)
    }

    /// Register every template found under `dir`. Files whose stem is not a
    /// [`TemplateName`] key are skipped; a name without a template fails
    /// only when it is used.
    pub fn load(dir: &Path) -> Result<Self, NotificationError> {
        let mut templates = Self::new();
        let mut loaded = 0;
        for (channel, extension) in [("email", "html"), ("sms", "txt")] {
            let channel_dir = dir.join(channel);
            if !channel_dir.is_dir() {
                debug!("No {} templates in {}", channel, dir.display());
                continue;
            }
            for entry in fs::read_dir(&channel_dir).map_err(NotificationError::TemplateIo)? {
                let path = entry.map_err(NotificationError::TemplateIo)?.path();
                if path.extension().and_then(|e| e.to_str()) != Some(extension) {
                    continue;
                }
                let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                let Some(name) = TemplateName::from_key(stem) else {
                    warn!("Ignoring unknown {} template {}", channel, path.display());
                    continue;
                };
                let source = fs::read_to_string(&path).map_err(NotificationError::TemplateIo)?;
                match channel {
                    "email" => templates.register_email(name, &source)?,
                    _ => templates.register_sms(name, &source)?,
                }
                loaded += 1;
            }
        }
        info!("Loaded {} notification templates from {}", loaded, dir.display());
        Ok(templates)
    }

    pub fn render_email(&self, name: TemplateName, variables: &Value) -> Result<RenderedEmail, NotificationError> {
        if !self.email.has_template(name.key()) {
            return Err(NotificationError::UnknownTemplate {
                channel: "email",
                name: name.key().to_string(),
            });
        }
        Ok(RenderedEmail {
            subject: name.email_subject().to_string(),
            html: self.email.render(name.key(), variables)?,
        })
    }

    pub fn render_sms(&self, name: TemplateName, variables: &Value) -> Result<String, NotificationError> {
        if !self.sms.has_template(name.key()) {
            return Err(NotificationError::UnknownTemplate {
                channel: "sms",
                name: name.key().to_string(),
            });
        }
        Ok(self.sms.render(name.key(), variables)?.trim().to_string())
    }
}

fn register(
    registry: &mut Handlebars<'static>,
    name: TemplateName,
    source: &str,
) -> Result<(), NotificationError> {
    registry
        .register_template_string(name.key(), source)
        .map_err(|source| NotificationError::Template {
            name: name.key().to_string(),
            source: Box::new(source),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keys_are_stable() {
        for name in TemplateName::ALL {
            assert_eq!(TemplateName::from_key(name.key()), Some(name));
            assert_eq!(serde_json::to_value(name).unwrap(), json!(name.key()));
        }
        assert_eq!(TemplateName::from_key("unknown"), None);
    }

    #[test]
    fn test_email_escapes_and_sms_does_not() {
        let mut templates = NotificationTemplates::new();
        templates
            .register_email(TemplateName::BirthDeclaration, "<p>{{informantName}}</p>")
            .unwrap();
        templates
            .register_sms(TemplateName::BirthDeclaration, "Salama {{informantName}}\n")
            .unwrap();

        let vars = json!({ "informantName": "Rasoa & Rakoto" });
        let email = templates.render_email(TemplateName::BirthDeclaration, &vars).unwrap();
        assert_eq!(email.html, "<p>Rasoa &amp; Rakoto</p>");
        assert_eq!(email.subject, "Voaray ny fanambarana fahaterahana");
        assert_eq!(
            templates.render_sms(TemplateName::BirthDeclaration, &vars).unwrap(),
            "Salama Rasoa & Rakoto"
        );
    }

    #[test]
    fn test_missing_template() {
        let templates = NotificationTemplates::new();
        assert!(matches!(
            templates.render_sms(TemplateName::ResetPassword, &json!({})),
            Err(NotificationError::UnknownTemplate { channel: "sms", .. })
        ));
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sms")).unwrap();
        fs::write(dir.path().join("sms/reset_password.txt"), "Kaody: {{code}}").unwrap();

        let templates = NotificationTemplates::load(dir.path()).unwrap();
        assert_eq!(
            templates
                .render_sms(TemplateName::ResetPassword, &json!({ "code": "123456" }))
                .unwrap(),
            "Kaody: 123456"
        );
        assert!(templates
            .render_email(TemplateName::ResetPassword, &json!({}))
            .is_err());
    }

    #[test]
    fn test_load_ignores_unknown_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("email")).unwrap();
        fs::write(dir.path().join("email/birth_registration.html"), "<p>{{childName}}</p>").unwrap();
        fs::write(dir.path().join("email/marriage_registration.html"), "<p>{{").unwrap();
        fs::write(dir.path().join("email/birth_rejection.txt"), "{{").unwrap();

        let templates = NotificationTemplates::load(dir.path()).unwrap();
        let email = templates
            .render_email(TemplateName::BirthRegistration, &json!({ "childName": "Hery" }))
            .unwrap();
        assert_eq!(email.html, "<p>Hery</p>");
        assert!(matches!(
            templates.render_email(TemplateName::BirthRejection, &json!({})),
            Err(NotificationError::UnknownTemplate { channel: "email", .. })
        ));
    }
}

//! Configuration documents.
//!
//! Two JSON files are read at startup: a public one with rule groups and the
//! email template, and a private one with SMTP credentials.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{FinderError, Result};
use crate::rules::{CriteriaRule, RuleRegistry};

/// Default SMTP host.
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// Default SMTP port (STARTTLS).
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Domain appended to recipient names that are not full addresses.
pub const DEFAULT_RECIPIENT_DOMAIN: &str = "gmail.com";

/// A rule and the recipients who want its matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleGroup {
    /// Registered rule name.
    pub rule_name: String,
    /// Recipient name tokens.
    #[serde(alias = "distribution_list")]
    pub distribution_lists: Vec<String>,
}

impl RuleGroup {
    /// Create a rule group.
    #[must_use]
    pub fn new(rule_name: impl Into<String>, recipients: &[&str]) -> Self {
        Self {
            rule_name: rule_name.into(),
            distribution_lists: recipients.iter().map(ToString::to_string).collect(),
        }
    }
}

/// The public configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicConfig {
    /// Rule groups, in notification order.
    pub rules: Vec<RuleGroup>,
    /// HTML template; `{0}` is the digest body, `{1}` the recipient name.
    pub email_template: String,
    /// Email subject line.
    pub email_subject: String,
    /// Domain appended to recipient names.
    #[serde(default = "default_recipient_domain")]
    pub recipient_domain: String,
    /// Extra rules declared in configuration.
    #[serde(default)]
    pub rule_definitions: Vec<CriteriaRule>,
}

fn default_recipient_domain() -> String {
    DEFAULT_RECIPIENT_DOMAIN.to_string()
}

impl PublicConfig {
    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        load_json(path)
    }

    /// Registry with the built-in rules plus any declared ones.
    #[must_use]
    pub fn build_registry(&self) -> RuleRegistry {
        let mut registry = RuleRegistry::with_builtin_rules();
        for rule in &self.rule_definitions {
            registry.register(rule.clone());
        }
        registry
    }

    /// Check that every rule name is usable as a file name and that every
    /// rule group names a registered rule.
    pub fn validate(&self, registry: &RuleRegistry) -> Result<()> {
        let declared = self.rule_definitions.iter().map(|rule| rule.name.as_str());
        let grouped = self.rules.iter().map(|group| group.rule_name.as_str());
        for name in declared.chain(grouped) {
            check_rule_name(name)?;
        }
        for group in &self.rules {
            registry.get(&group.rule_name)?;
        }
        Ok(())
    }

    /// Email address for a recipient name token.
    #[must_use]
    pub fn recipient_address(&self, recipient: &str) -> String {
        if recipient.contains('@') {
            recipient.to_string()
        } else {
            format!("{recipient}@{}", self.recipient_domain)
        }
    }

    /// Fill the email template for one recipient.
    #[must_use]
    pub fn render_email(&self, body: &str, recipient: &str) -> String {
        fill_template(&self.email_template, body, recipient)
    }
}

/// The private configuration document.
#[derive(Clone, Serialize, Deserialize)]
pub struct PrivateConfig {
    /// SMTP username, also used as the sender address.
    pub email_username: String,
    /// SMTP password (for Gmail, an app password).
    pub email_password: String,
    /// SMTP server hostname.
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    /// SMTP server port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
}

fn default_smtp_host() -> String {
    DEFAULT_SMTP_HOST.to_string()
}

const fn default_smtp_port() -> u16 {
    DEFAULT_SMTP_PORT
}

impl PrivateConfig {
    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        load_json(path)
    }
}

// Keep the password out of logs.
impl std::fmt::Debug for PrivateConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateConfig")
            .field("email_username", &self.email_username)
            .field("email_password", &"<redacted>")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .finish()
    }
}

/// Rule names become `<cache_dir>/<name>.cache`, so they must stay inside
/// the cache directory.
fn check_rule_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.contains('\0');
    if invalid {
        return Err(FinderError::InvalidRuleName {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| FinderError::Config {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| FinderError::Config {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Substitute positional slots `{0}` and `{1}`.
///
/// Bare `{}` slots are numbered in order of appearance, so the first one is
/// the body and the second the recipient. `{{` and `}}` are literal braces,
/// so templates can carry inline CSS.
fn fill_template(template: &str, body: &str, recipient: &str) -> String {
    let mut out = String::with_capacity(template.len() + body.len());
    let mut rest = template;
    let mut next_auto = 0;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if let Some(after) = tail.strip_prefix("{{") {
            out.push('{');
            rest = after;
        } else if let Some(after) = tail.strip_prefix("}}") {
            out.push('}');
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{0}") {
            out.push_str(body);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{1}") {
            out.push_str(recipient);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{}") {
            match next_auto {
                0 => out.push_str(body),
                1 => out.push_str(recipient),
                _ => out.push_str("{}"),
            }
            next_auto += 1;
            rest = after;
        } else {
            out.push_str(&tail[..1]);
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PUBLIC: &str = r#"{
        "rules": [
            {"rule_name": "BasicClimbingRule", "distribution_lists": ["alice", "bob"]},
            {"rule_name": "EasyKayakingRule", "distribution_list": ["carol@example.org"]}
        ],
        "email_template": "<html><body>Hi {1},{0}</body></html>",
        "email_subject": "New activities"
    }"#;

    fn public() -> PublicConfig {
        serde_json::from_str(PUBLIC).unwrap()
    }

    #[test]
    fn test_parse_public_config() {
        let config = public();
        assert_eq!(config.rules.len(), 2);
        assert_eq!(config.rules[0], RuleGroup::new("BasicClimbingRule", &["alice", "bob"]));
        assert_eq!(config.rules[1].distribution_lists, vec!["carol@example.org"]);
        assert_eq!(config.recipient_domain, DEFAULT_RECIPIENT_DOMAIN);
        assert!(config.rule_definitions.is_empty());
    }

    #[test]
    fn test_recipient_address() {
        let config = public();
        assert_eq!(config.recipient_address("alice"), "alice@gmail.com");
        assert_eq!(
            config.recipient_address("carol@example.org"),
            "carol@example.org"
        );
    }

    #[test]
    fn test_render_email() {
        let config = public();
        assert_eq!(
            config.render_email("<div>trip</div>", "alice"),
            "<html><body>Hi alice,<div>trip</div></body></html>"
        );
    }

    #[test]
    fn test_template_braces() {
        assert_eq!(
            fill_template("<style>p {{ color: red; }}</style>{0}{2}", "x", "y"),
            "<style>p { color: red; }</style>x{2}"
        );
    }

    #[test]
    fn test_template_auto_numbered_slots() {
        assert_eq!(
            fill_template("<html>{}<p>{}</p></html>", "<div>trip</div>", "alice"),
            "<html><div>trip</div><p>alice</p></html>"
        );
        assert_eq!(
            fill_template("<style>a {{}}</style>{}", "x", "y"),
            "<style>a {}</style>x"
        );
        assert_eq!(fill_template("{}{}{}", "x", "y"), "xy{}");
    }

    #[test]
    fn test_validate_unknown_rule() {
        let mut config = public();
        let registry = config.build_registry();
        assert!(config.validate(&registry).is_ok());

        config.rules.push(RuleGroup::new("MissingRule", &["dave"]));
        assert!(matches!(
            config.validate(&registry),
            Err(FinderError::RuleNotFound { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_path_like_rule_names() {
        for name in ["../x", "nested/rule", "back\\slash", "..", ""] {
            let mut config = public();
            config
                .rule_definitions
                .push(CriteriaRule::new(name, &["Alpine Scramble"]));
            let registry = config.build_registry();
            assert!(
                matches!(
                    config.validate(&registry),
                    Err(FinderError::InvalidRuleName { name: ref bad }) if bad == name
                ),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_declared_rules_are_registered() {
        let json = r#"{
            "rules": [{"rule_name": "AlpineScrambleRule", "distribution_lists": ["alice"]}],
            "email_template": "{0}",
            "email_subject": "s",
            "rule_definitions": [{"name": "AlpineScrambleRule", "types": ["Alpine Scramble"]}]
        }"#;
        let config: PublicConfig = serde_json::from_str(json).unwrap();
        let registry = config.build_registry();
        assert!(registry.contains("AlpineScrambleRule"));
        assert!(config.validate(&registry).is_ok());
    }

    #[test]
    fn test_private_config_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secrets.json");
        std::fs::write(
            &path,
            r#"{"email_username": "finder@gmail.com", "email_password": "hunter2"}"#,
        )
        .unwrap();

        let config = PrivateConfig::load(&path).unwrap();
        assert_eq!(config.smtp_host, DEFAULT_SMTP_HOST);
        assert_eq!(config.smtp_port, DEFAULT_SMTP_PORT);
        assert!(!format!("{config:?}").contains("hunter2"));
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, r#"{"rules": []}"#).unwrap();

        assert!(matches!(
            PublicConfig::load(&path),
            Err(FinderError::Config { .. })
        ));
        assert!(matches!(
            PublicConfig::load(&temp_dir.path().join("absent.json")),
            Err(FinderError::Config { .. })
        ));
    }
}

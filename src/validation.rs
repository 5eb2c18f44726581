//! Pre-flight checks for `createRepository`.
//!
//! Checks run in a fixed order and stop at the first failure:
//! name → actor → description → languages. Nothing here writes.

use std::collections::HashSet;

use crate::error::{AppError, Result};
use crate::models::{RepoData, User};

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 500;
pub const MAX_LANGUAGES: usize = 20;
pub const MAX_LANGUAGE_LEN: usize = 50;

/// Resolves an actor token to a registered user.
pub trait ActorDirectory {
    fn resolve_actor(&self, token: &str) -> Result<Option<User>>;
}

pub struct ValidationGate;

impl ValidationGate {
    pub fn check(repo: &RepoData, token: &str, actors: &dyn ActorDirectory) -> Result<User> {
        check_name(&repo.name)?;
        let actor = check_actor(token, actors)?;
        check_description(&repo.description)?;
        check_languages(&repo.languages)?;
        Ok(actor)
    }
}

pub fn check_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(AppError::validation("name", "must not be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::validation(
            "name",
            format!("must be at most {} characters", MAX_NAME_LEN),
        ));
    }
    if name.starts_with('.') {
        return Err(AppError::validation("name", "must not start with '.'"));
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
    {
        return Err(AppError::validation(
            "name",
            format!("contains invalid character {:?}", c),
        ));
    }
    Ok(())
}

fn check_actor(token: &str, actors: &dyn ActorDirectory) -> Result<User> {
    if token.trim().is_empty() {
        return Err(AppError::validation("actor", "missing access token"));
    }
    actors
        .resolve_actor(token)?
        .ok_or_else(|| AppError::validation("actor", "access token does not identify a user"))
}

pub fn check_description(description: &str) -> Result<()> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(AppError::validation(
            "description",
            format!("must be at most {} characters", MAX_DESCRIPTION_LEN),
        ));
    }
    if description
        .chars()
        .any(|c| c.is_control() && c != '\n' && c != '\t')
    {
        return Err(AppError::validation(
            "description",
            "must not contain control characters",
        ));
    }
    Ok(())
}

pub fn check_languages(languages: &[String]) -> Result<()> {
    if languages.len() > MAX_LANGUAGES {
        return Err(AppError::validation(
            "languages",
            format!("at most {} languages may be declared", MAX_LANGUAGES),
        ));
    }

    let mut seen = HashSet::new();
    for lang in languages {
        if lang.trim().is_empty() {
            return Err(AppError::validation("languages", "entries must not be blank"));
        }
        if lang.chars().count() > MAX_LANGUAGE_LEN {
            return Err(AppError::validation(
                "languages",
                format!("'{}' exceeds {} characters", lang, MAX_LANGUAGE_LEN),
            ));
        }
        if !seen.insert(lang.as_str()) {
            return Err(AppError::validation(
                "languages",
                format!("'{}' declared more than once", lang),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserId;

    struct OneUser;

    impl ActorDirectory for OneUser {
        fn resolve_actor(&self, token: &str) -> Result<Option<User>> {
            Ok((token == "good").then(|| User {
                id: UserId(1),
                username: "alice".to_string(),
            }))
        }
    }

    fn data(name: &str, description: &str, languages: &[&str]) -> RepoData {
        RepoData {
            name: name.to_string(),
            description: description.to_string(),
            languages: languages.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn failing_field(result: Result<User>) -> String {
        match result {
            Err(AppError::Validation { field, .. }) => field,
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn test_accepts_valid_input() {
        let actor = ValidationGate::check(
            &data("demo-app_1.0", "A demo", &["Rust"]),
            "good",
            &OneUser,
        )
        .unwrap();
        assert_eq!(actor.username, "alice");
    }

    #[test]
    fn test_name_rules() {
        assert!(check_name("").is_err());
        assert!(check_name(".hidden").is_err());
        assert!(check_name("..").is_err());
        assert!(check_name("a/b").is_err());
        assert!(check_name("with space").is_err());
        assert!(check_name(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
        assert!(check_name(&"x".repeat(MAX_NAME_LEN)).is_ok());
    }

    #[test]
    fn test_checks_run_in_declared_order() {
        // Bad name wins over a bad token.
        let r = ValidationGate::check(&data("bad name", "", &[]), "wrong", &OneUser);
        assert_eq!(failing_field(r), "name");

        // Bad token wins over a bad description.
        let r = ValidationGate::check(&data("demo", "\u{7}", &[]), "wrong", &OneUser);
        assert_eq!(failing_field(r), "actor");

        let r = ValidationGate::check(&data("demo", "\u{7}", &["", ""]), "good", &OneUser);
        assert_eq!(failing_field(r), "description");

        let r = ValidationGate::check(&data("demo", "ok", &["Rust", "Rust"]), "good", &OneUser);
        assert_eq!(failing_field(r), "languages");
    }

    #[test]
    fn test_description_allows_newlines() {
        assert!(check_description("line one\n\tline two").is_ok());
        assert!(check_description(&"d".repeat(MAX_DESCRIPTION_LEN + 1)).is_err());
    }

    #[test]
    fn test_language_list_limits() {
        let many: Vec<String> = (0..=MAX_LANGUAGES).map(|i| format!("L{}", i)).collect();
        assert!(check_languages(&many).is_err());
        assert!(check_languages(&["  ".to_string()]).is_err());
        assert!(check_languages(&[]).is_ok());
    }

    #[test]
    fn test_empty_token() {
        let r = ValidationGate::check(&data("demo", "", &[]), "  ", &OneUser);
        assert_eq!(failing_field(r), "actor");
    }
}

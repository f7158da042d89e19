//! Request body checks applied before anything reaches a service.

use std::collections::BTreeSet;

use quill_shared::dto::{PostRequest, SignUpRequest};

use crate::middleware::error::{AppError, AppResult};

const CATEGORY_NAME_LEN: (usize, usize) = (3, 50);
const TAG_NAME_LEN: (usize, usize) = (1, 30);
const MAX_TAGS_PER_REQUEST: usize = 10;
const POST_TITLE_LEN: (usize, usize) = (3, 200);
const POST_CONTENT_LEN: (usize, usize) = (10, 50_000);
const MIN_PASSWORD_LEN: usize = 8;

/// Collects broken rules so the caller sees all of them at once.
#[derive(Default)]
struct Rules(Vec<String>);

impl Rules {
    fn check(&mut self, ok: bool, message: impl Into<String>) {
        if !ok {
            self.0.push(message.into());
        }
    }

    fn length(&mut self, field: &str, value: &str, (min, max): (usize, usize)) {
        let len = value.chars().count();
        self.check(
            (min..=max).contains(&len),
            format!("{field} must be between {min} and {max} characters"),
        );
    }

    fn finish(self) -> AppResult<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.0))
        }
    }
}

pub fn category_name(name: &str) -> AppResult<()> {
    let mut rules = Rules::default();
    rules.check(!name.trim().is_empty(), "Category name is required");
    rules.length("Category name", name, CATEGORY_NAME_LEN);
    rules.check(
        name.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == ' '),
        "Category name can only contain letters, numbers, and spaces or hyphens",
    );
    rules.finish()
}

pub fn tag_names(names: &BTreeSet<String>) -> AppResult<()> {
    let mut rules = Rules::default();
    rules.check(
        names.len() <= MAX_TAGS_PER_REQUEST,
        format!("Maximum {MAX_TAGS_PER_REQUEST} tags allowed"),
    );
    for name in names {
        rules.check(!name.trim().is_empty(), "Tag name must not be blank");
        rules.length("Tag name", name, TAG_NAME_LEN);
    }
    rules.finish()
}

pub fn post(request: &PostRequest) -> AppResult<()> {
    let mut rules = Rules::default();
    rules.length("Title", request.title.trim(), POST_TITLE_LEN);
    rules.length("Content", request.content.trim(), POST_CONTENT_LEN);
    rules.check(
        request.tag_ids.len() <= MAX_TAGS_PER_REQUEST,
        format!("Maximum {MAX_TAGS_PER_REQUEST} tags allowed"),
    );
    rules.finish()
}

pub fn sign_up(request: &SignUpRequest) -> AppResult<()> {
    let mut rules = Rules::default();
    rules.check(!request.name.trim().is_empty(), "Name is required");
    rules.check(request.email.contains('@'), "Invalid email address");
    rules.check(
        request.password.len() >= MIN_PASSWORD_LEN,
        format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
    );
    rules.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::domain::PostStatus;
    use uuid::Uuid;

    fn broken(result: AppResult<()>) -> Vec<String> {
        match result {
            Err(AppError::Validation(errors)) => errors,
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn test_category_name_rules() {
        assert!(category_name("Rust News").is_ok());
        assert!(category_name("web-dev_2").is_ok());
        assert_eq!(broken(category_name("ab")).len(), 1);
        assert_eq!(broken(category_name("no/slashes")).len(), 1);
        assert!(category_name(&"x".repeat(51)).is_err());
    }

    #[test]
    fn test_category_name_is_ascii_with_plain_spaces() {
        assert_eq!(broken(category_name("Café")).len(), 1);
        assert_eq!(broken(category_name("tab\tname")).len(), 1);
        assert_eq!(broken(category_name("two\nlines")).len(), 1);
    }

    #[test]
    fn test_tag_rules() {
        let ok: BTreeSet<String> = ["go", "rust"].map(String::from).into();
        assert!(tag_names(&ok).is_ok());

        let too_many: BTreeSet<String> = (0..11).map(|i| format!("t{i}")).collect();
        assert!(tag_names(&too_many).is_err());

        let too_long: BTreeSet<String> = [("y".repeat(31))].into();
        assert!(tag_names(&too_long).is_err());
    }

    #[test]
    fn test_post_rules_report_every_field() {
        let request = PostRequest {
            title: "Hi".into(),
            content: "short".into(),
            status: PostStatus::Draft,
            category_id: Uuid::new_v4(),
            tag_ids: BTreeSet::new(),
        };

        assert_eq!(broken(post(&request)).len(), 2);
    }

    #[test]
    fn test_sign_up_rules() {
        let good = SignUpRequest {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: "correct horse".into(),
        };
        assert!(sign_up(&good).is_ok());

        let bad = SignUpRequest {
            name: " ".into(),
            email: "nope".into(),
            password: "short".into(),
        };
        assert_eq!(broken(sign_up(&bad)).len(), 3);
    }
}

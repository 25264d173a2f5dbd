use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use sqlx::PgPool;

use crate::blog::slug::{is_valid_slug, slugify};
use crate::database::categories::{CategoryChanges, NewCategory};
use crate::database::posts::{NewPost, PostChanges};
use crate::database::users::ProfileChanges;
use crate::database::{categories, locations};
use crate::error::ApiError;

pub const USERNAME_MAX_LEN: usize = 150;
pub const NAME_MAX_LEN: usize = 150;
pub const TITLE_MAX_LEN: usize = 256;
pub const SLUG_MAX_LEN: usize = 64;
pub const EMAIL_MAX_LEN: usize = 254;

const REQUIRED: &str = "This field is required.";

/// Collects per-field messages; the first message for a field wins
#[derive(Debug, Default)]
pub struct FieldErrors(HashMap<String, String>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), ApiError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error("Invalid form data", Some(self.0)))
        }
    }
}

/// Distinguishes an absent key from an explicit `null` in JSON
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn check_username(errors: &mut FieldErrors, username: &str) {
    if username.is_empty() {
        errors.add("username", REQUIRED);
    } else if username.chars().count() > USERNAME_MAX_LEN {
        errors.add("username", format!("Ensure this value has at most {} characters.", USERNAME_MAX_LEN));
    } else if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        errors.add(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    }
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    if email.is_empty() {
        return;
    }
    if email.chars().count() > EMAIL_MAX_LEN {
        check_max_len(errors, "email", email, EMAIL_MAX_LEN);
        return;
    }
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@') && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        errors.add("email", "Enter a valid email address.");
    }
}

fn check_max_len(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.add(field, format!("Ensure this value has at most {} characters.", max));
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistrationForm {
    pub username: String,
    pub password1: String,
    pub password2: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl RegistrationForm {
    pub fn validate(&self, min_password_length: usize) -> Result<(), ApiError> {
        let mut errors = FieldErrors::default();
        let username = self.username.trim();
        check_username(&mut errors, username);
        check_email(&mut errors, self.email.trim());
        check_max_len(&mut errors, "first_name", &self.first_name, NAME_MAX_LEN);
        check_max_len(&mut errors, "last_name", &self.last_name, NAME_MAX_LEN);

        if self.password1.is_empty() {
            errors.add("password1", REQUIRED);
        }
        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        } else if self.password1 != self.password2 {
            errors.add("password2", "The two password fields didn't match.");
        } else {
            let password = &self.password1;
            if password.chars().count() < min_password_length {
                errors.add(
                    "password2",
                    format!(
                        "This password is too short. It must contain at least {} characters.",
                        min_password_length
                    ),
                );
            } else if password.chars().all(|c| c.is_ascii_digit()) {
                errors.add("password2", "This password is entirely numeric.");
            } else if !username.is_empty() && password.to_lowercase() == username.to_lowercase() {
                errors.add("password2", "The password is too similar to the username.");
            }
        }

        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileForm {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl ProfileForm {
    pub fn validate(self) -> Result<ProfileChanges, ApiError> {
        let mut errors = FieldErrors::default();
        let username = self.username.map(|u| u.trim().to_string());
        let email = self.email.map(|e| e.trim().to_string());

        if let Some(username) = &username {
            check_username(&mut errors, username);
        }
        if let Some(email) = &email {
            check_email(&mut errors, email);
        }
        if let Some(first_name) = &self.first_name {
            check_max_len(&mut errors, "first_name", first_name, NAME_MAX_LEN);
        }
        if let Some(last_name) = &self.last_name {
            check_max_len(&mut errors, "last_name", last_name, NAME_MAX_LEN);
        }
        errors.into_result()?;

        Ok(ProfileChanges {
            username,
            email,
            first_name: self.first_name,
            last_name: self.last_name,
        })
    }
}

/// Post document for create and edit. On create `title` and `text` are required;
/// on edit every absent field is left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostForm {
    pub title: Option<String>,
    pub text: Option<String>,
    pub pub_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub location_id: Option<Option<i64>>,
    pub is_published: Option<bool>,
}

impl PostForm {
    /// Build from multipart text parts. An empty value clears a nullable reference.
    pub fn from_text_fields(fields: &HashMap<String, String>) -> Result<Self, ApiError> {
        let mut errors = FieldErrors::default();
        let mut form = PostForm {
            title: fields.get("title").cloned(),
            text: fields.get("text").cloned(),
            ..Default::default()
        };

        if let Some(raw) = fields.get("pub_date").map(|s| s.trim()).filter(|s| !s.is_empty()) {
            match DateTime::parse_from_rfc3339(raw) {
                Ok(date) => form.pub_date = Some(date.with_timezone(&Utc)),
                Err(_) => errors.add("pub_date", "Enter a valid date/time."),
            }
        }
        for (field, target) in [("category_id", &mut form.category_id), ("location_id", &mut form.location_id)] {
            if let Some(raw) = fields.get(field).map(|s| s.trim()) {
                if raw.is_empty() {
                    *target = Some(None);
                } else {
                    match raw.parse::<i64>() {
                        Ok(id) => *target = Some(Some(id)),
                        Err(_) => errors.add(field, "Select a valid choice."),
                    }
                }
            }
        }
        if let Some(raw) = fields.get("is_published") {
            match parse_bool(raw) {
                Some(value) => form.is_published = Some(value),
                None => errors.add("is_published", "Enter a valid boolean."),
            }
        }

        errors.into_result()?;
        Ok(form)
    }

    fn check_fields(&self, errors: &mut FieldErrors, creating: bool) {
        match self.title.as_deref().map(str::trim) {
            None if creating => errors.add("title", REQUIRED),
            Some("") => errors.add("title", REQUIRED),
            Some(title) => check_max_len(errors, "title", title, TITLE_MAX_LEN),
            None => {}
        }
        match self.text.as_deref().map(str::trim) {
            None if creating => errors.add("text", REQUIRED),
            Some("") => errors.add("text", REQUIRED),
            _ => {}
        }
    }

    /// Referenced category and location must exist
    pub async fn check_references(&self, pool: &PgPool) -> Result<(), ApiError> {
        let mut errors = FieldErrors::default();
        if let Some(Some(category_id)) = self.category_id {
            if !categories::exists(pool, category_id).await? {
                errors.add("category_id", "Select a valid choice. That choice is not one of the available choices.");
            }
        }
        if let Some(Some(location_id)) = self.location_id {
            if !locations::exists(pool, location_id).await? {
                errors.add("location_id", "Select a valid choice. That choice is not one of the available choices.");
            }
        }
        errors.into_result()
    }

    pub fn into_new_post(self, author_id: i64, image: Option<String>, now: DateTime<Utc>) -> Result<NewPost, ApiError> {
        let mut errors = FieldErrors::default();
        self.check_fields(&mut errors, true);
        errors.into_result()?;

        Ok(NewPost {
            title: self.title.unwrap_or_default().trim().to_string(),
            text: self.text.unwrap_or_default(),
            pub_date: self.pub_date.unwrap_or(now),
            author_id,
            category_id: self.category_id.flatten(),
            location_id: self.location_id.flatten(),
            image,
            is_published: self.is_published.unwrap_or(true),
        })
    }

    pub fn into_changes(self) -> Result<PostChanges, ApiError> {
        let mut errors = FieldErrors::default();
        self.check_fields(&mut errors, false);
        errors.into_result()?;

        Ok(PostChanges {
            title: self.title.map(|t| t.trim().to_string()),
            text: self.text,
            pub_date: self.pub_date,
            category_id: self.category_id,
            location_id: self.location_id,
            image: None,
            is_published: self.is_published,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommentForm {
    pub text: String,
}

impl CommentForm {
    pub fn validate(self) -> Result<String, ApiError> {
        if self.text.trim().is_empty() {
            return Err(ApiError::field_error("text", REQUIRED));
        }
        Ok(self.text)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub is_published: Option<bool>,
}

/// Owned counterpart of `NewCategory` produced by a valid form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    pub title: String,
    pub description: String,
    pub slug: String,
    pub is_published: bool,
}

impl CategoryDraft {
    pub fn as_new(&self) -> NewCategory<'_> {
        NewCategory {
            title: &self.title,
            description: &self.description,
            slug: &self.slug,
            is_published: self.is_published,
        }
    }
}

impl CategoryForm {
    fn check_slug(errors: &mut FieldErrors, slug: &str) {
        if !is_valid_slug(slug) {
            errors.add(
                "slug",
                "Enter a valid slug consisting of letters, numbers, underscores or hyphens.",
            );
        }
    }

    /// Slug falls back to `slugify(title)` when not supplied
    pub fn into_draft(self) -> Result<CategoryDraft, ApiError> {
        let mut errors = FieldErrors::default();
        let title = self.title.unwrap_or_default().trim().to_string();
        let description = self.description.unwrap_or_default();

        if title.is_empty() {
            errors.add("title", REQUIRED);
        } else {
            check_max_len(&mut errors, "title", &title, TITLE_MAX_LEN);
        }
        if description.trim().is_empty() {
            errors.add("description", REQUIRED);
        }

        let slug = match self.slug.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
            Some(slug) => slug,
            None => slugify(&title).chars().take(SLUG_MAX_LEN).collect::<String>().trim_end_matches('-').to_string(),
        };
        Self::check_slug(&mut errors, &slug);
        check_max_len(&mut errors, "slug", &slug, SLUG_MAX_LEN);

        errors.into_result()?;
        Ok(CategoryDraft {
            title,
            description,
            slug,
            is_published: self.is_published.unwrap_or(true),
        })
    }

    pub fn into_changes(self) -> Result<CategoryChanges, ApiError> {
        let mut errors = FieldErrors::default();
        let title = self.title.map(|t| t.trim().to_string());
        let slug = self.slug.map(|s| s.trim().to_string());

        if let Some(title) = &title {
            if title.is_empty() {
                errors.add("title", REQUIRED);
            }
            check_max_len(&mut errors, "title", title, TITLE_MAX_LEN);
        }
        if let Some(description) = &self.description {
            if description.trim().is_empty() {
                errors.add("description", REQUIRED);
            }
        }
        if let Some(slug) = &slug {
            Self::check_slug(&mut errors, slug);
            check_max_len(&mut errors, "slug", slug, SLUG_MAX_LEN);
        }

        errors.into_result()?;
        Ok(CategoryChanges {
            title,
            description: self.description,
            slug,
            is_published: self.is_published,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationForm {
    pub name: Option<String>,
    pub is_published: Option<bool>,
}

impl LocationForm {
    fn check_name(errors: &mut FieldErrors, name: &str) {
        if name.is_empty() {
            errors.add("name", REQUIRED);
        } else {
            check_max_len(errors, "name", name, TITLE_MAX_LEN);
        }
    }

    /// Returns the trimmed name and publication flag for a new location
    pub fn into_new(self) -> Result<(String, bool), ApiError> {
        let mut errors = FieldErrors::default();
        let name = self.name.unwrap_or_default().trim().to_string();
        Self::check_name(&mut errors, &name);
        errors.into_result()?;
        Ok((name, self.is_published.unwrap_or(true)))
    }

    pub fn into_changes(self) -> Result<(Option<String>, Option<bool>), ApiError> {
        let mut errors = FieldErrors::default();
        let name = self.name.map(|n| n.trim().to_string());
        if let Some(name) = &name {
            Self::check_name(&mut errors, name);
        }
        errors.into_result()?;
        Ok((name, self.is_published))
    }
}

/// Accepts the spellings HTML checkboxes and CLI users send
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" | "" => Some(false),
        _ => None,
    }
}

// handlers/protected/submission.rs - Post bodies from JSON or multipart forms

use std::collections::HashMap;

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Json,
};
use serde::Deserialize;

use crate::blog::forms::{parse_bool, PostForm};
use crate::error::ApiError;

pub struct UploadedImage {
    pub file_name: String,
    pub bytes: Bytes,
}

/// A post create/edit request. `image_clear` removes the stored image on edit.
pub struct PostSubmission {
    pub form: PostForm,
    pub image: Option<UploadedImage>,
    pub clear_image: bool,
    /// Came in as `multipart/form-data` rather than JSON
    pub from_form: bool,
}

#[derive(Deserialize)]
struct JsonSubmission {
    #[serde(flatten)]
    form: PostForm,
    #[serde(default)]
    image_clear: bool,
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("multipart/form-data"))
        .unwrap_or(false)
}

impl PostSubmission {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut fields = HashMap::new();
        let mut image = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == "image" {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(|e| ApiError::bad_request(e.body_text()))?;
                // Browsers send an empty part when no file was chosen
                if !file_name.is_empty() && !bytes.is_empty() {
                    image = Some(UploadedImage { file_name, bytes });
                }
            } else {
                let text = field.text().await.map_err(|e| ApiError::bad_request(e.body_text()))?;
                fields.insert(name, text);
            }
        }

        let clear_image = match fields.remove("image_clear") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| ApiError::field_error("image_clear", "Enter a valid boolean."))?,
            None => false,
        };

        Ok(Self {
            form: PostForm::from_text_fields(&fields)?,
            image,
            clear_image,
            from_form: true,
        })
    }

    /// Form used for a new post. Browsers leave unchecked boxes out of the
    /// submission, so a form without `is_published` creates a draft.
    pub fn create_form(&self) -> PostForm {
        let mut form = self.form.clone();
        if self.from_form && form.is_published.is_none() {
            form.is_published = Some(false);
        }
        form
    }
}

#[async_trait]
impl<S> FromRequest<S> for PostSubmission
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_multipart(&req) {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            return Self::from_multipart(multipart).await;
        }

        let Json(body) = Json::<JsonSubmission>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        Ok(Self {
            form: body.form,
            image: None,
            clear_image: body.image_clear,
            from_form: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use chrono::Utc;

    use super::*;

    const BOUNDARY: &str = "blogicum-boundary";

    fn multipart_request(parts: &[(&str, Option<&str>, &str)]) -> Request {
        let mut body = Vec::new();
        for (name, file_name, data) in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match file_name {
                Some(file_name) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                        name, file_name
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                ),
            }
            body.extend_from_slice(data.as_bytes());
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        axum::http::Request::builder()
            .method("POST")
            .uri("/api/posts")
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn multipart_collects_fields_and_image() {
        let req = multipart_request(&[
            ("title", None, "Kazan"),
            ("text", None, "Great trip"),
            ("category_id", None, "4"),
            ("image", Some("kremlin.png"), "PNG fake"),
        ]);
        let submission = PostSubmission::from_request(req, &()).await.unwrap();

        assert!(submission.from_form);
        assert_eq!(submission.form.title.as_deref(), Some("Kazan"));
        assert_eq!(submission.form.category_id, Some(Some(4)));
        let image = submission.image.as_ref().unwrap();
        assert_eq!(image.file_name, "kremlin.png");
        assert_eq!(&image.bytes[..], b"PNG fake");
        assert!(!submission.clear_image);
    }

    #[tokio::test]
    async fn unchecked_publish_box_creates_a_draft() {
        let req = multipart_request(&[("title", None, "Draft"), ("text", None, "Later")]);
        let submission = PostSubmission::from_request(req, &()).await.unwrap();
        let post = submission.create_form().into_new_post(1, None, Utc::now()).unwrap();
        assert!(!post.is_published);

        let req = multipart_request(&[("title", None, "Out"), ("text", None, "Now"), ("is_published", None, "on")]);
        let submission = PostSubmission::from_request(req, &()).await.unwrap();
        assert!(submission.create_form().into_new_post(1, None, Utc::now()).unwrap().is_published);
    }

    #[tokio::test]
    async fn empty_file_part_and_clear_flag() {
        let req = multipart_request(&[("image", Some(""), ""), ("image_clear", None, "true")]);
        let submission = PostSubmission::from_request(req, &()).await.unwrap();
        assert!(submission.image.is_none());
        assert!(submission.clear_image);

        let req = multipart_request(&[("image_clear", None, "maybe")]);
        assert!(PostSubmission::from_request(req, &()).await.is_err());
    }

    #[tokio::test]
    async fn json_bodies_publish_by_default() {
        let req = axum::http::Request::builder()
            .method("POST")
            .uri("/api/posts")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"title": "Hi", "text": "There", "image_clear": true}"#))
            .unwrap();
        let submission = PostSubmission::from_request(req, &()).await.unwrap();
        assert!(!submission.from_form);
        assert!(submission.clear_image);
        assert!(submission.create_form().into_new_post(1, None, Utc::now()).unwrap().is_published);
    }
}

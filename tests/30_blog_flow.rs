mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use blogicum::database::categories::{self, NewCategory};
use blogicum::database::{locations, users};
use common::{database_app, multipart, request, send, unique, Part, MAX_IMAGE_BYTES};

async fn register_and_login(app: &axum::Router, username: &str) -> (i64, String) {
    let payload = json!({
        "username": username,
        "password1": "s3cret-pass",
        "password2": "s3cret-pass",
        "email": format!("{}@example.com", username)
    });
    let (status, body) = send(app, request(Method::POST, "/auth/registration", None, Some(payload))).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let id = body["data"]["id"].as_i64().expect("user id");
    assert!(body["data"].get("password_hash").is_none());

    let login = json!({ "username": username, "password": "s3cret-pass" });
    let (status, body) = send(app, request(Method::POST, "/auth/login", None, Some(login))).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    (id, body["data"]["token"].as_str().expect("token").to_string())
}

fn post_ids(page: &Value) -> Vec<i64> {
    page["items"]
        .as_array()
        .map(|items| items.iter().filter_map(|p| p["id"].as_i64()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn registration_posting_visibility_and_ownership() -> anyhow::Result<()> {
    let media = tempfile::tempdir()?;
    let Some((app, pool)) = database_app(media.path()).await? else {
        return Ok(());
    };

    let author_name = unique("author");
    let reader_name = unique("reader");
    let (author_id, author_token) = register_and_login(&app, &author_name).await;
    let (_, reader_token) = register_and_login(&app, &reader_name).await;

    // Duplicate registration is a field error
    let dup = json!({ "username": author_name, "password1": "s3cret-pass", "password2": "s3cret-pass" });
    let (status, body) = send(&app, request(Method::POST, "/auth/registration", None, Some(dup))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["username"].is_string());

    let slug = unique("travel");
    let category = categories::insert(
        &pool,
        &NewCategory { title: "Travel", description: "Trips", slug: &slug, is_published: true },
    )
    .await?;
    let hidden_location = locations::insert(&pool, &unique("nowhere"), false).await?;

    // Published post
    let create = json!({ "title": "Kazan", "text": "Great trip", "category_id": category.id });
    let (status, body) = send(&app, request(Method::POST, "/api/posts", Some(&author_token), Some(create))).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let public_id = body["data"]["id"].as_i64().expect("post id");
    assert_eq!(body["data"]["author"]["id"], author_id);

    // Scheduled post and a post pinned to a hidden location
    let future = (Utc::now() + Duration::days(3)).to_rfc3339();
    let create = json!({ "title": "Soon", "text": "Later", "category_id": category.id, "pub_date": future });
    let (_, body) = send(&app, request(Method::POST, "/api/posts", Some(&author_token), Some(create))).await;
    let scheduled_id = body["data"]["id"].as_i64().expect("post id");

    let create = json!({
        "title": "Secret spot", "text": "Shh",
        "category_id": category.id, "location_id": hidden_location.id
    });
    let (_, body) = send(&app, request(Method::POST, "/api/posts", Some(&author_token), Some(create))).await;
    let hidden_id = body["data"]["id"].as_i64().expect("post id");

    // Missing references are rejected
    let create = json!({ "title": "Bad", "text": "Ref", "category_id": i64::MAX });
    let (status, body) = send(&app, request(Method::POST, "/api/posts", Some(&author_token), Some(create))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["category_id"].is_string());

    // Category listing shows only the visible post
    let (status, body) = send(&app, request(Method::GET, &format!("/category/{}", slug), None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(post_ids(&body["data"]["posts"]), vec![public_id]);

    // Detail of a hidden post: 404 for others, visible to the author
    let uri = format!("/posts/{}", scheduled_id);
    let (status, _) = send(&app, request(Method::GET, &uri, Some(&reader_token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, request(Method::GET, &uri, Some(&author_token), None)).await;
    assert_eq!(status, StatusCode::OK);

    // Profile: owner sees all three posts, others only the public one
    let uri = format!("/profile/{}", author_name);
    let (_, body) = send(&app, request(Method::GET, &uri, Some(&author_token), None)).await;
    let mut own = post_ids(&body["data"]["posts"]);
    own.sort_unstable();
    let mut expected = vec![public_id, scheduled_id, hidden_id];
    expected.sort_unstable();
    assert_eq!(own, expected);
    let (_, body) = send(&app, request(Method::GET, &uri, None, None)).await;
    assert_eq!(post_ids(&body["data"]["posts"]), vec![public_id]);

    // Only the author may edit
    let uri = format!("/api/posts/{}", public_id);
    let patch = json!({ "title": "Hijacked" });
    let (status, _) = send(&app, request(Method::PATCH, &uri, Some(&reader_token), Some(patch))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let patch = json!({ "title": "Kazan in May" });
    let (status, body) = send(&app, request(Method::PATCH, &uri, Some(&author_token), Some(patch))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Kazan in May");

    // Comments: hidden posts cannot be commented on by others
    let uri = format!("/api/posts/{}/comments", hidden_id);
    let (status, _) = send(&app, request(Method::POST, &uri, Some(&reader_token), Some(json!({ "text": "Hi" })))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/api/posts/{}/comments", public_id);
    let (status, body) = send(&app, request(Method::POST, &uri, Some(&reader_token), Some(json!({ "text": "Nice!" })))).await;
    assert_eq!(status, StatusCode::CREATED);
    let comment_id = body["data"]["id"].as_i64().expect("comment id");

    let (status, _) = send(&app, request(Method::POST, &uri, Some(&reader_token), Some(json!({ "text": "  " })))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Wrong post in the path hides the comment; wrong user is forbidden
    let wrong = format!("/api/posts/{}/comments/{}", scheduled_id, comment_id);
    let (status, _) = send(&app, request(Method::DELETE, &wrong, Some(&reader_token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let comment_uri = format!("/api/posts/{}/comments/{}", public_id, comment_id);
    let (status, _) = send(&app, request(Method::PATCH, &comment_uri, Some(&author_token), Some(json!({ "text": "x" })))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = send(&app, request(Method::GET, &format!("/posts/{}", public_id), None, None)).await;
    assert_eq!(body["data"]["post"]["comment_count"], 1);
    assert_eq!(body["data"]["comments"][0]["text"], "Nice!");

    // Index is paginated and clamps out-of-range pages
    let (status, body) = send(&app, request(Method::GET, "/?page=9999", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["number"], body["data"]["num_pages"]);

    // Deleting the post removes its comments
    let (status, _) = send(&app, request(Method::DELETE, &format!("/api/posts/{}", public_id), Some(&author_token), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, request(Method::PATCH, &comment_uri, Some(&reader_token), Some(json!({ "text": "y" })))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn admin_requires_staff_and_filters_lists() -> anyhow::Result<()> {
    let media = tempfile::tempdir()?;
    let Some((app, pool)) = database_app(media.path()).await? else {
        return Ok(());
    };

    let staff_name = unique("staff");
    let (_, token) = register_and_login(&app, &staff_name).await;

    let (status, _) = send(&app, request(Method::GET, "/api/admin/categories", Some(&token), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Staff flag is read live, so the existing token is upgraded
    users::set_staff(&pool, &staff_name, true).await?;

    let title = unique("Admin Made");
    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/admin/categories",
            Some(&token),
            Some(json!({ "title": title, "description": "From the admin" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let slug = body["data"]["slug"].as_str().expect("slug").to_string();
    assert_eq!(slug, title.to_lowercase().replace([' ', '_'], "-"));

    // Same slug again is rejected
    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/admin/categories",
            Some(&token),
            Some(json!({ "title": "Other", "description": "x", "slug": slug })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["slug"].is_string());

    let uri = format!("/api/admin/categories?q={}&created=today&order=-title", slug);
    let (status, body) = send(&app, request(Method::GET, &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["items"][0]["slug"], slug);

    let (status, _) = send(&app, request(Method::GET, "/api/admin/categories?colour=red", Some(&token), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, request(Method::GET, "/api/admin/users", Some(&token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let id = body["data"]["items"][0]["id"].as_i64().expect("id");
    let (status, _) = send(&app, request(Method::DELETE, &format!("/api/admin/categories/{}", id), Some(&token), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    Ok(())
}

#[tokio::test]
async fn images_profiles_pages_and_moderation() -> anyhow::Result<()> {
    let media = tempfile::tempdir()?;
    let Some((app, pool)) = database_app(media.path()).await? else {
        return Ok(());
    };

    let author_name = unique("writer");
    let other_name = unique("other");
    let moderator_name = unique("moderator");
    let (_, token) = register_and_login(&app, &author_name).await;
    let (_, other_token) = register_and_login(&app, &other_name).await;
    let (_, moderator_token) = register_and_login(&app, &moderator_name).await;
    users::set_staff(&pool, &moderator_name, true).await?;

    // Unpublished categories have no public page
    let hidden_slug = unique("hidden");
    categories::insert(
        &pool,
        &NewCategory { title: "Hidden", description: "Not yet", slug: &hidden_slug, is_published: false },
    )
    .await?;
    let (status, _) = send(&app, request(Method::GET, &format!("/category/{}", hidden_slug), None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let slug = unique("photos");
    let category = categories::insert(
        &pool,
        &NewCategory { title: "Photos", description: "Pictures", slug: &slug, is_published: true },
    )
    .await?;
    let category_id = category.id.to_string();

    // Multipart create with an image
    let upload = multipart(
        Method::POST,
        "/api/posts",
        Some(&token),
        vec![
            Part::Text("title", "Kremlin"),
            Part::Text("text", "At sunset"),
            Part::Text("category_id", &category_id),
            Part::Text("is_published", "on"),
            Part::File("image", "kremlin.PNG", b"PNG fake".to_vec()),
        ],
    );
    let (status, body) = send(&app, upload).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let post_id = body["data"]["id"].as_i64().expect("post id");
    assert_eq!(body["data"]["is_published"], true);
    let first_url = body["data"]["image"].as_str().expect("image url").to_string();
    assert!(first_url.starts_with("/media/posts_images/") && first_url.ends_with(".png"));
    let first_file = media.path().join(first_url.trim_start_matches("/media/"));
    assert!(first_file.exists());
    let (status, _) = send(&app, request(Method::GET, &first_url, None, None)).await;
    assert_eq!(status, StatusCode::OK);

    // An unticked publish box creates a draft
    let draft = multipart(
        Method::POST,
        "/api/posts",
        Some(&token),
        vec![Part::Text("title", "Draft"), Part::Text("text", "Later"), Part::Text("category_id", &category_id)],
    );
    let (status, body) = send(&app, draft).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["is_published"], false);

    // Bad uploads
    let wrong_type = multipart(
        Method::POST,
        "/api/posts",
        Some(&token),
        vec![Part::Text("title", "Notes"), Part::Text("text", "x"), Part::File("image", "notes.txt", b"hi".to_vec())],
    );
    let (status, body) = send(&app, wrong_type).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["image"].is_string());

    let too_big = multipart(
        Method::POST,
        "/api/posts",
        Some(&token),
        vec![
            Part::Text("title", "Huge"),
            Part::Text("text", "x"),
            Part::File("image", "huge.jpg", vec![0u8; MAX_IMAGE_BYTES + 1]),
        ],
    );
    let (status, body) = send(&app, too_big).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");

    // Replacing the image removes the old file; clearing removes the new one
    let uri = format!("/api/posts/{}", post_id);
    let replace = multipart(
        Method::PATCH,
        &uri,
        Some(&token),
        vec![Part::File("image", "kremlin.jpg", b"JPEG fake".to_vec())],
    );
    let (status, body) = send(&app, replace).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert!(!first_file.exists());
    let second_url = body["data"]["image"].as_str().expect("image url").to_string();
    let second_file = media.path().join(second_url.trim_start_matches("/media/"));
    assert!(second_file.exists());

    let clear = multipart(Method::PATCH, &uri, Some(&token), vec![Part::Text("image_clear", "true")]);
    let (status, body) = send(&app, clear).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["image"].is_null());
    assert!(!second_file.exists());

    // Eleven more public posts give the category a second page
    for n in 0..11 {
        let create = json!({ "title": format!("Shot {}", n), "text": "Look", "category_id": category.id });
        let (status, _) = send(&app, request(Method::POST, "/api/posts", Some(&token), Some(create))).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (_, body) = send(&app, request(Method::GET, &format!("/category/{}", slug), None, None)).await;
    let first_page = &body["data"]["posts"];
    assert_eq!(first_page["count"], 12);
    assert_eq!(first_page["num_pages"], 2);
    assert_eq!(first_page["items"].as_array().map(Vec::len), Some(10));
    assert_eq!(first_page["has_next"], true);

    let (_, body) = send(&app, request(Method::GET, &format!("/category/{}?page=2", slug), None, None)).await;
    let second_page = &body["data"]["posts"];
    assert_eq!(second_page["number"], 2);
    assert_eq!(second_page["has_previous"], true);
    assert_eq!(second_page["has_next"], false);
    // Newest first, so the multipart post is the oldest and lands last
    assert_eq!(post_ids(second_page), vec![post_id]);

    // Own profile
    let (status, body) = send(&app, request(Method::GET, "/api/profile", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], author_name.as_str());

    let taken = json!({ "username": other_name });
    let (status, body) = send(&app, request(Method::PATCH, "/api/profile", Some(&token), Some(taken))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["username"].is_string());

    let names = json!({ "first_name": "Lev", "last_name": "Tolstoy" });
    let (status, body) = send(&app, request(Method::PATCH, "/api/profile", Some(&token), Some(names))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["first_name"], "Lev");
    assert_eq!(body["data"]["username"], author_name.as_str());

    // Moderation: staff delete someone else's comment and post
    let uri = format!("/api/posts/{}", post_id);
    let upload = multipart(Method::PATCH, &uri, Some(&token), vec![Part::File("image", "again.gif", b"GIF fake".to_vec())]);
    let (_, body) = send(&app, upload).await;
    let third_url = body["data"]["image"].as_str().expect("image url").to_string();
    let third_file = media.path().join(third_url.trim_start_matches("/media/"));
    assert!(third_file.exists());

    let comments_uri = format!("/api/posts/{}/comments", post_id);
    let (_, body) = send(&app, request(Method::POST, &comments_uri, Some(&other_token), Some(json!({ "text": "Spam" })))).await;
    let comment_id = body["data"]["id"].as_i64().expect("comment id");

    let (status, _) = send(&app, request(Method::DELETE, &format!("/api/admin/comments/{}", comment_id), Some(&other_token), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, request(Method::DELETE, &format!("/api/admin/comments/{}", comment_id), Some(&moderator_token), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = send(&app, request(Method::GET, &format!("/posts/{}", post_id), None, None)).await;
    assert_eq!(body["data"]["comments"].as_array().map(Vec::len), Some(0));

    let (status, _) = send(&app, request(Method::DELETE, &format!("/api/admin/posts/{}", post_id), Some(&moderator_token), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(!third_file.exists());
    let (status, _) = send(&app, request(Method::GET, &format!("/posts/{}", post_id), None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, request(Method::DELETE, &format!("/api/admin/posts/{}", post_id), Some(&moderator_token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

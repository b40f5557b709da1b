use std::time::{SystemTime, UNIX_EPOCH};

use blog_api_client::{ApiClient, ApiError, Config, Credentials, NewUser, PostDraft};

fn unique_suffix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock must be after unix epoch")
        .as_nanos();
    format!("{nanos}")
}

#[tokio::test]
#[ignore = "requires running blog backend"]
async fn full_session_flow() {
    let base_url =
        std::env::var("BLOG_API_URL").unwrap_or_else(|_| "http://127.0.0.1:8000/api".to_string());
    let client = ApiClient::new(Config::new(base_url));

    let suffix = unique_suffix();
    let username = format!("user_{suffix}");
    let email = format!("user_{suffix}@example.com");
    let password = "password123";

    let registered = client
        .register(&NewUser {
            username: username.clone(),
            email: email.clone(),
            password: password.to_string(),
            first_name: None,
            last_name: None,
        })
        .await
        .expect("register must succeed");
    assert_eq!(registered.user.username, username);
    assert!(!registered.token.is_empty());
    assert!(!client.session().is_authenticated());

    let login = client
        .login(&Credentials {
            username: username.clone(),
            password: password.to_string(),
        })
        .await
        .expect("login must succeed");
    assert!(!login.token.is_empty());
    assert!(client.session().is_authenticated());

    let me = client.current_user().await.expect("current_user must succeed");
    assert_eq!(me.username, username);

    let created = client
        .create_post(&PostDraft {
            title: "smoke title".to_string(),
            content: "smoke content".to_string(),
        })
        .await
        .expect("create_post must succeed");
    assert_eq!(created.title, "smoke title");
    assert_eq!(created.author_username, username);

    let fetched = client
        .get_post(created.id)
        .await
        .expect("get_post must succeed");
    assert_eq!(fetched.id, created.id);

    let listed = client.list_posts(1).await.expect("list_posts must succeed");
    assert!(listed.count >= 1);
    assert!(listed.results.iter().any(|post| post.id == created.id));

    let updated = client
        .update_post(
            created.id,
            &PostDraft {
                title: "smoke title updated".to_string(),
                content: "smoke content updated".to_string(),
            },
        )
        .await
        .expect("update_post must succeed");
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.title, "smoke title updated");

    client
        .delete_post(created.id)
        .await
        .expect("delete_post must succeed");

    let after_delete = client.get_post(created.id).await;
    assert!(matches!(after_delete, Err(ApiError::NotFound(_))));

    let delete_again = client.delete_post(created.id).await;
    assert!(matches!(delete_again, Err(ApiError::NotFound(_))));

    client.logout().await.expect("logout must succeed");
    assert!(!client.session().is_authenticated());

    // Чтение доступно и без сессии: запрос уходит без заголовка авторизации.
    client
        .list_posts(1)
        .await
        .expect("anonymous list_posts must succeed");
}

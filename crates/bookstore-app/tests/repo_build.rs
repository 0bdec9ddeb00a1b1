use bookstore_repo::{build_repo, Repo};
use bookstore_types::domain::book::BookSort;
use bookstore_types::domain::user::NewUser;
use bookstore_types::ports::book_repository::BookRepository;
use bookstore_types::ports::user_repository::UserRepository;

#[tokio::test]
async fn builds_sqlite_repo_from_url() {
    // Use a temp DB path for isolation.
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("bookstore-test.db");
    let url = format!("sqlite://{}", db_path.display());

    let repo: Repo = build_repo(Some(&url)).await.expect("build repo");
    assert_eq!(repo.backend_name(), "sqlite");
    assert!(repo.list_books(BookSort::Id).await.expect("list").is_empty());
}

#[tokio::test]
async fn sqlite_repo_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("reopen.db").display());

    {
        let repo = build_repo(Some(&url)).await.unwrap();
        repo.create_user(NewUser {
            username: "kept".into(),
            email: "kept@example.com".into(),
            password_hash: "hash".into(),
        })
        .await
        .unwrap();
    }

    let reopened = build_repo(Some(&url)).await.unwrap();
    let user = reopened.find_user_by_username("kept").await.unwrap();
    assert!(user.is_some());
}

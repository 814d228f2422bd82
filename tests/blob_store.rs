use bytes::Bytes;
use printshop_api::adapters::{
    blob::{BlobError, BlobStore, LocalBlobStore, sanitize_file_name},
    identity::{AccountProfile, IdentityError, IdentityProvider, InMemoryIdentityProvider},
};

#[tokio::test]
async fn put_writes_under_owner_directory() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = LocalBlobStore::new(dir.path()).await?;

    let path = store
        .put(Bytes::from_static(b"%PDF-1.7"), "Quarterly Report.pdf", "uid-1")
        .await?;

    assert!(path.starts_with("uid-1/Quarterly_Report_"), "{path}");
    assert!(path.ends_with(".pdf"), "{path}");
    let written = tokio::fs::read(dir.path().join(&path)).await?;
    assert_eq!(written, b"%PDF-1.7");
    Ok(())
}

#[tokio::test]
async fn same_name_twice_gets_distinct_paths() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = LocalBlobStore::new(dir.path()).await?;

    let a = store.put(Bytes::from_static(b"a"), "scan.png", "uid-1").await?;
    let b = store.put(Bytes::from_static(b"b"), "scan.png", "uid-1").await?;

    assert_ne!(a, b);
    Ok(())
}

#[tokio::test]
async fn delete_removes_and_then_reports_not_found() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = LocalBlobStore::new(dir.path()).await?;
    let path = store.put(Bytes::from_static(b"x"), "a.txt", "uid-1").await?;

    store.delete(&path).await?;
    assert!(!dir.path().join(&path).exists());
    assert!(matches!(store.delete(&path).await, Err(BlobError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn paths_escaping_the_base_are_rejected() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = LocalBlobStore::new(dir.path()).await?;

    for path in ["../outside.txt", "/etc/passwd", "uid-1/../../x", ""] {
        assert!(
            matches!(store.delete(path).await, Err(BlobError::InvalidPath(_))),
            "{path:?}"
        );
    }
    Ok(())
}

#[test]
fn file_names_are_sanitized() {
    assert_eq!(sanitize_file_name("my file (1).pdf"), "my_file_1_.pdf");
    assert_eq!(sanitize_file_name("../../etc/passwd"), "etc_passwd");
    assert_eq!(sanitize_file_name("???"), "file");
    assert_eq!(sanitize_file_name("résumé.docx"), "r_sum_.docx");
}

#[tokio::test]
async fn in_memory_identity_provider_round_trip() {
    let provider = InMemoryIdentityProvider::new();
    let profile = AccountProfile {
        email: "ada@example.com".into(),
        display_name: "Ada Lovelace".into(),
        phone_number: None,
    };

    assert!(matches!(
        provider.create_account(&profile, "123").await,
        Err(IdentityError::InvalidArgument(_))
    ));

    let uid = provider.create_account(&profile, "secret-1").await.unwrap();
    assert!(provider.contains(&uid).await);
    assert!(matches!(
        provider.create_account(&profile, "secret-2").await,
        Err(IdentityError::EmailExists(_))
    ));

    provider.delete_account(&uid).await.unwrap();
    assert!(matches!(
        provider.delete_account(&uid).await,
        Err(IdentityError::NotFound)
    ));
}

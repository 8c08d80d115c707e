use super::*;

#[test]
fn parse_classifies_references() {
    assert_eq!(
        AssetSource::parse("https://example.com/a.png"),
        AssetSource::Remote("https://example.com/a.png".to_owned())
    );
    assert_eq!(
        AssetSource::parse("HTTP://example.com"),
        AssetSource::Remote("HTTP://example.com".to_owned())
    );
    assert!(matches!(
        AssetSource::parse("data:image/png;base64,AAAA"),
        AssetSource::Data(_)
    ));
    assert_eq!(
        AssetSource::parse("frames/phone.png"),
        AssetSource::Path(PathBuf::from("frames/phone.png"))
    );
}

#[test]
fn data_uri_base64_and_plain_payloads() {
    assert_eq!(
        decode_data_uri("data:text/plain;base64,aGVsbG8=").unwrap(),
        b"hello"
    );
    assert_eq!(
        decode_data_uri("data:image/svg+xml,<svg/>").unwrap(),
        b"<svg/>"
    );
    assert!(decode_data_uri("data:image/png;base64").is_err());
    assert!(decode_data_uri("data:image/png;base64,@@@").is_err());
    assert!(decode_data_uri("file:x").is_err());
}

#[test]
fn bare_base64_becomes_bytes() {
    let src = AssetSource::from_base64("aGVsbG8=").unwrap();
    assert_eq!(src, AssetSource::Bytes(Arc::new(b"hello".to_vec())));
    assert!(AssetSource::from_base64("not base64!").is_err());
}

#[test]
fn cache_keys_distinguish_content() {
    let a = AssetSource::Bytes(Arc::new(vec![1, 2, 3]));
    let b = AssetSource::Bytes(Arc::new(vec![1, 2, 4]));
    assert_ne!(a.cache_key(), b.cache_key());
    assert_eq!(a.cache_key(), a.clone().cache_key());
    assert!(AssetSource::parse("a.png").cache_key().starts_with("path:"));
}

#[test]
fn normalize_path_slash_normalization() {
    assert_eq!(normalize_rel_path("a/b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("./a//b.png").unwrap(), "a/b.png");
    assert!(normalize_rel_path("../x.png").is_err());
    assert!(normalize_rel_path("./").is_err());
}

#[tokio::test]
async fn default_fetcher_reads_relative_files_and_rejects_traversal() {
    let dir = std::env::temp_dir().join(format!("shotframe-fetch-{}", std::process::id()));
    std::fs::create_dir_all(dir.join("shots")).unwrap();
    std::fs::write(dir.join("shots/a.bin"), [7u8, 8, 9]).unwrap();

    let fetcher = DefaultFetcher::new(&dir);
    let bytes = fetcher
        .fetch(&AssetSource::parse("shots/a.bin"))
        .await
        .unwrap();
    assert_eq!(bytes, vec![7, 8, 9]);

    assert!(
        fetcher
            .fetch(&AssetSource::parse("../escape.bin"))
            .await
            .is_err()
    );
    let missing = fetcher
        .fetch(&AssetSource::parse("shots/missing.bin"))
        .await
        .unwrap_err();
    assert!(missing.to_string().contains("fetch error:"));
}

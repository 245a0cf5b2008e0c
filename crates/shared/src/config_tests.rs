use super::*;
use rstest::rstest;

#[test]
fn test_load_defaults() {
    temp_env::with_vars_unset(
        [
            "KABOX__SERVER__PORT",
            "KABOX__SERVER__PUBLIC_BASE_URL",
            "KABOX__STORAGE__BACKEND",
            "KABOX__UPLOAD__MAX_FILES",
        ],
        || {
            let config = AppConfig::load().expect("defaults should load");
            assert_eq!(config.server.host, "0.0.0.0");
            assert_eq!(config.server.port, 5000);
            assert_eq!(config.server.public_base_url(), None);
            assert_eq!(config.storage.backend, StorageBackend::Fs);
            assert_eq!(config.storage.bucket, "kabox-files");
            assert_eq!(config.upload.max_files, 3);
            assert_eq!(config.upload.max_file_size, 50 * 1024 * 1024);
            assert_eq!(config.upload.fetch_timeout_secs, None);
        },
    );
}

#[test]
fn test_load_from_environment() {
    temp_env::with_vars(
        [
            ("KABOX__SERVER__PORT", Some("8081")),
            ("KABOX__SERVER__PUBLIC_BASE_URL", Some("https://files.example.com/")),
            ("KABOX__STORAGE__BACKEND", Some("supabase")),
            ("KABOX__STORAGE__ENDPOINT", Some("https://project.supabase.co")),
            ("KABOX__STORAGE__ACCESS_KEY_ID", Some("supabase-access-key")),
            ("KABOX__UPLOAD__MAX_FILES", Some("5")),
        ],
        || {
            let config = AppConfig::load().expect("env config should load");
            assert_eq!(config.server.port, 8081);
            assert_eq!(
                config.server.public_base_url(),
                Some("https://files.example.com")
            );
            assert_eq!(config.storage.backend, StorageBackend::Supabase);
            assert_eq!(
                config.storage.endpoint.as_deref(),
                Some("https://project.supabase.co")
            );
            assert_eq!(
                config.storage.access_key_id.as_deref(),
                Some("supabase-access-key")
            );
            assert_eq!(config.upload.max_files, 5);
        },
    );
}

#[rstest]
#[case(None, None)]
#[case(Some(""), None)]
#[case(Some("   "), None)]
#[case(Some("https://kabox.example"), Some("https://kabox.example"))]
#[case(Some("https://kabox.example///"), Some("https://kabox.example"))]
fn test_public_base_url_normalization(#[case] raw: Option<&str>, #[case] expected: Option<&str>) {
    let server = ServerConfig {
        public_base_url: raw.map(String::from),
        ..ServerConfig::default()
    };
    assert_eq!(server.public_base_url(), expected);
}

use bitsa_portal::{
    AppConfig, Env,
    config::{AdminSeed, DEFAULT_API_URL},
    error::ConfigError,
};
use serial_test::serial;
use std::{env, panic};

const VARS: [&str; 12] = [
    "APP_ENV",
    "BITSA_API_URL",
    "BITSA_BIND_ADDR",
    "BITSA_DATA_DIR",
    "JWT_SECRET",
    "S3_ENDPOINT",
    "S3_REGION",
    "S3_ACCESS_KEY",
    "S3_SECRET_KEY",
    "S3_BUCKET_NAME",
    "ADMIN_EMAIL",
    "ADMIN_PASSWORD",
];

/// Runs `test` with every config variable cleared except `vars`, then puts the
/// original environment back.
fn run_with_env<T, R>(vars: &[(&'static str, &str)], test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(&str, Option<String>)> =
        VARS.iter().map(|&var| (var, env::var(var).ok())).collect();

    unsafe {
        for var in VARS {
            env::remove_var(var);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }
    }

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals.into_iter().rev() {
        unsafe {
            if let Some(val) = original_value {
                env::set_var(key, val);
            } else {
                env::remove_var(key);
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

#[test]
#[serial]
fn test_app_config_production_fail_fast() {
    let result = run_with_env(
        &[("APP_ENV", "production"), ("BITSA_API_URL", "https://bitsa.example/api")],
        AppConfig::load,
    );
    assert!(matches!(result, Err(ConfigError::Missing("JWT_SECRET"))));

    let result = run_with_env(
        &[("APP_ENV", "production"), ("JWT_SECRET", "prod-secret")],
        AppConfig::load,
    );
    assert!(matches!(result, Err(ConfigError::Missing("BITSA_API_URL"))));
}

#[test]
#[serial]
fn test_app_config_local_env_defaults() {
    let config = run_with_env(&[], AppConfig::load).expect("local config should load");

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.api_url, DEFAULT_API_URL);
    assert_eq!(config.bind_addr.to_string(), "127.0.0.1:5000");
    assert!(!config.jwt_secret.is_empty());
    assert!(config.s3.is_none());
    assert!(config.admin.is_none());
}

#[test]
#[serial]
fn test_app_config_production_with_secrets() {
    let config = run_with_env(
        &[
            ("APP_ENV", "production"),
            ("BITSA_API_URL", "https://bitsa.example/api"),
            ("JWT_SECRET", "prod-secret"),
            ("BITSA_BIND_ADDR", "0.0.0.0:8080"),
        ],
        AppConfig::load,
    )
    .expect("production config should load");

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.api_url, "https://bitsa.example/api");
    assert_eq!(config.jwt_secret, "prod-secret");
    assert_eq!(config.bind_addr.port(), 8080);
}

#[test]
#[serial]
fn test_s3_endpoint_requires_credentials() {
    let result = run_with_env(&[("S3_ENDPOINT", "http://localhost:9000")], AppConfig::load);
    assert!(matches!(result, Err(ConfigError::Missing("S3_ACCESS_KEY"))));

    let config = run_with_env(
        &[
            ("S3_ENDPOINT", "http://localhost:9000"),
            ("S3_ACCESS_KEY", "minio"),
            ("S3_SECRET_KEY", "minio-secret"),
        ],
        AppConfig::load,
    )
    .expect("s3 config should load");
    let s3 = config.s3.expect("s3 settings");
    assert_eq!(s3.region, "us-east-1");
    assert_eq!(s3.bucket, "bitsa-uploads");
}

#[test]
#[serial]
fn test_invalid_bind_addr_is_reported() {
    let result = run_with_env(&[("BITSA_BIND_ADDR", "not-an-address")], AppConfig::load);
    match result {
        Err(ConfigError::Invalid { key, value }) => {
            assert_eq!(key, "BITSA_BIND_ADDR");
            assert_eq!(value, "not-an-address");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
#[serial]
fn test_admin_seed_needs_both_values() {
    let config = run_with_env(&[("ADMIN_EMAIL", "root@bitsa.test")], AppConfig::load).unwrap();
    assert!(config.admin.is_none());

    let config = run_with_env(
        &[("ADMIN_EMAIL", "root@bitsa.test"), ("ADMIN_PASSWORD", "pw")],
        AppConfig::load,
    )
    .unwrap();
    assert_eq!(
        config.admin,
        Some(AdminSeed {
            email: "root@bitsa.test".into(),
            password: "pw".into(),
        })
    );
}

use std::time::Duration;

pub const DEFAULT_SOURCE_URL: &str =
    "https://drive.google.com/file/d/15o23_u56048edFmDE-6vaomGJiT9SB3a/view?usp=sharing";
pub const DEFAULT_SIMPLIFY_TOLERANCE: f64 = 0.01; // raise to ~0.05 for a lighter payload
pub const DEFAULT_SERVER_PORT: u16 = 8050;
pub const DEFAULT_STATIC_DIR: &str = "client/dist";
pub const DEFAULT_UPSTREAM_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS: u64 = 5;

pub const NAME_PROPERTY: &str = "Kab_Kota";
pub const PROVINCE_PROPERTY: &str = "Provinsi_1";

pub fn source_url() -> String {
    std::env::var("PRIORITAS_SOURCE_URL")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string())
}

pub fn simplify_tolerance() -> f64 {
    std::env::var("SIMPLIFY_TOLERANCE")
        .ok()
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite() && *value > 0.0)
        .unwrap_or(DEFAULT_SIMPLIFY_TOLERANCE)
}

pub fn server_port() -> u16 {
    std::env::var("SERVER_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_SERVER_PORT)
}

pub fn static_dir() -> String {
    std::env::var("STATIC_DIR")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string())
}

pub fn upstream_http_timeout() -> Duration {
    std::env::var("UPSTREAM_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_UPSTREAM_HTTP_TIMEOUT_SECS))
}

pub fn upstream_connect_timeout() -> Duration {
    std::env::var("UPSTREAM_CONNECT_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        temp_env::with_vars_unset(
            [
                "PRIORITAS_SOURCE_URL",
                "SIMPLIFY_TOLERANCE",
                "SERVER_PORT",
                "STATIC_DIR",
                "UPSTREAM_HTTP_TIMEOUT_SECS",
                "UPSTREAM_CONNECT_TIMEOUT_SECS",
            ],
            || {
                assert_eq!(source_url(), DEFAULT_SOURCE_URL);
                assert_eq!(simplify_tolerance(), DEFAULT_SIMPLIFY_TOLERANCE);
                assert_eq!(server_port(), DEFAULT_SERVER_PORT);
                assert_eq!(static_dir(), DEFAULT_STATIC_DIR);
                assert_eq!(
                    upstream_http_timeout(),
                    Duration::from_secs(DEFAULT_UPSTREAM_HTTP_TIMEOUT_SECS)
                );
                assert_eq!(
                    upstream_connect_timeout(),
                    Duration::from_secs(DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS)
                );
            },
        );
    }

    #[test]
    fn valid_overrides_are_used() {
        temp_env::with_vars(
            [
                ("PRIORITAS_SOURCE_URL", Some(" http://localhost:9000/kab.geojson ")),
                ("SIMPLIFY_TOLERANCE", Some("0.05")),
                ("SERVER_PORT", Some("3100")),
                ("UPSTREAM_CONNECT_TIMEOUT_SECS", Some("2")),
            ],
            || {
                assert_eq!(source_url(), "http://localhost:9000/kab.geojson");
                assert_eq!(simplify_tolerance(), 0.05);
                assert_eq!(server_port(), 3100);
                assert_eq!(upstream_connect_timeout(), Duration::from_secs(2));
            },
        );
    }

    #[test]
    fn invalid_overrides_fall_back_to_defaults() {
        temp_env::with_vars(
            [
                ("PRIORITAS_SOURCE_URL", Some("   ")),
                ("SIMPLIFY_TOLERANCE", Some("-1")),
                ("SERVER_PORT", Some("0")),
                ("STATIC_DIR", Some("")),
                ("UPSTREAM_HTTP_TIMEOUT_SECS", Some("soon")),
            ],
            || {
                assert_eq!(source_url(), DEFAULT_SOURCE_URL);
                assert_eq!(simplify_tolerance(), DEFAULT_SIMPLIFY_TOLERANCE);
                assert_eq!(server_port(), DEFAULT_SERVER_PORT);
                assert_eq!(static_dir(), DEFAULT_STATIC_DIR);
                assert_eq!(
                    upstream_http_timeout(),
                    Duration::from_secs(DEFAULT_UPSTREAM_HTTP_TIMEOUT_SECS)
                );
            },
        );
    }

    #[test]
    fn non_finite_tolerance_is_rejected() {
        temp_env::with_var("SIMPLIFY_TOLERANCE", Some("NaN"), || {
            assert_eq!(simplify_tolerance(), DEFAULT_SIMPLIFY_TOLERANCE);
        });
    }
}

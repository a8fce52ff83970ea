//! TLS connector setup for the hyper client.
//!
//! # Feature Flags
//!
//! TLS support requires both a crypto provider and root certificates:
//!
//! - **Crypto providers** (choose one):
//!   - `tls-ring` - Use ring crypto (default with `tls` feature)
//!   - `tls-aws-lc` - Use AWS LC crypto
//!
//! - **Root certificates** (choose one):
//!   - `tls-native-roots` - Use system root certificates (default with `tls` feature)
//!   - `tls-webpki-roots` - Use bundled Mozilla root certificates
//!
//! Without a provider feature, a provider installed through
//! `rustls::crypto::CryptoProvider::install_default` is used instead.

#[cfg(any(feature = "tls-native-roots", feature = "tls-webpki-roots"))]
use std::sync::Arc;

use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use rustls::ClientConfig;

use crate::builder::ClientBuildError;

/// Whether a crypto provider and root certificates are both compiled in.
#[inline]
pub const fn has_tls_support() -> bool {
    cfg!(any(feature = "tls-ring", feature = "tls-aws-lc"))
        && cfg!(any(
            feature = "tls-native-roots",
            feature = "tls-webpki-roots"
        ))
}

/// Pick the crypto provider.
///
/// Priority:
/// 1. Feature-gated provider (tls-ring, then tls-aws-lc)
/// 2. User-installed global default provider
#[cfg(any(feature = "tls-native-roots", feature = "tls-webpki-roots"))]
fn crypto_provider() -> Option<Arc<rustls::crypto::CryptoProvider>> {
    #[cfg(feature = "tls-ring")]
    return Some(Arc::new(rustls::crypto::ring::default_provider()));

    #[cfg(all(feature = "tls-aws-lc", not(feature = "tls-ring")))]
    return Some(Arc::new(rustls::crypto::aws_lc_rs::default_provider()));

    #[cfg(not(any(feature = "tls-ring", feature = "tls-aws-lc")))]
    rustls::crypto::CryptoProvider::get_default().cloned()
}

/// Build the default TLS configuration from the enabled features.
#[cfg(any(feature = "tls-native-roots", feature = "tls-webpki-roots"))]
pub fn default_tls_config() -> Result<ClientConfig, ClientBuildError> {
    let provider = crypto_provider().ok_or_else(|| {
        ClientBuildError::Tls(
            "no crypto provider: enable `tls-ring` or `tls-aws-lc`, \
             or install a default rustls provider"
                .into(),
        )
    })?;

    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| ClientBuildError::Tls(e.to_string()))?
        .with_root_certificates(build_root_store())
        .with_no_client_auth();

    Ok(config)
}

/// Build the root certificate store from enabled features.
#[cfg(any(feature = "tls-native-roots", feature = "tls-webpki-roots"))]
fn build_root_store() -> rustls::RootCertStore {
    let mut roots = rustls::RootCertStore::empty();

    // Native roots win when both are enabled.
    #[cfg(feature = "tls-native-roots")]
    {
        let native_certs = rustls_native_certs::load_native_certs();
        if !native_certs.errors.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::debug!(errors = ?native_certs.errors, "errors loading native certs");
        }
        let (added, ignored) = roots.add_parsable_certificates(native_certs.certs);
        #[cfg(feature = "tracing")]
        tracing::debug!(added, ignored, "loaded native root certificates");
        #[cfg(not(feature = "tracing"))]
        let _ = (added, ignored);
    }

    #[cfg(all(feature = "tls-webpki-roots", not(feature = "tls-native-roots")))]
    {
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    }

    roots
}

#[cfg(any(feature = "tls-native-roots", feature = "tls-webpki-roots"))]
fn fallback_tls_config() -> Result<ClientConfig, ClientBuildError> {
    default_tls_config()
}

#[cfg(not(any(feature = "tls-native-roots", feature = "tls-webpki-roots")))]
fn fallback_tls_config() -> Result<ClientConfig, ClientBuildError> {
    Err(ClientBuildError::Tls(
        "no root certificates: enable `tls-native-roots` or `tls-webpki-roots`, \
         or pass a TLS config to the builder"
            .into(),
    ))
}

/// Build a connector that speaks plain HTTP and HTTPS.
///
/// Without an explicit `tls_config` the default configuration is built from
/// the enabled features.
pub fn build_https_connector(
    tls_config: Option<ClientConfig>,
) -> Result<HttpsConnector<HttpConnector>, ClientBuildError> {
    let config = match tls_config {
        Some(config) => config,
        None => fallback_tls_config()?,
    };

    Ok(HttpsConnectorBuilder::new()
        .with_tls_config(config)
        .https_or_http()
        .enable_all_versions()
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_tls_support_matches_features() {
        let expected = cfg!(any(feature = "tls-ring", feature = "tls-aws-lc"))
            && cfg!(any(
                feature = "tls-native-roots",
                feature = "tls-webpki-roots"
            ));
        assert_eq!(has_tls_support(), expected);
    }

    #[cfg(all(feature = "tls-ring", feature = "tls-native-roots"))]
    #[test]
    fn test_default_tls_config() {
        let config = default_tls_config().unwrap();
        assert!(config.alpn_protocols.is_empty());
    }

    #[cfg(all(feature = "tls-ring", feature = "tls-native-roots"))]
    #[test]
    fn test_build_default_connector() {
        assert!(build_https_connector(None).is_ok());
    }
}

//! OAuth 1.0a request signing (HMAC-SHA1).

use avatrope_types::{credentials::Credentials, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha1::Sha1;
use url::Url;
use uuid::Uuid;

use crate::upload_error;

type HmacSha1 = Hmac<Sha1>;

/// Everything except RFC 3986 unreserved characters.
const OAUTH_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";
pub const OAUTH_VERSION: &str = "1.0";

pub fn percent_encode(value: &str) -> String {
    utf8_percent_encode(value, OAUTH_ENCODE).to_string()
}

/// Per-request values that make a signature unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nonce {
    pub nonce: String,
    pub timestamp: i64,
}

impl Nonce {
    pub fn fresh() -> Self {
        Self {
            nonce: Uuid::new_v4().simple().to_string(),
            timestamp: Utc::now().timestamp(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OAuthSigner {
    credentials: Credentials,
}

impl OAuthSigner {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// `Authorization` header value for a request.
    ///
    /// `params` are the form-encoded body parameters; multipart payloads
    /// contribute nothing and should pass an empty slice.
    pub fn authorization(
        &self,
        method: &str,
        url: &Url,
        params: &[(String, String)],
    ) -> Result<String> {
        self.authorization_with(method, url, params, &Nonce::fresh())
    }

    pub fn authorization_with(
        &self,
        method: &str,
        url: &Url,
        params: &[(String, String)],
        nonce: &Nonce,
    ) -> Result<String> {
        let mut oauth = self.protocol_params(nonce);
        let mut signed = oauth.clone();
        signed.extend(params.iter().cloned());

        let base = signature_base_string(method, url, &signed);
        let signature = sign(
            &base,
            &self.credentials.consumer_secret,
            &self.credentials.token_secret,
        )?;
        oauth.push(("oauth_signature".into(), signature));
        oauth.sort();

        let fields: Vec<String> = oauth
            .iter()
            .map(|(key, value)| format!("{}=\"{}\"", percent_encode(key), percent_encode(value)))
            .collect();
        Ok(format!("OAuth {}", fields.join(", ")))
    }

    fn protocol_params(&self, nonce: &Nonce) -> Vec<(String, String)> {
        vec![
            ("oauth_consumer_key".into(), self.credentials.consumer_key.clone()),
            ("oauth_nonce".into(), nonce.nonce.clone()),
            ("oauth_signature_method".into(), SIGNATURE_METHOD.into()),
            ("oauth_timestamp".into(), nonce.timestamp.to_string()),
            ("oauth_token".into(), self.credentials.token.clone()),
            ("oauth_version".into(), OAUTH_VERSION.into()),
        ]
    }
}

/// Scheme, host, non-default port and path; query and fragment dropped.
pub fn base_string_uri(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    let port = url.port().map(|p| format!(":{p}")).unwrap_or_default();
    format!("{}://{}{}{}", url.scheme(), host, port, url.path())
}

/// Signature base string; query parameters on `url` are folded in.
pub fn signature_base_string(method: &str, url: &Url, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .chain(
            url.query_pairs()
                .map(|(k, v)| (percent_encode(&k), percent_encode(&v))),
        )
        .collect();
    encoded.sort();

    let normalized: Vec<String> = encoded.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        percent_encode(&base_string_uri(url)),
        percent_encode(&normalized.join("&"))
    )
}

pub fn sign(base: &str, consumer_secret: &str, token_secret: &str) -> Result<String> {
    let key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    );
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|err| upload_error(format!("invalid signing key: {err}")))?;
    mac.update(base.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_signer() -> OAuthSigner {
        OAuthSigner::new(Credentials {
            consumer_key: "xvz1evFS4wEEPTGEFPHBog".into(),
            consumer_secret: "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw".into(),
            token: "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb".into(),
            token_secret: "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE".into(),
        })
    }

    fn reference_nonce() -> Nonce {
        Nonce {
            nonce: "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg".into(),
            timestamp: 1_318_622_958,
        }
    }

    fn reference_url() -> Url {
        Url::parse("https://api.twitter.com/1.1/statuses/update.json?include_entities=true").unwrap()
    }

    fn status_param() -> Vec<(String, String)> {
        vec![(
            "status".into(),
            "Hello Ladies + Gentlemen, a signed OAuth request!".into(),
        )]
    }

    #[test]
    fn percent_encoding_keeps_unreserved() {
        assert_eq!(percent_encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
        assert_eq!(percent_encode("a-b.c_d~e"), "a-b.c_d~e");
        assert_eq!(percent_encode("☃"), "%E2%98%83");
    }

    #[test]
    fn base_string_matches_reference_vector() {
        let signer = reference_signer();
        let mut params = signer.protocol_params(&reference_nonce());
        params.extend(status_param());
        let base = signature_base_string("post", &reference_url(), &params);
        assert_eq!(
            base,
            "POST&https%3A%2F%2Fapi.twitter.com%2F1.1%2Fstatuses%2Fupdate.json&\
             include_entities%3Dtrue%26oauth_consumer_key%3Dxvz1evFS4wEEPTGEFPHBog%26\
             oauth_nonce%3DkYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg%26\
             oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1318622958%26\
             oauth_token%3D370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb%26\
             oauth_version%3D1.0%26status%3DHello%2520Ladies%2520%252B%2520Gentlemen\
             %252C%2520a%2520signed%2520OAuth%2520request%2521"
        );
    }

    #[test]
    fn signature_matches_reference_vector() {
        let header = reference_signer()
            .authorization_with("POST", &reference_url(), &status_param(), &reference_nonce())
            .expect("sign");
        assert!(header.starts_with("OAuth oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\""));
        assert!(header.contains("oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\""));
        assert!(header.contains("oauth_version=\"1.0\""));
    }

    #[test]
    fn base_uri_drops_default_port_and_query() {
        let url = Url::parse("HTTPS://Example.COM:443/a/b?x=1#frag").unwrap();
        assert_eq!(base_string_uri(&url), "https://example.com/a/b");
        let url = Url::parse("http://example.com:8080/").unwrap();
        assert_eq!(base_string_uri(&url), "http://example.com:8080/");
    }

    #[test]
    fn fresh_nonces_differ() {
        assert_ne!(Nonce::fresh().nonce, Nonce::fresh().nonce);
    }
}

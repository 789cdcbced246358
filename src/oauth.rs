//! OAuth 1.0a request signing (HMAC-SHA1)
//! ref: <https://developer.twitter.com/en/docs/authentication/oauth-1-0a/creating-a-signature>
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use url::Url;
use uuid::Uuid;

use crate::credentials::TwitterCredentials;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";

/// Signs requests on behalf of a single app + user credential pair
pub struct OAuthSigner {
    credentials: TwitterCredentials,
}

impl OAuthSigner {
    pub fn new(credentials: TwitterCredentials) -> Self {
        OAuthSigner { credentials }
    }

    pub fn consumer_key(&self) -> &str {
        &self.credentials.consumer_key
    }

    /// Build the `Authorization` header value for the request
    /// * method: HTTP method e.g. `GET`
    /// * url: request target, its query pairs are part of the signature
    pub fn authorization_header(&self, method: &str, url: &Url) -> Result<String> {
        let nonce = Uuid::new_v4().simple().to_string();
        let timestamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
        Ok(self.authorization_header_with(method, url, &nonce, timestamp))
    }

    fn authorization_header_with(
        &self,
        method: &str,
        url: &Url,
        nonce: &str,
        timestamp: u64,
    ) -> String {
        let timestamp = timestamp.to_string();
        let oauth_params = self.oauth_params(nonce, &timestamp);
        let signature = self.sign(&signature_base_string(method, url, &oauth_params));

        let mut header_params = oauth_params;
        header_params.push(("oauth_signature", signature.as_str()));
        header_params.sort();
        let joined = header_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("OAuth {}", joined)
    }

    fn oauth_params<'a>(&'a self, nonce: &'a str, timestamp: &'a str) -> Vec<(&'a str, &'a str)> {
        vec![
            ("oauth_consumer_key", self.credentials.consumer_key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", SIGNATURE_METHOD),
            ("oauth_timestamp", timestamp),
            ("oauth_token", self.credentials.access_token.as_str()),
            ("oauth_version", OAUTH_VERSION),
        ]
    }

    fn sign(&self, base_string: &str) -> String {
        let signing_key = format!(
            "{}&{}",
            encode(&self.credentials.consumer_secret),
            encode(&self.credentials.access_token_secret)
        );
        let digest = hmacsha1::hmac_sha1(signing_key.as_bytes(), base_string.as_bytes());
        base64::encode(digest)
    }
}

/// `METHOD&enc(base_url)&enc(sorted params)`
fn signature_base_string(method: &str, url: &Url, oauth_params: &[(&str, &str)]) -> String {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (encode(&k), encode(&v)))
        .chain(oauth_params.iter().map(|(k, v)| (encode(k), encode(v))))
        .collect();
    params.sort();
    let param_string = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut base_url = url.clone();
    base_url.set_query(None);
    base_url.set_fragment(None);

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        encode(base_url.as_str()),
        encode(&param_string)
    )
}

// RFC 3986 unreserved characters stay as they are
fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

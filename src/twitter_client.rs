//! Twitter API Client
//! It calls the v1.1 REST APIs and signs every request with OAuth1
//! Define it as trait and implement it for the testability(using mock)
use std::io::Read;
use std::time::Duration;

use anyhow::Result;
use log::debug;
use serde::de::DeserializeOwned;
use url::Url;

use crate::credentials::TwitterCredentials;
use crate::error::ApiError;
use crate::oauth::OAuthSigner;
use crate::twitter_object::{FriendsPage, Status, User};

const API_SERVER: &str = "https://api.twitter.com";

/// Twitter Client
/// It needs to know the endpoint and the credentials used to sign the requests
pub struct TwitterClient {
    agent: ureq::Agent,
    server: Url,
    signer: OAuthSigner,
}

#[cfg(test)]
use mockall::automock;
#[cfg_attr(test, automock)]
pub trait TwitterClientTrait {
    fn verify_credentials(&self) -> Result<User, ApiError>;
    fn fetch_timeline_page(
        &self,
        screen_name: &str,
        count: usize,
        max_id: Option<u64>,
    ) -> Result<Vec<Status>, ApiError>;
    fn fetch_friends(&self, screen_name: &str, count: usize) -> Result<Vec<User>, ApiError>;
}

impl TwitterClient {
    /// Constructs new Twitter Client
    /// * credentials: consumer key/secret and access token/secret.
    ///   Nothing is sent until the first call, use [`TwitterClientTrait::verify_credentials()`]
    ///   to check them against the server
    pub fn new(credentials: TwitterCredentials) -> Result<Self> {
        let server = Url::parse(API_SERVER)?;
        let agent: ureq::Agent = ureq::AgentBuilder::new()
            .timeout_read(Duration::from_secs(5))
            .timeout_write(Duration::from_secs(5))
            .build();

        Ok(TwitterClient {
            agent,
            server,
            signer: OAuthSigner::new(credentials),
        })
    }

    /// Signed GET request, the body is decoded as `T`
    /// * path: endpoint path relative to the server
    /// * query: query params, they are part of the signature
    /// * subject: screen name the request is about, used for error reporting
    fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        subject: &str,
    ) -> Result<T, ApiError> {
        let mut url = self
            .server
            .join(path)
            .map_err(|e| ApiError::Network(e.to_string()))?;
        url.query_pairs_mut()
            .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));

        let authorization = self
            .signer
            .authorization_header("GET", &url)
            .map_err(|e| ApiError::Network(e.to_string()))?;

        debug!("GET {}", url);
        let response = self
            .agent
            .request_url("GET", &url)
            .set("Authorization", &authorization)
            .call();

        match response {
            Ok(res) => res
                .into_json()
                .map_err(|e| ApiError::Decode(format!("{} {}: {}", path, subject, e))),
            Err(ureq::Error::Status(status, res)) => {
                let reset = res.header("x-rate-limit-reset").map(str::to_string);
                let mut body = String::new();
                // The body only refines the classification, a broken one is not fatal
                let _ = res.into_reader().take(64 * 1024).read_to_string(&mut body);
                Err(ApiError::from_response(
                    status,
                    &body,
                    subject,
                    reset.as_deref(),
                ))
            }
            Err(ureq::Error::Transport(transport)) => Err(transport.into()),
        }
    }
}

impl TwitterClientTrait for TwitterClient {
    /// Check the credentials and return the authenticated user
    fn verify_credentials(&self) -> Result<User, ApiError> {
        self.get(
            "1.1/account/verify_credentials.json",
            &[("skip_status", "true".to_string())],
            self.signer.consumer_key(),
        )
        .map_err(ApiError::about_credentials)
    }

    /// Retrieve one page of the user's timeline, newest first
    /// * screen_name: target user
    /// * count: page size, the server may return fewer
    /// * max_id: only statuses with an id lower or equal to this, for paging backwards
    fn fetch_timeline_page(
        &self,
        screen_name: &str,
        count: usize,
        max_id: Option<u64>,
    ) -> Result<Vec<Status>, ApiError> {
        let mut query = vec![
            ("screen_name", screen_name.to_string()),
            ("count", count.to_string()),
        ];
        if let Some(max_id) = max_id {
            query.push(("max_id", max_id.to_string()));
        }
        let statuses: Vec<Status> =
            self.get("1.1/statuses/user_timeline.json", &query, screen_name)?;
        debug!("Got: {} statuses for {}", statuses.len(), screen_name);
        Ok(statuses)
    }

    /// Retrieve the accounts the user follows, a single page only
    /// * screen_name: target user
    /// * count: page size, 200 at most on the server side
    fn fetch_friends(&self, screen_name: &str, count: usize) -> Result<Vec<User>, ApiError> {
        let query = [
            ("screen_name", screen_name.to_string()),
            ("count", count.to_string()),
            ("skip_status", "true".to_string()),
            ("include_user_entities", "false".to_string()),
        ];
        let page: FriendsPage = self.get("1.1/friends/list.json", &query, screen_name)?;
        debug!(
            "Got: {} friends for {} (next_cursor={})",
            page.users.len(),
            screen_name,
            page.next_cursor
        );
        Ok(page.users)
    }
}

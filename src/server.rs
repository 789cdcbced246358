//! HTTP front end
//!
//! Routes:
//! * `GET /favicon.ico`: the icon given at startup, or an empty body
//! * `GET /following/<name>`: accounts `<name>` follows, most followed first
//! * `GET /<name>`: the latest tweets of `<name>` colored by sentiment
//!
//! Requests are handled one after the other on the accept loop. The Twitter
//! Client is authenticated once before the loop starts and only borrowed here.
use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{anyhow, Result};
use log::{debug, error, info, warn};

use crate::color::{add_color, Gradient};
use crate::error::ApiError;
use crate::rate_limit::RateLimits;
use crate::render::{Renderer, TimelineView};
use crate::tweetie::{self, MAX_TWEETS, TIMELINE_PAGE_SIZE};
use crate::twitter_client::TwitterClientTrait;

const HTML: &str = "text/html; charset=utf-8";
const ICON: &str = "image/x-icon";
const TEXT: &str = "text/plain; charset=utf-8";

/// A response before it is handed to the HTTP server
#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    pub retry_after: Option<u64>,
}

impl Reply {
    fn new(status: u16, content_type: &'static str, body: Vec<u8>) -> Self {
        Reply {
            status,
            content_type,
            body,
            retry_after: None,
        }
    }

    fn html(body: String) -> Self {
        Reply::new(200, HTML, body.into_bytes())
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Route {
    Favicon,
    Tweets(String),
    Following(String),
    NotFound,
}

fn route(url: &str) -> Route {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    let decode = |segment: &str| {
        urlencoding::decode(segment)
            .ok()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
    };
    match segments.as_slice() {
        ["favicon.ico"] => Route::Favicon,
        ["following", name] => decode(*name).map_or(Route::NotFound, Route::Following),
        [name] => decode(*name).map_or(Route::NotFound, Route::Tweets),
        _ => Route::NotFound,
    }
}

/// The pages and everything they share between requests
pub struct App<C> {
    tw_client: C,
    renderer: Renderer,
    gradient: Gradient,
    limits: RateLimits,
    favicon: Option<Vec<u8>>,
}

impl<C: TwitterClientTrait> App<C> {
    /// * tw_client: authenticated Twitter Client
    /// * favicon: icon file, a missing one only means an empty `/favicon.ico`
    pub fn new(tw_client: C, favicon: Option<&Path>) -> Result<Self> {
        let favicon = favicon.and_then(|path| match fs::read(path) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!("Failed to read favicon {}: {}", path.display(), e);
                None
            }
        });
        Ok(App {
            tw_client,
            renderer: Renderer::new()?,
            gradient: Gradient::red_to_green(),
            limits: RateLimits::default(),
            favicon,
        })
    }

    /// Route and answer a single request, errors are turned into error pages
    pub fn handle(&mut self, method: &str, url: &str) -> Reply {
        if !method.eq_ignore_ascii_case("GET") {
            let detail = format!("{} is not supported", method);
            return self.error_page(405, "Method not allowed", &detail);
        }
        let result = match route(url) {
            Route::Favicon => Ok(self.favicon()),
            Route::Tweets(name) => self.tweets(&name),
            Route::Following(name) => self.following(&name),
            Route::NotFound => {
                return self.error_page(404, "Not found", &format!("Nothing lives at {}", url))
            }
        };
        match result {
            Ok(reply) => reply,
            Err(e) => self.failure_page(e),
        }
    }

    fn favicon(&self) -> Reply {
        match &self.favicon {
            Some(bytes) => Reply::new(200, ICON, bytes.clone()),
            None => Reply::new(204, ICON, Vec::new()),
        }
    }

    fn tweets(&mut self, name: &str) -> Result<Reply> {
        // Worst case number of user_timeline calls for one page
        let cost = MAX_TWEETS.div_ceil(TIMELINE_PAGE_SIZE) as u32;
        self.limits
            .timeline
            .try_acquire(cost, Instant::now())
            .map_err(|wait| ApiError::RateLimited {
                retry_after: Some(wait.as_secs()),
            })?;

        let timeline = tweetie::fetch_tweets(&self.tw_client, name)?;
        let median = tweetie::median_score(&timeline.tweets);
        let view = TimelineView {
            user: &timeline.user,
            count: timeline.count,
            tweets: add_color(&self.gradient, &timeline.tweets),
        };
        Ok(Reply::html(self.renderer.tweets(&view, median)?))
    }

    fn following(&mut self, name: &str) -> Result<Reply> {
        self.limits
            .friends
            .try_acquire(1, Instant::now())
            .map_err(|wait| ApiError::RateLimited {
                retry_after: Some(wait.as_secs()),
            })?;

        debug!(
            "friends/list requests left in this window: {}",
            self.limits.friends.remaining()
        );

        let mut followers = tweetie::fetch_following(&self.tw_client, name)?;
        tweetie::sort_by_followers(&mut followers);
        Ok(Reply::html(self.renderer.following(&followers, name)?))
    }

    fn failure_page(&self, e: anyhow::Error) -> Reply {
        let (status, title, retry_after) = match e.downcast_ref::<ApiError>() {
            Some(ApiError::NotFound(_)) => (404, "No such user", None),
            Some(ApiError::RateLimited { retry_after }) => {
                (429, "Twitter rate limit reached, try again later", *retry_after)
            }
            Some(ApiError::NotAuthorized(_)) => (403, "Not authorized to view this user", None),
            Some(ApiError::Auth(_)) => (502, "Twitter rejected our credentials", None),
            Some(_) => (502, "Twitter request failed", None),
            None => (500, "Internal error", None),
        };
        if status >= 500 {
            error!("{}: {:#}", title, e);
        } else {
            info!("{}: {}", title, e);
        }
        let mut reply = self.error_page(status, title, &e.to_string());
        reply.retry_after = retry_after;
        reply
    }

    fn error_page(&self, status: u16, title: &str, detail: &str) -> Reply {
        match self.renderer.error(status, title, detail) {
            Ok(body) => Reply::new(status, HTML, body.into_bytes()),
            Err(e) => {
                error!("Failed to render the error page: {:#}", e);
                Reply::new(status, TEXT, format!("{}\n", title).into_bytes())
            }
        }
    }
}

/// Serve requests until the listener is closed
/// * app: pages with the authenticated client
/// * bind: address to listen on, e.g. `127.0.0.1:5000`
pub fn serve<C: TwitterClientTrait>(mut app: App<C>, bind: &str) -> Result<()> {
    let server = tiny_http::Server::http(bind)
        .map_err(|e| anyhow!("Failed to listen on {}: {}", bind, e))?;
    info!("Listening on http://{}", bind);

    for request in server.incoming_requests() {
        let method = request.method().to_string();
        let url = request.url().to_string();
        let reply = app.handle(&method, &url);
        info!("{} {} -> {}", method, url, reply.status);

        let mut response = tiny_http::Response::from_data(reply.body)
            .with_status_code(reply.status)
            .with_header(header("Content-Type", reply.content_type)?);
        if let Some(secs) = reply.retry_after {
            response = response.with_header(header("Retry-After", &secs.to_string())?);
        }
        if let Err(e) = request.respond(response) {
            warn!("Failed to answer {} {}: {}", method, url, e);
        }
    }
    Ok(())
}

fn header(name: &str, value: &str) -> Result<tiny_http::Header> {
    tiny_http::Header::from_bytes(name.as_bytes(), value.as_bytes())
        .map_err(|_| anyhow!("Invalid header {}: {}", name, value))
}

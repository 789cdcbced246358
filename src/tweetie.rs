//! App module and interface between the pages/CLI and the Twitter Client
//! pub methods are expected to call from [`crate::server`] and `main`
use std::path::Path;

use anyhow::{Context, Result};
use chrono::DateTime;
use log::{debug, info};
use serde::Serialize;
use vader_sentiment::SentimentIntensityAnalyzer;

use crate::credentials::load_credentials;
use crate::error::ApiError;
use crate::twitter_client::{TwitterClient, TwitterClientTrait};
use crate::twitter_object::{Status, User};

pub const MAX_TWEETS: usize = 100;
pub const MAX_FOLLOWING: usize = 100;
/// Statuses per `user_timeline` request
pub const TIMELINE_PAGE_SIZE: usize = 20;

const TWITTER_DATE_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tweet {
    pub id: u64,
    /// As provided by the API, e.g. `Wed Oct 10 20:19:24 +0000 2018`
    pub created: String,
    pub retweet_count: u64,
    pub text: String,
    pub hashtags: Vec<String>,
    pub urls: Vec<String>,
    pub mentions: Vec<String>,
    /// VADER compound polarity, -1.0 (negative) to 1.0 (positive)
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    pub user: String,
    pub count: usize,
    pub tweets: Vec<Tweet>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FollowedAccount {
    pub name: String,
    pub screen_name: String,
    pub followers: u64,
    /// `YYYY-MM-DD`
    pub created: String,
    pub image: String,
}

/// Load the credentials and verify them with the server
///
/// The returned client is created once and shared by every request afterwards
/// * credentials_path: CSV file with the four keys/tokens
pub fn authenticate(credentials_path: &Path) -> Result<TwitterClient> {
    let credentials = load_credentials(credentials_path)?;
    let tw_client = TwitterClient::new(credentials)?;
    let user = tw_client
        .verify_credentials()
        .context("Twitter rejected the credentials")?;
    info!("Authenticated as @{}", user.screen_name);
    Ok(tw_client)
}

/// Fetch the most recent tweets of the user with their sentiment score
///
/// Pages backwards with `max_id` until [`MAX_TWEETS`] are collected or the timeline ends.
/// A single analyzer is built per call and shared by all the tweets.
/// * tw_client: authenticated Twitter Client
/// * name: screen name
pub fn fetch_tweets(
    tw_client: &impl TwitterClientTrait,
    name: &str,
) -> Result<Timeline, ApiError> {
    let analyzer = SentimentIntensityAnalyzer::new();
    let mut tweets: Vec<Tweet> = Vec::with_capacity(MAX_TWEETS);
    let mut max_id: Option<u64> = None;

    while tweets.len() < MAX_TWEETS {
        let remaining = MAX_TWEETS - tweets.len();
        let page =
            tw_client.fetch_timeline_page(name, remaining.min(TIMELINE_PAGE_SIZE), max_id)?;
        // Statuses above max_id were collected already, a repeated page adds nothing
        let fresh: Vec<Status> = page
            .into_iter()
            .filter(|status| max_id.map_or(true, |max| status.id <= max))
            .take(remaining)
            .collect();
        let oldest = match fresh.iter().map(|status| status.id).min() {
            Some(id) => id,
            None => break,
        };
        tweets.extend(fresh.into_iter().map(|status| to_tweet(&analyzer, status)));
        match oldest.checked_sub(1) {
            Some(next) => max_id = Some(next),
            None => break,
        }
    }

    debug!("Fetched {} tweets for {}", tweets.len(), name);
    Ok(Timeline {
        user: name.to_string(),
        count: tweets.len(),
        tweets,
    })
}

fn to_tweet(analyzer: &SentimentIntensityAnalyzer, status: Status) -> Tweet {
    let score = analyzer
        .polarity_scores(&status.text)
        .get("compound")
        .copied()
        .unwrap_or(0.0);
    let entities = status.entities;
    Tweet {
        id: status.id,
        created: status.created_at,
        retweet_count: status.retweet_count,
        hashtags: entities.hashtags.into_iter().map(|h| h.text).collect(),
        urls: entities.urls.into_iter().map(|u| u.url).collect(),
        mentions: entities
            .user_mentions
            .into_iter()
            .map(|m| m.screen_name)
            .collect(),
        text: status.text,
        score,
    }
}

/// Fetch the accounts followed by the user, a single page of [`MAX_FOLLOWING`] at most
/// * tw_client: authenticated Twitter Client
/// * name: screen name
pub fn fetch_following(
    tw_client: &impl TwitterClientTrait,
    name: &str,
) -> Result<Vec<FollowedAccount>, ApiError> {
    let users = tw_client.fetch_friends(name, MAX_FOLLOWING)?;
    debug!("Fetched {} followed accounts for {}", users.len(), name);
    users
        .into_iter()
        .take(MAX_FOLLOWING)
        .map(to_followed_account)
        .collect()
}

fn to_followed_account(user: User) -> Result<FollowedAccount, ApiError> {
    let created = DateTime::parse_from_str(&user.created_at, TWITTER_DATE_FORMAT)
        .map_err(|e| {
            ApiError::Decode(format!(
                "created_at {:?} of @{}: {}",
                user.created_at, user.screen_name, e
            ))
        })?
        .format("%Y-%m-%d")
        .to_string();
    Ok(FollowedAccount {
        name: user.name,
        screen_name: user.screen_name,
        followers: user.followers_count,
        created,
        image: user.profile_image_url,
    })
}

/// Most followed first, accounts with the same count keep their order
pub fn sort_by_followers(accounts: &mut [FollowedAccount]) {
    accounts.sort_by(|a, b| b.followers.cmp(&a.followers));
}

/// Median of the sentiment scores, `None` when there is no tweet
pub fn median_score(tweets: &[Tweet]) -> Option<f64> {
    let mut scores: Vec<f64> = tweets.iter().map(|t| t.score).collect();
    if scores.is_empty() {
        return None;
    }
    scores.sort_by(|a, b| a.total_cmp(b));
    let mid = scores.len() / 2;
    if scores.len() % 2 == 0 {
        Some((scores[mid - 1] + scores[mid]) / 2.0)
    } else {
        Some(scores[mid])
    }
}

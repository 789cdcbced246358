//! HTML pages, rendered with tera
//! The templates are compiled into the binary, see `templates/`
use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

use crate::color::ColoredTweet;
use crate::tweetie::FollowedAccount;

const TEMPLATES: [(&str, &str); 4] = [
    ("base.html", include_str!("../templates/base.html")),
    ("tweets.html", include_str!("../templates/tweets.html")),
    ("following.html", include_str!("../templates/following.html")),
    ("error.html", include_str!("../templates/error.html")),
];

/// Shown in place of the median when there is no tweet to score
pub const NO_SCORE: &str = "n/a";

/// What the tweets page sees as `record`
#[derive(Serialize)]
pub struct TimelineView<'a> {
    pub user: &'a str,
    pub count: usize,
    pub tweets: Vec<ColoredTweet<'a>>,
}

pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.to_vec())?;
        Ok(Renderer { tera })
    }

    pub fn tweets(&self, record: &TimelineView<'_>, median: Option<f64>) -> Result<String> {
        let mut context = Context::new();
        context.insert("record", record);
        context.insert("median", &format_median(median));
        Ok(self.tera.render("tweets.html", &context)?)
    }

    pub fn following(&self, followers: &[FollowedAccount], name: &str) -> Result<String> {
        let mut context = Context::new();
        context.insert("followers", followers);
        context.insert("name", name);
        Ok(self.tera.render("following.html", &context)?)
    }

    pub fn error(&self, status: u16, title: &str, detail: &str) -> Result<String> {
        let mut context = Context::new();
        context.insert("status", &status);
        context.insert("title", title);
        context.insert("detail", detail);
        Ok(self.tera.render("error.html", &context)?)
    }
}

fn format_median(median: Option<f64>) -> String {
    match median {
        Some(score) => format!("{:.3}", score),
        None => NO_SCORE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{add_color, Gradient};
    use crate::tweetie::Tweet;

    fn tweet(text: &str, score: f64) -> Tweet {
        Tweet {
            id: 7,
            created: "Wed Oct 10 20:19:24 +0000 2018".to_string(),
            retweet_count: 2,
            text: text.to_string(),
            hashtags: vec!["rust".to_string()],
            urls: vec![],
            mentions: vec!["rustlang".to_string()],
            score,
        }
    }

    #[test]
    fn tweets_page_shows_colors_and_median() {
        let renderer = Renderer::new().unwrap();
        let tweets = vec![tweet("good <b>day</b>", 1.0)];
        let gradient = Gradient::red_to_green();
        let view = TimelineView {
            user: "parrt",
            count: tweets.len(),
            tweets: add_color(&gradient, &tweets),
        };
        let html = renderer.tweets(&view, Some(1.0)).unwrap();
        assert!(html.contains("@parrt"));
        assert!(html.contains("#008000"));
        assert!(html.contains("1.000"));
        assert!(html.contains("#rust"));
        // text is escaped
        assert!(html.contains("&lt;b&gt;day&lt;"));
    }

    #[test]
    fn tweets_page_without_tweets_has_no_score() {
        let renderer = Renderer::new().unwrap();
        let view = TimelineView {
            user: "quiet",
            count: 0,
            tweets: vec![],
        };
        let html = renderer.tweets(&view, None).unwrap();
        assert!(html.contains(NO_SCORE));
        assert!(html.contains("No tweets."));
    }

    #[test]
    fn following_page_lists_accounts_in_given_order() {
        let renderer = Renderer::new().unwrap();
        let followers = vec![
            FollowedAccount {
                name: "Big".to_string(),
                screen_name: "big".to_string(),
                followers: 50,
                created: "2006-03-21".to_string(),
                image: "http://pbs.twimg.com/big.jpg".to_string(),
            },
            FollowedAccount {
                name: "Small".to_string(),
                screen_name: "small".to_string(),
                followers: 5,
                created: "2010-01-01".to_string(),
                image: "http://pbs.twimg.com/small.jpg".to_string(),
            },
        ];
        let html = renderer.following(&followers, "parrt").unwrap();
        let big = html.find("@big").unwrap();
        let small = html.find("@small").unwrap();
        assert!(big < small);
        assert!(html.contains("2006-03-21"));
        assert!(html.contains("Accounts"));
    }

    #[test]
    fn error_page() {
        let renderer = Renderer::new().unwrap();
        let html = renderer.error(404, "No such user", "nobody").unwrap();
        assert!(html.contains("No such user"));
        assert!(html.contains("nobody"));
    }
}

//! Web front end showing a Twitter user's latest tweets colored by sentiment
//! and the accounts the user follows, most followed first
use env_logger::Env;
use log::info;
use structopt::StructOpt;
mod cli;
mod color;
mod credentials;
mod error;
mod oauth;
mod rate_limit;
mod render;
mod server;
mod tweetie;
mod twitter_client;
mod twitter_object;

use cli::{Action::*, CommandLineArgs};

/// Entrypoint Function
///
/// It will use the following environment variable
/// * `TWEETIE_LOG_LEVEL` Log level setting e.g. `TWEETIE_LOG_LEVEL=tweetie=debug`
///
/// The credentials file is read and checked against Twitter once, before anything is served.
/// A missing or malformed file stops the process.
fn main() -> anyhow::Result<()> {
    let env = Env::default().filter_or("TWEETIE_LOG_LEVEL", "info");
    env_logger::init_from_env(env);

    let CommandLineArgs { action } = CommandLineArgs::from_args();

    match action {
        Serve {
            credentials,
            bind,
            favicon,
        } => {
            let tw_client = tweetie::authenticate(&credentials)?;
            let app = server::App::new(tw_client, favicon.as_deref())?;
            server::serve(app, &bind)
        }
        Tweets { credentials, name } => {
            let tw_client = tweetie::authenticate(&credentials)?;
            let timeline = tweetie::fetch_tweets(&tw_client, &name)?;
            match tweetie::median_score(&timeline.tweets) {
                Some(median) => info!("Median sentiment score: {:.3}", median),
                None => info!("No tweets, no median sentiment score"),
            }
            println!("{}", serde_json::to_string_pretty(&timeline)?);
            Ok(())
        }
        Following { credentials, name } => {
            let tw_client = tweetie::authenticate(&credentials)?;
            let mut followers = tweetie::fetch_following(&tw_client, &name)?;
            tweetie::sort_by_followers(&mut followers);
            println!("{}", serde_json::to_string_pretty(&followers)?);
            Ok(())
        }
    }
}

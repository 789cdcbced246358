//! Definition of CLI commands/sub commands + its option parameters
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "tweetie",
    about = "Tweets colored by sentiment and followed accounts sorted by reach"
)]
pub struct CommandLineArgs {
    #[structopt(subcommand)]
    pub action: Action,
}

#[derive(Debug, StructOpt)]
pub enum Action {
    #[structopt(about = "Serve the tweets and following pages over HTTP")]
    Serve {
        #[structopt(
            parse(from_os_str),
            help = "CSV file with consumer_key,consumer_secret,access_token,access_token_secret"
        )]
        credentials: PathBuf,

        #[structopt(
            short,
            long,
            default_value = "127.0.0.1:5000",
            help = "Address to listen on"
        )]
        bind: String,

        #[structopt(
            parse(from_os_str),
            long,
            help = "Icon served at /favicon.ico, e.g. a 16x16 or 32x32 .png"
        )]
        favicon: Option<PathBuf>,
    },
    #[structopt(
        about = "Fetch the latest tweets of a user with their sentiment score and print them as JSON"
    )]
    Tweets {
        #[structopt(parse(from_os_str), help = "CSV credentials file")]
        credentials: PathBuf,

        #[structopt(help = "Screen name e.g. twitterdev")]
        name: String,
    },
    #[structopt(
        about = "Fetch the accounts a user follows, most followed first, and print them as JSON"
    )]
    Following {
        #[structopt(parse(from_os_str), help = "CSV credentials file")]
        credentials: PathBuf,

        #[structopt(help = "Screen name e.g. twitterdev")]
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_follow_the_serve_marker() {
        let args =
            CommandLineArgs::from_iter_safe(["tweetie", "serve", "/tmp/twitter.csv"]).unwrap();
        match args.action {
            Action::Serve {
                credentials,
                bind,
                favicon,
            } => {
                assert_eq!(credentials, PathBuf::from("/tmp/twitter.csv"));
                assert_eq!(bind, "127.0.0.1:5000");
                assert!(favicon.is_none());
            }
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn serve_without_credentials_fails() {
        assert!(CommandLineArgs::from_iter_safe(["tweetie", "serve"]).is_err());
    }

    #[test]
    fn following_takes_a_name() {
        let args =
            CommandLineArgs::from_iter_safe(["tweetie", "following", "keys.csv", "parrt"]).unwrap();
        assert!(matches!(
            args.action,
            Action::Following { ref name, .. } if name == "parrt"
        ));
    }
}

//! Twitter credentials loading
//! The credentials file is a single CSV line:
//! `consumer_key,consumer_secret,access_token,access_token_secret`
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use thiserror::Error;

const FIELD_NAMES: [&str; 4] = [
    "consumer_key",
    "consumer_secret",
    "access_token",
    "access_token_secret",
];

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to read credentials file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("credentials file {path} is malformed: {reason}")]
    Malformed { path: PathBuf, reason: String },
}

/// App and user side credentials, in the order they appear in the file
#[derive(Clone, PartialEq, Eq)]
pub struct TwitterCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

// Secrets never reach the logs
impl std::fmt::Debug for TwitterCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterCredentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"***")
            .field("access_token", &"***")
            .field("access_token_secret", &"***")
            .finish()
    }
}

/// Load the credentials from the first line of the file
/// * path: path of the CSV credentials file
pub fn load_credentials(path: &Path) -> Result<TwitterCredentials, CredentialError> {
    let io_err = |source| CredentialError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(io_err)?;
    let mut line = String::new();
    BufReader::new(file).read_line(&mut line).map_err(io_err)?;
    debug!("Loaded credentials line from {}", path.display());
    parse_credentials(path, &line)
}

fn parse_credentials(path: &Path, line: &str) -> Result<TwitterCredentials, CredentialError> {
    let fields: Vec<&str> = line.trim().split(',').map(str::trim).collect();
    if fields.len() < FIELD_NAMES.len() {
        return Err(CredentialError::Malformed {
            path: path.to_path_buf(),
            reason: format!(
                "expected {} comma separated fields, found {}",
                FIELD_NAMES.len(),
                fields.len()
            ),
        });
    }
    if fields.len() > FIELD_NAMES.len() {
        warn!(
            "Credentials file {} has {} fields, ignoring everything after {}",
            path.display(),
            fields.len(),
            FIELD_NAMES[3]
        );
    }
    if let Some(pos) = fields[..FIELD_NAMES.len()].iter().position(|f| f.is_empty()) {
        return Err(CredentialError::Malformed {
            path: path.to_path_buf(),
            reason: format!("{} is empty", FIELD_NAMES[pos]),
        });
    }

    Ok(TwitterCredentials {
        consumer_key: fields[0].to_string(),
        consumer_secret: fields[1].to_string(),
        access_token: fields[2].to_string(),
        access_token_secret: fields[3].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn fields(creds: &TwitterCredentials) -> [&str; 4] {
        [
            &creds.consumer_key,
            &creds.consumer_secret,
            &creds.access_token,
            &creds.access_token_secret,
        ]
    }

    fn write_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_four_fields_in_order() {
        let file = write_file("k,s,t,ts\n");
        let creds = load_credentials(file.path()).unwrap();
        assert_eq!(fields(&creds), ["k", "s", "t", "ts"]);
    }

    #[test]
    fn reads_only_the_first_line() {
        let file = write_file("k, s, t, ts\nother,line,is,ignored\n");
        let creds = load_credentials(file.path()).unwrap();
        assert_eq!(fields(&creds), ["k", "s", "t", "ts"]);
    }

    #[test]
    fn too_few_fields_is_malformed() {
        let file = write_file("k,s,t");
        let result = load_credentials(file.path());
        assert!(matches!(result, Err(CredentialError::Malformed { .. })));
    }

    #[test]
    fn empty_field_is_malformed() {
        let file = write_file("k,,t,ts");
        let result = load_credentials(file.path());
        assert!(matches!(result, Err(CredentialError::Malformed { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_credentials(&dir.path().join("twitter.csv"));
        assert!(matches!(result, Err(CredentialError::Io { .. })));
    }

    #[test]
    fn debug_hides_secrets() {
        let file = write_file("key,secret,token,token-secret");
        let creds = load_credentials(file.path()).unwrap();
        let printed = format!("{:?}", creds);
        assert!(printed.contains("key"));
        assert!(!printed.contains("token-secret"));
    }
}

//! Configuration read from the environment, and the fixed parameters of the
//! person operations.

use log::warn;

/// Food appended by the edit-then-save operation
pub const FOOD_TO_ADD: &str = "hamburger";
/// Age assigned by the find-and-update operation
pub const AGE_TO_SET: f64 = 20.0;
/// Name whose records are removed in bulk
pub const NAME_TO_REMOVE: &str = "Mary";
/// Maximum number of records returned by the chained query
pub const QUERY_CHAIN_LIMIT: u64 = 2;

/// Database used when neither the environment nor the connection string name one
pub const DEFAULT_DATABASE: &str = "test";

pub mod env {
    pub const MONGO_URI: &str = "MONGO_URI";
    pub const MONGO_DATABASE: &str = "MONGO_DATABASE";
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("missing environment variable `{0}`")]
    MissingVariable(&'static str),
    #[error("invalid connection string :: {0}")]
    BadConnectionString(#[from] url::ParseError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Configurables {
    /// Connection string of the document database
    pub mongo_uri: String,
    pub database: String,
}

impl Configurables {
    /// Reads the configuration from the process environment.
    ///
    /// Values from a `.env` file must already be loaded at this point.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// The database is taken from `MONGO_DATABASE`, falling back to the path of the
    /// connection string and finally to [`DEFAULT_DATABASE`]. The connection string
    /// is only parsed in the fallback case, so multi-host strings are accepted as long
    /// as `MONGO_DATABASE` is set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let mongo_uri = lookup(env::MONGO_URI)
            .filter(|v| !v.trim().is_empty())
            .ok_or(Error::MissingVariable(env::MONGO_URI))?;

        let database = match lookup(env::MONGO_DATABASE).filter(|v| !v.trim().is_empty()) {
            Some(database) => database,
            None => database_from_uri(&mongo_uri)?.unwrap_or_else(|| {
                warn!(
                    "no database in `{}` nor in the connection string, using `{}`",
                    env::MONGO_DATABASE,
                    DEFAULT_DATABASE
                );
                DEFAULT_DATABASE.to_owned()
            }),
        };

        Ok(Self {
            mongo_uri,
            database,
        })
    }

    /// The connection string with its password masked, suitable for logs.
    pub fn redacted_uri(&self) -> String {
        match url::Url::parse(&self.mongo_uri) {
            Ok(mut url) => {
                if url.password().is_some() {
                    // Fails only for URLs without a host, which carry no password
                    let _ = url.set_password(Some("****"));
                }
                url.to_string()
            }
            Err(_) => format!("{}://****", self.scheme()),
        }
    }

    fn scheme(&self) -> &str {
        self.mongo_uri
            .split_once("://")
            .map_or("mongodb", |(scheme, _)| scheme)
    }
}

fn database_from_uri(uri: &str) -> Result<Option<String>, Error> {
    let url = url::Url::parse(uri)?;
    Ok(url
        .path_segments()
        .and_then(|mut segments| segments.next())
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned))
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// HTTP verbs the backend API is called with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// Verbs that mutate server state and may therefore be deferred.
///
/// Reads are never queued; they are served from cache instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WriteMethod {
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// The write form of this method, or `None` for reads.
    pub fn as_write(self) -> Option<WriteMethod> {
        match self {
            HttpMethod::Get => None,
            HttpMethod::Post => Some(WriteMethod::Post),
            HttpMethod::Put => Some(WriteMethod::Put),
            HttpMethod::Delete => Some(WriteMethod::Delete),
        }
    }
}

impl From<WriteMethod> for HttpMethod {
    fn from(method: WriteMethod) -> Self {
        match method {
            WriteMethod::Post => HttpMethod::Post,
            WriteMethod::Put => HttpMethod::Put,
            WriteMethod::Delete => HttpMethod::Delete,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for WriteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(HttpMethod::from(*self).as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(format!(
                "Invalid method '{}'. Valid options: GET, POST, PUT, DELETE",
                s
            )),
        }
    }
}

impl FromStr for WriteMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::from_str(s)?
            .as_write()
            .ok_or_else(|| format!("'{}' requests are never queued", s.to_uppercase()))
    }
}

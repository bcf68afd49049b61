extern crate reqwest;
extern crate rppal;
extern crate serde_json;
extern crate std;

pub type SeoulDashResult<T> = std::result::Result<T, SeoulDashError>;

/// The only two outcomes a failed fetch cycle exposes to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    TransportUnavailable,
    ParseFailure,
}

#[derive(Debug)]
pub enum SeoulDashError {
    HttpError(reqwest::Error),
    HttpStatus(reqwest::StatusCode),
    GpioError(rppal::gpio::Error),
    I2cError(rppal::i2c::Error),
    IoError(std::io::Error),
    JsonError(serde_json::Error),
    MissingRoot(&'static str),
    Other(String),
}

impl SeoulDashError {
    pub fn kind(&self) -> FailureKind {
        match *self {
            SeoulDashError::HttpError(_) => FailureKind::TransportUnavailable,
            SeoulDashError::HttpStatus(_) => FailureKind::TransportUnavailable,
            SeoulDashError::GpioError(_) => FailureKind::TransportUnavailable,
            SeoulDashError::I2cError(_) => FailureKind::TransportUnavailable,
            SeoulDashError::IoError(_) => FailureKind::TransportUnavailable,
            SeoulDashError::Other(_) => FailureKind::TransportUnavailable,
            SeoulDashError::JsonError(ref err) => {
                // A socket failure surfacing through the parser is still a
                // transport problem, not a malformed document.
                if err.is_io() {
                    return FailureKind::TransportUnavailable;
                }
                return FailureKind::ParseFailure;
            },
            SeoulDashError::MissingRoot(_) => FailureKind::ParseFailure,
        }
    }
}

impl std::fmt::Display for SeoulDashError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            SeoulDashError::HttpError(ref err) => {
                return write!(f, "HTTP Error: {}", err);
            },
            SeoulDashError::HttpStatus(ref status) => {
                return write!(f, "HTTP Status: {}", status);
            },
            SeoulDashError::GpioError(ref err) => {
                return write!(f, "GPIO Error: {}", err);
            },
            SeoulDashError::I2cError(ref err) => {
                return write!(f, "I2C Error: {}", err);
            },
            SeoulDashError::IoError(ref err) => {
                return write!(f, "IO Error: {}", err);
            },
            SeoulDashError::JsonError(ref err) => {
                return write!(f, "JSON Error: {}", err);
            },
            SeoulDashError::MissingRoot(ref field) => {
                return write!(f, "Document has no '{}' object", field);
            },
            SeoulDashError::Other(ref msg) => {
                return write!(f, "Error: {}", msg);
            },
        }
    }
}

impl std::error::Error for SeoulDashError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            SeoulDashError::HttpError(ref err) => Some(err),
            SeoulDashError::GpioError(ref err) => Some(err),
            SeoulDashError::I2cError(ref err) => Some(err),
            SeoulDashError::IoError(ref err) => Some(err),
            SeoulDashError::JsonError(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SeoulDashError {
    fn from(err: reqwest::Error) -> SeoulDashError {
        return SeoulDashError::HttpError(err);
    }
}

impl From<rppal::gpio::Error> for SeoulDashError {
    fn from(err: rppal::gpio::Error) -> SeoulDashError {
        return SeoulDashError::GpioError(err);
    }
}

impl From<rppal::i2c::Error> for SeoulDashError {
    fn from(err: rppal::i2c::Error) -> SeoulDashError {
        return SeoulDashError::I2cError(err);
    }
}

impl From<std::io::Error> for SeoulDashError {
    fn from(err: std::io::Error) -> SeoulDashError {
        return SeoulDashError::IoError(err);
    }
}

impl From<serde_json::Error> for SeoulDashError {
    fn from(err: serde_json::Error) -> SeoulDashError {
        return SeoulDashError::JsonError(err);
    }
}

pub fn make_error(msg: &str) -> SeoulDashError {
    return SeoulDashError::Other(msg.to_string());
}

#[cfg(test)]
mod tests {
    use super::{FailureKind, SeoulDashError};

    #[test]
    fn classifies_failures() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        assert_eq!(FailureKind::TransportUnavailable, SeoulDashError::from(io).kind());

        let syntax = serde_json::from_str::<serde_json::Value>("{\"a\":").unwrap_err();
        assert_eq!(FailureKind::ParseFailure, SeoulDashError::from(syntax).kind());

        assert_eq!(FailureKind::ParseFailure, SeoulDashError::MissingRoot("CITYDATA").kind());
    }
}

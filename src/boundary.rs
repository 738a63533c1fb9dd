//! Adapter between the engine and the `http` crate's request/response types.

use http::header::LOCATION;
use http::uri::Scheme;
use http::Response;

use crate::{Action, RequestInfo};

impl<B> RequestInfo for http::Request<B> {
    fn path(&self) -> &str {
        self.uri().path()
    }

    fn query(&self) -> Option<&str> {
        self.uri().query()
    }

    fn method(&self) -> &str {
        http::Request::method(self).as_str()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers().get(name).and_then(|v| v.to_str().ok())
    }

    fn is_secure(&self) -> bool {
        self.uri().scheme() == Some(&Scheme::HTTPS)
    }
}

impl Action {
    /// Build the response the boundary should send.
    ///
    /// Returns `Ok(None)` for [`Action::PassThrough`], meaning the next handler
    /// should run. Redirects carry a `Location` header; blocks have an empty body.
    ///
    /// # Errors
    ///
    /// Returns [`http::Error`] if the destination is not a valid header value.
    pub fn to_response<B: Default>(&self) -> Result<Option<Response<B>>, http::Error> {
        let Some(status) = self.status_code() else {
            return Ok(None);
        };
        let mut builder = Response::builder().status(status);
        if let Some(destination) = self.destination() {
            builder = builder.header(LOCATION, destination);
        }
        builder.body(B::default()).map(Some)
    }
}

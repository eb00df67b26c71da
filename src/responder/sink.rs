//! Outbound response sinks

use crate::http::ResponseBody;
use hyper::Response;

/// Destination of a finished response
///
/// The responder calls `deliver` exactly once, when the response is finalized.
pub trait ResponseSink: Send {
    fn deliver(&mut self, response: Response<ResponseBody>);
}

/// Sink that keeps the delivered response until the caller takes it
///
/// Used by the hyper service: the handler runs the responder, then returns
/// whatever landed in the slot.
#[derive(Default)]
pub struct ResponseSlot {
    response: Option<Response<ResponseBody>>,
}

impl ResponseSlot {
    pub fn take(&mut self) -> Option<Response<ResponseBody>> {
        self.response.take()
    }

    pub const fn is_filled(&self) -> bool {
        self.response.is_some()
    }
}

impl ResponseSink for ResponseSlot {
    fn deliver(&mut self, response: Response<ResponseBody>) {
        self.response = Some(response);
    }
}

use crate::method::Method;
use crate::{Request, RequestConsumer, Response};
use std::collections::HashMap;
use std::sync::Arc;

/// A fixed mapping from legal HTTP methods to request consumers,
/// resolved once at configuration time.
pub struct ConsumerSelector {
    consumers: HashMap<Method, Arc<dyn RequestConsumer>>,
}
impl ConsumerSelector {
    #[must_use]
    pub fn new() -> Self {
        Self {
            consumers: HashMap::new(),
        }
    }

    /// Registers `consumer` to handle `method`, replacing any previous
    /// registration.
    #[must_use]
    pub fn with_consumer(mut self, method: Method, consumer: Arc<dyn RequestConsumer>) -> Self {
        self.consumers.insert(method, consumer);
        self
    }

    /// Returns the consumer registered for `method`, or `None` when the
    /// method is unmapped in the current configuration.
    #[must_use]
    pub fn select(&self, method: Method) -> Option<&Arc<dyn RequestConsumer>> {
        self.consumers.get(&method)
    }
}
impl Default for ConsumerSelector {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves the method of an inbound request, consults the selector, and
/// invokes the chosen consumer.
///
/// A token outside the legal HTTP method set gets `405 Method Not
/// Allowed`.  A legal method with no consumer registered in the current
/// configuration gets `501 Not Implemented`.
pub struct RequestDispatcher {
    selector: ConsumerSelector,
}
impl RequestDispatcher {
    #[must_use]
    pub fn new(selector: ConsumerSelector) -> Self {
        Self { selector }
    }
}
impl RequestConsumer for RequestDispatcher {
    fn consume(&self, request: &Request, response: &mut Response) {
        let Some(method) = Method::from_token(request.method()) else {
            *response = Response::text(405, "method not allowed");
            return;
        };
        let Some(consumer) = self.selector.select(method) else {
            *response = Response::text(501, "method not implemented");
            return;
        };
        consumer.consume(request, response);
    }
}

use async_trait::async_trait;

use crate::error::ResponseError;
use crate::request::IncomingRequest;
use crate::transport::HttpTransport;
use crate::writer::{Responded, ResponseWriter};

pub type HandlerResult = Result<Responded, ResponseError>;

#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, req: &IncomingRequest, w: &mut ResponseWriter<HttpTransport>) -> HandlerResult;
}

#[async_trait]
impl<F> Handler for F
where
    F: Fn(&IncomingRequest, &mut ResponseWriter<HttpTransport>) -> HandlerResult + Send + Sync,
{
    async fn handle(&self, req: &IncomingRequest, w: &mut ResponseWriter<HttpTransport>) -> HandlerResult {
        (self)(req, w)
    }
}

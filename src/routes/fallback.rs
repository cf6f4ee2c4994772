use actix_web::http::Method;
use actix_web::{HttpRequest, HttpResponse, Responder};

/// Answers CORS preflight requests on any path and everything else nobody routed.
#[tracing::instrument(
    name = "Fallback handler",
    skip(req),
    fields(method = %req.method(), path = %req.path())
)]
pub async fn fallback(req: HttpRequest) -> impl Responder {
    if *req.method() == Method::OPTIONS {
        return HttpResponse::NoContent().finish();
    }

    HttpResponse::NotFound().body("Not found")
}

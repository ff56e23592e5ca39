//! Shared per-listener state and the catch-all dispatch entry point
//!
//! Routing lives in the pipeline, not in actix: every request reaches the
//! same default service, which buffers the body and drives the pipeline.

use crate::pipeline::{Pipeline, RequestCx};
use actix_web::{web, HttpRequest, HttpResponse};
use bytes::Bytes;

/// State shared by all workers of a listener.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
}

/// The single actix handler behind every route.
pub async fn dispatch_request(
    request: HttpRequest,
    body: Bytes,
    state: web::Data<AppState>,
) -> HttpResponse {
    let mut cx = RequestCx::new(request, body);
    state.pipeline.dispatch(&mut cx).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{handler_fn, Outcome};
    use actix_web::test;
    use actix_web::App;

    #[actix_web::test]
    async fn test_every_path_reaches_the_pipeline() {
        let pipeline = Pipeline::new();
        pipeline.register(
            "/".into(),
            handler_fn(|cx| {
                let path = cx.path().to_string();
                Box::pin(async move { Ok(Outcome::Done(HttpResponse::Ok().body(path))) })
            }),
        );

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState { pipeline }))
                .default_service(web::route().to(dispatch_request)),
        )
        .await;

        let response = test::call_service(
            &app,
            test::TestRequest::with_uri("/deeply/nested/route").to_request(),
        )
        .await;
        assert!(response.status().is_success());
        let body = test::read_body(response).await;
        assert_eq!(&body[..], b"/deeply/nested/route");
    }
}

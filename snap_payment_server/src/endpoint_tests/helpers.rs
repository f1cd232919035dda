use actix_web::{
    body::MessageBody,
    error::ResponseError,
    http::StatusCode,
    test,
    test::TestRequest,
    web::ServiceConfig,
    App,
};

/// Builds a service from `configure`, fires `req` at it and collapses the outcome to (status, body). Middleware
/// rejections come back as error responses rather than panics so tests can assert on them.
pub async fn send_request(req: TestRequest, configure: fn(&mut ServiceConfig)) -> (StatusCode, String) {
    let _ = env_logger::try_init();
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => {
            let (_, res) = res.into_parts();
            let status = res.status();
            let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
            (status, body)
        },
        Err(e) => (e.as_response_error().status_code(), e.to_string()),
    }
}

use actix_web::{web, HttpResponse, Responder};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::metrics::render_metrics;
use crate::state::{current_snapshot, AppState};

/// Serve the current snapshot as exposition text. Never waits on an
/// in-flight collection and never returns an error status: before the
/// first successful cycle this is simply header-only output.
pub async fn get_metrics(data: web::Data<AppState>) -> impl Responder {
    let snapshot = current_snapshot(&data);
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64;

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(render_metrics(&snapshot, now_ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Pm2Env, Pm2Process};
    use crate::state::{new_state, publish_snapshot, Snapshot};
    use actix_web::{test, App};

    #[actix_web::test]
    async fn metrics_endpoint_serves_exposition_text() {
        let state = new_state();
        let p = Pm2Process {
            pid: 5,
            name: "svc".into(),
            pm2_env: Pm2Env {
                status: "online".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        publish_snapshot(
            &state,
            Snapshot {
                processes: vec![p],
                last_fetch: Some(SystemTime::now()),
            },
        );

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .route("/metrics", web::get().to(get_metrics)),
        )
        .await;

        let req = test::TestRequest::get().uri("/metrics").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "text/plain; version=0.0.4"
        );

        let body = test::read_body(resp).await;
        let text = std::str::from_utf8(&body).unwrap();
        assert!(text.contains("pm2_status{process=\"svc\",pid=\"5\",status=\"online\"} 1"));
    }

    #[actix_web::test]
    async fn metrics_endpoint_is_header_only_before_first_collection() {
        let state = new_state();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .route("/metrics", web::get().to(get_metrics)),
        )
        .await;

        let req = test::TestRequest::get().uri("/metrics").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body = test::read_body(resp).await;
        let text = std::str::from_utf8(&body).unwrap();
        assert!(text.lines().all(|l| l.starts_with('#')));
        assert_eq!(text.matches("# TYPE ").count(), 7);
    }
}

use chrono::{TimeZone, Utc};
use httpmock::prelude::*;
use serde_json::json;
use vision_mailer::{App, AppConfig};

fn config_for(server: &MockServer) -> AppConfig {
    let mut config = AppConfig::default();
    config.store.endpoint = server.url("/exec");
    config.providers.sendgrid_api_key = Some("sg".to_string());
    config.providers.sendgrid_base_url = server.base_url();
    config.providers.mailjet_api_key = Some("mj".to_string());
    config.providers.mailjet_secret_key = Some("secret".to_string());
    config.providers.mailjet_base_url = server.base_url();
    config.providers.resend_api_key = Some("re".to_string());
    config.providers.resend_base_url = server.base_url();
    config.ai.deepseek_api_key = Some("ds".to_string());
    config.ai.deepseek_base_url = server.base_url();
    config.ai.gemini_api_key = Some("gk".to_string());
    config.ai.gemini_base_url = server.base_url();
    config.scheduler.batch_delay_ms = 0;
    config
}

#[tokio::test]
async fn daily_batch_over_http_fails_over_to_mailjet() {
    let server = MockServer::start();
    let sheet = server.mock(|when, then| {
        when.method(GET).path("/exec");
        then.status(200).json_body(json!([
            {"email": "ana@x.com", "nombre": "Ana", "objetivos": "Rust", "diaRecordatorio": "Miércoles"},
            {"email": "bob@x.com", "nombre": "Bob", "objetivos": "Correr", "diaRecordatorio": "Lunes"},
            {"email": "eva@x.com", "nombre": "Eva", "objetivos": "Leer", "diaRecordatorio": "Miercoles"}
        ]));
    });
    let gemini = server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-2.0-flash:generateContent")
            .query_param("key", "gk");
        then.status(200).json_body(json!({
            "candidates": [{ "content": { "parts": [{ "text": "**Tarea de hoy:** 15 minutos" }] } }]
        }));
    });
    let deepseek = server.mock(|when, then| {
        when.method(POST).path("/chat/completions");
        then.status(200).json_body(json!({"choices": []}));
    });
    let sendgrid = server.mock(|when, then| {
        when.method(POST).path("/v3/mail/send");
        then.status(500).body("internal");
    });
    let mailjet = server.mock(|when, then| {
        when.method(POST)
            .path("/v3.1/send")
            .body_contains("Tarea de hoy:</strong> 15 minutos");
        then.status(200).json_body(json!({"Messages": [{"Status": "success"}]}));
    });
    let resend = server.mock(|when, then| {
        when.method(POST).path("/emails");
        then.status(200);
    });

    let app = App::build(config_for(&server)).unwrap();
    // 2026-01-07 is a Wednesday
    let now = Utc.with_ymd_and_hms(2026, 1, 7, 8, 0, 0).unwrap();
    let report = app.scheduler.run_daily_batch(now).await;

    assert_eq!(report.total_users, 3);
    assert_eq!(report.due_today, 2);
    assert_eq!(report.delivered, 2);
    assert_eq!(report.failed, 0);
    sheet.assert();
    gemini.assert_hits(2);
    deepseek.assert_hits(0);
    sendgrid.assert_hits(2);
    mailjet.assert_hits(2);
    resend.assert_hits(0);
}

#[tokio::test]
async fn unreachable_store_means_no_sends() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/exec");
        then.status(503);
    });
    let sendgrid = server.mock(|when, then| {
        when.method(POST).path("/v3/mail/send");
        then.status(202);
    });

    let app = App::build(config_for(&server)).unwrap();
    let now = Utc.with_ymd_and_hms(2026, 1, 7, 8, 0, 0).unwrap();
    let report = app.scheduler.run_daily_batch(now).await;

    assert_eq!(report.due_today, 0);
    sendgrid.assert_hits(0);
}

#[tokio::test]
async fn send_test_reports_last_provider_error() {
    let server = MockServer::start();
    for path in ["/v3/mail/send", "/v3.1/send"] {
        server.mock(|when, then| {
            when.method(POST).path(path);
            then.status(503).body("unavailable");
        });
    }
    server.mock(|when, then| {
        when.method(POST).path("/emails");
        then.status(403).body("domain not verified");
    });

    let app = App::build(config_for(&server)).unwrap();
    let result = app.mailer.send_test("t@x.com", "Test").await;

    assert!(!result.success);
    assert_eq!(
        result.error.as_deref(),
        Some("resend responded with 403: domain not verified")
    );
}

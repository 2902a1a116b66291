//! HTTP status page and JSON endpoint.

mod strings;

use actix_web::{App, HttpRequest, HttpResponse, HttpServer, http::header, web};
use s85_status::status::{DepartureInformation, DepartureStatus};
use s85_status::store::StatusStore;
use serde::Deserialize;
use tracing::info;

use strings::PageLanguage;

#[derive(Clone)]
pub struct AppState {
    pub store: StatusStore,
    pub line_name: String,
    /// Language whose messages are shown when the page language has none.
    pub source_language: String,
}

#[derive(Deserialize)]
struct PageQuery {
    lang: Option<String>,
}

pub async fn serve(bind: &str, state: AppState) -> std::io::Result<()> {
    info!(bind, "Starting HTTP server");
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .route("/", web::get().to(index))
            .route("/api/status", web::get().to(status_json))
            .route("/health", web::get().to(health))
    })
    .bind(bind)?
    .run()
    .await
}

fn log_request(req: &HttpRequest) {
    info!(
        uri = %req.uri(),
        method = %req.method(),
        ip = ?req.peer_addr(),
        "request completed"
    );
}

fn page_language(req: &HttpRequest, query: &PageQuery) -> PageLanguage {
    query
        .lang
        .as_deref()
        .and_then(PageLanguage::from_code)
        .or_else(|| {
            req.headers()
                .get(header::ACCEPT_LANGUAGE)
                .and_then(|value| value.to_str().ok())
                .and_then(PageLanguage::from_accept_language)
        })
        .unwrap_or(PageLanguage::DEFAULT)
}

async fn index(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> HttpResponse {
    let language = page_language(&req, &query);
    let information = state.store.current().await;
    let body = render_page(&information, language, &state.line_name, &state.source_language);

    log_request(&req);
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .insert_header((header::CONTENT_LANGUAGE, language.code()))
        .body(body)
}

async fn status_json(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let information = state.store.current().await;
    log_request(&req);
    HttpResponse::Ok().json(&*information)
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}

/// Renders the status page. Messages are already HTML-safe.
fn render_page(
    information: &DepartureInformation,
    language: PageLanguage,
    line_name: &str,
    fallback_language: &str,
) -> String {
    let title = html_escape::encode_text(&language.title(line_name)).into_owned();

    let detail = if information.status == DepartureStatus::NotRunning {
        let mut messages = information.messages_for(language.code());
        if messages.is_empty() {
            messages = information.messages_for(fallback_language);
        }
        messages.join("<br>")
    } else {
        String::new()
    };

    let time = information
        .observed_at
        .with_timezone(&chrono::Local)
        .format("%Y-%m-%d %H:%M:%S");

    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
</head>
<body class="status-{status}">
<h1>{title}</h1>
<p class="answer">{answer}</p>
<p class="detail">{detail}</p>
<p class="time">{updated}: {time}</p>
</body>
</html>
"#,
        lang = language.code(),
        status = information.status.to_string().to_ascii_lowercase(),
        answer = language.answer(information.status),
        updated = language.updated_label(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn not_running() -> DepartureInformation {
        let mut information = DepartureInformation::empty(DepartureStatus::NotRunning);
        information.messages.insert(
            "de".to_string(),
            ["Ersatzverkehr", "Bauarbeiten"].into_iter().collect(),
        );
        information
    }

    #[test]
    fn test_render_not_running_joins_messages() {
        let html = render_page(&not_running(), PageLanguage::German, "S85", "de");
        assert!(html.contains("Fährt die S85?"));
        assert!(html.contains("<p class=\"answer\">Nein</p>"));
        assert!(html.contains("Ersatzverkehr<br>Bauarbeiten"));
    }

    #[test]
    fn test_render_falls_back_to_source_messages() {
        let html = render_page(&not_running(), PageLanguage::English, "S85", "de");
        assert!(html.contains("<p class=\"answer\">No</p>"));
        assert!(html.contains("Ersatzverkehr<br>Bauarbeiten"));
    }

    #[test]
    fn test_render_running_hides_messages() {
        let mut information = not_running();
        information.status = DepartureStatus::Running;
        let html = render_page(&information, PageLanguage::English, "S85", "de");
        assert!(html.contains("<p class=\"answer\">Yes</p>"));
        assert!(html.contains("<p class=\"detail\"></p>"));
    }

    #[test]
    fn test_page_language_prefers_query() {
        let req = TestRequest::default()
            .insert_header((header::ACCEPT_LANGUAGE, "de-DE,de;q=0.9"))
            .to_http_request();
        let query = PageQuery {
            lang: Some("en".to_string()),
        };
        assert_eq!(page_language(&req, &query), PageLanguage::English);

        let query = PageQuery { lang: None };
        assert_eq!(page_language(&req, &query), PageLanguage::German);
    }

    #[test]
    fn test_page_language_defaults_to_english() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(
            page_language(&req, &PageQuery { lang: None }),
            PageLanguage::English
        );
    }
}

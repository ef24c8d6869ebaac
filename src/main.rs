use std::sync::Arc;

use clap::Parser;
use serde_json::json;
use tokio::net::TcpListener;

use safehttp::config::{Args, Config};
use safehttp::{
    DefaultDispatcher, HandlerResult, HttpTransport, IncomingRequest, Response, ResponseWriter,
    SafeHtml, Server, StatusCode, TextTemplate,
};

static INDEX: &str = r#"<!DOCTYPE html>
<html>
<head><title>{{ title }}</title></head>
<body><h1>{{ title }}</h1><p>You asked for {{ request.path }}.</p></body>
</html>
"#;

fn demo(index: &TextTemplate, req: &IncomingRequest, w: &mut ResponseWriter<HttpTransport>) -> HandlerResult {
    w.header().set("X-Frame-Options", "DENY")?;
    match req.path() {
        "/" => w.write_template(
            index,
            &json!({
                "title": "safehttp <demo>",
                "request": {"path": req.path(), "query": req.query()},
            }),
        ),
        "/login-required" => w.redirect(req, "login?next=%2Flogin-required", StatusCode::FOUND),
        "/api" => w.write(Response::json(json!({"method": req.method(), "query": req.query()}))),
        "/oops" => w.server_error(StatusCode::SERVICE_UNAVAILABLE),
        "/login" => w.write(Response::html(SafeHtml::from_constant("<p>login form goes here</p>"))),
        _ => w.write(Response::text("Not Found").with_status(StatusCode::NOT_FOUND)),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = if args.file.is_empty() {
        let mut config = Config::default();
        config.autofix();
        config
    } else {
        Config::load(&args.file)?
    };
    let config = config.with_args(&args);
    safehttp::logging::init(&config.logging)?;

    let listener = TcpListener::bind(&config.addr).await?;
    log::info!(addr = config.addr.as_str(), pid = std::process::id(); "safehttpd listening");

    let index = TextTemplate::new("index", INDEX);
    let handler = move |req: &IncomingRequest, w: &mut ResponseWriter<HttpTransport>| -> HandlerResult {
        demo(&index, req, w)
    };

    let server = Arc::new(Server::new(
        config,
        Arc::new(DefaultDispatcher),
        Arc::new(handler),
    ));
    server
        .run(listener, async {
            _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}

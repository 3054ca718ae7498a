//! Fetch command - answer one request the way the proxy would

use super::Worker;
use crate::cli::args::FetchArgs;
use crate::config::Config;
use crate::error::ProxyResult;
use crate::http::{Method, Request};
use crate::proxy::ResponseSource;
use crate::ui::{self, UiContext};

/// Execute the fetch command
pub async fn execute(args: FetchArgs, config: &Config) -> ProxyResult<()> {
    let worker = Worker::start(config, UiContext::detect()).await?;
    let ctx = worker.ctx.clone();

    let url = worker.proxy().settings().origin.join(&args.url)?;
    let method: Method = args.method.parse()?;
    let request = if args.navigate {
        Request::navigation(url)
    } else {
        Request::get(url)
    }
    .with_method(method);

    let route = worker.proxy().route(&request);
    let outcome = worker.dispatcher.fetch(request.clone()).await?;
    let response = &outcome.response;

    ui::key_value(&ctx, "Request", &request.to_string());
    ui::key_value(&ctx, "Route", &format!("{:?}", route));
    ui::key_value_status(
        &ctx,
        "Status",
        &response.status.to_string(),
        response.is_ok(),
    );
    ui::key_value_status(
        &ctx,
        "Source",
        &outcome.source.to_string(),
        outcome.source != ResponseSource::ShellFallback,
    );
    ui::key_value(&ctx, "Size", &format!("{} bytes", response.body.len()));
    if let Some(content_type) = response.header("content-type") {
        ui::key_value(&ctx, "Type", content_type);
    }

    if args.show_body {
        println!();
        println!("{}", response.text());
    }

    Ok(())
}

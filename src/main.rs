// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context as _, Result};
use axum::{http::StatusCode, routing::get, Router};
use clap::Parser;
use futures::StreamExt;
use k8gb_sync::{
    config::Config,
    constants::{ERROR_REQUEUE_SECS, TOKIO_WORKER_THREADS},
    context::Context,
    crd::Gslb,
    metrics,
    reconcilers::{reconcile_gslb, ReconcileError},
};
use k8s_openapi::api::networking::v1::Ingress;
use kube::{
    runtime::{controller::Action, watcher, Controller},
    Api, Client, ResourceExt,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

fn main() -> Result<()> {
    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("k8gb-sync")
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    // Respects RUST_LOG (default INFO) and RUST_LOG_FORMAT (json|text)
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    let config = Config::parse();
    if let Err(reason) = config.validate() {
        anyhow::bail!("invalid configuration: {reason}");
    }
    info!(
        geo_tag = %config.cluster_geo_tag,
        dns_zone = %config.dns_zone,
        edge_dns_zone = %config.edge_dns_zone,
        edge_dns_type = %config.resolved_edge_dns_type(),
        "Starting k8gb DNS synchronization controller"
    );

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;
    debug!("Kubernetes client initialized successfully");

    let metrics_address = config.metrics_bind_address.clone();
    let ctx = Arc::new(Context::from_client(config, &client)?);
    info!(provider = %ctx.provider, "DNS provider configured");

    // Either task exiting means the operator can no longer do its job
    tokio::select! {
        result = run_gslb_controller(client, ctx) => {
            warn!("Gslb controller exited: {:?}", result);
            result
        }
        result = run_metrics_server(&metrics_address) => {
            error!("CRITICAL: metrics server exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("metrics server exited unexpectedly without error")
        }
    }
}

/// Run the `Gslb` controller until a shutdown signal arrives.
async fn run_gslb_controller(client: Client, ctx: Arc<Context>) -> Result<()> {
    info!("Starting Gslb controller");

    let gslbs = Api::<Gslb>::all(client.clone());
    let ingresses = Api::<Ingress>::all(client);

    Controller::new(gslbs, watcher::Config::default())
        .owns(ingresses, watcher::Config::default())
        .shutdown_on_signal()
        .run(reconcile_gslb, error_policy, ctx)
        .for_each(|result| {
            if let Err(e) = result {
                debug!("Gslb controller event: {e}");
            }
            futures::future::ready(())
        })
        .await;

    info!("Gslb controller stopped");
    Ok(())
}

/// Serve the Prometheus registry on `/metrics`.
async fn run_metrics_server(address: &str) -> Result<()> {
    let app = Router::new().route("/metrics", get(metrics_handler));
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("failed to bind metrics endpoint to {address}"))?;
    info!("Metrics server listening on {address}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn metrics_handler() -> Result<String, (StatusCode, String)> {
    metrics::gather_metrics().map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

/// Error policy for the `Gslb` controller
fn error_policy(gslb: Arc<Gslb>, err: &ReconcileError, _ctx: Arc<Context>) -> Action {
    error!(
        namespace = %gslb.namespace().unwrap_or_default(),
        name = %gslb.name_any(),
        reason = err.0.status_reason(),
        "Failed to reconcile Gslb: {err}"
    );
    Action::requeue(Duration::from_secs(ERROR_REQUEUE_SECS))
}

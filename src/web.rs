use crate::config::Config;
use crate::error::ReportError;
use crate::pipeline::{generate, Outcome, NO_DATA_NOTICE};
use chrono::Utc;
use log::{error, info};
use std::net::{IpAddr, SocketAddr};
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Reply};

/// Renders the page fresh for every request.
async fn get_report(config: Config) -> Result<Response, warp::Rejection> {
    let result = tokio::task::spawn_blocking(move || generate(&config, Utc::now())).await;

    let response = match result {
        Ok(Ok(Outcome::Report(document))) => warp::reply::html(document.to_string()).into_response(),
        Ok(Ok(Outcome::NoData)) => NO_DATA_NOTICE.into_response(),
        Ok(Err(e)) => {
            error!("Failed to generate report: {}", e);
            unavailable()
        }
        Err(e) => {
            error!("Report task failed: {}", e);
            unavailable()
        }
    };
    Ok(response)
}

fn unavailable() -> Response {
    warp::reply::with_status("Report unavailable", StatusCode::INTERNAL_SERVER_ERROR)
        .into_response()
}

pub fn routes(
    config: Config,
) -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone {
    warp::path::end()
        .and(warp::get())
        .and(with_config(config))
        .and_then(get_report)
        .with(warp::log("weather_graph::web"))
}

pub async fn start_web_server(config: Config) -> Result<(), ReportError> {
    config.validate()?;
    let ip: IpAddr = config.web_server_ip.parse().map_err(|_| {
        ReportError::InvalidConfig(format!(
            "web_server_ip '{}' is not an IP address",
            config.web_server_ip
        ))
    })?;

    let addr = SocketAddr::new(ip, config.web_server_port);
    let sensor_id = config.sensor_id.clone();

    let (bound, server) = warp::serve(routes(config))
        .try_bind_ephemeral(addr)
        .map_err(|source| ReportError::Bind { addr, source })?;

    info!("Serving sensor '{}' on http://{}/", sensor_id, bound);
    server.await;
    Ok(())
}

fn with_config(
    config: Config,
) -> impl Filter<Extract = (Config,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || config.clone())
}

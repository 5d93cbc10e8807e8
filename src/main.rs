/*
 *  main.rs
 *
 *  smart-display - weather & clock panel
 *  (c) 2020-26 Stuart Hunter
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use anyhow::Context;
use env_logger::Env;
use log::info;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

#[cfg(unix)] // Only compile this block on Unix-like systems
use tokio::signal::unix::{signal, SignalKind};

use smart_display::config;
use smart_display::display::{ConsoleSink, DisplaySink};
use smart_display::http::HttpFetcher;
use smart_display::location::{self, HttpGeoLookup};
use smart_display::{
    ClockService, Dashboard, ForecastSource, HttpForecastSource, HttpTimeSource, Monotonic, TimeSource,
};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Asynchronously waits for a SIGINT, SIGTERM, or SIGHUP signal.
#[cfg(unix)]
async fn signal_handler() -> std::io::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

#[cfg(not(unix))]
async fn signal_handler() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    info!("Ctrl-C received. Initiating graceful shutdown.");
    Ok(())
}

/// Drive the dashboard at a fixed cadence, forever.
async fn run<T, F, S>(dashboard: &mut Dashboard<T, F, S>, monotonic: Monotonic, cadence: Duration)
where
    T: TimeSource,
    F: ForecastSource,
    S: DisplaySink,
{
    dashboard.start(monotonic.now_ms()).await;

    // a slow fetch stretches the cadence, it never queues up ticks
    let mut ticker = tokio::time::interval(cadence);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        dashboard.step(monotonic.now_ms()).await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load().context("loading configuration")?;

    env_logger::Builder::from_env(Env::default().default_filter_or(cfg.log_level.as_str()))
        .format_timestamp_secs()
        .init();

    info!("This {} shows the week ahead", env!("CARGO_PKG_NAME"));
    info!("v.{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);

    let http = HttpFetcher::new(Duration::from_millis(cfg.http_timeout_ms), cfg.http_retries)
        .context("building HTTP client")?;

    let loc = location::get_location(cfg.latitude, cfg.longitude, &HttpGeoLookup::new(http.clone())).await?;
    info!("Location determined: {}", loc);

    let clock = ClockService::new(
        HttpTimeSource::new(http.clone(), &cfg.time_url),
        cfg.utc_offset_secs,
        Duration::from_secs(cfg.sync_interval_secs),
        cfg.language,
    );
    let forecast = HttpForecastSource::new(
        http,
        &cfg.forecast_url,
        loc.latitude,
        loc.longitude,
        cfg.forecast_days,
        cfg.utc_offset_secs,
    );
    let mut dashboard = Dashboard::new(
        clock,
        forecast,
        ConsoleSink::new(),
        cfg.forecast_days,
        Duration::from_secs(cfg.forecast_interval_secs),
    );

    info!(
        "Clock sync every {}s, forecast every {}s, tick {}ms",
        cfg.sync_interval_secs, cfg.forecast_interval_secs, cfg.tick_interval_ms
    );

    tokio::select! {
        // Handle Unix signals for graceful shutdown
        res = signal_handler() => {
            res.context("installing signal handlers")?;
        }
        _ = run(&mut dashboard, Monotonic::start(), Duration::from_millis(cfg.tick_interval_ms)) => {}
    }

    info!("Bye");
    Ok(())
}

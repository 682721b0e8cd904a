use std::convert::Infallible;
use std::net::SocketAddr;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use log::{error, info};
use tokio::net::TcpListener;

use crate::app::handlers;
use crate::service::Services;

mod app;
mod config;
mod misc;
mod model;
mod service;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let services = Services::create();
    let addr = SocketAddr::from(([0, 0, 0, 0], config::port()));
    let listener = TcpListener::bind(addr).await?;
    info!("app is running on: {addr}");

    loop {
        let (stream, remote) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let services = services.clone();
        tokio::spawn(async move {
            let service = service_fn(move |req| {
                let services = services.clone();
                async move { Ok::<_, Infallible>(handlers::handle(services, req).await) }
            });
            // upgrades stay enabled so room sockets can complete their handshake
            let connection = http1::Builder::new()
                .serve_connection(io, service)
                .with_upgrades();
            if let Err(err) = connection.await {
                error!("connection error from {remote}: {err}");
            }
        });
    }
}

//! # Mini HTTP Server - Entry Point
//! src/main.rs
//!
//! Registra los archivos estáticos y los endpoints de la aplicación, y
//! arranca el servidor. Solo el bind inicial puede terminar el proceso.

use log::{error, info, warn};
use mini_http_server::commands::{self, STATIC_PATHS};
use mini_http_server::config::Config;
use mini_http_server::server::Server;

fn init_logging() {
    let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    pretty_env_logger::formatted_timed_builder()
        .parse_filters(&filters)
        .init();
}

fn main() {
    init_logging();

    let config = Config::new();
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        std::process::exit(2);
    }
    if !config.root.is_dir() {
        warn!("Served root {} is not a directory; static files will 404", config.root.display());
    }

    let server = Server::new(config);
    server.serve_static(STATIC_PATHS);
    server.add_handler("GET", "/", commands::index_handler);
    server.add_handler("GET", "/messages", commands::messages_handler);
    server.add_handler("GET", "/search", commands::search_handler);
    server.add_handler("GET", "/filter", commands::filter_handler);
    server.add_handler("POST", "/messages", commands::post_messages_handler);
    info!("{} routes registered", server.router().len());

    if let Err(e) = server.run() {
        error!("Could not start server on {}: {}", server.config().address(), e);
        std::process::exit(1);
    }
}

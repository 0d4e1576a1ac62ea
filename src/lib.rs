//! # Mini HTTP Server
//! src/lib.rs
//!
//! Servidor HTTP/1.1 mínimo implementado sobre `std::net`: un request por
//! conexión, router exacto por (método, path) y archivos estáticos.
//!
//! ## Arquitectura
//!
//! El servidor está dividido en módulos especializados:
//! - `http`: Parsing de requests y construcción de responses
//! - `router`: Registro (método, path) → handler
//! - `server`: Listener, pool de workers y manejo de conexiones
//! - `commands`: Handlers concretos (archivos estáticos y endpoints demo)
//! - `config`: Configuración desde CLI y variables de entorno
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use mini_http_server::config::Config;
//! use mini_http_server::server::Server;
//!
//! let server = Server::new(Config::default());
//! server.serve_static(&["/index.html"]);
//! server.run().expect("Error al iniciar servidor");
//! ```

pub mod commands;
pub mod config;
pub mod http;
pub mod router;
pub mod server;

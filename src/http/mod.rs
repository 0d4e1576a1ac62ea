//! # Módulo HTTP
//! src/http/mod.rs
//!
//! Implementa el subconjunto de HTTP/1.1 que necesita el servidor, sin usar
//! librerías de alto nivel:
//!
//! - Parsing de requests (request line, headers, body)
//! - Construcción de responses
//! - Códigos de estado
//! - Extracción de query parameters
//!
//! No hay conexiones persistentes ni chunked transfer encoding: cada
//! conexión atiende un único request y se cierra.
//!
//! ### Formato de Request
//!
//! ```text
//! POST /messages?user_id=7 HTTP/1.1\r\n
//! Host: localhost:9999\r\n
//! Content-Length: 5\r\n
//! \r\n
//! hello
//! ```

pub mod request;   // Parsing de HTTP requests
pub mod response;  // Construcción de HTTP responses
pub mod status;    // Códigos de estado HTTP

// Re-exportamos los tipos principales para facilitar su uso
pub use request::{ParseError, Request};
pub use response::{write_head, Response};
pub use status::StatusCode;

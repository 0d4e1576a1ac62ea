//! # Handlers del Servidor
//! src/commands/mod.rs
//!
//! Handlers concretos que se registran en el router:
//!
//! - **static_files**: Archivos estáticos bajo el directorio servido,
//!   con la plantilla `/classic.html`
//! - **query**: Endpoints de ejemplo de la aplicación (`/messages`,
//!   `/search`, `/filter`, ...)

pub mod query;
pub mod static_files;

pub use query::*;
pub use static_files::StaticFiles;

/// Paths que el binario sirve desde el directorio raíz
pub const STATIC_PATHS: &[&str] = &[
    "/index.html",
    "/spring.svg",
    "/spring.png",
    "/resources.html",
    "/styles.css",
    "/app.js",
    "/links.html",
    "/forms.html",
    "/classic.html",
    "/events.html",
    "/events.js",
    "/treug.jpg",
];

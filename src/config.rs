//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración desde argumentos CLI y variables de entorno. Solo hay dos
//! valores configurables desde fuera: el puerto y el directorio servido.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./mini_http_server --port 8080 --root ./site
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 PUBLIC_DIR=/srv/www ./mini_http_server
//! ```

use crate::server::pool::DEFAULT_POOL_SIZE;
use clap::Parser;
use std::path::PathBuf;

/// Host en el que escucha el servidor (todas las interfaces)
pub const BIND_HOST: &str = "0.0.0.0";

/// Configuración del servidor HTTP
#[derive(Debug, Clone, Parser)]
#[command(name = "mini_http_server")]
#[command(about = "Servidor HTTP/1.1 mínimo con archivos estáticos")]
#[command(version)]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "9999", env = "HTTP_PORT")]
    pub port: u16,

    /// Directorio desde el que se sirven los archivos estáticos
    #[arg(short, long, default_value = "./public", env = "PUBLIC_DIR")]
    pub root: PathBuf,

    /// Número de workers del pool (no expuesto en el CLI)
    #[arg(skip = DEFAULT_POOL_SIZE)]
    pub workers: usize,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use mini_http_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:9999");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", BIND_HOST, self.port)
    }

    /// Valida la configuración
    ///
    /// Un directorio raíz inexistente no es un error: los archivos se
    /// resuelven en cada request y simplemente darán 404.
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == 0 {
            return Err("Workers must be >= 1".to_string());
        }
        if self.root.as_os_str().is_empty() {
            return Err("Served root must not be empty".to_string());
        }
        Ok(())
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 9999,
            root: PathBuf::from("./public"),
            workers: DEFAULT_POOL_SIZE,
        }
    }
}

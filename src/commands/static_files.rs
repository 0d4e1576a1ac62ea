//! # Archivos Estáticos
//! src/commands/static_files.rs
//!
//! Sirve archivos desde un directorio raíz (por defecto `./public`).
//!
//! - El path del request se usa como sufijo relativo a la raíz
//! - El Content-Type se adivina por extensión; si no se conoce se usa
//!   `application/octet-stream`
//! - `/classic.html` es una plantilla: cada `{time}` se reemplaza por la
//!   hora actual antes de enviarla. El resto se copia byte a byte
//! - Nada se cachea: existencia y tipo se resuelven en cada request

use crate::http::{write_head, Request, Response, StatusCode};
use crate::router::Handler;
use log::debug;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

/// Body de la respuesta 404 para archivos inexistentes
pub const NOT_FOUND_BODY: &str = "File not found";

/// Único path que se trata como plantilla
pub const TEMPLATE_PATH: &str = "/classic.html";

/// Marcador que se sustituye en la plantilla
pub const TIME_PLACEHOLDER: &str = "{time}";

/// Content-Type cuando no se puede adivinar
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Handler que sirve archivos bajo un directorio raíz
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directorio raíz servido
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Traduce un path de request a un path en disco
    ///
    /// Retorna `None` si el path intenta salir de la raíz (`..`, rutas
    /// absolutas, prefijos de Windows).
    pub fn resolve(&self, request_path: &str) -> Option<PathBuf> {
        let relative = Path::new(request_path.trim_start_matches('/'));
        let mut resolved = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(resolved)
    }

    /// Escribe la respuesta completa para `request_path`
    pub fn serve(&self, request_path: &str, out: &mut dyn Write) -> io::Result<()> {
        let file_path = match self.resolve(request_path) {
            Some(path) => path,
            None => {
                debug!("Rejected path outside served root: {}", request_path);
                return not_found(out);
            }
        };

        let mut file = match File::open(&file_path) {
            Ok(file) => file,
            Err(e) => {
                debug!("Cannot open {}: {}", file_path.display(), e);
                return not_found(out);
            }
        };
        let metadata = file.metadata()?;
        if !metadata.is_file() {
            return not_found(out);
        }

        let content_type = probe_content_type(&file_path);

        if request_path == TEMPLATE_PATH {
            let template = fs::read(&file_path)?;
            let content = render_template(&String::from_utf8_lossy(&template));
            return Response::new(StatusCode::Ok)
                .with_content_type(content_type)
                .with_body(&content)
                .write_to(out);
        }

        write_head(out, StatusCode::Ok, content_type, metadata.len())?;
        io::copy(&mut file, out)?;
        out.flush()
    }
}

impl Handler for StaticFiles {
    fn handle(&self, request: &Request, out: &mut dyn Write) -> io::Result<()> {
        self.serve(request.path(), out)
    }
}

/// Content-Type según la extensión del archivo
pub fn probe_content_type(path: &Path) -> &'static str {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}

/// Sustituye cada `{time}` por la hora local actual
pub fn render_template(template: &str) -> String {
    let now = chrono::Local::now()
        .format("%Y-%m-%dT%H:%M:%S%.3f")
        .to_string();
    template.replace(TIME_PLACEHOLDER, &now)
}

fn not_found(out: &mut dyn Write) -> io::Result<()> {
    Response::text(StatusCode::NotFound, NOT_FOUND_BODY).write_to(out)
}

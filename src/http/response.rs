//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! Este módulo proporciona una API para construir respuestas HTTP/1.1
//! y escribirlas directamente en el socket.
//!
//! ## Formato de una respuesta
//!
//! Todas las respuestas llevan exactamente estos tres headers, en este orden:
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/plain\r\n
//! Content-Length: 5\r\n
//! Connection: close\r\n
//! \r\n
//! Hello
//! ```
//!
//! ## Ejemplo de uso
//!
//! ```
//! use mini_http_server::http::{Response, StatusCode};
//!
//! let response = Response::new(StatusCode::Ok)
//!     .with_content_type("text/html")
//!     .with_body("<h1>Hola</h1>");
//!
//! let mut out = Vec::new();
//! response.write_to(&mut out).unwrap();
//! assert!(out.starts_with(b"HTTP/1.1 200 OK\r\n"));
//! ```

use super::StatusCode;
use std::io::{self, Write};

/// Content-Type por defecto de las respuestas generadas por el servidor
pub const TEXT_PLAIN: &str = "text/plain";

/// Escribe el status line y los headers de una respuesta
///
/// Útil cuando el body se envía por separado (por ejemplo, un archivo
/// copiado directamente al socket). `content_length` debe coincidir con
/// los bytes que se escriban después.
pub fn write_head<W: Write + ?Sized>(
    out: &mut W,
    status: StatusCode,
    content_type: &str,
    content_length: u64,
) -> io::Result<()> {
    write!(
        out,
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status, content_type, content_length
    )
}

/// Representa una respuesta HTTP completa
#[derive(Debug, Clone)]
pub struct Response {
    /// Código de estado HTTP (200, 404, etc.)
    status: StatusCode,

    /// Valor del header Content-Type
    content_type: String,

    /// Cuerpo de la respuesta (puede ser vacío)
    body: Vec<u8>,
}

impl Response {
    /// Crea una nueva respuesta `text/plain` sin body
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            content_type: TEXT_PLAIN.to_string(),
            body: Vec::new(),
        }
    }

    /// Respuesta de texto plano con el body dado
    ///
    /// # Ejemplo
    /// ```
    /// use mini_http_server::http::{Response, StatusCode};
    ///
    /// let response = Response::text(StatusCode::NotFound, "File not found");
    /// assert_eq!(response.body(), b"File not found");
    /// ```
    pub fn text(status: StatusCode, body: &str) -> Self {
        Self::new(status).with_body(body)
    }

    /// Respuesta de error cuyo body es la reason phrase del código
    pub fn error(status: StatusCode) -> Self {
        Self::text(status, status.reason_phrase())
    }

    /// Cambia el Content-Type de la respuesta
    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = content_type.to_string();
        self
    }

    /// Establece el cuerpo de la respuesta desde un string
    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.as_bytes().to_vec();
        self
    }

    /// Establece el cuerpo de la respuesta desde bytes
    pub fn with_body_bytes(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Escribe la respuesta completa en `out` y hace flush
    ///
    /// El Content-Length se calcula siempre a partir del body en bytes.
    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        write_head(out, self.status, &self.content_type, self.body.len() as u64)?;
        out.write_all(&self.body)?;
        out.flush()
    }

    /// Convierte la respuesta a bytes listos para enviar por el socket
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(self.body.len() + 96);
        // Escribir en un Vec no puede fallar
        let _ = self.write_to(&mut result);
        result
    }

    /// Obtiene el código de estado de la respuesta
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Obtiene el Content-Type
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Obtiene una referencia al body
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_response() {
        let response = Response::new(StatusCode::Ok);
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.content_type(), "text/plain");
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_to_bytes_has_exact_headers() {
        let response = Response::new(StatusCode::Ok)
            .with_content_type("text/html")
            .with_body("Test");

        let text = String::from_utf8(response.to_bytes()).unwrap();
        assert_eq!(
            text,
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 4\r\nConnection: close\r\n\r\nTest"
        );
    }

    #[test]
    fn test_content_length_counts_bytes_not_chars() {
        let response = Response::text(StatusCode::Ok, "ñandú");
        let text = String::from_utf8(response.to_bytes()).unwrap();
        assert!(text.contains("Content-Length: 7\r\n"));
    }

    #[test]
    fn test_error_response_uses_reason_phrase() {
        let response = Response::error(StatusCode::MethodNotAllowed);
        assert_eq!(response.status(), StatusCode::MethodNotAllowed);
        assert_eq!(response.body(), b"Method Not Allowed");
    }

    #[test]
    fn test_empty_body_response() {
        let text = String::from_utf8(Response::new(StatusCode::NotFound).to_bytes()).unwrap();
        assert!(text.contains("Content-Length: 0\r\n"));
        assert!(text.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_write_head_only() {
        let mut out = Vec::new();
        write_head(&mut out, StatusCode::Ok, "image/png", 1024).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Content-Type: image/png\r\n"));
        assert!(text.contains("Content-Length: 1024\r\n"));
        assert!(text.ends_with("Connection: close\r\n\r\n"));
    }

    #[test]
    fn test_with_body_bytes() {
        let binary_data = vec![0x00, 0x01, 0x02, 0xFF];
        let response = Response::new(StatusCode::Ok).with_body_bytes(binary_data.clone());
        assert_eq!(response.body(), &binary_data[..]);
        assert!(response.to_bytes().ends_with(&binary_data));
    }
}

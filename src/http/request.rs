//! # Parsing de Requests HTTP/1.1
//! src/http/request.rs
//!
//! Parser incremental que lee un request directamente del socket.
//!
//! ## Formato de un Request
//!
//! ```text
//! GET /filter?category=books&tag=a&tag=b HTTP/1.1\r\n
//! Host: localhost:9999\r\n
//! Content-Length: 0\r\n
//! \r\n
//! ```
//!
//! ## Componentes
//!
//! 1. **Request Line**: `METHOD SP request-target SP version`, exactamente
//!    tres tokens separados por un espacio
//! 2. **Headers**: Pares `Name: Value` hasta la primera línea vacía. Las
//!    líneas sin `:` se descartan
//! 3. **Body**: Solo si `Content-Length` es un entero positivo; se leen
//!    exactamente esos bytes

use log::warn;
use std::collections::HashMap;
use std::io::{self, BufRead, Read};

/// Representa un request HTTP parseado
///
/// Es inmutable una vez construido y vive lo que dura la conexión.
#[derive(Debug, Clone)]
pub struct Request {
    /// Método HTTP tal cual llegó (ej: "GET")
    method: String,

    /// Path sin la parte de query (ej: "/filter")
    path: String,

    /// Query string cruda, sin el '?'
    query_string: Option<String>,

    /// Query parameters decodificados; un nombre puede repetirse
    query_params: HashMap<String, Vec<String>>,

    /// Headers con el nombre en minúsculas; el último duplicado gana
    headers: HashMap<String, String>,

    /// Versión HTTP (ej: "HTTP/1.1")
    version: String,

    /// Body del request
    body: Vec<u8>,
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug)]
pub enum ParseError {
    /// No se pudo leer ninguna request line (EOF o stream vacío)
    EmptyRequest,

    /// La request line no tiene exactamente tres tokens
    InvalidRequestLine(String),

    /// El peer cerró antes de enviar todo el body anunciado
    IncompleteBody { expected: usize, received: usize },

    /// Error de lectura del socket
    Io(io::Error),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::EmptyRequest => write!(f, "Empty request"),
            ParseError::InvalidRequestLine(line) => {
                write!(f, "Invalid request line format: {:?}", line)
            }
            ParseError::IncompleteBody { expected, received } => write!(
                f,
                "Incomplete body: expected {} bytes, received {}",
                expected, received
            ),
            ParseError::Io(e) => write!(f, "I/O error while reading request: {}", e),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ParseError {
    fn from(e: io::Error) -> Self {
        ParseError::Io(e)
    }
}

impl Request {
    /// Lee un request completo desde `reader`
    ///
    /// # Retorna
    ///
    /// * `Ok(Request)` - Request parseado exitosamente
    /// * `Err(ParseError::EmptyRequest)` - El peer no envió nada
    /// * `Err(ParseError::InvalidRequestLine)` - Request line malformada
    /// * `Err(ParseError::IncompleteBody)` - El body llegó truncado
    pub fn read_from<R: BufRead>(reader: &mut R) -> Result<Self, ParseError> {
        // 1. Request line
        let line = match read_line(reader)? {
            Some(line) if !line.is_empty() => line,
            _ => return Err(ParseError::EmptyRequest),
        };
        let (method, target, version) = Self::parse_request_line(&line)?;
        let (path, query_string) = match target.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (target.to_string(), None),
        };
        let query_params = query_string
            .as_deref()
            .map(parse_query_string)
            .unwrap_or_default();

        // 2. Headers, hasta línea vacía o EOF
        let mut headers = HashMap::new();
        while let Some(line) = read_line(reader)? {
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
            }
        }

        // 3. Body
        let body = match content_length(&headers) {
            Some(expected) => {
                let mut body = Vec::with_capacity(expected.min(64 * 1024));
                Read::take(&mut *reader, expected as u64).read_to_end(&mut body)?;
                if body.len() < expected {
                    return Err(ParseError::IncompleteBody {
                        expected,
                        received: body.len(),
                    });
                }
                body
            }
            None => Vec::new(),
        };

        Ok(Request {
            method: method.to_string(),
            path,
            query_string,
            query_params,
            headers,
            version: version.to_string(),
            body,
        })
    }

    /// Parsea un request desde un buffer en memoria
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use mini_http_server::http::Request;
    ///
    /// let raw = b"GET /search?q=rust&page=2 HTTP/1.1\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.path(), "/search");
    /// assert_eq!(request.query_param("q"), Some("rust"));
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        let mut reader = buffer;
        Self::read_from(&mut reader)
    }

    /// Divide la request line en (método, target, versión)
    ///
    /// Se separa por un único espacio: dos espacios seguidos producen un
    /// token vacío y la línea se considera inválida.
    fn parse_request_line(line: &str) -> Result<(&str, &str, &str), ParseError> {
        let parts: Vec<&str> = line.split(' ').collect();
        match parts.as_slice() {
            [method, target, version] => Ok((*method, *target, *version)),
            _ => Err(ParseError::InvalidRequestLine(line.to_string())),
        }
    }

    // === Métodos públicos para acceder a los campos ===

    /// Obtiene el método HTTP del request
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Obtiene el path del request
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Obtiene la query string cruda, si la hubo
    pub fn query_string(&self) -> Option<&str> {
        self.query_string.as_deref()
    }

    /// Obtiene todos los query parameters
    pub fn query_params(&self) -> &HashMap<String, Vec<String>> {
        &self.query_params
    }

    /// Obtiene el primer valor de un query parameter
    ///
    /// # Ejemplo
    /// ```
    /// use mini_http_server::http::Request;
    ///
    /// let request = Request::parse(b"GET /filter?tag=a&tag=b HTTP/1.1\r\n\r\n").unwrap();
    ///
    /// assert_eq!(request.query_param("tag"), Some("a"));
    /// assert_eq!(request.query_param("missing"), None);
    /// ```
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Obtiene todos los valores de un query parameter, en orden de llegada
    pub fn query_param_values(&self, name: &str) -> &[String] {
        self.query_params
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Obtiene todos los headers (nombres en minúsculas)
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene un header sin distinguir mayúsculas/minúsculas
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Obtiene la versión HTTP
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Obtiene el body del request
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Obtiene el body como texto (bytes inválidos se reemplazan)
    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Lee una línea terminada en `\n`, sin el `\r\n` final
///
/// Retorna `None` en EOF.
fn read_line<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }
    if buf.ends_with(b"\n") {
        buf.pop();
        if buf.ends_with(b"\r") {
            buf.pop();
        }
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

/// Longitud del body según `Content-Length`
///
/// Un valor que no es entero positivo equivale a "sin body".
fn content_length(headers: &HashMap<String, String>) -> Option<usize> {
    let raw = headers.get("content-length")?;
    match raw.parse::<usize>() {
        Ok(0) => None,
        Ok(len) => Some(len),
        Err(e) => {
            warn!("Invalid Content-Length {:?}: {}", raw, e);
            None
        }
    }
}

/// Parsea una query string en un mapa nombre → valores
///
/// Ejemplo: "tag=a&tag=b&debug"
/// Retorna: {"tag": ["a", "b"], "debug": [""]}
fn parse_query_string(query: &str) -> HashMap<String, Vec<String>> {
    let mut params: HashMap<String, Vec<String>> = HashMap::new();
    for (name, value) in form_urlencoded::parse(query.as_bytes()) {
        params
            .entry(name.into_owned())
            .or_default()
            .push(value.into_owned());
    }
    params
}

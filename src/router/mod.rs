//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Este módulo implementa el router que mapea (método, path) a handlers.
//!
//! ## Arquitectura
//!
//! ```text
//! Request → Router → Handler → Response (escrita en el socket)
//! ```
//!
//! La búsqueda es por igualdad exacta en ambas dimensiones, sin comodines
//! ni prefijos. Un fallo tiene dos niveles:
//!
//! - método sin ningún handler registrado → 405 Method Not Allowed
//! - método conocido pero path desconocido → 404 Not Found

use crate::http::{Request, StatusCode};
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::{Arc, PoisonError, RwLock};

/// Capacidad que atiende un request
///
/// Recibe el request parseado y el sink de salida, y es responsable de
/// escribir una respuesta HTTP completa (status line, headers, body) y
/// hacer flush.
///
/// Cualquier closure `Fn(&Request, &mut dyn Write) -> io::Result<()>`
/// es un handler:
///
/// ```
/// use mini_http_server::http::{Request, Response, StatusCode};
/// use mini_http_server::router::Router;
/// use std::io::Write;
///
/// let router = Router::new();
/// router.register("GET", "/hello", |_req: &Request, out: &mut dyn Write| {
///     Response::text(StatusCode::Ok, "hello").write_to(out)
/// });
/// assert!(router.resolve("GET", "/hello").is_ok());
/// ```
pub trait Handler: Send + Sync {
    fn handle(&self, request: &Request, out: &mut dyn Write) -> io::Result<()>;
}

impl<F> Handler for F
where
    F: Fn(&Request, &mut dyn Write) -> io::Result<()> + Send + Sync,
{
    fn handle(&self, request: &Request, out: &mut dyn Write) -> io::Result<()> {
        self(request, out)
    }
}

/// Motivo por el que no se encontró un handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMiss {
    /// Ningún handler registrado para el método
    MethodNotAllowed,

    /// El método existe pero no para este path
    NotFound,
}

impl RouteMiss {
    /// Código de estado con el que se responde
    pub fn status(&self) -> StatusCode {
        match self {
            RouteMiss::MethodNotAllowed => StatusCode::MethodNotAllowed,
            RouteMiss::NotFound => StatusCode::NotFound,
        }
    }
}

impl std::fmt::Display for RouteMiss {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.status().reason_phrase())
    }
}

impl std::error::Error for RouteMiss {}

type Routes = HashMap<String, HashMap<String, Arc<dyn Handler>>>;

/// Router que mapea (método, path) a handlers
///
/// Se comparte entre workers con `Arc<Router>`. El registro puede
/// intercalarse con búsquedas: el mapa va detrás de un `RwLock`.
pub struct Router {
    /// método → (path → handler)
    routes: RwLock<Routes>,
}

impl Router {
    /// Crea un nuevo router vacío
    pub fn new() -> Self {
        Self {
            routes: RwLock::new(HashMap::new()),
        }
    }

    /// Registra un handler para (método, path)
    ///
    /// Un registro posterior para el mismo par reemplaza al anterior.
    pub fn register<H>(&self, method: &str, path: &str, handler: H)
    where
        H: Handler + 'static,
    {
        self.register_arc(method, path, Arc::new(handler));
    }

    /// Igual que [`Router::register`] pero con un handler ya compartido
    pub fn register_arc(&self, method: &str, path: &str, handler: Arc<dyn Handler>) {
        let mut routes = self.routes.write().unwrap_or_else(PoisonError::into_inner);
        routes
            .entry(method.to_string())
            .or_default()
            .insert(path.to_string(), handler);
    }

    /// Busca el handler para (método, path)
    pub fn resolve(&self, method: &str, path: &str) -> Result<Arc<dyn Handler>, RouteMiss> {
        let routes = self.routes.read().unwrap_or_else(PoisonError::into_inner);
        let by_path = routes.get(method).ok_or(RouteMiss::MethodNotAllowed)?;
        by_path.get(path).cloned().ok_or(RouteMiss::NotFound)
    }

    /// Número total de rutas registradas
    pub fn len(&self) -> usize {
        let routes = self.routes.read().unwrap_or_else(PoisonError::into_inner);
        routes.values().map(HashMap::len).sum()
    }

    /// Verifica si no hay rutas registradas
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Response;
    use std::thread;

    fn reply(body: &'static str) -> impl Handler {
        move |_req: &Request, out: &mut dyn Write| Response::text(StatusCode::Ok, body).write_to(out)
    }

    fn call(router: &Router, method: &str, path: &str) -> Result<String, RouteMiss> {
        let handler = router.resolve(method, path)?;
        let request = Request::parse(format!("{} {} HTTP/1.1\r\n\r\n", method, path).as_bytes()).unwrap();
        let mut out = Vec::new();
        handler.handle(&request, &mut out).unwrap();
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_router_creation() {
        let router = Router::new();
        assert!(router.is_empty());
    }

    #[test]
    fn test_route_found() {
        let router = Router::new();
        router.register("GET", "/test", reply("test"));

        let text = call(&router, "GET", "/test").unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK"));
        assert!(text.ends_with("test"));
    }

    #[test]
    fn test_unknown_method_is_405() {
        let router = Router::new();
        router.register("GET", "/test", reply("test"));

        assert_eq!(call(&router, "DELETE", "/test").unwrap_err(), RouteMiss::MethodNotAllowed);
        assert_eq!(RouteMiss::MethodNotAllowed.status(), StatusCode::MethodNotAllowed);
    }

    #[test]
    fn test_unknown_path_is_404() {
        let router = Router::new();
        router.register("GET", "/test", reply("test"));

        assert_eq!(call(&router, "GET", "/nonexistent").unwrap_err(), RouteMiss::NotFound);
        assert_eq!(RouteMiss::NotFound.status(), StatusCode::NotFound);
    }

    #[test]
    fn test_exact_match_only() {
        let router = Router::new();
        router.register("GET", "/messages", reply("m"));

        assert_eq!(call(&router, "GET", "/messages/").unwrap_err(), RouteMiss::NotFound);
        assert_eq!(call(&router, "GET", "/Messages").unwrap_err(), RouteMiss::NotFound);
        assert_eq!(call(&router, "get", "/messages").unwrap_err(), RouteMiss::MethodNotAllowed);
    }

    #[test]
    fn test_same_path_different_methods() {
        let router = Router::new();
        router.register("GET", "/messages", reply("get"));
        router.register("POST", "/messages", reply("post"));

        assert!(call(&router, "GET", "/messages").unwrap().ends_with("get"));
        assert!(call(&router, "POST", "/messages").unwrap().ends_with("post"));
        assert_eq!(router.len(), 2);
    }

    #[test]
    fn test_last_registration_wins() {
        let router = Router::new();
        router.register("GET", "/test", reply("first"));
        router.register("GET", "/test", reply("second"));

        assert_eq!(router.len(), 1);
        assert!(call(&router, "GET", "/test").unwrap().ends_with("second"));
    }

    #[test]
    fn test_concurrent_register_and_resolve() {
        let router = Arc::new(Router::new());
        router.register("GET", "/base", reply("base"));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let router = Arc::clone(&router);
                thread::spawn(move || {
                    router.register("GET", &format!("/r{}", i), reply("r"));
                    for _ in 0..100 {
                        assert!(router.resolve("GET", "/base").is_ok());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(router.len(), 9);
    }
}

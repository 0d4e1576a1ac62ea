//! # Manejo de una Conexión
//! src/server/connection.rs
//!
//! Cada conexión aceptada atiende exactamente un request y se cierra:
//!
//! ```text
//! leer request → router → handler → flush → shutdown + close
//! ```
//!
//! - Sin request line (EOF) o body truncado: se cierra sin responder
//! - Request line malformada: 400 Bad Request
//! - Método o path no registrados: 405 / 404
//! - Un handler que falla (error de I/O o panic) no tumba al worker: se
//!   registra en el log y la conexión igual se cierra

use crate::http::{ParseError, Request, Response, StatusCode};
use crate::router::Router;
use log::{debug, error, warn};
use std::io::{self, BufReader, BufWriter, Write};
use std::net::{Shutdown, TcpStream};
use std::panic::{self, AssertUnwindSafe};

/// Atiende una conexión de principio a fin
///
/// Nunca propaga errores: todo se resuelve dentro del ciclo
/// request/response y se registra en el log.
pub fn handle_connection(stream: TcpStream, router: &Router) {
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    if let Err(e) = serve_one(&stream, router, &peer) {
        warn!("Connection error with {}: {}", peer, e);
    }

    if let Err(e) = stream.shutdown(Shutdown::Both) {
        // El peer puede haber cerrado primero
        if e.kind() != io::ErrorKind::NotConnected {
            warn!("Error closing connection with {}: {}", peer, e);
        }
    }
}

fn serve_one(stream: &TcpStream, router: &Router, peer: &str) -> io::Result<()> {
    let mut reader = BufReader::new(stream);
    let mut out = BufWriter::new(stream);

    let request = match Request::read_from(&mut reader) {
        Ok(request) => request,
        Err(ParseError::EmptyRequest) => {
            debug!("{} closed without sending a request", peer);
            return Ok(());
        }
        Err(ParseError::InvalidRequestLine(line)) => {
            debug!("Bad request line from {}: {:?}", peer, line);
            return Response::error(StatusCode::BadRequest).write_to(&mut out);
        }
        Err(e @ ParseError::IncompleteBody { .. }) => {
            debug!("Dropping request from {}: {}", peer, e);
            return Ok(());
        }
        Err(ParseError::Io(e)) => return Err(e),
    };

    debug!("{} {} {} from {}", request.method(), request.path(), request.version(), peer);

    let handler = match router.resolve(request.method(), request.path()) {
        Ok(handler) => handler,
        Err(miss) => {
            debug!("{} {} -> {}", request.method(), request.path(), miss.status());
            return Response::error(miss.status()).write_to(&mut out);
        }
    };

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        handler.handle(&request, &mut out)?;
        out.flush()
    }));
    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(
            "Handler for {} {} failed: {}",
            request.method(),
            request.path(),
            e
        ),
        Err(_) => error!(
            "Handler for {} {} panicked",
            request.method(),
            request.path()
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::TcpListener;
    use std::thread;

    fn ephemeral_listener() -> TcpListener {
        TcpListener::bind("127.0.0.1:0").expect("bind")
    }

    /// Atiende una sola conexión con `router` y retorna lo que recibe el cliente
    fn exchange(router: Router, raw: &[u8]) -> String {
        let listener = ephemeral_listener();
        let addr = listener.local_addr().unwrap();

        let t = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            handle_connection(stream, &router);
        });

        let mut client = TcpStream::connect(addr).unwrap();
        client.write_all(raw).unwrap();
        client.shutdown(Shutdown::Write).unwrap();

        let mut buf = Vec::new();
        client.read_to_end(&mut buf).unwrap();
        t.join().unwrap();
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn hello_router() -> Router {
        let router = Router::new();
        router.register("GET", "/hello", |req: &Request, out: &mut dyn Write| {
            let name = req.query_param("name").unwrap_or("world");
            Response::text(StatusCode::Ok, &format!("hello {}", name)).write_to(out)
        });
        router
    }

    #[test]
    fn test_handle_connection_ok() {
        let text = exchange(hello_router(), b"GET /hello?name=ana HTTP/1.1\r\nHost: x\r\n\r\n");

        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Connection: close\r\n"));
        assert!(text.ends_with("hello ana"));
    }

    #[test]
    fn test_handle_connection_not_found() {
        let text = exchange(hello_router(), b"GET /nope HTTP/1.1\r\n\r\n");

        assert!(text.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert_eq!(text.matches("HTTP/1.1").count(), 1);
    }

    #[test]
    fn test_handle_connection_method_not_allowed() {
        let text = exchange(hello_router(), b"DELETE /hello HTTP/1.1\r\n\r\n");

        assert!(text.starts_with("HTTP/1.1 405 Method Not Allowed\r\n"));
        assert!(text.contains("Content-Type: text/plain\r\n"));
        assert!(text.contains("Content-Length: 18\r\n"));
    }

    #[test]
    fn test_handle_connection_parse_error() {
        let text = exchange(hello_router(), b"GARBAGE\r\n");

        assert!(text.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(text.ends_with("Bad Request"));
    }

    #[test]
    fn test_handle_connection_peer_closed_immediately() {
        let text = exchange(hello_router(), b"");
        assert!(text.is_empty());
    }

    #[test]
    fn test_handle_connection_truncated_body() {
        let router = Router::new();
        router.register("POST", "/echo", |req: &Request, out: &mut dyn Write| {
            Response::new(StatusCode::Ok).with_body_bytes(req.body().to_vec()).write_to(out)
        });

        let text = exchange(router, b"POST /echo HTTP/1.1\r\nContent-Length: 50\r\n\r\nshort");
        assert!(text.is_empty());
    }

    #[test]
    fn test_handle_connection_body_is_passed_to_handler() {
        let router = Router::new();
        router.register("POST", "/echo", |req: &Request, out: &mut dyn Write| {
            Response::new(StatusCode::Ok).with_body_bytes(req.body().to_vec()).write_to(out)
        });

        let text = exchange(router, b"POST /echo HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello");
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.ends_with("\r\n\r\nhello"));
    }

    #[test]
    fn test_handler_error_still_closes() {
        let router = Router::new();
        router.register("GET", "/fail", |_req: &Request, _out: &mut dyn Write| -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "backend down"))
        });

        let text = exchange(router, b"GET /fail HTTP/1.1\r\n\r\n");
        assert!(text.is_empty());
    }

    #[test]
    fn test_handler_panic_still_closes() {
        let router = Router::new();
        router.register("GET", "/panic", |_req: &Request, _out: &mut dyn Write| -> io::Result<()> {
            panic!("handler bug")
        });

        let text = exchange(router, b"GET /panic HTTP/1.1\r\n\r\n");
        assert!(text.is_empty());
    }
}

//! # Handlers de la Aplicación
//! src/commands/query.rs
//!
//! Endpoints de ejemplo que registra el binario. Todos responden 200 y
//! muestran cómo leer query parameters (incluidos los repetidos) y el body:
//! - GET /: Bienvenida y lista de endpoints
//! - GET /messages: Eco de `last`, `limit`, `sort`
//! - GET /search: Eco de `q`, `page`, `per_page`
//! - GET /filter: Todas las `category` y `tag` (JSON)
//! - POST /messages: Eco de `user_id`, `action` y el body

use crate::http::{Request, Response, StatusCode};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::{self, Write};

/// Query parameters ordenados por nombre, para una salida estable
fn sorted_params(req: &Request) -> BTreeMap<&str, &[String]> {
    req.query_params()
        .iter()
        .map(|(name, values)| (name.as_str(), values.as_slice()))
        .collect()
}

/// Query parameters como JSON: `{"tag": ["a", "b"]}`
pub fn params_json(req: &Request) -> String {
    serde_json::to_string(&sorted_params(req)).unwrap_or_else(|_| "{}".to_string())
}

fn reply_text(out: &mut dyn Write, body: &str) -> io::Result<()> {
    Response::text(StatusCode::Ok, body).write_to(out)
}

/// Handler para GET /
pub fn index_handler(req: &Request, out: &mut dyn Write) -> io::Result<()> {
    let mut body = String::from(
        "Welcome!\n\
         Available endpoints:\n\
         - GET /messages?last=10&limit=5\n\
         - GET /search?q=rust&page=1\n\
         - GET /filter?category=books&category=electronics&tag=sale\n\
         - POST /messages?user_id=123&action=create\n\n",
    );
    if req.query_params().is_empty() {
        body.push_str("Try adding query parameters to the URL!");
    } else {
        let _ = write!(body, "Your query parameters: {}", params_json(req));
    }
    reply_text(out, &body)
}

/// Handler para GET /messages?last=N&limit=N&sort=FIELD
pub fn messages_handler(req: &Request, out: &mut dyn Write) -> io::Result<()> {
    let mut body = String::from("GET messages handler\n");
    let _ = writeln!(body, "Time: {}", chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"));

    if let Some(last) = req.query_param("last") {
        let _ = writeln!(body, "Last messages: {}", last);
    }
    if let Some(limit) = req.query_param("limit") {
        let _ = writeln!(body, "Limit: {}", limit);
    }
    if let Some(sort) = req.query_param("sort") {
        let _ = writeln!(body, "Sort by: {}", sort);
    }
    let _ = writeln!(body, "All query params: {}", params_json(req));

    let limits = req.query_param_values("limit");
    if !limits.is_empty() {
        let _ = writeln!(body, "All limit values: {:?}", limits);
    }
    reply_text(out, &body)
}

/// Handler para GET /search?q=TEXT&page=N&per_page=N
pub fn search_handler(req: &Request, out: &mut dyn Write) -> io::Result<()> {
    let body = match req.query_param("q") {
        Some(query) => {
            let mut body = format!("Search results for: '{}'\n", query);
            if let Some(page) = req.query_param("page") {
                let _ = writeln!(body, "Page: {}", page);
            }
            if let Some(per_page) = req.query_param("per_page") {
                let _ = writeln!(body, "Results per page: {}", per_page);
            }
            let _ = write!(body, "All params: {}", params_json(req));
            body
        }
        None => "Please provide the q parameter\nExample: /search?q=rust&page=1&per_page=10".to_string(),
    };
    reply_text(out, &body)
}

#[derive(Debug, Serialize)]
struct FilterSummary<'a> {
    categories: &'a [String],
    tags: &'a [String],
    params: BTreeMap<&'a str, &'a [String]>,
}

/// Handler para GET /filter?category=A&category=B&tag=C
pub fn filter_handler(req: &Request, out: &mut dyn Write) -> io::Result<()> {
    let summary = FilterSummary {
        categories: req.query_param_values("category"),
        tags: req.query_param_values("tag"),
        params: sorted_params(req),
    };
    let body = serde_json::to_string(&summary).map_err(io::Error::from)?;
    Response::text(StatusCode::Ok, &body)
        .with_content_type("application/json")
        .write_to(out)
}

/// Handler para POST /messages?user_id=ID&action=NAME
pub fn post_messages_handler(req: &Request, out: &mut dyn Write) -> io::Result<()> {
    let mut body = String::from("POST messages handler\n");
    if let Some(user_id) = req.query_param("user_id") {
        let _ = writeln!(body, "User ID: {}", user_id);
    }
    if let Some(action) = req.query_param("action") {
        let _ = writeln!(body, "Action: {}", action);
    }
    let _ = writeln!(body, "Body: {}", req.body_string());
    let _ = write!(body, "Query params: {}", params_json(req));
    reply_text(out, &body)
}

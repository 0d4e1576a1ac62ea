//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Un thread dedicado acepta conexiones y las entrega a un pool de workers
//! de tamaño fijo; cada conexión se procesa en un worker.
//!
//! No hay timeouts de lectura/escritura: un cliente que no envía nada
//! ocupa su worker indefinidamente. Con el pool por defecto (64) eso solo
//! afecta a las demás conexiones cuando todos los workers están ocupados.

use super::connection::handle_connection;
use super::pool::WorkerPool;
use crate::commands::StaticFiles;
use crate::config::Config;
use crate::router::{Handler, Router};
use log::{debug, error, info, warn};
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Servidor HTTP con router propio
pub struct Server {
    config: Config,
    router: Arc<Router>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            router: Arc::new(Router::new()),
        }
    }

    /// Configuración con la que se creó el servidor
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Router compartido con los workers
    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    /// Registra un handler para (método, path)
    pub fn add_handler<H>(&self, method: &str, path: &str, handler: H)
    where
        H: Handler + 'static,
    {
        self.router.register(method, path, handler);
    }

    /// Registra cada path como `GET` servido desde el directorio raíz
    pub fn serve_static<S: AsRef<str>>(&self, paths: &[S]) {
        let files: Arc<dyn Handler> = Arc::new(StaticFiles::new(self.config.root.clone()));
        for path in paths {
            self.router.register_arc("GET", path.as_ref(), Arc::clone(&files));
        }
    }

    /// Hace bind del puerto y empieza a aceptar conexiones en otro thread
    ///
    /// Un error aquí (puerto ocupado, sin permisos) es fatal para el
    /// servidor y se retorna tal cual; no se reintenta.
    pub fn start(&self) -> io::Result<ServerHandle> {
        let address = self.config.address();
        info!("Starting server on {}", address);

        let listener = TcpListener::bind(&address)?;
        let local_addr = listener.local_addr()?;
        let pool = WorkerPool::new(self.config.workers)?;

        info!(
            "Listening on {} with {} workers, serving {}",
            local_addr,
            pool.size(),
            self.config.root.display()
        );

        let running = Arc::new(AtomicBool::new(true));
        let accept_thread = thread::Builder::new().name("accept".to_string()).spawn({
            let router = Arc::clone(&self.router);
            let running = Arc::clone(&running);
            move || accept_loop(listener, router, pool, running)
        })?;

        Ok(ServerHandle {
            local_addr,
            running,
            accept_thread: Some(accept_thread),
        })
    }

    /// Igual que [`Server::start`] pero bloquea hasta que el servidor se detenga
    pub fn run(&self) -> io::Result<()> {
        self.start()?.wait();
        Ok(())
    }
}

/// Acepta conexiones hasta que `running` pasa a `false`
fn accept_loop(listener: TcpListener, router: Arc<Router>, mut pool: WorkerPool, running: Arc<AtomicBool>) {
    for stream in listener.incoming() {
        if !running.load(Ordering::SeqCst) {
            break;
        }
        match stream {
            Ok(stream) => {
                let router = Arc::clone(&router);
                if let Err(e) = pool.execute(move || handle_connection(stream, &router)) {
                    warn!("Dropping connection: {}", e);
                }
            }
            Err(e) => {
                error!("Error accepting connection: {}", e);
            }
        }
    }

    drop(listener);
    info!("Listener closed, waiting for in-flight connections");
    pool.shutdown();
    info!("Server stopped");
}

/// Control de un servidor en marcha
pub struct ServerHandle {
    local_addr: SocketAddr,
    running: Arc<AtomicBool>,
    accept_thread: Option<JoinHandle<()>>,
}

impl ServerHandle {
    /// Dirección real del listener (útil con puerto 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Dirección para conectarse localmente al servidor
    ///
    /// Si el listener escucha en todas las interfaces se usa loopback.
    pub fn loopback_addr(&self) -> SocketAddr {
        SocketAddr::new(loopback_for(self.local_addr.ip()), self.local_addr.port())
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Detiene el servidor
    ///
    /// Deja de aceptar conexiones y cierra el listener. Las conexiones ya
    /// aceptadas terminan normalmente; [`ServerHandle::wait`] espera por ellas.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        // accept() está bloqueado: una conexión local lo despierta
        let wake_addr = self.loopback_addr();
        if let Err(e) = TcpStream::connect(wake_addr) {
            debug!("Wake-up connection to {} failed: {}", wake_addr, e);
        }
    }

    /// Espera a que el thread de accept y todos los workers terminen
    pub fn wait(mut self) {
        if let Some(handle) = self.accept_thread.take() {
            if handle.join().is_err() {
                error!("Accept thread panicked");
            }
        }
    }
}

fn loopback_for(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V4(v4) if v4.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(v6) if v6.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        other => other,
    }
}

use may::coroutine::JoinHandle;
use may_minihttp::{HttpServerWithHeaders, HttpService};
use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

/// Maximum request headers accepted per request.
pub const MAX_HEADERS: usize = 32;

/// Listener wrapper around `may_minihttp`.
pub struct HttpServer<T>(pub T);

/// Handle to a running listener.
pub struct ServerHandle {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ServerHandle {
    /// The bound address, with the real port when started on port 0.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Poll until the listener accepts connections.
    ///
    /// # Errors
    ///
    /// `TimedOut` if it does not come up within `timeout`.
    pub fn wait_ready_for(&self, timeout: Duration) -> io::Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if TcpStream::connect(self.addr).is_ok() {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(5));
        }
        Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"))
    }

    /// [`Self::wait_ready_for`] with a one second budget.
    ///
    /// # Errors
    ///
    /// `TimedOut` if the listener does not come up.
    pub fn wait_ready(&self) -> io::Result<()> {
        self.wait_ready_for(Duration::from_secs(1))
    }

    /// Cancel the listener coroutine and wait for it.
    pub fn stop(self) {
        // SAFETY: cancel() is unsafe in the may runtime. The handle is owned here,
        // so the coroutine is still valid, and nothing else relies on it running.
        unsafe {
            self.handle.coroutine().cancel();
        }
        let _ = self.handle.join();
        info!(addr = %self.addr, "Server stopped");
    }

    /// Block until the listener coroutine exits.
    ///
    /// # Errors
    ///
    /// Returns the panic payload if the listener panicked.
    pub fn join(self) -> std::thread::Result<()> {
        self.handle.join()
    }
}

impl<T: HttpService + Clone + Send + Sync + 'static> HttpServer<T> {
    /// Bind `addr` and start serving.
    ///
    /// Port 0 is resolved to a free port first, so [`ServerHandle::addr`]
    /// always reports a connectable address.
    ///
    /// # Errors
    ///
    /// Fails if the address does not resolve or cannot be bound.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let mut addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid address"))?;
        if addr.port() == 0 {
            addr = TcpListener::bind(addr)?.local_addr()?;
        }
        let handle = HttpServerWithHeaders::<_, MAX_HEADERS>(self.0).start(addr)?;
        info!(addr = %addr, max_headers = MAX_HEADERS, "Server listening");
        Ok(ServerHandle { addr, handle })
    }
}

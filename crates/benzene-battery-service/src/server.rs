//! Unix socket server
//!
//! The listener accepts without blocking so the shutdown flag is seen between
//! connections. Every connection gets a thread that only does framing; the
//! calls themselves run on a fixed pool of workers, one request per job, so
//! an idle client never holds a worker.

use benzene_battery_aidl::transport::{read_request, write_reply};
use benzene_battery_aidl::{BatteryStub, IBattery};
use std::io::{self, ErrorKind};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Sleep between accept attempts when no client is waiting
const ACCEPT_POLL: Duration = Duration::from_millis(50);

/// Read timeout on idle connections, after which the shutdown flag is checked
const IDLE_POLL: Duration = Duration::from_millis(250);

/// One decoded request waiting for a worker
struct Job {
    code: u32,
    data: Vec<u8>,
    reply: Sender<Vec<u8>>,
}

pub struct Server<S> {
    listener: UnixListener,
    path: PathBuf,
    stub: BatteryStub<S>,
    workers: usize,
}

impl<S: IBattery> Server<S> {
    /// Bind the service socket, replacing a stale one
    pub fn bind(path: &Path, service: S, workers: usize) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if path.exists() {
            debug!("Removing stale socket {}", path.display());
            std::fs::remove_file(path)?;
        }

        let listener = UnixListener::bind(path)?;
        listener.set_nonblocking(true)?;

        Ok(Self {
            listener,
            path: path.to_path_buf(),
            stub: BatteryStub::new(service),
            workers: workers.max(1),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn service(&self) -> &S {
        self.stub.service()
    }

    /// Serve until `shutdown` is set
    ///
    /// Returns once the listener has stopped, every connection has noticed the
    /// flag or hung up, and every in-flight call has been answered. A fatal
    /// accept error sets `shutdown` so connections wind down before it is
    /// returned.
    pub fn serve(&self, shutdown: &AtomicBool) -> io::Result<()> {
        info!(
            "Serving {} with {} worker(s)",
            self.path.display(),
            self.workers
        );
        let (jobs, rx) = mpsc::channel();
        let rx = Mutex::new(rx);

        thread::scope(|scope| {
            for id in 0..self.workers {
                let rx = &rx;
                scope.spawn(move || self.worker(id, rx));
            }

            let result = loop {
                if shutdown.load(Ordering::SeqCst) {
                    break Ok(());
                }
                match self.listener.accept() {
                    Ok((stream, _)) => {
                        if let Err(e) = prepare(&stream) {
                            warn!("Dropping connection: {}", e);
                            continue;
                        }
                        debug!("Accepted connection");
                        let jobs = jobs.clone();
                        scope.spawn(move || self.connection(stream, &jobs, shutdown));
                    }
                    Err(e) if e.kind() == ErrorKind::WouldBlock => thread::sleep(ACCEPT_POLL),
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => {
                        error!("Accept failed: {}", e);
                        shutdown.store(true, Ordering::SeqCst);
                        break Err(e);
                    }
                }
            };

            // Workers stop once the last connection drops its sender
            drop(jobs);
            result
        })?;

        info!("Server stopped");
        Ok(())
    }

    fn worker(&self, id: usize, rx: &Mutex<Receiver<Job>>) {
        loop {
            let next = match rx.lock() {
                Ok(rx) => rx.recv(),
                Err(_) => break,
            };
            let Ok(job) = next else { break };
            let reply = self.stub.on_transact(job.code, &job.data);
            // The connection may have gone away meanwhile
            let _ = job.reply.send(reply);
        }
        debug!("Worker {} exiting", id);
    }

    fn connection(&self, mut stream: UnixStream, jobs: &Sender<Job>, shutdown: &AtomicBool) {
        let (reply_tx, replies) = mpsc::channel();
        loop {
            match read_request(&mut stream) {
                Ok(Some((code, data))) => {
                    let job = Job {
                        code,
                        data,
                        reply: reply_tx.clone(),
                    };
                    if jobs.send(job).is_err() {
                        warn!("No workers left, closing connection");
                        return;
                    }
                    let Ok(reply) = replies.recv() else {
                        warn!("Worker dropped transaction {}", code);
                        return;
                    };
                    if let Err(e) = write_reply(&mut stream, &reply) {
                        warn!("Failed to write reply: {}", e);
                        return;
                    }
                }
                Ok(None) => {
                    debug!("Client disconnected");
                    return;
                }
                Err(e) if is_timeout(&e) => {
                    if shutdown.load(Ordering::SeqCst) {
                        return;
                    }
                }
                Err(e) => {
                    warn!("Dropping connection: {}", e);
                    return;
                }
            }
        }
    }
}

fn prepare(stream: &UnixStream) -> io::Result<()> {
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(IDLE_POLL))
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}

impl<S> Drop for Server<S> {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

use std::os::unix::net::UnixStream;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use bytes::Bytes;
use tracing::{debug, info, warn};

use mailslot_core::{SlotHandle, SlotRegistry};
use mailslot_wire::{Request, Response, SessionError, WireError, WireReader, WireWriter};

use crate::error::Result;
use crate::transport::{TransportError, UdsListener};

/// Relay server: hosts an injected registry behind a Unix domain socket.
///
/// Each accepted connection runs as its own session thread and owns at most
/// one [`SlotHandle`], created by the session's Open request and dropped on
/// disconnect (release). Relay errors are answered as `Err` frames and keep
/// the session alive; transport errors end it.
pub struct RelayServer {
    listener: UdsListener,
    registry: Arc<SlotRegistry>,
}

impl RelayServer {
    /// Bind to `path`, serving the given registry.
    pub fn bind(path: impl AsRef<Path>, registry: Arc<SlotRegistry>) -> Result<Self> {
        let listener = UdsListener::bind(path)?;
        Ok(Self { listener, registry })
    }

    /// The socket path this server is bound to.
    pub fn path(&self) -> &Path {
        self.listener.path()
    }

    pub fn registry(&self) -> &Arc<SlotRegistry> {
        &self.registry
    }

    /// Accept and serve connections until `running` is cleared.
    ///
    /// The flag is re-checked between accepts; an in-flight session runs to
    /// disconnect on its own thread.
    pub fn run(&self, running: &AtomicBool) -> Result<()> {
        info!(path = ?self.listener.path(), "relay server running");
        while running.load(Ordering::SeqCst) {
            let stream = match self.listener.accept() {
                Ok(stream) => stream,
                Err(err) => {
                    if !running.load(Ordering::SeqCst) {
                        break;
                    }
                    return Err(err);
                }
            };

            let registry = Arc::clone(&self.registry);
            thread::spawn(move || serve_session(registry, stream));
        }
        Ok(())
    }
}

fn serve_session(registry: Arc<SlotRegistry>, stream: UnixStream) {
    let write_half = match stream.try_clone() {
        Ok(cloned) => cloned,
        Err(err) => {
            warn!(error = %TransportError::Io(err), "failed to clone session stream");
            return;
        }
    };
    let mut reader = WireReader::new(stream);
    let mut writer = WireWriter::new(write_half);

    // The session's relay handle. None until the client sends Open; dropped
    // when the session ends, which releases the handle without touching any
    // pending message.
    let mut handle: Option<SlotHandle> = None;

    loop {
        let request = match reader.read_request() {
            Ok(request) => request,
            Err(WireError::ConnectionClosed) => {
                debug!("session disconnected");
                return;
            }
            Err(err) => {
                warn!(error = %err, "session read failed");
                return;
            }
        };

        let response = dispatch(&registry, &mut handle, request);
        if let Err(err) = writer.write_response(&response) {
            warn!(error = %err, "session write failed");
            return;
        }
    }
}

/// Apply one request to the session state and produce its response.
fn dispatch(
    registry: &SlotRegistry,
    handle: &mut Option<SlotHandle>,
    request: Request,
) -> Response {
    match request {
        Request::Open { instance } => match registry.open(instance) {
            Ok(opened) => {
                *handle = Some(opened);
                Response::ok_empty()
            }
            Err(err) => Response::Err(SessionError::Relay(err)),
        },
        Request::Select { channel } => {
            let Some(handle) = handle.as_mut() else {
                return Response::Err(SessionError::NotOpened);
            };
            match handle.select(channel) {
                Ok(()) => Response::ok_empty(),
                Err(err) => Response::Err(SessionError::Relay(err)),
            }
        }
        Request::Send { payload } => {
            let Some(handle) = handle.as_ref() else {
                return Response::Err(SessionError::NotOpened);
            };
            match handle.send(&payload) {
                Ok(accepted) => Response::Ok {
                    payload: Bytes::copy_from_slice(&(accepted as u32).to_le_bytes()),
                },
                Err(err) => Response::Err(SessionError::Relay(err)),
            }
        }
        Request::Recv { max_len } => {
            let Some(handle) = handle.as_ref() else {
                return Response::Err(SessionError::NotOpened);
            };
            match handle.recv(max_len as usize) {
                Ok(message) => Response::Ok {
                    payload: Bytes::from(message),
                },
                Err(err) => Response::Err(SessionError::Relay(err)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailslot_core::RelayError;

    fn fresh_session() -> (Arc<SlotRegistry>, Option<SlotHandle>) {
        (Arc::new(SlotRegistry::with_defaults()), None)
    }

    #[test]
    fn requests_before_open_are_rejected() {
        let (registry, mut handle) = fresh_session();
        for request in [
            Request::Select { channel: 1 },
            Request::Send {
                payload: Bytes::from_static(b"x"),
            },
            Request::Recv { max_len: 128 },
        ] {
            assert_eq!(
                dispatch(&registry, &mut handle, request),
                Response::Err(SessionError::NotOpened)
            );
        }
    }

    #[test]
    fn open_select_send_recv_sequence() {
        let (registry, mut handle) = fresh_session();

        assert_eq!(
            dispatch(&registry, &mut handle, Request::Open { instance: 0 }),
            Response::ok_empty()
        );
        assert_eq!(
            dispatch(&registry, &mut handle, Request::Select { channel: 42 }),
            Response::ok_empty()
        );
        assert_eq!(
            dispatch(
                &registry,
                &mut handle,
                Request::Send {
                    payload: Bytes::from_static(b"hello"),
                }
            ),
            Response::Ok {
                payload: Bytes::copy_from_slice(&5u32.to_le_bytes()),
            }
        );
        assert_eq!(
            dispatch(&registry, &mut handle, Request::Recv { max_len: 128 }),
            Response::Ok {
                payload: Bytes::from_static(b"hello"),
            }
        );
    }

    #[test]
    fn relay_errors_become_err_frames() {
        let (registry, mut handle) = fresh_session();
        dispatch(&registry, &mut handle, Request::Open { instance: 0 });

        assert_eq!(
            dispatch(&registry, &mut handle, Request::Select { channel: 0 }),
            Response::Err(SessionError::Relay(RelayError::InvalidChannel))
        );
        assert_eq!(
            dispatch(&registry, &mut handle, Request::Recv { max_len: 128 }),
            Response::Err(SessionError::Relay(RelayError::NotSelected))
        );

        dispatch(&registry, &mut handle, Request::Select { channel: 7 });
        assert_eq!(
            dispatch(&registry, &mut handle, Request::Recv { max_len: 128 }),
            Response::Err(SessionError::Relay(RelayError::NoMessage))
        );
    }

    #[test]
    fn reopen_replaces_the_session_handle() {
        let (registry, mut handle) = fresh_session();
        dispatch(&registry, &mut handle, Request::Open { instance: 0 });
        dispatch(&registry, &mut handle, Request::Select { channel: 9 });

        // A later Open rebinds the session to another instance; the new
        // handle starts unselected.
        dispatch(&registry, &mut handle, Request::Open { instance: 1 });
        assert_eq!(
            dispatch(
                &registry,
                &mut handle,
                Request::Send {
                    payload: Bytes::from_static(b"x"),
                }
            ),
            Response::Err(SessionError::Relay(RelayError::NotSelected))
        );
    }

    #[test]
    fn two_sessions_share_one_registry() {
        let registry = Arc::new(SlotRegistry::with_defaults());
        let mut session_a: Option<SlotHandle> = None;
        let mut session_b: Option<SlotHandle> = None;

        dispatch(&registry, &mut session_a, Request::Open { instance: 0 });
        dispatch(&registry, &mut session_a, Request::Select { channel: 42 });
        dispatch(
            &registry,
            &mut session_a,
            Request::Send {
                payload: Bytes::from_static(b"from A"),
            },
        );

        dispatch(&registry, &mut session_b, Request::Open { instance: 0 });
        dispatch(&registry, &mut session_b, Request::Select { channel: 42 });
        assert_eq!(
            dispatch(&registry, &mut session_b, Request::Recv { max_len: 128 }),
            Response::Ok {
                payload: Bytes::from_static(b"from A"),
            }
        );
    }
}

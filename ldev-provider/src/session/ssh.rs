use super::{Connector, ExecResult, Session};
use crate::target::RemoteTarget;
use ldev_core::error::{LdevError, Result};
use ssh2::{ExtendedData, Sftp};
use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

const READ_CHUNK: usize = 8192;

/// Opens public-key authenticated sessions with libssh2.
#[derive(Debug, Clone, Default)]
pub struct SshConnector;

impl Connector for SshConnector {
    fn connect(&self, target: &RemoteTarget, timeout: Duration) -> Result<Box<dyn Session>> {
        let tcp = connect_tcp(&target.host, target.port, timeout)?;

        let mut session = ssh2::Session::new().map_err(|e| remote_error(&target.host, e))?;
        session.set_tcp_stream(tcp);
        session.set_timeout(timeout_millis(timeout));
        session
            .handshake()
            .map_err(|e| remote_error(&target.host, e))?;

        if let Err(e) =
            session.userauth_pubkey_file(&target.user, None, &target.identity_file, None)
        {
            return Err(LdevError::AuthenticationFailed {
                user: target.user.clone(),
                host: target.host.clone(),
                log: auth_log(&session, target, &e.to_string()),
            });
        }
        if !session.authenticated() {
            return Err(LdevError::AuthenticationFailed {
                user: target.user.clone(),
                host: target.host.clone(),
                log: auth_log(&session, target, "server did not accept the key"),
            });
        }

        info!(target = %target.address(), "ssh session established");
        Ok(Box::new(SshSession {
            session,
            host: target.host.clone(),
            sftp: None,
        }))
    }
}

/// An authenticated ssh session. Each command gets its own channel.
pub struct SshSession {
    session: ssh2::Session,
    host: String,
    sftp: Option<Sftp>,
}

impl SshSession {
    fn sftp(&mut self) -> Result<&Sftp> {
        let sftp = match self.sftp.take() {
            Some(sftp) => sftp,
            None => self
                .session
                .sftp()
                .map_err(|e| remote_error(&self.host, e))?,
        };
        Ok(self.sftp.insert(sftp))
    }
}

impl Session for SshSession {
    fn execute(&mut self, command: &str, mut sink: Option<&mut dyn Write>) -> Result<ExecResult> {
        let host = self.host.clone();
        let mut channel = self
            .session
            .channel_session()
            .map_err(|e| remote_error(&host, e))?;
        channel
            .handle_extended_data(ExtendedData::Merge)
            .map_err(|e| remote_error(&host, e))?;
        channel.exec(command).map_err(|e| remote_error(&host, e))?;

        let mut captured = Vec::new();
        let mut buf = [0u8; READ_CHUNK];
        let mut timed_out = false;
        loop {
            match channel.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => match sink.as_deref_mut() {
                    Some(out) => {
                        out.write_all(&buf[..n])?;
                        out.flush()?;
                    }
                    None => captured.extend_from_slice(&buf[..n]),
                },
                Err(e) if e.kind() == io::ErrorKind::TimedOut => {
                    warn!(host = %host, command, "remote command timed out");
                    timed_out = true;
                    break;
                }
                Err(e) => return Err(remote_io_error(&host, e)),
            }
        }

        let exit_status = if timed_out {
            -1
        } else {
            channel.wait_close().map_err(|e| remote_error(&host, e))?;
            channel.exit_status().map_err(|e| remote_error(&host, e))?
        };
        debug!(host = %host, exit_status, "remote command finished");

        let output = String::from_utf8_lossy(&captured);
        let output = output.strip_suffix('\n').unwrap_or(&output);
        Ok(ExecResult {
            output: output.strip_suffix('\r').unwrap_or(output).to_string(),
            timed_out,
            exit_status,
        })
    }

    fn read_file(&mut self, path: &str) -> Result<String> {
        let host = self.host.clone();
        let mut file = self
            .sftp()?
            .open(Path::new(path))
            .map_err(|e| remote_error(&host, e))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| remote_io_error(&host, e))?;
        Ok(contents)
    }

    fn write_file(&mut self, path: &str, contents: &str) -> Result<()> {
        let host = self.host.clone();
        let mut file = self
            .sftp()?
            .create(Path::new(path))
            .map_err(|e| remote_error(&host, e))?;
        file.write_all(contents.as_bytes())
            .map_err(|e| remote_io_error(&host, e))?;
        Ok(())
    }
}

fn connect_tcp(host: &str, port: u16, timeout: Duration) -> Result<TcpStream> {
    let socket_error = |e: io::Error| LdevError::Socket {
        host: host.to_string(),
        port,
        code: e.raw_os_error().unwrap_or(0),
        message: e.to_string(),
    };

    let mut last_err = None;
    for addr in (host, port).to_socket_addrs().map_err(socket_error)? {
        let attempt = if timeout.is_zero() {
            TcpStream::connect(addr)
        } else {
            TcpStream::connect_timeout(&addr, timeout)
        };
        match attempt {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                debug!(%addr, error = %e, "tcp connect failed");
                last_err = Some(e);
            }
        }
    }

    Err(socket_error(last_err.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "host resolved to no addresses")
    })))
}

/// libssh2 takes milliseconds as u32, with 0 meaning no limit.
fn timeout_millis(timeout: Duration) -> u32 {
    u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX)
}

fn remote_error(host: &str, err: ssh2::Error) -> LdevError {
    LdevError::RemoteExecution {
        host: host.to_string(),
        message: err.to_string(),
    }
}

fn remote_io_error(host: &str, err: io::Error) -> LdevError {
    LdevError::RemoteExecution {
        host: host.to_string(),
        message: err.to_string(),
    }
}

fn auth_log(session: &ssh2::Session, target: &RemoteTarget, reason: &str) -> String {
    let methods = session
        .auth_methods(&target.user)
        .map(str::to_string)
        .unwrap_or_else(|_| "unknown".to_string());
    format!(
        "publickey {} rejected: {}; server allows: {}",
        target.identity_file.display(),
        reason,
        methods
    )
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Hornet - Embeddable Logic Query Server
// Copyright (C) 2026 Sushanth Reddy Vanagala (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Stream and listener abstraction over the two endpoint kinds: loopback
//! TCP and Unix-domain sockets. The communication worker is the only
//! reader and the only writer of a [`Socket`]; clones exist solely so the
//! supervisor can `shutdown` a connection from outside.

use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
#[cfg(unix)]
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// One accepted client connection.
#[derive(Debug)]
pub enum Socket {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(UnixStream),
}

impl Socket {
    pub fn try_clone(&self) -> Result<Socket> {
        Ok(match self {
            Socket::Tcp(s) => Socket::Tcp(s.try_clone()?),
            #[cfg(unix)]
            Socket::Unix(s) => Socket::Unix(s.try_clone()?),
        })
    }

    /// Shut down both directions; any blocked read on a clone returns.
    pub fn shutdown(&self) {
        match self {
            Socket::Tcp(s) => {
                let _ = s.shutdown(Shutdown::Both);
            }
            #[cfg(unix)]
            Socket::Unix(s) => {
                let _ = s.shutdown(Shutdown::Both);
            }
        }
    }
}

impl Read for Socket {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Socket::Tcp(s) => s.read(buf),
            #[cfg(unix)]
            Socket::Unix(s) => s.read(buf),
        }
    }
}

impl Write for Socket {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Socket::Tcp(s) => s.write(buf),
            #[cfg(unix)]
            Socket::Unix(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Socket::Tcp(s) => s.flush(),
            #[cfg(unix)]
            Socket::Unix(s) => s.flush(),
        }
    }
}

/// The bound listening endpoint.
pub enum Listener {
    Tcp(TcpListener),
    #[cfg(unix)]
    Unix(UnixListener),
}

/// Where a running server can be reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenAddr {
    Tcp(SocketAddr),
    Unix(PathBuf),
}

impl Listener {
    pub fn bind_tcp(port: u16, backlog: u32) -> Result<(Listener, ListenAddr)> {
        let listener = TcpListener::bind(("127.0.0.1", port))?;
        set_backlog(&listener, backlog);
        let addr = listener.local_addr()?;
        Ok((Listener::Tcp(listener), ListenAddr::Tcp(addr)))
    }

    #[cfg(unix)]
    pub fn bind_unix(path: &Path, backlog: u32) -> Result<(Listener, ListenAddr)> {
        let listener = UnixListener::bind(path)?;
        set_unix_backlog(&listener, backlog);
        Ok((Listener::Unix(listener), ListenAddr::Unix(path.to_path_buf())))
    }

    pub fn accept(&self) -> Result<Socket> {
        Ok(match self {
            Listener::Tcp(l) => Socket::Tcp(l.accept()?.0),
            #[cfg(unix)]
            Listener::Unix(l) => Socket::Unix(l.accept()?.0),
        })
    }
}

impl ListenAddr {
    /// The line an embedding host reads from standard output: the decimal
    /// port for TCP, the absolute path for a local socket.
    pub fn connection_value(&self) -> String {
        match self {
            ListenAddr::Tcp(addr) => addr.port().to_string(),
            ListenAddr::Unix(path) => path.display().to_string(),
        }
    }

    /// Open a throwaway connection to this endpoint. Used to unblock the
    /// accept loop during shutdown.
    pub fn poke(&self) {
        match self {
            ListenAddr::Tcp(addr) => {
                let _ = TcpStream::connect(addr);
            }
            #[cfg(unix)]
            ListenAddr::Unix(path) => {
                let _ = UnixStream::connect(path);
            }
            #[cfg(not(unix))]
            ListenAddr::Unix(_) => {}
        }
    }
}

// std fixes the accept backlog at bind time; a second listen() on the
// already-listening descriptor updates it.
#[cfg(unix)]
fn set_backlog(listener: &TcpListener, backlog: u32) {
    use std::os::unix::io::AsRawFd;
    unsafe {
        libc::listen(listener.as_raw_fd(), backlog.min(i32::MAX as u32) as i32);
    }
}

#[cfg(not(unix))]
fn set_backlog(_listener: &TcpListener, _backlog: u32) {}

#[cfg(unix)]
fn set_unix_backlog(listener: &UnixListener, backlog: u32) {
    use std::os::unix::io::AsRawFd;
    unsafe {
        libc::listen(listener.as_raw_fd(), backlog.min(i32::MAX as u32) as i32);
    }
}

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

//! Wire client.
//!
//! Speaks the framed protocol from the client side: greet with the
//! password, send command terms, decode JSON replies. Raw `.` heartbeat
//! bytes arriving before a length prefix are stripped and counted.
//!
//! Used by embedding hosts that talk to a server in the same process and
//! by the integration tests.

use std::io::BufReader;
use std::net::TcpStream;
#[cfg(unix)]
use std::os::unix::net::UnixStream;
#[cfg(unix)]
use std::path::Path;

use serde_json::Value;

use crate::error::{Result, ServerError};
use crate::frame::{read_reply_frame, write_frame};
use crate::socket::Socket;

/// A decoded server reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// `true(Rows)`: zero or more answer rows, each a list of JSON values
    /// (binding objects, or the `threads/2` greeting term).
    True(Vec<Vec<Value>>),
    False,
    /// `exception(E)` with the error value as JSON.
    Exception(Value),
}

impl Reply {
    /// The `(name, value)` bindings of one answer row.
    pub fn bindings(row: &[Value]) -> Vec<(String, Value)> {
        row.iter()
            .filter_map(|item| {
                let obj = item.as_object()?;
                if obj.get("functor")?.as_str()? != "=" {
                    return None;
                }
                let args = obj.get("args")?.as_array()?;
                Some((args.first()?.as_str()?.to_string(), args.get(1)?.clone()))
            })
            .collect()
    }

    /// The exception tag when the exception value is an atom.
    pub fn exception_tag(&self) -> Option<&str> {
        match self {
            Reply::Exception(Value::String(tag)) => Some(tag),
            _ => None,
        }
    }
}

/// A connected, authenticated client session.
#[derive(Debug)]
pub struct Client {
    reader: BufReader<Socket>,
    writer: Socket,
    comm_id: String,
    goal_id: String,
    heartbeats: u64,
}

impl Client {
    /// Connect over loopback TCP and authenticate.
    pub fn connect_tcp(port: u16, password: &str) -> Result<Client> {
        let stream = TcpStream::connect(("127.0.0.1", port))?;
        let socket = Socket::Tcp(stream);
        Self::establish(socket, password)
    }

    /// Connect over a local socket and authenticate.
    #[cfg(unix)]
    pub fn connect_unix(path: &Path, password: &str) -> Result<Client> {
        let stream = UnixStream::connect(path)?;
        let socket = Socket::Unix(stream);
        Self::establish(socket, password)
    }

    fn establish(socket: Socket, password: &str) -> Result<Client> {
        let reader = BufReader::new(socket.try_clone()?);
        let mut client = Client {
            reader,
            writer: socket,
            comm_id: String::new(),
            goal_id: String::new(),
            heartbeats: 0,
        };
        let reply = client.exchange(password)?;
        match &reply {
            Reply::True(rows) => {
                let threads = rows
                    .first()
                    .and_then(|row| row.first())
                    .and_then(|item| item.as_object())
                    .filter(|obj| obj.get("functor").and_then(Value::as_str) == Some("threads"))
                    .and_then(|obj| obj.get("args"))
                    .and_then(Value::as_array);
                if let Some(args) = threads {
                    client.comm_id = args
                        .first()
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string();
                    client.goal_id = args
                        .get(1)
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string();
                }
                Ok(client)
            }
            Reply::Exception(value) => Err(ServerError::Protocol(format!(
                "connection rejected: {value}"
            ))),
            Reply::False => Err(ServerError::Protocol("unexpected greeting reply".into())),
        }
    }

    /// Diagnostic worker ids reported by the greeting.
    pub fn thread_ids(&self) -> (&str, &str) {
        (&self.comm_id, &self.goal_id)
    }

    /// Heartbeat bytes observed so far.
    pub fn heartbeat_count(&self) -> u64 {
        self.heartbeats
    }

    /// Send one raw command payload and read the reply.
    pub fn send_command(&mut self, command: &str) -> Result<Reply> {
        self.exchange(command)
    }

    /// Synchronous query; `timeout` in seconds, `None` for the server
    /// default.
    pub fn run(&mut self, goal: &str, timeout: Option<f64>) -> Result<Reply> {
        self.exchange(&format!(
            "run(({}), {})",
            trim_goal(goal),
            format_timeout(timeout)
        ))
    }

    /// Start an asynchronous query.
    pub fn run_async(&mut self, goal: &str, timeout: Option<f64>, find_all: bool) -> Result<Reply> {
        self.exchange(&format!(
            "run_async(({}), {}, {})",
            trim_goal(goal),
            format_timeout(timeout),
            find_all
        ))
    }

    /// Pull the next asynchronous result; negative `timeout` waits
    /// forever, `0.0` polls.
    pub fn async_result(&mut self, timeout: f64) -> Result<Reply> {
        self.exchange(&format!("async_result({timeout})"))
    }

    pub fn cancel_async(&mut self) -> Result<Reply> {
        self.exchange("cancel_async")
    }

    /// Orderly close; the server keeps running.
    pub fn close(&mut self) -> Result<Reply> {
        self.exchange("close")
    }

    /// Ask the server to shut down entirely.
    pub fn quit(&mut self) -> Result<Reply> {
        self.exchange("quit")
    }

    fn exchange(&mut self, payload: &str) -> Result<Reply> {
        write_frame(&mut self.writer, payload)?;
        let (reply, heartbeats) = read_reply_frame(&mut self.reader)?;
        self.heartbeats += heartbeats;
        parse_reply(&reply)
    }
}

fn format_timeout(timeout: Option<f64>) -> String {
    match timeout {
        // An unbound variable selects the server's configured default.
        None => "_".to_string(),
        Some(seconds) => seconds.to_string(),
    }
}

/// Strip a trailing end-of-term marker; the command builder adds its own
/// framing.
fn trim_goal(goal: &str) -> &str {
    goal.trim().trim_end_matches(|c| c == '.' || c == '\n')
}

fn parse_reply(text: &str) -> Result<Reply> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| ServerError::Protocol(format!("reply is not JSON: {e}")))?;
    let obj = value
        .as_object()
        .ok_or_else(|| ServerError::Protocol("reply is not an object".into()))?;
    let functor = obj
        .get("functor")
        .and_then(Value::as_str)
        .ok_or_else(|| ServerError::Protocol("reply missing functor".into()))?;
    let args = obj
        .get("args")
        .and_then(Value::as_array)
        .ok_or_else(|| ServerError::Protocol("reply missing args".into()))?;
    match functor {
        "true" => {
            let rows = args
                .first()
                .and_then(Value::as_array)
                .ok_or_else(|| ServerError::Protocol("true reply missing answers".into()))?;
            let rows = rows
                .iter()
                .map(|row| {
                    row.as_array()
                        .cloned()
                        .ok_or_else(|| ServerError::Protocol("answer row is not a list".into()))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Reply::True(rows))
        }
        "false" => Ok(Reply::False),
        "exception" => Ok(Reply::Exception(
            args.first().cloned().unwrap_or(Value::Null),
        )),
        other => Err(ServerError::Protocol(format!(
            "unexpected reply functor: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_true_reply() {
        let reply = parse_reply(
            r#"{"functor":"true","args":[[[{"functor":"=","args":["X","a"]}]]]}"#,
        )
        .unwrap();
        match &reply {
            Reply::True(rows) => {
                assert_eq!(rows.len(), 1);
                let bindings = Reply::bindings(&rows[0]);
                assert_eq!(bindings, vec![("X".to_string(), json!("a"))]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_false_and_exception() {
        assert_eq!(
            parse_reply(r#"{"functor":"false","args":[]}"#).unwrap(),
            Reply::False
        );
        let reply = parse_reply(r#"{"functor":"exception","args":["no_query"]}"#).unwrap();
        assert_eq!(reply.exception_tag(), Some("no_query"));
    }

    #[test]
    fn test_garbage_reply_is_protocol_error() {
        assert!(parse_reply("not json").is_err());
        assert!(parse_reply(r#"{"functor":"maybe","args":[]}"#).is_err());
    }

    #[test]
    fn test_format_timeout() {
        assert_eq!(format_timeout(None), "_");
        assert_eq!(format_timeout(Some(-1.0)), "-1");
        assert_eq!(format_timeout(Some(0.5)), "0.5");
    }
}

use std::net::SocketAddr;
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::error::{Result, ServerError};
use crate::http::parser::{ParseError, parse_http_request, parse_truncated_request};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::routing::Dispatcher;

pub struct Connection<'a> {
    stream: TcpStream,
    peer: SocketAddr,
    buffer: BytesMut,
    state: ConnectionState,
    dispatcher: &'a Dispatcher,
    read_timeout: Duration,
    write_timeout: Duration,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter),
    Closed,
}

impl<'a> Connection<'a> {
    pub fn new(
        stream: TcpStream,
        peer: SocketAddr,
        dispatcher: &'a Dispatcher,
        read_timeout: Duration,
        write_timeout: Duration,
    ) -> Self {
        Self {
            stream,
            peer,
            buffer: BytesMut::with_capacity(4096),
            state: ConnectionState::Reading,
            dispatcher,
            read_timeout,
            write_timeout,
        }
    }

    /// Serves exactly one request, then closes the socket.
    ///
    /// The socket is shut down on every path. The returned error, if any,
    /// describes what went wrong on this connection only.
    pub async fn run(mut self) -> Result<()> {
        let mut failure = None;

        loop {
            self.state = match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => match self.read_request().await {
                    Ok(request) => ConnectionState::Processing(request),
                    Err(ServerError::MalformedRequest(ParseError::Empty)) => {
                        failure = Some(ServerError::MalformedRequest(ParseError::Empty));
                        ConnectionState::Closed
                    }
                    Err(ServerError::MalformedRequest(e)) => {
                        let response = Response::bad_request(&e.to_string());
                        failure = Some(ServerError::MalformedRequest(e));
                        ConnectionState::Writing(ResponseWriter::new(&response))
                    }
                    Err(e) => {
                        failure = Some(e);
                        ConnectionState::Closed
                    }
                },

                ConnectionState::Processing(request) => {
                    match self.dispatcher.dispatch(&request).await {
                        Ok(response) => {
                            tracing::info!(
                                peer = %self.peer,
                                method = ?request.method,
                                path = %request.path,
                                status = response.status.as_u16(),
                                "Request served"
                            );
                            ConnectionState::Writing(ResponseWriter::new(&response))
                        }
                        Err(e) => {
                            tracing::error!(
                                peer = %self.peer,
                                path = %request.path,
                                error = %e,
                                "No response could be produced"
                            );
                            failure = Some(e);
                            ConnectionState::Writing(ResponseWriter::new(&Response::internal_error()))
                        }
                    }
                }

                ConnectionState::Writing(mut writer) => {
                    match timeout(self.write_timeout, writer.write_to_stream(&mut self.stream)).await {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => failure = Some(ServerError::Io(e)),
                        Err(_) => failure = Some(ServerError::Timeout("writing the response")),
                    }
                    ConnectionState::Closed
                }

                ConnectionState::Closed => break,
            };
        }

        if let Err(e) = self.stream.shutdown().await {
            tracing::debug!(peer = %self.peer, error = %e, "Socket shutdown failed");
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Reads until the head is complete.
    ///
    /// If the peer stops sending (close or read timeout) after some bytes
    /// arrived, those bytes are parsed as the whole head.
    pub async fn read_request(&mut self) -> Result<Request> {
        loop {
            // Try parsing whatever we already have
            match parse_http_request(&self.buffer) {
                Ok((request, _consumed)) => return Ok(request),
                Err(ParseError::Incomplete) => {}
                Err(e) => return Err(e.into()),
            }

            // Read more data
            let read = timeout(self.read_timeout, self.stream.read_buf(&mut self.buffer)).await;

            match read {
                Ok(Ok(0)) => {
                    // Peer closed its side
                    return Ok(parse_truncated_request(&self.buffer)?);
                }
                Ok(Ok(_)) => {}
                Ok(Err(e)) => return Err(e.into()),
                Err(_) if self.buffer.is_empty() => {
                    return Err(ServerError::Timeout("waiting for the request"));
                }
                Err(_) => {
                    tracing::debug!(peer = %self.peer, "Read timed out, parsing partial head");
                    return Ok(parse_truncated_request(&self.buffer)?);
                }
            }
        }
    }
}

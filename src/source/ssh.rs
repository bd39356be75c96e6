use anyhow::Result;
use secrecy::{ExposeSecret, SecretString};
use ssh2::{Channel, Session};
use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::{debug, info, trace};

use super::ConfigSource;
use crate::MigrationError;

const SHOW_RUNNING_CONFIG: &str = "show running-config";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExecMode {
    /// `host>`
    User,
    /// `host#`
    Privileged,
}

/// Answers every keyboard-interactive prompt with the login password.
struct PasswordPrompt<'a> {
    password: &'a str,
}

impl ssh2::KeyboardInteractivePrompt for PasswordPrompt<'_> {
    fn prompt<'b>(
        &mut self,
        _username: &str,
        _instructions: &str,
        prompts: &[ssh2::Prompt<'b>],
    ) -> Vec<String> {
        prompts.iter().map(|_| self.password.to_string()).collect()
    }
}

/// Live Catalyst switch reached over SSH.
pub struct SshSource {
    host: String,
    port: u16,
    username: String,
    password: SecretString,
    secret: Option<SecretString>,
    timeout: Duration,
}

impl SshSource {
    pub fn new(host: &str, username: &str, password: SecretString) -> Self {
        Self {
            host: host.to_string(),
            port: 22,
            username: username.to_string(),
            password,
            secret: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// Enter privileged mode with this secret before reading the config.
    pub fn with_enable_secret(mut self, secret: Option<SecretString>) -> Self {
        self.secret = secret;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    fn unavailable(&self, message: impl Into<String>) -> MigrationError {
        MigrationError::SourceUnavailable {
            source_name: self.describe(),
            message: message.into(),
        }
    }

    fn connect(&self) -> Result<Session, MigrationError> {
        let addr = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| self.unavailable(format!("cannot resolve host: {e}")))?
            .next()
            .ok_or_else(|| self.unavailable("host resolved to no addresses"))?;

        debug!(%addr, "connecting");
        let tcp = TcpStream::connect_timeout(&addr, self.timeout)
            .map_err(|e| self.unavailable(format!("TCP connection failed: {e}")))?;
        tcp.set_read_timeout(Some(self.timeout)).ok();
        tcp.set_write_timeout(Some(self.timeout)).ok();

        let mut session =
            Session::new().map_err(|e| self.unavailable(format!("SSH session: {e}")))?;
        session.set_tcp_stream(tcp);
        session.set_timeout(u32::try_from(self.timeout.as_millis()).unwrap_or(u32::MAX));
        session
            .handshake()
            .map_err(|e| self.unavailable(format!("SSH handshake failed: {e}")))?;

        let password = self.password.expose_secret();
        if session.userauth_password(&self.username, password).is_err()
            || !session.authenticated()
        {
            // IOS-XE with AAA often only offers keyboard-interactive
            let mut prompter = PasswordPrompt { password };
            let _ = session.userauth_keyboard_interactive(&self.username, &mut prompter);
        }

        if session.authenticated() {
            Ok(session)
        } else {
            Err(self.unavailable("SSH authentication failed"))
        }
    }

    fn exec(&self, session: &Session) -> Result<String, MigrationError> {
        let mut channel = session
            .channel_session()
            .map_err(|e| self.unavailable(format!("failed to open channel: {e}")))?;
        channel
            .exec(SHOW_RUNNING_CONFIG)
            .map_err(|e| self.unavailable(format!("failed to execute command: {e}")))?;

        let mut output = String::new();
        channel
            .read_to_string(&mut output)
            .map_err(|e| self.unavailable(format!("failed to read output: {e}")))?;
        let _ = channel.wait_close();
        Ok(output)
    }

    /// Read shell output until it stops at an exec prompt.
    fn read_until_prompt(&self, channel: &mut Channel) -> Result<(String, ExecMode), MigrationError> {
        let mut output = String::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = channel
                .read(&mut buf)
                .map_err(|e| self.unavailable(format!("failed to read prompt: {e}")))?;
            if n == 0 {
                return Err(self.unavailable("shell closed before showing a prompt"));
            }
            output.push_str(&String::from_utf8_lossy(&buf[..n]));
            if let Some(mode) = prompt_mode(&output) {
                return Ok((output, mode));
            }
        }
    }

    fn privileged_shell(&self, session: &Session, secret: &str) -> Result<String, MigrationError> {
        let mut channel = session
            .channel_session()
            .map_err(|e| self.unavailable(format!("failed to open channel: {e}")))?;
        channel
            .request_pty("vt100", None, None)
            .map_err(|e| self.unavailable(format!("failed to request terminal: {e}")))?;
        channel
            .shell()
            .map_err(|e| self.unavailable(format!("failed to start shell: {e}")))?;

        let (mut output, mode) = self.read_until_prompt(&mut channel)?;
        let mut script = String::new();
        if mode == ExecMode::User {
            script.push_str(&format!("enable\n{secret}\n"));
        } else {
            debug!("login is already privileged, not sending enable");
        }
        script.push_str(&format!("terminal length 0\n{SHOW_RUNNING_CONFIG}\nexit\n"));

        channel
            .write_all(script.as_bytes())
            .map_err(|e| self.unavailable(format!("failed to send commands: {e}")))?;
        channel
            .send_eof()
            .map_err(|e| self.unavailable(format!("failed to send commands: {e}")))?;

        channel
            .read_to_string(&mut output)
            .map_err(|e| self.unavailable(format!("failed to read output: {e}")))?;
        let _ = channel.wait_close();
        Ok(output)
    }
}

impl ConfigSource for SshSource {
    fn fetch_running_config(&mut self) -> Result<String> {
        info!(host = %self.host, "retrieving running configuration over SSH");
        let session = self.connect()?;

        let output = match &self.secret {
            Some(secret) => self.privileged_shell(&session, secret.expose_secret())?,
            None => self.exec(&session)?,
        };
        trace!(bytes = output.len(), "received output");

        check_rejected(&output, &self.describe())?;
        Ok(running_config_section(&output).to_string())
    }

    fn describe(&self) -> String {
        if self.port == 22 {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// IOS reports a rejected command inline rather than through the exit status.
fn check_rejected(output: &str, source_name: &str) -> Result<(), MigrationError> {
    for line in output.lines().map(str::trim) {
        let command = if line.contains("Invalid input") {
            SHOW_RUNNING_CONFIG
        } else if line.starts_with("% Access denied") || line.starts_with("% Bad secrets") {
            "enable"
        } else {
            continue;
        };
        return Err(MigrationError::SourceRejectedCommand {
            source_name: source_name.to_string(),
            command: command.to_string(),
            message: line.to_string(),
        });
    }
    Ok(())
}

/// Cut shell noise (banners, prompts, echoed commands) around the config.
fn running_config_section(output: &str) -> &str {
    let Some(start) = output
        .find("Building configuration")
        .or_else(|| output.find("Current configuration"))
    else {
        return output;
    };
    let body = &output[start..];
    match config_end(body) {
        Some(end) => &body[..end],
        None => body,
    }
}

/// Offset just past the first line that is exactly `end`.
fn config_end(body: &str) -> Option<usize> {
    let mut offset = 0;
    for line in body.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "end" {
            return Some(offset + "end".len());
        }
        offset += line.len();
    }
    None
}

/// The exec mode shown by a trailing `host>` or `host#` prompt.
fn prompt_mode(output: &str) -> Option<ExecMode> {
    let last = output.trim_end().rsplit('\n').next()?.trim();
    let (host, mode) = match last.strip_suffix('#') {
        Some(host) => (host, ExecMode::Privileged),
        None => (last.strip_suffix('>')?, ExecMode::User),
    };
    let is_hostname = !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    is_hostname.then_some(mode)
}
